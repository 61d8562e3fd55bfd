//! Response definitions
//!
//! The response header never says whether a filename or payload follows.
//! That is decided by the pair (opcode sent, status received), which is
//! mapped here onto a closed set of response kinds.

use crate::transfer::TransferReport;
use super::{OpCode, ResponseStatus};

/// Size of the fixed response header: version (1) + status (2)
pub const RESPONSE_HEADER_SIZE: usize = 3;

/// The fixed part of every response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Protocol version echoed by the server (not validated)
    pub version: u8,

    /// Raw status code
    pub status: u16,
}

/// Meaning of a response in the context of the request that prompted it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// List + FileListRetrieved
    FileList,

    /// List + NoUserFiles
    NoUserFiles,

    /// Save + Success
    Saved,

    /// Save + NoFile
    SaveSourceMissing,

    /// Retrieve + FileRetrieved
    Retrieved,

    /// Retrieve + NoFile
    RetrieveMissing,

    /// Delete + Success
    Deleted,

    /// Delete + NoFile
    DeleteMissing,

    /// Unknown status, or a known one that is not a valid answer to the opcode
    Unrecognized { status: u16 },
}

impl ResponseKind {
    /// Classify a status received in reply to `op`
    pub fn classify(op: OpCode, status: u16) -> Self {
        use OpCode::*;
        use ResponseStatus::*;

        match (op, ResponseStatus::from_u16(status)) {
            (ListFiles, Some(FileListRetrieved)) => ResponseKind::FileList,
            (ListFiles, Some(NoUserFiles)) => ResponseKind::NoUserFiles,
            (SaveFile, Some(Success)) => ResponseKind::Saved,
            (SaveFile, Some(NoFile)) => ResponseKind::SaveSourceMissing,
            (RetrieveFile, Some(FileRetrieved)) => ResponseKind::Retrieved,
            (RetrieveFile, Some(NoFile)) => ResponseKind::RetrieveMissing,
            (DeleteFile, Some(Success)) => ResponseKind::Deleted,
            (DeleteFile, Some(NoFile)) => ResponseKind::DeleteMissing,

            (ListFiles, Some(FileRetrieved | Success | NoFile | ServerError))
            | (SaveFile, Some(FileRetrieved | FileListRetrieved | NoUserFiles | ServerError))
            | (RetrieveFile, Some(FileListRetrieved | Success | NoUserFiles | ServerError))
            | (DeleteFile, Some(FileRetrieved | FileListRetrieved | NoUserFiles | ServerError))
            | (_, None) => ResponseKind::Unrecognized { status },
        }
    }
}

/// Fields that followed the header, shaped by the response kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// `[NameLen:2][Name][FileSize:4][FileBytes]`; the bytes went to the sink
    FileList {
        filename: String,
        transfer: TransferReport,
    },

    NoUserFiles,

    /// `[NameLen:2][Name]`
    Saved { filename: String },

    SaveSourceMissing,

    /// `[NameLen:2][Name][FileSize:4][FileBytes]`; the bytes went to the sink
    Retrieved {
        filename: String,
        transfer: TransferReport,
    },

    RetrieveMissing,

    /// `[NameLen:2][Name]`
    Deleted { filename: String },

    DeleteMissing,

    /// Nothing after the header was read
    Unrecognized { status: u16 },
}

impl ResponseBody {
    pub fn kind(&self) -> ResponseKind {
        match self {
            ResponseBody::FileList { .. } => ResponseKind::FileList,
            ResponseBody::NoUserFiles => ResponseKind::NoUserFiles,
            ResponseBody::Saved { .. } => ResponseKind::Saved,
            ResponseBody::SaveSourceMissing => ResponseKind::SaveSourceMissing,
            ResponseBody::Retrieved { .. } => ResponseKind::Retrieved,
            ResponseBody::RetrieveMissing => ResponseKind::RetrieveMissing,
            ResponseBody::Deleted { .. } => ResponseKind::Deleted,
            ResponseBody::DeleteMissing => ResponseKind::DeleteMissing,
            ResponseBody::Unrecognized { status } => ResponseKind::Unrecognized { status: *status },
        }
    }

    /// Report of the payload transfer, for bodies that carry one
    pub fn transfer(&self) -> Option<TransferReport> {
        match self {
            ResponseBody::FileList { transfer, .. } | ResponseBody::Retrieved { transfer, .. } => {
                Some(*transfer)
            }
            ResponseBody::NoUserFiles
            | ResponseBody::Saved { .. }
            | ResponseBody::SaveSourceMissing
            | ResponseBody::RetrieveMissing
            | ResponseBody::Deleted { .. }
            | ResponseBody::DeleteMissing
            | ResponseBody::Unrecognized { .. } => None,
        }
    }
}

/// A parsed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub header: ResponseHeader,

    pub body: ResponseBody,
}
