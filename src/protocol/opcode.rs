//! Operation codes and response statuses

use std::fmt;

/// Request operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    SaveFile = 100,
    RetrieveFile = 200,
    DeleteFile = 201,
    ListFiles = 202,
}

impl OpCode {
    /// Parse a wire opcode, `None` if unknown
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            100 => Some(OpCode::SaveFile),
            200 => Some(OpCode::RetrieveFile),
            201 => Some(OpCode::DeleteFile),
            202 => Some(OpCode::ListFiles),
            _ => None,
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpCode::SaveFile => "save",
            OpCode::RetrieveFile => "retrieve",
            OpCode::DeleteFile => "delete",
            OpCode::ListFiles => "list",
        };
        f.write_str(name)
    }
}

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ResponseStatus {
    // Success
    FileRetrieved = 210,
    FileListRetrieved = 211,
    Success = 212,

    // Errors
    NoFile = 1001,
    NoUserFiles = 1002,
    ServerError = 1003,
}

impl ResponseStatus {
    /// Parse a wire status, `None` if outside the known set
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            210 => Some(ResponseStatus::FileRetrieved),
            211 => Some(ResponseStatus::FileListRetrieved),
            212 => Some(ResponseStatus::Success),
            1001 => Some(ResponseStatus::NoFile),
            1002 => Some(ResponseStatus::NoUserFiles),
            1003 => Some(ResponseStatus::ServerError),
            _ => None,
        }
    }

    pub fn is_success(self) -> bool {
        (self as u16) < 1000
    }
}
