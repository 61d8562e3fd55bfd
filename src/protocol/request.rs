//! Request definitions
//!
//! Represents the operations a client asks the server to perform.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, VaultError};
use super::OpCode;

/// Anonymous per-client identifier
///
/// Generated once from 4 random bytes and reused for every request the
/// client makes. The bytes are read as a big-endian integer, which is then
/// written to the wire little-endian like every other field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(u32);

impl UserId {
    /// Generate a fresh random identifier
    pub fn random() -> Self {
        Self::from_bytes(rand::random::<[u8; 4]>())
    }

    /// Build an identifier from its raw bytes
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// The raw bytes this identifier was generated from
    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// A request to send to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Upload a file; `contents` was loaded before the request was framed
    Save { filename: String, contents: Vec<u8> },

    /// Download a file
    Retrieve { filename: String },

    /// Remove a file from the backup
    Delete { filename: String },

    /// List the caller's files
    List,
}

impl Request {
    /// Build a save request by loading `filename` from the local filesystem
    ///
    /// The name sent to the server is `filename` exactly as given. Fails with
    /// `FileNotFound` when the file does not exist, before anything is framed.
    pub fn save_from_path(filename: &str) -> Result<Self> {
        let contents = read_source(Path::new(filename))?;
        Ok(Request::Save {
            filename: filename.to_string(),
            contents,
        })
    }

    /// Get the opcode for this request
    pub fn op_code(&self) -> OpCode {
        match self {
            Request::Save { .. } => OpCode::SaveFile,
            Request::Retrieve { .. } => OpCode::RetrieveFile,
            Request::Delete { .. } => OpCode::DeleteFile,
            Request::List => OpCode::ListFiles,
        }
    }

    /// The filename carried by the request, if any
    pub fn filename(&self) -> Option<&str> {
        match self {
            Request::Save { filename, .. }
            | Request::Retrieve { filename }
            | Request::Delete { filename } => Some(filename),
            Request::List => None,
        }
    }

    /// The file contents carried by the request, if any
    pub fn contents(&self) -> Option<&[u8]> {
        match self {
            Request::Save { contents, .. } => Some(contents),
            _ => None,
        }
    }
}

fn read_source(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => VaultError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => VaultError::Io(e),
    })
}
