//! Client Module
//!
//! Runs the four backup operations against the server.
//!
//! ## Responsibilities
//! - Frame each request before any connection is opened
//! - One connection per operation, closed on every exit path
//! - Interpret the response in the context of the request that was sent
//! - Contain every failure to the operation that caused it
//!
//! ## Operation Lifecycle
//! ```text
//! Idle → Connected → RequestSent → StatusReceived → Completed
//!                                                 ↘ Failed
//! ```

use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::ClientConfig;
use crate::error::{Result, VaultError};
use crate::network::Connection;
use crate::protocol::{
    encode_request, OpCode, Request, Response, ResponseBody, ResponseKind, UserId,
};
use crate::transfer::{TransferReport, TransferStatus};

/// What a completed operation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The server sent a file listing
    Listing {
        entries: Vec<String>,
        staged: PathBuf,
        transfer: TransferReport,
    },

    /// The server holds no files for this user
    NoFiles,

    /// The server stored the file
    Saved { filename: String },

    /// The server says the file was missing on the sending side
    MissingLocally { filename: String },

    /// The file was downloaded into the staging area
    Retrieved {
        filename: String,
        staged: PathBuf,
        transfer: TransferReport,
    },

    /// The server has no such file
    NotOnServer { filename: String },

    /// The server removed the file
    Deleted { filename: String },
}

impl Report {
    /// Whether a payload arrived shorter than declared
    pub fn is_truncated(&self) -> bool {
        match self {
            Report::Listing { transfer, .. } | Report::Retrieved { transfer, .. } => {
                !transfer.is_complete()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Listing { entries, .. } => {
                write!(f, "List of files on server:")?;
                for entry in entries {
                    write!(f, "\n{}", entry)?;
                }
            }
            Report::NoFiles => write!(f, "No files on server")?,
            Report::Saved { filename } => write!(f, "Saved {} to server", filename)?,
            Report::MissingLocally { filename } => {
                write!(f, "No such file {} on client", filename)?
            }
            Report::Retrieved { filename, staged, .. } => write!(
                f,
                "Retrieved {} from server into {}",
                filename,
                staged.display()
            )?,
            Report::NotOnServer { filename } => {
                write!(f, "No such file {} on server", filename)?
            }
            Report::Deleted { filename } => write!(f, "Deleted {} from server", filename)?,
        }

        match self {
            Report::Listing { transfer, .. } | Report::Retrieved { transfer, .. } => {
                if let TransferStatus::Truncated { missing } = transfer.status() {
                    write!(f, " (truncated: {} bytes missing)", missing)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Terminal state of one operation
#[derive(Debug)]
pub enum Outcome {
    /// A recognized response was received and interpreted
    Completed { op: OpCode, report: Report },

    /// Transport failure, local precondition failure, or unexpected response
    Failed { op: OpCode, error: VaultError },
}

impl Outcome {
    pub fn op(&self) -> OpCode {
        match self {
            Outcome::Completed { op, .. } | Outcome::Failed { op, .. } => *op,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            Outcome::Completed { report, .. } => Some(report),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&VaultError> {
        match self {
            Outcome::Completed { .. } => None,
            Outcome::Failed { error, .. } => Some(error),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed { report, .. } => report.fmt(f),
            Outcome::Failed { op, error } => write!(f, "{} failed: {}", op, error),
        }
    }
}

/// A backup client bound to one user id
///
/// The user id is generated once and sent unchanged on every request this
/// client makes. Independent clients in the same process get independent ids.
pub struct BackupClient {
    config: ClientConfig,
    user_id: UserId,
}

impl BackupClient {
    /// Create a client with a freshly generated user id
    pub fn new(config: ClientConfig) -> Self {
        Self::with_user_id(config, UserId::random())
    }

    /// Create a client with a known user id
    pub fn with_user_id(config: ClientConfig, user_id: UserId) -> Self {
        Self { config, user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// List the files stored for this user
    pub fn list(&self) -> Outcome {
        self.execute(Request::List)
    }

    /// Upload a local file
    ///
    /// The file is read before connecting; if it is missing no connection is
    /// made and nothing is sent.
    pub fn save(&self, filename: &str) -> Outcome {
        match Request::save_from_path(filename) {
            Ok(request) => self.execute(request),
            Err(error) => self.fail(OpCode::SaveFile, error),
        }
    }

    /// Download a file into the staging area
    pub fn retrieve(&self, filename: &str) -> Outcome {
        self.execute(Request::Retrieve {
            filename: filename.to_string(),
        })
    }

    /// Remove a file from the backup
    pub fn delete(&self, filename: &str) -> Outcome {
        self.execute(Request::Delete {
            filename: filename.to_string(),
        })
    }

    /// Run one request to completion, containing any failure
    pub fn execute(&self, request: Request) -> Outcome {
        let op = request.op_code();
        match self.exchange(&request) {
            Ok(report) => {
                tracing::info!(operation = %op, user = %self.user_id, "{}", report);
                Outcome::Completed { op, report }
            }
            Err(error) => self.fail(op, error),
        }
    }

    /// Run the standard backup session over `filenames`
    ///
    /// list, save first, save second, list, retrieve first, delete first,
    /// retrieve first again. Each step is independent of the others.
    pub fn run_session(&self, filenames: &[String]) -> Result<Vec<Outcome>> {
        let [first, second, ..] = filenames else {
            return Err(VaultError::Config(format!(
                "session needs at least 2 filenames, got {}",
                filenames.len()
            )));
        };

        Ok(vec![
            self.list(),
            self.save(first),
            self.save(second),
            self.list(),
            self.retrieve(first),
            self.delete(first),
            self.retrieve(first),
        ])
    }

    fn fail(&self, op: OpCode, error: VaultError) -> Outcome {
        tracing::error!(
            operation = %op,
            user = %self.user_id,
            "{} failed: {}",
            op,
            error_chain(&error)
        );
        Outcome::Failed { op, error }
    }

    fn exchange(&self, request: &Request) -> Result<Report> {
        let op = request.op_code();
        let frame = encode_request(self.user_id, self.config.protocol_version, request)?;

        let mut connection = Connection::open(&self.config.server_addr)?;
        connection.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)?;
        connection.send_frame(&frame)?;

        let response = connection.receive_response(op, self.config.chunk_size, |kind, name| {
            let path = self.staging_path(kind, name)?;
            tracing::debug!("Staging {} payload at {}", op, path.display());
            Ok(BufWriter::new(File::create(path)?))
        })?;
        drop(connection);

        self.interpret(request, response)
    }

    fn staging_path(&self, kind: ResponseKind, remote_name: &str) -> Result<PathBuf> {
        match kind {
            ResponseKind::FileList => Ok(self.config.staging_dir.join(bare_file_name(remote_name)?)),
            ResponseKind::Retrieved => Ok(self.config.retrieve_staging_path()),
            ResponseKind::NoUserFiles
            | ResponseKind::Saved
            | ResponseKind::SaveSourceMissing
            | ResponseKind::RetrieveMissing
            | ResponseKind::Deleted
            | ResponseKind::DeleteMissing
            | ResponseKind::Unrecognized { .. } => Err(VaultError::Protocol(format!(
                "{:?} response carries no payload",
                kind
            ))),
        }
    }

    fn interpret(&self, request: &Request, response: Response) -> Result<Report> {
        let requested = request.filename().unwrap_or_default().to_string();

        if let Some(transfer) = response.body.transfer() {
            if let TransferStatus::Truncated { missing } = transfer.status() {
                tracing::warn!(
                    "{} payload truncated: {} of {} bytes missing",
                    request.op_code(),
                    missing,
                    transfer.declared
                );
                if self.config.reject_truncated {
                    transfer.require_complete()?;
                }
            }
        }

        let report = match response.body {
            ResponseBody::FileList { filename, transfer } => {
                let staged = self.config.staging_dir.join(bare_file_name(&filename)?);
                Report::Listing {
                    entries: read_listing(&staged)?,
                    staged,
                    transfer,
                }
            }
            ResponseBody::NoUserFiles => Report::NoFiles,
            ResponseBody::Saved { filename } => Report::Saved { filename },
            ResponseBody::SaveSourceMissing => Report::MissingLocally {
                filename: requested,
            },
            ResponseBody::Retrieved { filename, transfer } => Report::Retrieved {
                filename,
                staged: self.config.retrieve_staging_path(),
                transfer,
            },
            ResponseBody::RetrieveMissing | ResponseBody::DeleteMissing => Report::NotOnServer {
                filename: requested,
            },
            ResponseBody::Deleted { filename } => Report::Deleted { filename },
            ResponseBody::Unrecognized { status } => {
                return Err(VaultError::Protocol(format!(
                    "Unexpected status {} for {} request",
                    status,
                    request.op_code()
                )))
            }
        };

        Ok(report)
    }
}

/// Read a staged listing: UTF-8 text, one filename per line
fn read_listing(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| VaultError::Protocol(format!("File listing is not valid UTF-8: {}", e)))?;

    Ok(text
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Accept a server-chosen name only if it names a file directly in the staging dir
fn bare_file_name(name: &str) -> Result<&str> {
    let is_bare = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0');

    if is_bare {
        Ok(name)
    } else {
        Err(VaultError::Protocol(format!(
            "Refusing to stage payload under '{}'",
            name
        )))
    }
}

/// Render an error with its full source chain
fn error_chain(error: &VaultError) -> String {
    let mut rendered = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // Transparent wrappers already print their source
        if !rendered.ends_with(&cause_text) {
            rendered.push_str(": ");
            rendered.push_str(&cause_text);
        }
        source = cause.source();
    }
    rendered
}
