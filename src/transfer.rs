//! Chunked Transfer
//!
//! Receives a payload of declared length from a stream in bounded chunks.
//!
//! ## Responsibilities
//! - Read at most `chunk_size` bytes per call, never past the declared length
//! - Treat short reads as normal and keep looping
//! - Stop on the first zero-length read (peer closed the stream)
//! - Report how many bytes actually arrived, so truncation is never silent

use std::io::{ErrorKind, Read, Write};

use crate::error::{Result, VaultError};

/// Default chunk size for payload reception (4 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Whether a transfer delivered everything it announced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// Every declared byte arrived
    Complete,

    /// The stream ended early
    Truncated { missing: u64 },
}

/// Result of a payload transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    /// Length announced by the sender
    pub declared: u32,

    /// Bytes actually written to the sink
    pub received: u64,
}

impl TransferReport {
    pub fn status(&self) -> TransferStatus {
        let declared = u64::from(self.declared);
        if self.received >= declared {
            TransferStatus::Complete
        } else {
            TransferStatus::Truncated {
                missing: declared - self.received,
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == TransferStatus::Complete
    }

    /// Turn a truncated transfer into an error
    pub fn require_complete(self) -> Result<Self> {
        match self.status() {
            TransferStatus::Complete => Ok(self),
            TransferStatus::Truncated { .. } => Err(VaultError::TruncatedTransfer {
                declared: self.declared,
                received: self.received,
            }),
        }
    }
}

/// Copy `declared` bytes from `reader` into `sink`, `chunk_size` at a time
///
/// Stops when the declared length is exhausted or the reader returns 0.
/// A stream that ends early is not an error here: the returned report says
/// how much arrived and the caller decides what truncation means.
pub fn receive_to_sink<R, W>(
    reader: &mut R,
    declared: u32,
    sink: &mut W,
    chunk_size: usize,
) -> Result<TransferReport>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    if chunk_size == 0 {
        return Err(VaultError::Config("chunk size must be non-zero".to_string()));
    }

    let mut buffer = vec![0u8; chunk_size.min(declared as usize)];
    let mut remaining = u64::from(declared);
    let mut received = 0u64;

    while remaining > 0 {
        let want = buffer.len().min(remaining as usize);
        let n = match reader.read(&mut buffer[..want]) {
            Ok(0) => {
                tracing::debug!(
                    "Stream ended with {} of {} declared bytes outstanding",
                    remaining,
                    declared
                );
                break;
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        sink.write_all(&buffer[..n])?;
        remaining -= n as u64;
        received += n as u64;
        tracing::trace!("Received chunk of {} bytes, {} remaining", n, remaining);
    }

    sink.flush()?;

    Ok(TransferReport { declared, received })
}
