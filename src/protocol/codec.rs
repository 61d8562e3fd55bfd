//! Protocol codec
//!
//! Encoding of requests and stream-based decoding of responses.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌────────────┬───────────┬──────────┬─────────────┬──────────┬─────────────┬───────────┐
//! │ UserID (4) │ Ver (1)   │ Op (1)   │ NameLen (2) │ Name     │ FileSize (4)│ FileBytes │
//! └────────────┴───────────┴──────────┴─────────────┴──────────┴─────────────┴───────────┘
//! ```
//! - LIST:            header only (6 bytes)
//! - RETRIEVE/DELETE: header + name_len + name
//! - SAVE:            header + name_len + name + file_size + file_bytes
//!
//! ### Response Format
//! ```text
//! ┌──────────┬────────────┬─────────────┬──────────┬─────────────┬───────────┐
//! │ Ver (1)  │ Status (2) │ NameLen (2) │ Name     │ FileSize (4)│ FileBytes │
//! └──────────┴────────────┴─────────────┴──────────┴─────────────┴───────────┘
//! ```
//! Everything after the status is optional; see [`ResponseKind::classify`].

use std::io::{Read, Write};

use bytes::{BufMut, BytesMut};

use crate::error::{Result, VaultError};
use crate::transfer::{receive_to_sink, TransferReport};
use super::field::{decode_field, encode_field, FieldWidth};
use super::{OpCode, Request, Response, ResponseBody, ResponseHeader, ResponseKind, UserId};
use super::response::RESPONSE_HEADER_SIZE;

/// Request header size: user id (4) + version (1) + opcode (1)
pub const REQUEST_HEADER_SIZE: usize = 6;

// =============================================================================
// Request Encoding
// =============================================================================

/// Encode a request to bytes
///
/// Fails without producing a partial frame when the filename or the file
/// contents do not fit their length fields.
pub fn encode_request(user_id: UserId, version: u8, request: &Request) -> Result<Vec<u8>> {
    let filename = request.filename();
    let contents = request.contents();

    let name_bytes = filename.map(str::as_bytes).unwrap_or(&[]);
    if name_bytes.len() > FieldWidth::Two.max_value() as usize {
        return Err(VaultError::FilenameTooLong(name_bytes.len()));
    }
    if let Some(contents) = contents {
        if contents.len() as u64 > FieldWidth::Four.max_value() {
            return Err(VaultError::PayloadTooLarge(contents.len() as u64));
        }
    }

    let capacity = REQUEST_HEADER_SIZE
        + filename.map_or(0, |_| 2 + name_bytes.len())
        + contents.map_or(0, |c| 4 + c.len());
    let mut message = BytesMut::with_capacity(capacity);

    message.put_slice(&encode_field(u64::from(user_id.value()), FieldWidth::Four)?);
    message.put_slice(&encode_field(u64::from(version), FieldWidth::One)?);
    message.put_slice(&encode_field(request.op_code() as u64, FieldWidth::One)?);

    if filename.is_some() {
        message.put_slice(&encode_field(name_bytes.len() as u64, FieldWidth::Two)?);
        message.put_slice(name_bytes);
    }

    if let Some(contents) = contents {
        message.put_slice(&encode_field(contents.len() as u64, FieldWidth::Four)?);
        message.put_slice(contents);
    }

    Ok(message.to_vec())
}

/// Write a request to a stream
pub fn write_request<W: Write>(
    writer: &mut W,
    user_id: UserId,
    version: u8,
    request: &Request,
) -> Result<()> {
    let bytes = encode_request(user_id, version, request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Response Decoding
// =============================================================================

/// Read the fixed response header with a single exact read
pub fn read_header<R: Read + ?Sized>(reader: &mut R) -> Result<ResponseHeader> {
    let mut header = [0u8; RESPONSE_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    Ok(ResponseHeader {
        version: decode_field(&header[..1], FieldWidth::One)? as u8,
        status: decode_field(&header[1..], FieldWidth::Two)? as u16,
    })
}

/// Read a `[NameLen:2][Name]` pair
pub fn read_filename<R: Read + ?Sized>(reader: &mut R) -> Result<String> {
    let mut len = [0u8; 2];
    reader.read_exact(&mut len)?;
    let name_len = decode_field(&len, FieldWidth::Two)? as usize;

    let mut name = vec![0u8; name_len];
    reader.read_exact(&mut name)?;

    String::from_utf8(name)
        .map_err(|e| VaultError::Protocol(format!("Filename is not valid UTF-8: {}", e)))
}

/// Read a `[FileSize:4]` field
pub fn read_file_size<R: Read + ?Sized>(reader: &mut R) -> Result<u32> {
    let mut size = [0u8; 4];
    reader.read_exact(&mut size)?;
    Ok(decode_field(&size, FieldWidth::Four)? as u32)
}

/// Read a complete response to a request with opcode `op`
///
/// The header decides, together with `op`, which fields follow. When a
/// payload follows, `open_sink` is called with the response kind and the
/// received filename to obtain the destination, and the payload is streamed
/// into it in `chunk_size` pieces. Unrecognized statuses stop after the
/// header; whatever else the peer sent is left unread.
pub fn read_response<R, W, F>(
    reader: &mut R,
    op: OpCode,
    chunk_size: usize,
    open_sink: F,
) -> Result<Response>
where
    R: Read + ?Sized,
    W: Write,
    F: FnOnce(ResponseKind, &str) -> Result<W>,
{
    let header = read_header(reader)?;
    let kind = ResponseKind::classify(op, header.status);

    tracing::debug!(
        "Response to {}: version={} status={} kind={:?}",
        op,
        header.version,
        header.status,
        kind
    );

    let body = match kind {
        ResponseKind::FileList => {
            let (filename, transfer) = read_payload(reader, kind, chunk_size, open_sink)?;
            ResponseBody::FileList { filename, transfer }
        }
        ResponseKind::Retrieved => {
            let (filename, transfer) = read_payload(reader, kind, chunk_size, open_sink)?;
            ResponseBody::Retrieved { filename, transfer }
        }
        ResponseKind::Saved => ResponseBody::Saved {
            filename: read_filename(reader)?,
        },
        ResponseKind::Deleted => ResponseBody::Deleted {
            filename: read_filename(reader)?,
        },
        ResponseKind::NoUserFiles => ResponseBody::NoUserFiles,
        ResponseKind::SaveSourceMissing => ResponseBody::SaveSourceMissing,
        ResponseKind::RetrieveMissing => ResponseBody::RetrieveMissing,
        ResponseKind::DeleteMissing => ResponseBody::DeleteMissing,
        ResponseKind::Unrecognized { status } => ResponseBody::Unrecognized { status },
    };

    Ok(Response { header, body })
}

/// Read `[NameLen:2][Name][FileSize:4]` and stream the payload into a sink
fn read_payload<R, W, F>(
    reader: &mut R,
    kind: ResponseKind,
    chunk_size: usize,
    open_sink: F,
) -> Result<(String, TransferReport)>
where
    R: Read + ?Sized,
    W: Write,
    F: FnOnce(ResponseKind, &str) -> Result<W>,
{
    let filename = read_filename(reader)?;
    let declared = read_file_size(reader)?;
    let mut sink = open_sink(kind, &filename)?;
    let report = receive_to_sink(reader, declared, &mut sink, chunk_size)?;
    Ok((filename, report))
}
