//! Protocol Module
//!
//! Defines the wire protocol spoken to the backup server.
//!
//! ## Protocol Format (Version 1)
//!
//! One request and one response per connection. All integers are
//! little-endian.
//!
//! ### Request Format
//! ```text
//! ┌────────────┬─────────┬────────┬──────────────────────────────────┐
//! │ UserID (4) │ Ver (1) │ Op (1) │  [NameLen (2) + Name] [Size + ..] │
//! └────────────┴─────────┴────────┴──────────────────────────────────┘
//! ```
//!
//! ### OpCodes
//! - 100: SAVE      - name + file
//! - 200: RETRIEVE  - name
//! - 201: DELETE    - name
//! - 202: LIST      - nothing
//!
//! ### Response Format
//! ```text
//! ┌─────────┬────────────┬──────────────────────────────────┐
//! │ Ver (1) │ Status (2) │  depends on (opcode, status)      │
//! └─────────┴────────────┴──────────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 210: FILE_RETRIEVED
//! - 211: FILE_LIST_RETRIEVED
//! - 212: SUCCESS
//! - 1001: NO_FILE
//! - 1002: NO_USER_FILES
//! - 1003: SERVER_ERROR

mod codec;
mod field;
mod opcode;
mod request;
mod response;

pub use codec::{
    encode_request, write_request, read_header, read_filename, read_file_size, read_response,
    REQUEST_HEADER_SIZE,
};
pub use field::{decode_field, encode_field, FieldWidth};
pub use opcode::{OpCode, ResponseStatus};
pub use request::{Request, UserId};
pub use response::{Response, ResponseBody, ResponseHeader, ResponseKind, RESPONSE_HEADER_SIZE};

/// Protocol version sent on every request
pub const PROTOCOL_VERSION: u8 = 1;
