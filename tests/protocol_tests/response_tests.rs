//! Response Parsing Tests
//!
//! Context-sensitive parsing keyed by (opcode, status).

use std::collections::VecDeque;
use std::io::{Cursor, Read};

use filevault::protocol::{
    read_header, read_response, OpCode, ResponseBody, ResponseKind, ResponseStatus,
};
use filevault::transfer::TransferStatus;

// =============================================================================
// Helper Functions
// =============================================================================

fn frame(status: u16, tail: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0x01];
    bytes.extend_from_slice(&status.to_le_bytes());
    bytes.extend_from_slice(tail);
    bytes
}

fn name_field(name: &str) -> Vec<u8> {
    let mut bytes = (name.len() as u16).to_le_bytes().to_vec();
    bytes.extend_from_slice(name.as_bytes());
    bytes
}

fn no_sink(kind: ResponseKind, name: &str) -> filevault::Result<Vec<u8>> {
    panic!("no payload expected for {:?} ({})", kind, name)
}

/// Reader that hands out predetermined pieces, one per read call
struct PieceReader {
    pieces: VecDeque<Vec<u8>>,
    reads: usize,
}

impl PieceReader {
    fn new(pieces: Vec<Vec<u8>>) -> Self {
        Self {
            pieces: pieces.into(),
            reads: 0,
        }
    }
}

impl Read for PieceReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reads += 1;
        let Some(front) = self.pieces.front_mut() else {
            return Ok(0);
        };
        let n = buf.len().min(front.len());
        buf[..n].copy_from_slice(&front[..n]);
        front.drain(..n);
        if front.is_empty() {
            self.pieces.pop_front();
        }
        Ok(n)
    }
}

// =============================================================================
// Classification Tests
// =============================================================================

#[test]
fn test_classify_expected_combinations() {
    let cases = [
        (OpCode::ListFiles, 211, ResponseKind::FileList),
        (OpCode::ListFiles, 1002, ResponseKind::NoUserFiles),
        (OpCode::SaveFile, 212, ResponseKind::Saved),
        (OpCode::SaveFile, 1001, ResponseKind::SaveSourceMissing),
        (OpCode::RetrieveFile, 210, ResponseKind::Retrieved),
        (OpCode::RetrieveFile, 1001, ResponseKind::RetrieveMissing),
        (OpCode::DeleteFile, 212, ResponseKind::Deleted),
        (OpCode::DeleteFile, 1001, ResponseKind::DeleteMissing),
    ];

    for (op, status, kind) in cases {
        assert_eq!(ResponseKind::classify(op, status), kind, "{:?} + {}", op, status);
    }
}

#[test]
fn test_classify_server_error_is_unrecognized_for_every_opcode() {
    for op in [
        OpCode::SaveFile,
        OpCode::RetrieveFile,
        OpCode::DeleteFile,
        OpCode::ListFiles,
    ] {
        assert_eq!(
            ResponseKind::classify(op, 1003),
            ResponseKind::Unrecognized { status: 1003 }
        );
    }
}

#[test]
fn test_classify_mismatched_and_unknown_statuses() {
    assert_eq!(
        ResponseKind::classify(OpCode::DeleteFile, 210),
        ResponseKind::Unrecognized { status: 210 }
    );
    assert_eq!(
        ResponseKind::classify(OpCode::ListFiles, 212),
        ResponseKind::Unrecognized { status: 212 }
    );
    assert_eq!(
        ResponseKind::classify(OpCode::SaveFile, 7),
        ResponseKind::Unrecognized { status: 7 }
    );
}

#[test]
fn test_status_codes() {
    assert_eq!(ResponseStatus::from_u16(1002), Some(ResponseStatus::NoUserFiles));
    assert_eq!(ResponseStatus::from_u16(213), None);
    assert!(ResponseStatus::Success.is_success());
    assert!(!ResponseStatus::NoFile.is_success());
    assert_eq!(OpCode::from_u8(201), Some(OpCode::DeleteFile));
    assert_eq!(OpCode::from_u8(0), None);
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_read_header() {
    let mut cursor = Cursor::new(vec![0x01, 0xE9, 0x03, 0xFF]);
    let header = read_header(&mut cursor).unwrap();

    assert_eq!(header.version, 1);
    assert_eq!(header.status, 1001);
    assert_eq!(cursor.position(), 3);
}

#[test]
fn test_incomplete_header() {
    let mut cursor = Cursor::new(vec![0x01, 0xE9]);
    let err = read_header(&mut cursor).unwrap_err();

    assert!(err.is_eof());
}

// =============================================================================
// Bare Response Tests
// =============================================================================

#[test]
fn test_no_user_files_reads_nothing_more() {
    let mut bytes = frame(1002, &[]);
    bytes.extend_from_slice(b"trailing bytes that must stay unread");
    let mut cursor = Cursor::new(bytes);

    let response = read_response(&mut cursor, OpCode::ListFiles, 4096, no_sink).unwrap();

    assert_eq!(response.body, ResponseBody::NoUserFiles);
    assert_eq!(response.body.transfer(), None);
    assert_eq!(cursor.position(), 3);
}

#[test]
fn test_no_user_files_single_read_call() {
    let mut reader = PieceReader::new(vec![frame(1002, &[]), b"extra".to_vec()]);

    read_response(&mut reader, OpCode::ListFiles, 4096, no_sink).unwrap();

    assert_eq!(reader.reads, 1);
}

#[test]
fn test_delete_missing_ignores_trailing_name() {
    // Some servers append the filename to NO_FILE; it is never parsed
    let bytes = frame(1001, &name_field("gone.txt"));
    let mut cursor = Cursor::new(bytes);

    let response = read_response(&mut cursor, OpCode::DeleteFile, 4096, no_sink).unwrap();

    assert_eq!(response.body, ResponseBody::DeleteMissing);
    assert_eq!(cursor.position(), 3);
}

#[test]
fn test_unrecognized_status_stops_after_header() {
    let mut cursor = Cursor::new(frame(4242, &name_field("junk")));

    let response = read_response(&mut cursor, OpCode::RetrieveFile, 4096, no_sink).unwrap();

    assert_eq!(response.body, ResponseBody::Unrecognized { status: 4242 });
    assert_eq!(cursor.position(), 3);
}

#[test]
fn test_server_error_stops_after_header() {
    // A name and size after SERVER_ERROR must not be taken as a payload
    let mut tail = name_field("list.txt");
    tail.extend_from_slice(&5u32.to_le_bytes());
    tail.extend_from_slice(b"a.txt");
    let mut cursor = Cursor::new(frame(1003, &tail));

    let response = read_response(&mut cursor, OpCode::ListFiles, 4096, no_sink).unwrap();

    assert_eq!(response.header.status, 1003);
    assert_eq!(response.body, ResponseBody::Unrecognized { status: 1003 });
    assert_eq!(response.body.kind(), ResponseKind::Unrecognized { status: 1003 });
    assert_eq!(cursor.position(), 3);
}

// =============================================================================
// Named Response Tests
// =============================================================================

#[test]
fn test_save_success_reads_name() {
    let mut cursor = Cursor::new(frame(212, &name_field("notes.txt")));

    let response = read_response(&mut cursor, OpCode::SaveFile, 4096, no_sink).unwrap();

    assert_eq!(
        response.body,
        ResponseBody::Saved {
            filename: "notes.txt".to_string()
        }
    );
    assert_eq!(response.body.transfer(), None);
}

#[test]
fn test_save_success_without_name_fails_cleanly() {
    // Connection closes right after the 3-byte header
    let mut cursor = Cursor::new(frame(212, &[]));

    let err = read_response(&mut cursor, OpCode::SaveFile, 4096, no_sink).unwrap_err();

    assert!(err.is_eof());
}

#[test]
fn test_save_success_with_short_name_fails_cleanly() {
    // Name length says 9, only 3 bytes follow
    let mut tail = 9u16.to_le_bytes().to_vec();
    tail.extend_from_slice(b"not");
    let mut cursor = Cursor::new(frame(212, &tail));

    let err = read_response(&mut cursor, OpCode::SaveFile, 4096, no_sink).unwrap_err();

    assert!(err.is_eof());
}

#[test]
fn test_invalid_utf8_name_rejected() {
    let mut tail = 2u16.to_le_bytes().to_vec();
    tail.extend_from_slice(&[0xFF, 0xFE]);
    let mut cursor = Cursor::new(frame(212, &tail));

    let err = read_response(&mut cursor, OpCode::DeleteFile, 4096, no_sink).unwrap_err();

    assert!(err.to_string().contains("UTF-8"));
}

// =============================================================================
// Payload Response Tests
// =============================================================================

#[test]
fn test_retrieved_payload_in_two_chunks() {
    let first: Vec<u8> = (0..2048).map(|i| (i % 251) as u8).collect();
    let second: Vec<u8> = (0..2048).map(|i| (i % 13) as u8).collect();

    let mut head = frame(210, &name_field("report.txt"));
    head.extend_from_slice(&4096u32.to_le_bytes());
    let mut reader = PieceReader::new(vec![head, first.clone(), second.clone()]);

    let mut staged = Vec::new();
    let sink = &mut staged;
    let mut seen_name = String::new();
    let response = read_response(&mut reader, OpCode::RetrieveFile, 4096, |kind, name| {
        assert_eq!(kind, ResponseKind::Retrieved);
        seen_name = name.to_string();
        Ok(sink)
    })
    .unwrap();

    assert_eq!(seen_name, "report.txt");
    let (filename, transfer) = match response.body {
        ResponseBody::Retrieved { filename, transfer } => (filename, transfer),
        other => panic!("Expected retrieved body, got {:?}", other),
    };
    assert_eq!(filename, "report.txt");
    assert_eq!(transfer.declared, 4096);
    assert_eq!(transfer.received, 4096);
    assert_eq!(transfer.status(), TransferStatus::Complete);

    let mut expected = first;
    expected.extend_from_slice(&second);
    assert_eq!(staged, expected);
}

#[test]
fn test_file_list_payload() {
    let listing = b"a.txt\nb.txt\n";
    let mut tail = name_field("Xq3TbL9vKa0Zr7YwPm2NcE5uHd8GjS1f");
    tail.extend_from_slice(&(listing.len() as u32).to_le_bytes());
    tail.extend_from_slice(listing);
    let mut cursor = Cursor::new(frame(211, &tail));

    let mut staged = Vec::new();
    let sink = &mut staged;
    let response = read_response(&mut cursor, OpCode::ListFiles, 4, move |kind, _| {
        assert_eq!(kind, ResponseKind::FileList);
        Ok(sink)
    })
    .unwrap();

    assert_eq!(response.body.kind(), ResponseKind::FileList);
    match &response.body {
        ResponseBody::FileList { filename, transfer } => {
            assert_eq!(filename, "Xq3TbL9vKa0Zr7YwPm2NcE5uHd8GjS1f");
            assert!(transfer.is_complete());
        }
        other => panic!("Expected file list body, got {:?}", other),
    }
    assert_eq!(staged, listing);
}

#[test]
fn test_truncated_payload_reported() {
    let mut tail = name_field("big.bin");
    tail.extend_from_slice(&100u32.to_le_bytes());
    tail.extend_from_slice(&[7u8; 40]);
    let mut cursor = Cursor::new(frame(210, &tail));

    let mut staged = Vec::new();
    let sink = &mut staged;
    let response =
        read_response(&mut cursor, OpCode::RetrieveFile, 16, move |_, _| Ok(sink)).unwrap();

    let transfer = response.body.transfer().unwrap();
    assert_eq!(transfer.received, 40);
    assert_eq!(transfer.status(), TransferStatus::Truncated { missing: 60 });
    assert_eq!(staged.len(), 40);
}

#[test]
fn test_missing_file_size_fails_cleanly() {
    let mut cursor = Cursor::new(frame(210, &name_field("x")));
    let mut staged = Vec::new();
    let sink = &mut staged;

    let err = read_response(&mut cursor, OpCode::RetrieveFile, 4096, move |_, _| Ok(sink))
        .unwrap_err();

    assert!(err.is_eof());
}
