//! Connection Handler
//!
//! A single client connection to the backup server. One connection carries
//! exactly one request and one response, and is closed when dropped.

use std::io::{BufWriter, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{read_response, OpCode, Response, ResponseKind};

/// A connection to the backup server
pub struct Connection {
    /// TCP stream reader (unbuffered so response fields are read exactly)
    reader: TcpStream,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Connect to `addr` (host:port)
    pub fn open(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| addr.to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Connected to {}", peer_addr);

        Ok(Self {
            reader: read_stream,
            writer: BufWriter::new(write_stream),
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves the socket blocking)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Send a fully framed request
    pub fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.writer.write_all(frame)?;
        self.writer.flush()?;
        tracing::debug!("Sent {} byte request to {}", frame.len(), self.peer_addr);
        Ok(())
    }

    /// Receive the response to a request with opcode `op`
    pub fn receive_response<W, F>(
        &mut self,
        op: OpCode,
        chunk_size: usize,
        open_sink: F,
    ) -> Result<Response>
    where
        W: Write,
        F: FnOnce(ResponseKind, &str) -> Result<W>,
    {
        read_response(&mut self.reader, op, chunk_size, open_sink)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.writer.flush();
        let _ = self.reader.shutdown(Shutdown::Both);
        tracing::debug!("Connection to {} closed", self.peer_addr);
    }
}
