//! Newline-delimited JSON framing shared by the player and lifeline sockets
//!
//! Every message is a single JSON value encoded as UTF-8 and terminated by one
//! `\n`. There is no length prefix, so the reader accumulates bytes until a
//! terminator shows up. A single read may carry several complete messages
//! (coalesced by the OS) or only part of one; the buffer keeps whatever follows
//! the first terminator for the next call.
//!
//! A line that grows past the frame limit without a terminator is a framing
//! error, so one peer cannot make the reader buffer without bound.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Bytes requested from the socket per read
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
/// Longest accepted frame in bytes, terminator excluded
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed frame: {0}")]
    Framing(#[source] serde_json::Error),
    #[error("frame exceeds {limit} bytes without a terminator")]
    FrameTooLong { limit: usize },
    #[error("frame is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("unexpected message shape: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("connection closed by peer")]
    ConnectionClosed,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl WireError {
    /// True when the peer went away rather than misbehaving
    pub fn is_disconnect(&self) -> bool {
        match self {
            WireError::ConnectionClosed => true,
            WireError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }

    /// True for bytes that could not be turned into a JSON value
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            WireError::Framing(_) | WireError::Utf8(_) | WireError::FrameTooLong { .. }
        )
    }
}

/// Accumulates raw bytes and splits them into decoded frames
///
/// Contains no I/O so it can be fed from any source and in any chunking.
/// Bytes already searched for a terminator are not searched again.
#[derive(Debug)]
pub struct FrameBuffer {
    buf: Vec<u8>,
    scanned: usize,
    max_frame_len: usize,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            max_frame_len: max_frame_len.max(1),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Extracts the first complete frame, if any
    ///
    /// The frame and its terminator are removed from the buffer even when
    /// decoding fails. An oversized frame discards everything buffered, since
    /// the stream can no longer be resynchronized.
    pub fn next_frame(&mut self) -> Option<Result<Value, WireError>> {
        let found = self.buf[self.scanned..].iter().position(|b| *b == b'\n');
        let end = match found {
            Some(offset) => self.scanned + offset,
            None => {
                self.scanned = self.buf.len();
                if self.buf.len() > self.max_frame_len {
                    return Some(Err(self.overflow()));
                }
                return None;
            }
        };
        self.scanned = 0;

        let mut line: Vec<u8> = self.buf.drain(..=end).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.len() > self.max_frame_len {
            return Some(Err(self.overflow()));
        }

        Some(decode_line(&line))
    }

    fn overflow(&mut self) -> WireError {
        self.buf.clear();
        self.scanned = 0;
        WireError::FrameTooLong {
            limit: self.max_frame_len,
        }
    }

    /// Bytes received after the last complete frame
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

fn decode_line(line: &[u8]) -> Result<Value, WireError> {
    let text = std::str::from_utf8(line)?;
    serde_json::from_str(text).map_err(WireError::Framing)
}

/// Reads framed messages from an async byte stream
pub struct MessageReader<R> {
    inner: R,
    frames: FrameBuffer,
    chunk: Vec<u8>,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_chunk_size(inner, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(inner: R, chunk_size: usize) -> Self {
        Self::with_limits(inner, chunk_size, DEFAULT_MAX_FRAME_LEN)
    }

    pub fn with_limits(inner: R, chunk_size: usize, max_frame_len: usize) -> Self {
        Self {
            inner,
            frames: FrameBuffer::with_max_frame_len(max_frame_len),
            chunk: vec![0u8; chunk_size.max(1)],
        }
    }

    /// Returns the next JSON value, reading from the stream only when no
    /// complete frame is buffered
    pub async fn next_value(&mut self) -> Result<Value, WireError> {
        loop {
            if let Some(frame) = self.frames.next_frame() {
                return frame;
            }

            let n = self.inner.read(&mut self.chunk).await?;
            if n == 0 {
                return Err(WireError::ConnectionClosed);
            }
            self.frames.extend(&self.chunk[..n]);
        }
    }

    pub async fn read_message<T: DeserializeOwned>(&mut self) -> Result<T, WireError> {
        let value = self.next_value().await?;
        serde_json::from_value(value).map_err(WireError::Decode)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Serializes `message` and writes it as one terminated line
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let mut line = serde_json::to_vec(message).map_err(WireError::Encode)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}
