//! Byte sources and manual input.
//!
//! The core never blocks on a channel: the host asks a `ByteSource` how many
//! bytes are available once per tick and hands them to the monitor. A source
//! that is not open is simply skipped.

mod manual;
mod replay;

pub use manual::{ManualInputError, parse_hex_tokens};
pub use replay::ReplaySource;

use thiserror::Error;

pub trait ByteSource {
    fn is_open(&self) -> bool;

    /// Bytes that can be read right now without waiting.
    fn bytes_available(&self) -> usize;

    /// Read up to `buf.len()` bytes; returns how many were written.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source is closed")]
    Closed,
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),
}
