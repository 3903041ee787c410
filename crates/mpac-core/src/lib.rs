//! MPac core library for serial message monitoring.
//!
//! This crate implements the framing and decoding engine used by the CLI:
//! raw byte chunks feed the frame reassembler, which matches two-byte headers
//! against the format registry; matched frames are rendered by the payload
//! decoder and handed to a `Sink`. Decoding is byte-oriented and side-effect
//! free; file and channel access is isolated in `source` and `interchange`.
//!
//! Invariants:
//! - No byte is lost: every input byte ends up in a message, in an
//!   unrecognized-byte event, or in the pending buffer.
//! - Output is independent of how the input stream is chunked.
//! - Lookup precedence is Local before Company, first match in insertion
//!   order.
//! - Malformed decode specs or short payloads degrade the rendered text,
//!   never the pipeline.
//!
//! Known limitation: a `length = 0` format whose header happens to occur
//! inside unframed noise is matched wherever it appears; there is no escape
//! scheme protecting against aliasing.
//!
//! # Examples
//! ```
//! use mpac_core::{CatalogKind, MessageFormat, Monitor, Registry, SinkEvent};
//!
//! let mut registry = Registry::new();
//! registry.add(MessageFormat::new(0x01, 0x02, "Speed", 2, "g * 2 h"), CatalogKind::Local)?;
//!
//! let mut monitor = Monitor::new(registry);
//! let mut events: Vec<SinkEvent> = Vec::new();
//! monitor.ingest(&[0xFF, 0x01, 0x02, 0x05, 0x00], &mut events);
//!
//! assert_eq!(events[0], SinkEvent::UnrecognizedByte(0xFF));
//! assert_eq!(events[1], SinkEvent::DecodedMessage("Speed:  10 h".to_string()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod decode;
pub mod frame;
pub mod interchange;
pub mod monitor;
pub mod registry;
pub mod sink;
pub mod source;

pub use decode::decode;
pub use frame::{FrameEvent, Reassembler};
pub use interchange::{CsvFileProvider, InterchangeError};
pub use monitor::{LENGTH_MISMATCH_NOTE, Monitor, MonitorStats};
pub use registry::{FormatProvider, FormatSelector, ProvisionError, Registry, RegistryError};
pub use sink::{Sink, SinkEvent};
pub use source::{ByteSource, ManualInputError, ReplaySource, SourceError, parse_hex_tokens};

/// Size of the message type header on the wire.
pub const HEADER_LEN: usize = 2;

/// Catalog a message format belongs to.
///
/// # Examples
/// ```
/// use mpac_core::CatalogKind;
///
/// assert_eq!(CatalogKind::Local.to_string(), "local");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// User-maintained formats, searched first.
    Local,
    /// Centrally provisioned formats.
    Company,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogKind::Local => f.write_str("local"),
            CatalogKind::Company => f.write_str("company"),
        }
    }
}

/// Descriptor of one message type.
///
/// # Examples
/// ```
/// use mpac_core::MessageFormat;
///
/// let format = MessageFormat::new(0x01, 0x02, "Speed", 2, "g * 2 h");
/// assert_eq!(format.header(), (0x01, 0x02));
/// assert_eq!(format.frame_len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFormat {
    /// First transmitted header byte.
    pub id_high: u8,
    /// Second transmitted header byte.
    pub id_low: u8,
    /// Display label.
    pub name: String,
    /// Payload byte count following the header (0 = header only).
    pub length: usize,
    /// Decode spec interpreted by [`decode`].
    pub format: String,
}

impl MessageFormat {
    pub fn new(
        id_high: u8,
        id_low: u8,
        name: impl Into<String>,
        length: usize,
        format: impl Into<String>,
    ) -> Self {
        Self {
            id_high,
            id_low,
            name: name.into(),
            length,
            format: format.into(),
        }
    }

    pub fn header(&self) -> (u8, u8) {
        (self.id_high, self.id_low)
    }

    pub fn matches(&self, id_high: u8, id_low: u8) -> bool {
        self.id_high == id_high && self.id_low == id_low
    }

    /// Total frame size on the wire, header included.
    pub fn frame_len(&self) -> usize {
        HEADER_LEN.saturating_add(self.length)
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X} {:02X} {} [{}] {}",
            self.id_high, self.id_low, self.name, self.length, self.format
        )
    }
}

/// One reassembled frame: header plus the payload bytes consumed after it.
///
/// # Examples
/// ```
/// use mpac_core::Message;
///
/// let message = Message::new(0x01, 0x02, vec![0x05, 0x00]);
/// assert_eq!(message.to_string(), "01 02 05 00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id_high: u8,
    pub id_low: u8,
    pub data: Vec<u8>,
}

impl Message {
    pub fn new(id_high: u8, id_low: u8, data: Vec<u8>) -> Self {
        Self {
            id_high,
            id_low,
            data,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X}", self.id_high, self.id_low)?;
        for byte in &self.data {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}
