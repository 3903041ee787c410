//! Decode pipeline.
//!
//! `Monitor` wires the reassembler, the registry and the decoder together
//! and reports through a `Sink`. It is driven by the host: one `poll` or
//! `ingest` per tick, `submit_manual` for operator test input and `close`
//! when the channel goes away.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::decode::decode;
use crate::frame::{FrameEvent, Reassembler};
use crate::registry::Registry;
use crate::sink::{Sink, SinkEvent};
use crate::source::{ByteSource, ManualInputError, SourceError, parse_hex_tokens};
use crate::{HEADER_LEN, Message, MessageFormat};

/// Suffix rendered when a message's payload does not match its format.
pub const LENGTH_MISMATCH_NOTE: &str = "Message Format Does Not Match Data Length";

/// Running counters since the monitor was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStats {
    /// Recognized messages rendered (length mismatches included).
    pub messages: u64,
    pub unrecognized_bytes: u64,
    pub length_mismatches: u64,
}

#[derive(Debug, Default)]
pub struct Monitor {
    registry: Registry,
    reassembler: Reassembler,
    stats: MonitorStats,
}

impl Monitor {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            reassembler: Reassembler::new(),
            stats: MonitorStats::default(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Bytes held back waiting for the rest of a frame.
    pub fn pending(&self) -> &[u8] {
        self.reassembler.pending()
    }

    /// Display line for a message of a known format.
    ///
    /// # Examples
    /// ```
    /// use mpac_core::{Message, MessageFormat, Monitor};
    ///
    /// let format = MessageFormat::new(0x01, 0x02, "Speed", 2, "g * 2 h");
    /// let line = Monitor::render(&format, &Message::new(0x01, 0x02, vec![0x05, 0x00]));
    /// assert_eq!(line, "Speed:  10 h");
    /// ```
    pub fn render(format: &MessageFormat, message: &Message) -> String {
        if message.data.len() != format.length {
            return format!("{}:  {}", format.name, LENGTH_MISMATCH_NOTE);
        }
        match decode(&format.format, &message.data) {
            Some(text) => format!("{}:  {}", format.name, text),
            None => format.name.clone(),
        }
    }

    /// Feed one chunk of stream bytes.
    pub fn ingest<S: Sink + ?Sized>(&mut self, chunk: &[u8], sink: &mut S) {
        for event in self.reassembler.feed(chunk, &self.registry) {
            match event {
                FrameEvent::Message(message) => self.emit_message(&message, sink),
                FrameEvent::Unrecognized(byte) => self.emit_unrecognized(byte, sink),
            }
        }
    }

    /// Read whatever the source has available and ingest it.
    ///
    /// A source that is not open is skipped and yields `Ok(0)`.
    ///
    /// # Errors
    /// Propagates `SourceError` from the source's `read`.
    pub fn poll<B, S>(&mut self, source: &mut B, sink: &mut S) -> Result<usize, SourceError>
    where
        B: ByteSource + ?Sized,
        S: Sink + ?Sized,
    {
        if !source.is_open() {
            trace!("poll skipped: source not open");
            return Ok(0);
        }
        let available = source.bytes_available();
        if available == 0 {
            return Ok(0);
        }
        let mut buf = vec![0u8; available];
        let read = source.read(&mut buf)?;
        self.ingest(&buf[..read], sink);
        Ok(read)
    }

    /// Decode operator-entered hex bytes as one complete message.
    ///
    /// The first two bytes are the header and the rest is the payload; the
    /// reassembler and its pending bytes are bypassed. Unknown headers and
    /// inputs shorter than a header are reported byte by byte.
    ///
    /// # Errors
    /// Returns `ManualInputError` when the text is not a list of hex bytes;
    /// nothing is emitted in that case.
    pub fn submit_manual<S: Sink + ?Sized>(
        &mut self,
        input: &str,
        sink: &mut S,
    ) -> Result<(), ManualInputError> {
        let bytes = parse_hex_tokens(input)?;
        debug!("manual input: {} bytes", bytes.len());

        let known = match bytes.as_slice() {
            [id_high, id_low, ..] => self.registry.lookup(*id_high, *id_low).is_some(),
            _ => false,
        };
        if !known {
            for byte in bytes {
                self.emit_unrecognized(byte, sink);
            }
            return Ok(());
        }

        let message = Message::new(bytes[0], bytes[1], bytes[HEADER_LEN..].to_vec());
        self.emit_message(&message, sink);
        Ok(())
    }

    /// The channel was closed: drop any partial frame.
    ///
    /// Returns how many buffered bytes were discarded.
    pub fn close<S: Sink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let dropped = self.reassembler.reset();
        if dropped > 0 {
            sink.emit(SinkEvent::StatusNote(format!(
                "discarded {dropped} bytes of a partial frame"
            )));
        }
        dropped
    }

    fn emit_message<S: Sink + ?Sized>(&mut self, message: &Message, sink: &mut S) {
        let Some((format, _)) = self.registry.lookup(message.id_high, message.id_low) else {
            return;
        };
        self.stats.messages += 1;
        if message.data.len() != format.length {
            self.stats.length_mismatches += 1;
            debug!(
                "{}: {} payload bytes, format declares {}",
                format.name,
                message.data.len(),
                format.length
            );
        }
        sink.emit(SinkEvent::DecodedMessage(Self::render(format, message)));
    }

    fn emit_unrecognized<S: Sink + ?Sized>(&mut self, byte: u8, sink: &mut S) {
        self.stats.unrecognized_bytes += 1;
        sink.emit(SinkEvent::UnrecognizedByte(byte));
    }
}
