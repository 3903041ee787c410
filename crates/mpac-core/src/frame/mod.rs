//! Stream reassembly.
//!
//! The reassembler turns arbitrarily chunked bytes into frames. Its only
//! state is the buffer of bytes not yet attributed to a message or reported
//! as unrecognized, so the output does not depend on chunk boundaries.
//!
//! Per call the buffer is scanned from the front:
//! - a known header with `length > 0` yields a message once the whole frame
//!   is buffered, otherwise scanning stops until more bytes arrive;
//! - a known header with `length == 0` yields an empty message at once;
//! - an unknown header reports its first byte and slides the window by one,
//!   which resynchronizes onto the next valid header after noise;
//! - a single trailing byte is kept only if some registered header starts
//!   with it, otherwise it is reported right away (the same outcome the next
//!   chunk would produce).
//!
//! A frame is always consumed atomically, so payload bytes that alias a
//! header are never read as a nested frame.

use log::{debug, trace};

use crate::registry::Registry;
use crate::{HEADER_LEN, Message};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    Message(Message),
    Unrecognized(u8),
}

#[derive(Debug, Default)]
pub struct Reassembler {
    buffer: Vec<u8>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and extract every frame that is complete.
    ///
    /// # Examples
    /// ```
    /// use mpac_core::{CatalogKind, FrameEvent, Message, MessageFormat, Reassembler, Registry};
    ///
    /// let mut registry = Registry::new();
    /// registry.add(MessageFormat::new(0x01, 0x02, "Speed", 2, "g"), CatalogKind::Local)?;
    ///
    /// let mut reassembler = Reassembler::new();
    /// assert!(reassembler.feed(&[0x01, 0x02, 0x05], &registry).is_empty());
    /// assert_eq!(
    ///     reassembler.feed(&[0x00], &registry),
    ///     vec![FrameEvent::Message(Message::new(0x01, 0x02, vec![0x05, 0x00]))]
    /// );
    /// # Ok::<(), mpac_core::RegistryError>(())
    /// ```
    pub fn feed(&mut self, chunk: &[u8], registry: &Registry) -> Vec<FrameEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut pos = 0;
        while pos < self.buffer.len() {
            let id_high = self.buffer[pos];
            if self.buffer.len() - pos < HEADER_LEN {
                if registry.starts_header(id_high) {
                    break;
                }
                trace!("unrecognized trailing byte {:02X}", id_high);
                events.push(FrameEvent::Unrecognized(id_high));
                pos += 1;
                continue;
            }
            let id_low = self.buffer[pos + 1];
            match registry.lookup(id_high, id_low) {
                Some((format, _)) => {
                    if self.buffer.len() - pos < format.frame_len() {
                        trace!(
                            "partial frame {:02X} {:02X}: {} of {} bytes",
                            id_high,
                            id_low,
                            self.buffer.len() - pos,
                            format.frame_len()
                        );
                        break;
                    }
                    let end = pos + format.frame_len();
                    let data = self.buffer[pos + HEADER_LEN..end].to_vec();
                    events.push(FrameEvent::Message(Message::new(id_high, id_low, data)));
                    pos = end;
                }
                None => {
                    trace!("unrecognized byte {:02X}", id_high);
                    events.push(FrameEvent::Unrecognized(id_high));
                    pos += 1;
                }
            }
        }
        self.buffer.drain(..pos);
        events
    }

    /// Bytes buffered but not yet attributed.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Drop any partial frame; returns how many bytes were discarded.
    pub fn reset(&mut self) -> usize {
        let dropped = self.buffer.len();
        if dropped > 0 {
            debug!("discarding {dropped} pending bytes");
        }
        self.buffer.clear();
        dropped
    }
}
