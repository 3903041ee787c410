//! Outward event contract.
//!
//! The core reports everything it produces through a `Sink`; timestamping,
//! display, persistence and rate limiting belong to the host.

use serde::{Deserialize, Serialize};

/// Event handed to the host.
///
/// # Examples
/// ```
/// use mpac_core::SinkEvent;
///
/// let event = SinkEvent::UnrecognizedByte(0xFF);
/// assert_eq!(event.to_string(), "unrecognized: 0xFF");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SinkEvent {
    /// Rendered line for a recognized message.
    DecodedMessage(String),
    /// A byte that could not be attributed to any frame.
    UnrecognizedByte(u8),
    /// Internal diagnostic (registry refresh progress, discarded partials).
    StatusNote(String),
}

impl std::fmt::Display for SinkEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkEvent::DecodedMessage(text) => f.write_str(text),
            SinkEvent::UnrecognizedByte(byte) => write!(f, "unrecognized: 0x{:02X}", byte),
            SinkEvent::StatusNote(text) => write!(f, "note: {}", text),
        }
    }
}

pub trait Sink {
    fn emit(&mut self, event: SinkEvent);
}

impl Sink for Vec<SinkEvent> {
    fn emit(&mut self, event: SinkEvent) {
        self.push(event);
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn emit(&mut self, event: SinkEvent) {
        (**self).emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::{Sink, SinkEvent};

    #[test]
    fn vec_sink_collects_in_order() {
        let mut events: Vec<SinkEvent> = Vec::new();
        events.emit(SinkEvent::StatusNote("start".to_string()));
        events.emit(SinkEvent::UnrecognizedByte(1));
        assert_eq!(
            events,
            vec![
                SinkEvent::StatusNote("start".to_string()),
                SinkEvent::UnrecognizedByte(1)
            ]
        );
    }

    #[test]
    fn events_serialize_as_tagged_json() {
        let value = serde_json::to_value(SinkEvent::UnrecognizedByte(0x7f)).expect("event json");
        assert_eq!(value["kind"], "unrecognized_byte");
        assert_eq!(value["value"], 0x7f);

        let value =
            serde_json::to_value(SinkEvent::DecodedMessage("Speed:  10 h".to_string())).unwrap();
        assert_eq!(value["kind"], "decoded_message");
        assert_eq!(value["value"], "Speed:  10 h");
    }
}
