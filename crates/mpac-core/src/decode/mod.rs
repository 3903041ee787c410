//! Payload decoding.
//!
//! A decode spec is a whitespace-separated list of directives applied left
//! to right against a payload cursor:
//! - `c`/`C`, `g`/`G`, `l`/`L`, `q`/`Q`: unsigned/signed integers of 1, 2,
//!   4 and 8 bytes, little-endian.
//! - `f`, `d`: single and double precision floats.
//! - `x`, `xN`: N raw bytes (default 1) as upper-case hex.
//! - `a`, `aN`: N bytes as ASCII; bare `a` takes the rest of the payload.
//! - `* n`, `/ n`, `+ n`, `- n` after a numeric field: arithmetic on that
//!   field, chained left to right.
//! - anything else is literal text (unit tags, labels); `\tok` forces `tok`
//!   to be literal.
//!
//! A unit tag spelled like a field code (`a`, `d`, `g`, `x`, ...) is read as
//! that field, so write it escaped: `g * 2 \a` renders `10 a`.
//!
//! Rendered pieces are joined with single spaces. A field that cannot be
//! satisfied by the remaining bytes renders as `?` and decoding moves on;
//! nothing here panics or returns an error to the caller.
//!
//! `layout` holds the vocabulary and `reader` does bounds-checked byte
//! access; `parser` turns a spec into directives.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod value;

use log::warn;

use error::DecodeError;
use parser::{Directive, Transform, parse_spec};
use reader::PayloadReader;

/// Render a payload according to a decode spec.
///
/// Returns `None` when nothing was rendered (empty spec).
///
/// # Examples
/// ```
/// use mpac_core::decode;
///
/// assert_eq!(decode("g * 2 h", &[0x05, 0x00]), Some("10 h".to_string()));
/// assert_eq!(decode("g", &[0x05]), Some("?".to_string()));
/// assert_eq!(decode("", &[0x05]), None);
/// ```
pub fn decode(spec: &str, payload: &[u8]) -> Option<String> {
    let mut reader = PayloadReader::new(payload);
    let mut pieces: Vec<String> = Vec::new();

    for directive in parse_spec(spec) {
        match render_directive(&directive, &mut reader) {
            Ok(piece) if piece.is_empty() => {}
            Ok(piece) => pieces.push(piece),
            Err(err) => {
                warn!("decode spec '{spec}': field rendered as diagnostic: {err}");
                pieces.push(layout::DIAGNOSTIC.to_string());
            }
        }
    }

    let text = pieces.join(" ");
    if text.is_empty() { None } else { Some(text) }
}

fn render_directive(
    directive: &Directive<'_>,
    reader: &mut PayloadReader<'_>,
) -> Result<String, DecodeError> {
    match directive {
        Directive::Numeric { kind, transforms } => {
            let value = reader.read_numeric(*kind)?;
            let value = transforms
                .iter()
                .try_fold(value, |value, Transform { op, operand }| {
                    value.apply(*op, *operand)
                })?;
            Ok(value.to_string())
        }
        Directive::Hex { count } => Ok(hex::encode_upper(reader.take(*count)?)),
        Directive::Ascii { count } => {
            let bytes = match count {
                Some(count) => reader.take(*count)?,
                None => reader.take_rest(),
            };
            Ok(render_ascii(bytes))
        }
        Directive::Literal(text) => Ok((*text).to_string()),
    }
}

fn render_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|b| **b != 0)
        .map(|b| {
            if b.is_ascii_graphic() || *b == b' ' {
                char::from(*b)
            } else {
                '.'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::decode;

    #[test]
    fn scaled_field_with_unit() {
        assert_eq!(decode("g * 2 h", &[0x05, 0x00]).as_deref(), Some("10 h"));
    }

    #[test]
    fn decode_is_deterministic() {
        let payload = [0x10, 0x27, 0x41, 0x42];
        let first = decode("g / 100 V a2", &payload);
        let second = decode("g / 100 V a2", &payload);
        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Some("100 V AB"));
    }

    #[test]
    fn short_payload_degrades_single_field() {
        assert_eq!(decode("Temp c C", &[0x80]).as_deref(), Some("Temp 128 ?"));
    }

    #[test]
    fn failed_field_skips_its_transforms_but_keeps_unit() {
        assert_eq!(decode("l * 3 rpm", &[1, 2]).as_deref(), Some("? rpm"));
    }

    #[test]
    fn division_by_zero_renders_diagnostic() {
        assert_eq!(decode("c / 0 c", &[4, 9]).as_deref(), Some("? 9"));
    }

    #[test]
    fn empty_payload_with_static_text() {
        assert_eq!(decode("Door open", &[]).as_deref(), Some("Door open"));
    }

    #[test]
    fn empty_spec_renders_nothing() {
        assert_eq!(decode("", &[1, 2, 3]), None);
        assert_eq!(decode("   ", &[]), None);
    }

    #[test]
    fn hex_and_ascii_runs() {
        let payload = [0xDE, 0xAD, b'o', b'k', 0x00, b'z'];
        assert_eq!(decode("x2 a", &payload).as_deref(), Some("DEAD ok"));
        assert_eq!(decode("x a2 x1", &payload).as_deref(), Some("DE .o 6B"));
    }

    #[test]
    fn signed_and_float_fields() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&(-2i32).to_le_bytes());
        payload.extend_from_slice(&1.5f64.to_le_bytes());
        assert_eq!(decode("L d * 2", &payload).as_deref(), Some("-2 3"));
    }

    #[test]
    fn unit_tag_matching_a_field_code_needs_escape() {
        assert_eq!(decode("g * 2 a", &[0x05, 0x00]).as_deref(), Some("10"));
        assert_eq!(decode("g * 2 d", &[0x05, 0x00]).as_deref(), Some("10 ?"));
        assert_eq!(decode("g * 2 \\a", &[0x05, 0x00]).as_deref(), Some("10 a"));
        assert_eq!(decode("g * 2 \\d", &[0x05, 0x00]).as_deref(), Some("10 d"));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        assert_eq!(decode("c", &[7, 8, 9]).as_deref(), Some("7"));
    }
}
