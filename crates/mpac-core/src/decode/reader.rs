use super::error::DecodeError;
use super::layout::NumericKind;
use super::value::Number;

/// Bounds-checked cursor over a message payload.
///
/// Multi-byte values are little-endian: the first transmitted byte is the
/// least significant. A failed read leaves the cursor where it was.
pub struct PayloadReader<'a> {
    payload: &'a [u8],
    cursor: usize,
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.payload.len() - self.cursor
    }

    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        if self.remaining() < needed {
            return Err(DecodeError::TooShort {
                needed,
                actual: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn take(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        self.require_len(count)?;
        let bytes = &self.payload[self.cursor..self.cursor + count];
        self.cursor += count;
        Ok(bytes)
    }

    pub fn take_rest(&mut self) -> &'a [u8] {
        let bytes = &self.payload[self.cursor..];
        self.cursor = self.payload.len();
        bytes
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self.take(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }

    pub fn read_numeric(&mut self, kind: NumericKind) -> Result<Number, DecodeError> {
        let value = match kind {
            NumericKind::U8 => Number::Int(u8::from_le_bytes(self.take_array()?).into()),
            NumericKind::I8 => Number::Int(i8::from_le_bytes(self.take_array()?).into()),
            NumericKind::U16 => Number::Int(u16::from_le_bytes(self.take_array()?).into()),
            NumericKind::I16 => Number::Int(i16::from_le_bytes(self.take_array()?).into()),
            NumericKind::U32 => Number::Int(u32::from_le_bytes(self.take_array()?).into()),
            NumericKind::I32 => Number::Int(i32::from_le_bytes(self.take_array()?).into()),
            NumericKind::U64 => Number::Int(u64::from_le_bytes(self.take_array()?).into()),
            NumericKind::I64 => Number::Int(i64::from_le_bytes(self.take_array()?).into()),
            NumericKind::F32 => Number::Float(widen_f32(f32::from_le_bytes(self.take_array()?))),
            NumericKind::F64 => Number::Float(f64::from_le_bytes(self.take_array()?)),
        };
        Ok(value)
    }
}

// Widen through the shortest decimal form so 0.1f32 renders as 0.1.
fn widen_f32(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(value as f64)
}

#[cfg(test)]
mod tests {
    use super::PayloadReader;
    use crate::decode::error::DecodeError;
    use crate::decode::layout::NumericKind;
    use crate::decode::value::Number;

    #[test]
    fn reads_little_endian_integers() {
        let payload = [0x05, 0x00, 0xFF, 0xFF];
        let mut reader = PayloadReader::new(&payload);
        assert_eq!(reader.read_numeric(NumericKind::U16).unwrap(), Number::Int(5));
        assert_eq!(reader.read_numeric(NumericKind::I16).unwrap(), Number::Int(-1));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn short_read_leaves_cursor_untouched() {
        let payload = [0x01, 0x02, 0x03];
        let mut reader = PayloadReader::new(&payload);
        let err = reader.read_numeric(NumericKind::U32).unwrap_err();
        assert_eq!(err, DecodeError::TooShort { needed: 4, actual: 3 });
        assert_eq!(reader.remaining(), 3);
        assert_eq!(reader.take(1).unwrap(), &[0x01]);
    }

    #[test]
    fn f32_widening_keeps_short_form() {
        let payload = 0.1f32.to_le_bytes();
        let mut reader = PayloadReader::new(&payload);
        let value = reader.read_numeric(NumericKind::F32).unwrap();
        assert_eq!(value.to_string(), "0.1");
    }

    #[test]
    fn take_rest_drains_payload() {
        let payload = [b'o', b'k'];
        let mut reader = PayloadReader::new(&payload);
        assert_eq!(reader.take_rest(), b"ok");
        assert!(reader.take_rest().is_empty());
    }
}
