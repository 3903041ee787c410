//! Directive vocabulary of the decode spec language.

/// Rendered in place of a field that could not be decoded.
pub const DIAGNOSTIC: &str = "?";
/// Prefix forcing the rest of a token to be literal text.
pub const ESCAPE: char = '\\';
/// Raw hex run, optionally followed by a byte count (`x`, `x4`).
pub const HEX_CODE: char = 'x';
/// ASCII run, optionally followed by a byte count (`a`, `a8`).
pub const ASCII_CODE: char = 'a';
/// Byte count of a bare hex directive.
pub const HEX_DEFAULT_COUNT: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl NumericKind {
    pub fn from_code(token: &str) -> Option<Self> {
        let kind = match token {
            "c" => NumericKind::U8,
            "C" => NumericKind::I8,
            "g" => NumericKind::U16,
            "G" => NumericKind::I16,
            "l" => NumericKind::U32,
            "L" => NumericKind::I32,
            "q" => NumericKind::U64,
            "Q" => NumericKind::I64,
            "f" => NumericKind::F32,
            "d" => NumericKind::F64,
            _ => return None,
        };
        Some(kind)
    }

    /// Bytes consumed from the payload.
    pub const fn width(self) -> usize {
        match self {
            NumericKind::U8 | NumericKind::I8 => 1,
            NumericKind::U16 | NumericKind::I16 => 2,
            NumericKind::U32 | NumericKind::I32 | NumericKind::F32 => 4,
            NumericKind::U64 | NumericKind::I64 | NumericKind::F64 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Mul,
    Div,
    Add,
    Sub,
}

impl Operator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "*" => Some(Operator::Mul),
            "/" => Some(Operator::Div),
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Sub),
            _ => None,
        }
    }
}
