use std::fmt;

use super::error::DecodeError;
use super::layout::Operator;

/// Numeric field value; integers stay exact until an operation cannot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    /// Parse a transform operand.
    pub fn parse(token: &str) -> Option<Self> {
        if let Ok(value) = token.parse::<i128>() {
            return Some(Number::Int(value));
        }
        token
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Number::Float)
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }

    pub fn apply(self, op: Operator, operand: Number) -> Result<Number, DecodeError> {
        if let (Number::Int(lhs), Number::Int(rhs)) = (self, operand) {
            let exact = match op {
                Operator::Mul => lhs.checked_mul(rhs),
                Operator::Add => lhs.checked_add(rhs),
                Operator::Sub => lhs.checked_sub(rhs),
                Operator::Div => {
                    if rhs == 0 {
                        return Err(DecodeError::DivisionByZero);
                    }
                    match lhs.checked_rem(rhs) {
                        Some(0) => lhs.checked_div(rhs),
                        _ => None,
                    }
                }
            };
            if let Some(value) = exact {
                return Ok(Number::Int(value));
            }
        }

        let (lhs, rhs) = (self.as_f64(), operand.as_f64());
        let value = match op {
            Operator::Mul => lhs * rhs,
            Operator::Add => lhs + rhs,
            Operator::Sub => lhs - rhs,
            Operator::Div => {
                if rhs == 0.0 {
                    return Err(DecodeError::DivisionByZero);
                }
                lhs / rhs
            }
        };
        Ok(Number::Float(value))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{}", value),
            Number::Float(value) => write!(f, "{}", value),
        }
    }
}
