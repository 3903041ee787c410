use super::layout::{self, NumericKind, Operator};
use super::value::Number;

#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub op: Operator,
    pub operand: Number,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Directive<'a> {
    Numeric {
        kind: NumericKind,
        transforms: Vec<Transform>,
    },
    Hex {
        count: usize,
    },
    /// `None` takes the rest of the payload.
    Ascii {
        count: Option<usize>,
    },
    Literal(&'a str),
}

/// Split a decode spec into directives.
///
/// Parsing never fails: anything that is not a field code or a well-formed
/// transform is literal text.
pub fn parse_spec(spec: &str) -> Vec<Directive<'_>> {
    let tokens: Vec<&str> = spec.split_ascii_whitespace().collect();
    let mut directives = Vec::new();
    let mut index = 0;

    while index < tokens.len() {
        let token = tokens[index];
        index += 1;

        if let Some(kind) = NumericKind::from_code(token) {
            let mut transforms = Vec::new();
            while let Some(transform) = transform_at(&tokens, index) {
                transforms.push(transform);
                index += 2;
            }
            directives.push(Directive::Numeric { kind, transforms });
            continue;
        }

        directives.push(parse_run(token).unwrap_or_else(|| literal(token)));
    }

    directives
}

fn transform_at(tokens: &[&str], index: usize) -> Option<Transform> {
    let op = Operator::from_token(tokens.get(index)?)?;
    let operand = Number::parse(tokens.get(index + 1)?)?;
    Some(Transform { op, operand })
}

fn parse_run(token: &str) -> Option<Directive<'_>> {
    let mut chars = token.chars();
    let code = chars.next()?;
    let count = chars.as_str();
    let count = if count.is_empty() {
        None
    } else {
        if !count.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(count.parse::<usize>().ok().filter(|count| *count > 0)?)
    };

    match code {
        layout::HEX_CODE => Some(Directive::Hex {
            count: count.unwrap_or(layout::HEX_DEFAULT_COUNT),
        }),
        layout::ASCII_CODE => Some(Directive::Ascii { count }),
        _ => None,
    }
}

fn literal(token: &str) -> Directive<'_> {
    match token.strip_prefix(layout::ESCAPE) {
        Some(rest) if !rest.is_empty() => Directive::Literal(rest),
        _ => Directive::Literal(token),
    }
}
