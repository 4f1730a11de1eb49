use std::fmt;

use crate::{InternalError, Location, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantKind {
    Error,
    Integer,
    String,
}

impl fmt::Display for ConstantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantKind::Error => write!(f, "<error>"),
            ConstantKind::Integer => write!(f, "int"),
            ConstantKind::String => write!(f, "String"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Literal {
    /// Keeps the rejected text for diagnostics
    Error(String),
    Integer(i64),
    /// Content without the surrounding quotes
    String(String),
}

/// A literal written in a .aidl file. Malformed text becomes an
/// `Error` value instead of failing the parse.
#[derive(Debug)]
pub struct ConstantValue {
    location: Location,
    value: Literal,
}

impl ConstantValue {
    pub fn literal_int(location: Location, value: i64) -> Self {
        Self { location, value: Literal::Integer(value) }
    }

    /// Decimal integer literal, optionally negative
    pub fn parse_int(location: Location, text: &str) -> Self {
        let value = match text.parse::<i64>() {
            Ok(n) => Literal::Integer(n),
            Err(_) => Literal::Error(text.to_string()),
        };
        Self { location, value }
    }

    /// `0x` prefixed literal. Values that fit in 32 bits are read as an
    /// `int` bit pattern, wider ones as a `long` bit pattern.
    pub fn parse_hex(location: Location, text: &str) -> Self {
        let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"));
        let value = match digits.map(|d| u64::from_str_radix(d, 16)) {
            Some(Ok(raw)) if raw <= u64::from(u32::MAX) => Literal::Integer(i64::from(raw as u32 as i32)),
            Some(Ok(raw)) => Literal::Integer(raw as i64),
            _ => Literal::Error(text.to_string()),
        };
        Self { location, value }
    }

    /// Double-quoted literal of printable ASCII; no escapes.
    pub fn parse_string(location: Location, text: &str) -> Self {
        let content = text
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .filter(|content| content.bytes().all(is_plain_string_byte));
        let value = match content {
            Some(content) => Literal::String(content.to_string()),
            None => Literal::Error(text.to_string()),
        };
        Self { location, value }
    }

    pub fn kind(&self) -> ConstantKind {
        match self.value {
            Literal::Error(_) => ConstantKind::Error,
            Literal::Integer(_) => ConstantKind::Integer,
            Literal::String(_) => ConstantKind::String,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.value {
            Literal::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    /// The text the literal was rejected from, for `Error` values
    pub fn error_text(&self) -> Option<&str> {
        match &self.value {
            Literal::Error(raw) => Some(raw),
            _ => None,
        }
    }

    /// Canonical source form of the literal.
    pub fn to_source(&self) -> Result<String, InternalError> {
        match &self.value {
            Literal::Integer(n) => Ok(n.to_string()),
            Literal::String(s) => Ok(format!("\"{}\"", s)),
            Literal::Error(raw) => Err(InternalError::new(
                &self.location,
                format!("attempted to render invalid constant '{}'", raw),
            )),
        }
    }
}

impl Node for ConstantValue {
    fn location(&self) -> &Location {
        &self.location
    }
}

fn is_plain_string_byte(b: u8) -> bool {
    (b' '..=b'~').contains(&b) && b != b'\\' && b != b'"'
}

/// Inclusive value range of an integral AIDL type
pub fn integer_range(type_name: &str) -> Option<(i64, i64)> {
    match type_name {
        "byte" => Some((i64::from(i8::MIN), i64::from(i8::MAX))),
        "int" => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
        "long" => Some((i64::MIN, i64::MAX)),
        _ => None,
    }
}
