use std::fmt;
use std::fmt::{Display, Formatter};

/// Errors raised by host natives, surfaced to page code exactly as an engine
/// built-in would raise them.
#[derive(Debug, Clone, PartialEq)]
pub enum JErrorType {
    ReferenceError(String),
    TypeError(String),
    RangeError(String),
    SyntaxError(String),
}

impl JErrorType {
    pub fn message(&self) -> &str {
        match self {
            JErrorType::ReferenceError(m)
            | JErrorType::TypeError(m)
            | JErrorType::RangeError(m)
            | JErrorType::SyntaxError(m) => m,
        }
    }
}

impl Display for JErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JErrorType::ReferenceError(m) => write!(f, "Uncaught reference error: {}.", m),
            JErrorType::TypeError(m) => write!(f, "Uncaught type error: {}.", m),
            JErrorType::RangeError(m) => write!(f, "Uncaught range error: {}.", m),
            JErrorType::SyntaxError(m) => write!(f, "Uncaught syntax error: {}.", m),
        }
    }
}

impl std::error::Error for JErrorType {}
