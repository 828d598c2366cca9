#![forbid(unsafe_code)]

//! Decoding errors.
//!
//! Encoding is total over [`crate::Value`], so every variant here comes from
//! the parsing direction. Positions are 1-based.

/// Errors produced while parsing wire text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Input ended inside a record, list, or quoted value.
    UnexpectedEnd { line: usize, column: usize },
    /// A specific symbol was required but something else was found.
    Expected {
        expected: &'static str,
        found: char,
        line: usize,
        column: usize,
    },
    /// Unknown or truncated backslash escape inside a quoted value.
    InvalidEscape {
        sequence: String,
        line: usize,
        column: usize,
    },
    /// Non-whitespace input after the closing brace of the top-level record.
    TrailingInput { line: usize, column: usize },
    /// Records nested deeper than the parser accepts.
    TooDeep {
        limit: usize,
        line: usize,
        column: usize,
    },
}

impl WireError {
    /// Line/column of the failure.
    #[must_use]
    pub const fn position(&self) -> (usize, usize) {
        match self {
            Self::UnexpectedEnd { line, column }
            | Self::Expected { line, column, .. }
            | Self::InvalidEscape { line, column, .. }
            | Self::TrailingInput { line, column }
            | Self::TooDeep { line, column, .. } => (*line, *column),
        }
    }
}

impl core::fmt::Display for WireError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnexpectedEnd { line, column } => {
                write!(f, "unexpected end of text (line {line}, column {column})")
            }
            Self::Expected {
                expected,
                found,
                line,
                column,
            } => write!(
                f,
                "expected {expected}, found {found:?} (line {line}, column {column})"
            ),
            Self::InvalidEscape {
                sequence,
                line,
                column,
            } => write!(
                f,
                "invalid escape sequence {sequence:?} (line {line}, column {column})"
            ),
            Self::TrailingInput { line, column } => {
                write!(f, "trailing input after record (line {line}, column {column})")
            }
            Self::TooDeep {
                limit,
                line,
                column,
            } => write!(
                f,
                "records nested deeper than {limit} levels (line {line}, column {column})"
            ),
        }
    }
}

impl std::error::Error for WireError {}
