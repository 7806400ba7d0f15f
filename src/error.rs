// edn-codec - Error types
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for the codec.
//!
//! Every failure is one of three kinds: a syntax error in the input text,
//! an I/O failure from the underlying character source or sink, or a
//! configuration error caused by a misassembled parser or printer. Syntax
//! errors carry the input position where the lexer or parser noticed them;
//! I/O errors preserve their cause.

use std::fmt;
use std::io;

use thiserror::Error;

/// A 1-indexed line/column pair within the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

fn fmt_position(position: &Option<Position>) -> String {
    match position {
        Some(p) => format!(" at {}", p),
        None => String::new(),
    }
}

/// Errors produced while reading or printing edn.
#[derive(Debug, Error)]
pub enum EdnError {
    /// The input text violates the edn grammar.
    #[error("syntax error{}: {message}", fmt_position(.position))]
    Syntax {
        message: String,
        position: Option<Position>,
    },

    /// Reading from the source or writing to the sink failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The parser or printer was set up incorrectly. This is a defect in
    /// the embedding program, not in the input data.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl EdnError {
    /// A syntax error with no position attached yet. The parser stamps its
    /// current position on position-less errors as they propagate.
    pub fn syntax(message: impl Into<String>) -> Self {
        EdnError::Syntax {
            message: message.into(),
            position: None,
        }
    }

    /// A syntax error at a known input position.
    pub fn syntax_at(message: impl Into<String>, position: Position) -> Self {
        EdnError::Syntax {
            message: message.into(),
            position: Some(position),
        }
    }

    /// A configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        EdnError::Configuration(message.into())
    }

    /// Attach `position` to a syntax error that does not have one.
    pub(crate) fn with_position(self, position: Position) -> Self {
        match self {
            EdnError::Syntax {
                message,
                position: None,
            } => EdnError::Syntax {
                message,
                position: Some(position),
            },
            other => other,
        }
    }

    /// The input position, if this is a positioned syntax error.
    pub fn position(&self) -> Option<Position> {
        match self {
            EdnError::Syntax { position, .. } => *position,
            _ => None,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, EdnError::Syntax { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, EdnError::Io(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, EdnError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, EdnError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_display_without_position() {
        let e = EdnError::syntax("bad input");
        assert_eq!(e.to_string(), "syntax error: bad input");
    }

    #[test]
    fn test_syntax_display_with_position() {
        let e = EdnError::syntax_at("bad input", Position { line: 3, column: 7 });
        assert_eq!(e.to_string(), "syntax error at 3:7: bad input");
    }

    #[test]
    fn test_with_position_fills_missing() {
        let e = EdnError::syntax("x").with_position(Position { line: 1, column: 2 });
        assert_eq!(e.position(), Some(Position { line: 1, column: 2 }));
    }

    #[test]
    fn test_with_position_keeps_existing() {
        let e = EdnError::syntax_at("x", Position { line: 1, column: 1 })
            .with_position(Position { line: 9, column: 9 });
        assert_eq!(e.position(), Some(Position { line: 1, column: 1 }));
    }

    #[test]
    fn test_io_preserves_cause() {
        let cause = io::Error::new(io::ErrorKind::UnexpectedEof, "boom");
        let e = EdnError::from(cause);
        assert!(e.is_io());
        assert!(e.to_string().contains("boom"));
    }
}
