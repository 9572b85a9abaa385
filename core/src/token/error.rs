use std::fmt;

use thiserror::Error;

/// Zero-based line/column of a token or error. Columns count chars from the preceding newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Which stage rejected the source, so callers can tell invalid code from code the
/// resolver does not understand yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Unhandled,
}

impl ErrorCategory {
    pub fn code(self) -> &'static str {
        match self {
            ErrorCategory::Lexical => "lunar-lexical",
            ErrorCategory::Syntax => "lunar-syntax",
            ErrorCategory::Unhandled => "lunar-unhandled",
        }
    }
}

/// Errors raised while lexing or resolving one file. Each of them ends analysis of the rest of
/// that file; everything resolved before it stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unexpected \"{character}\" at {position}")]
    Lexical { character: char, position: Position },

    #[error("{message}")]
    Syntax { message: String, position: Position },

    #[error("not yet handled: {message}")]
    Unhandled { message: String, position: Position },
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, position: Position) -> Self {
        ParseError::Syntax {
            message: message.into(),
            position,
        }
    }

    pub fn unhandled(message: impl Into<String>, position: Position) -> Self {
        ParseError::Unhandled {
            message: message.into(),
            position,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ParseError::Lexical { position, .. }
            | ParseError::Syntax { position, .. }
            | ParseError::Unhandled { position, .. } => *position,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ParseError::Lexical { .. } => ErrorCategory::Lexical,
            ParseError::Syntax { .. } => ErrorCategory::Syntax,
            ParseError::Unhandled { .. } => ErrorCategory::Unhandled,
        }
    }
}
