//! Error types for heapsql
//!
//! Errors fall into three families: parse errors raised by the SQL front end,
//! storage errors raised by relations and indices, and execution errors raised
//! by the statement handlers. The dispatcher is the only place that turns a
//! storage error into an execution error.

use thiserror::Error;

/// Prefix attached to storage errors when they cross the dispatcher boundary.
pub const STORAGE_ERROR_PREFIX: &str = "DbRelationError: ";

/// The main error type for heapsql
#[derive(Error, Debug)]
pub enum Error {
    // ========== Lexer Errors ==========
    #[error("Lexer error: unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),

    #[error("Lexer error: unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("Lexer error: invalid number format at position {0}")]
    InvalidNumber(usize),

    // ========== Parser Errors ==========
    #[error("Parse error: unexpected token '{found}', expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Parse error: unexpected end of input, expected {0}")]
    UnexpectedEof(String),

    // ========== Storage Errors ==========
    #[error("{0}")]
    Relation(String),

    #[error("block {0} has no room for a {1}-byte record")]
    NoRoom(u32, usize),

    #[error("unknown column '{0}' in relation '{1}'")]
    UnknownColumn(String, String),

    #[error("duplicate key {key} in unique index '{index}'")]
    DuplicateKey { index: String, key: String },

    #[error("cannot compare {0} with {1}")]
    TypeMismatch(&'static str, &'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index encoding error: {0}")]
    Json(#[from] serde_json::Error),

    // ========== Execution Errors ==========
    #[error("{0}")]
    Execution(String),
}

impl Error {
    /// Build an execution error from anything printable
    pub fn execution(message: impl Into<String>) -> Self {
        Error::Execution(message.into())
    }

    /// Build a storage-level relation error
    pub fn relation(message: impl Into<String>) -> Self {
        Error::Relation(message.into())
    }

    /// Is this an error raised by the storage layer?
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::Relation(_)
                | Error::NoRoom(..)
                | Error::UnknownColumn(..)
                | Error::DuplicateKey { .. }
                | Error::TypeMismatch(..)
                | Error::Io(_)
                | Error::Json(_)
        )
    }

    /// Translate a storage error into the user-facing execution error.
    /// Execution and parse errors are returned unchanged.
    pub fn into_execution(self) -> Self {
        if self.is_storage() {
            Error::Execution(format!("{}{}", STORAGE_ERROR_PREFIX, self))
        } else {
            self
        }
    }
}

/// Result type alias for heapsql operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownColumn("age".to_string(), "users".to_string());
        assert_eq!(err.to_string(), "unknown column 'age' in relation 'users'");

        let err = Error::UnexpectedCharacter('@', 5);
        assert_eq!(
            err.to_string(),
            "Lexer error: unexpected character '@' at position 5"
        );
    }

    #[test]
    fn test_storage_errors_are_wrapped() {
        let err = Error::relation("file exists").into_execution();
        match err {
            Error::Execution(msg) => assert_eq!(msg, "DbRelationError: file exists"),
            other => panic!("expected execution error, got {:?}", other),
        }
    }

    #[test]
    fn test_execution_errors_pass_through() {
        let err = Error::execution("cannot drop a schema table").into_execution();
        assert_eq!(err.to_string(), "cannot drop a schema table");
        assert!(!err.is_storage());
    }
}
