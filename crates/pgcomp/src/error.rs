//! Error types for pgcomp

use thiserror::Error;

/// Result type alias for composer operations
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Error types for composer operations.
///
/// Construction and mutation never fail; the cursor reads are the only
/// operations with a real failure mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// `key`/`oper`/`placeholder` read before the first successful `next`
    #[error("cursor out of range: position {cursor} of {len} expressions")]
    CursorOutOfRange { cursor: usize, len: usize },

    /// Operator token or name with no canonical [`Operator`](crate::Operator)
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Malformed capacity layout
    #[error("Layout error: {0}")]
    Layout(String),
}

impl ComposeError {
    /// Create a cursor range error
    pub fn cursor_out_of_range(cursor: usize, len: usize) -> Self {
        Self::CursorOutOfRange { cursor, len }
    }

    /// Check if this is a cursor range error
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::CursorOutOfRange { .. })
    }
}

impl From<toml::de::Error> for ComposeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Layout(err.to_string())
    }
}
