//! Error types for SwOS core types

use thiserror::Error;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the core types.
///
/// Decoding itself never fails; these only cover lookups by name.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Section name is not one of `sys`, `link`, `stats`
    #[error("unknown section: {0}")]
    UnknownSection(String),
}
