//! Error types for cow_trie

use thiserror::Error;

/// Result type alias for cow_trie operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the checked lookups on a trie
///
/// Mutations never fail; only lookups that need to tell an absent key
/// apart from a value of another type return these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Type mismatch at key {key}: value is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}
