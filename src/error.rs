//! Error types for hamt_trie

use thiserror::Error;

/// Result type alias for hamt_trie operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hamt_trie operations
///
/// Lookups and deletes never fail: absence is reported through `Option`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("No tokio runtime found")]
    NoRuntime,
}

/// Construction-time configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("hash width must be 32 or 64 bits, got {0}")]
    HashWidth(u32),

    #[error("index bits must be in 1..=6, got {0}")]
    IndexBits(u32),

    #[error("promotion threshold {threshold} outside 1..={capacity}")]
    Threshold { threshold: usize, capacity: usize },
}
