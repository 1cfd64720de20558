//! Error types for configuration and identifier generation.

use thiserror::Error;

/// Rejected configuration. Fatal to activation: a middleware instance is
/// never built from a configuration that produced one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A length was not an integer, or was less than 1.
    /// `field` is `length` or `additional.<name>`.
    #[error("invalid length for `{field}`: {value:?} (expected an integer >= 1)")]
    InvalidLength { field: String, value: String },

    /// The same additional name appeared twice.
    #[error("duplicate key: {name}")]
    DuplicateKey { name: String },
}

/// The secure random source could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("secure random source unavailable: {0}")]
    Entropy(String),
}
