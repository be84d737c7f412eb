//! Property Resolution Engine for the Basalt Scanner
//!
//! This crate answers one question: given an already-assembled key/value
//! store, what is the value of a property? Resolution reconciles each query
//! against a declared schema:
//! - Scalar and multi-valued access (`get` / `get_string_array`)
//! - Default-value fallback for declared properties
//! - CSV-subset decoding of multi-valued strings
//! - Transparent decryption of secret values
//! - Advisory warnings when an access pattern disagrees with the declaration
//!
//! # Architecture
//!
//! ```text
//! caller ──► Configuration ──► PropertySchema (declared? multi? default?)
//!                │
//!                ├──► raw store lookup, else declared default
//!                ├──► SecretCodec (decrypt if wrapped)
//!                ├──► multivalue parser (array access only)
//!                └──► WarnSink (schema/access mismatch notices)
//! ```
//!
//! Assembling the store (defaults, files, server, CLI) and registering
//! properties are the scanner's concern, not this crate's. The resolver is
//! immutable after construction and safe to share across threads.

pub mod multivalue;
pub mod resolver;
pub mod schema;
pub mod secrets;
pub mod warnings;

// Re-export main types
pub use resolver::{Configuration, ConfigurationBuilder, ScanMode};
pub use schema::{PropertyDeclaration, PropertySchema};
pub use secrets::{AesGcmCodec, PlainCodec, SecretCodec};
pub use warnings::{MemorySink, TracingSink, WarnSink};

/// Error types for property resolution
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A declared multi-valued property whose raw string does not follow the
    /// CSV subset. The message is pinned: downstream tooling matches it in
    /// scanner logs.
    #[error("Property: '{key}' doesn't contain a valid CSV value: '{raw}'")]
    MalformedMultiValue { key: String, raw: String },

    /// The secret codec recognized an encrypted value but could not reverse it.
    #[error("Unable to decrypt property '{key}': {reason}")]
    SecretDecode { key: String, reason: String },

    /// Codec-internal failure (key parsing, cipher setup, malformed wrapping).
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// A typed accessor could not parse the resolved value.
    #[error("Property '{key}' is not a valid {expected}: '{raw}'")]
    InvalidValue {
        key: String,
        raw: String,
        expected: &'static str,
    },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ConfigError {
    pub fn malformed_multi_value(key: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::MalformedMultiValue {
            key: key.into(),
            raw: raw.into(),
        }
    }

    pub fn secret_decode(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SecretDecode {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn encryption(msg: impl Into<String>) -> Self {
        Self::Encryption(msg.into())
    }

    pub fn invalid_value(
        key: impl Into<String>,
        raw: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            raw: raw.into(),
            expected,
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Result type for property resolution operations
pub type Result<T> = std::result::Result<T, ConfigError>;
