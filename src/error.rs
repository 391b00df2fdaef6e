//! Error types for regiontag
//!
//! Tagging itself never fails; these errors come from building rule
//! sets, loading configuration, and CLI I/O.

use thiserror::Error;

/// Result type alias for regiontag operations
pub type Result<T> = std::result::Result<T, TagError>;

/// Rule set, configuration and I/O errors
#[derive(Error, Debug)]
pub enum TagError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Rule '{rule}' has an invalid pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("Duplicate rule name: {0}")]
    DuplicateRule(String),

    #[error("Rule '{rule}' refers to unknown rule '{reference}'")]
    UnknownRule { rule: String, reference: String },

    #[error("Region rule '{0}' has no end pattern")]
    MissingEnd(String),

    #[error("Unknown base style: {0}")]
    UnknownStyle(String),

    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),
}
