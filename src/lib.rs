//! regiontag - rule-driven lexical region tagging
//!
//! Tags spans of text with symbolic categories using a declarative table
//! of pattern rules. Ships with a dialect for Coq's info-panel output;
//! other dialects can be loaded from TOML.

pub mod config;
pub mod error;
pub mod render;
pub mod syntax;

pub use error::{Result, TagError};
