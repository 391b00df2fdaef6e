//! Syntax tagging module
//!
//! This module provides the rule-driven region tagger:
//! - Rule and rule set definitions (built in code or loaded from TOML)
//! - The tagger itself, producing nested spans
//! - Category links and themes used to display the spans
//! - A highlighting manager with per-buffer caches for hosts

mod builtin;
mod category;
mod manager;
mod rules;
mod ruleset;
mod span;
mod tagger;
mod theme;

pub use builtin::{all_dialects, coq_info, coq_info_rules, CoqInfoOptions, COQ_INFO};
pub use category::{BaseStyle, LinkTable};
pub use manager::{HighlightCache, Highlighter, Snapshot, Source};
pub use rules::{floor_boundary, CategoryId, Rule, RuleDef, RuleId, RuleKind};
pub use ruleset::{RuleSet, RuleSetBuilder};
pub use span::{flatten, Segment, Span};
pub use tagger::{is_enabled, set_enabled, tag};
pub use theme::{default_style, Color, Style, Theme};
