//! Built-in dialect definitions

mod coq_info;

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::ruleset::RuleSet;
use crate::error::Result;

pub use coq_info::{coq_info_rules, CoqInfoOptions, NAME as COQ_INFO};

static COQ_INFO_DEFAULT: OnceCell<Arc<RuleSet>> = OnceCell::new();

/// The process-wide coq-info rule set with default options
///
/// Built on first use and shared read-only afterwards.
pub fn coq_info() -> Result<Arc<RuleSet>> {
    COQ_INFO_DEFAULT
        .get_or_try_init(|| coq_info_rules(CoqInfoOptions::default()).map(Arc::new))
        .cloned()
}

/// Get all built-in dialects with the given coq-info options
pub fn all_dialects(options: CoqInfoOptions) -> Result<Vec<Arc<RuleSet>>> {
    let coq = if options == CoqInfoOptions::default() {
        coq_info()?
    } else {
        Arc::new(coq_info_rules(options)?)
    };
    Ok(vec![coq])
}
