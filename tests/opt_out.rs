//! The process-wide opt-out flag
//!
//! Lives in its own test binary because the flag is global.

use regiontag::config::Config;
use regiontag::syntax::{coq_info, is_enabled, set_enabled, tag, Highlighter, Snapshot};

#[test]
fn disabled_tagging_returns_no_spans() {
    let rules = coq_info().unwrap();
    let text = "(* comment *)\nError: nope";
    let snapshot = Snapshot::new(text, 1);

    let mut highlighter = Highlighter::new().unwrap();
    highlighter.set_buffer_dialect(1, Some("coq-info")).unwrap();

    assert!(is_enabled());
    assert!(!tag(text, &rules, 0..text.len()).is_empty());
    assert_eq!(highlighter.highlight(1, &snapshot, 0..text.len()).len(), 2);

    let config = Config::parse("enabled = false").unwrap();
    config.apply_global();
    assert!(!is_enabled());
    assert!(tag(text, &rules, 0..text.len()).is_empty());

    // Same revision and range as the cached result
    assert!(highlighter.highlight(1, &snapshot, 0..text.len()).is_empty());

    set_enabled(true);
    assert_eq!(highlighter.highlight(1, &snapshot, 0..text.len()).len(), 2);
}
