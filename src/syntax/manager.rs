//! Highlighting manager
//!
//! Coordinates dialect selection, tagging, and per-buffer caching for a
//! host editor. Spans are cached per buffer and recomputed when the
//! buffer's revision or the visible range changes.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use tracing::debug;

use super::builtin::{self, CoqInfoOptions};
use super::ruleset::RuleSet;
use super::span::Span;
use super::tagger::{is_enabled, tag};
use crate::error::{Result, TagError};

/// A read-only text buffer as seen by the highlighter
pub trait Source {
    /// Full buffer contents
    fn text(&self) -> &str;
    /// Edit counter; changes whenever the text changes
    fn revision(&self) -> u64;
}

/// A borrowed buffer snapshot
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub text: &'a str,
    pub revision: u64,
}

impl<'a> Snapshot<'a> {
    pub fn new(text: &'a str, revision: u64) -> Self {
        Self { text, revision }
    }
}

impl Source for Snapshot<'_> {
    fn text(&self) -> &str {
        self.text
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

/// Per-buffer highlighting cache
#[derive(Debug, Default)]
pub struct HighlightCache {
    /// Dialect for this buffer (None if no highlighting)
    pub dialect: Option<String>,
    /// Revision and range the cached spans were computed for
    key: Option<(u64, Range<usize>)>,
    spans: Vec<Span>,
}

impl HighlightCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dialect for this buffer
    pub fn set_dialect(&mut self, dialect: Option<String>) {
        self.dialect = dialect;
        self.invalidate();
    }

    /// Drop cached spans
    pub fn invalidate(&mut self) {
        self.key = None;
        self.spans.clear();
    }

    /// Whether spans are cached for this revision and range
    pub fn is_valid_for(&self, revision: u64, visible: &Range<usize>) -> bool {
        self.key.as_ref().map_or(false, |(rev, range)| *rev == revision && range == visible)
    }
}

/// Main highlighting manager
pub struct Highlighter {
    /// Loaded dialects by name
    dialects: HashMap<String, Arc<RuleSet>>,
    /// Per-buffer caches (buffer id -> cache)
    caches: HashMap<usize, HighlightCache>,
}

impl Highlighter {
    /// Create a highlighter with the built-in dialects
    pub fn new() -> Result<Self> {
        Self::with_options(CoqInfoOptions::default())
    }

    /// Create a highlighter with custom coq-info options
    pub fn with_options(options: CoqInfoOptions) -> Result<Self> {
        let mut highlighter = Self {
            dialects: HashMap::new(),
            caches: HashMap::new(),
        };
        for dialect in builtin::all_dialects(options)? {
            highlighter.register(dialect);
        }
        Ok(highlighter)
    }

    /// Add or replace a dialect
    ///
    /// Buffers already using a dialect of the same name are re-tagged on
    /// their next request.
    pub fn register(&mut self, rules: Arc<RuleSet>) {
        let name = rules.name().to_string();
        for cache in self.caches.values_mut() {
            if cache.dialect.as_deref() == Some(name.as_str()) {
                cache.invalidate();
            }
        }
        debug!(dialect = %name, "registered dialect");
        self.dialects.insert(name, rules);
    }

    /// Get a dialect by name
    pub fn dialect(&self, name: &str) -> Option<&Arc<RuleSet>> {
        self.dialects.get(name)
    }

    /// Get or create a cache for a buffer
    pub fn get_cache(&mut self, buffer: usize) -> &mut HighlightCache {
        self.caches.entry(buffer).or_default()
    }

    /// Remove cache for a buffer (when buffer is closed)
    pub fn remove_cache(&mut self, buffer: usize) {
        self.caches.remove(&buffer);
    }

    /// Set the dialect of a buffer; `None` turns highlighting off for it
    pub fn set_buffer_dialect(&mut self, buffer: usize, dialect: Option<&str>) -> Result<()> {
        if let Some(name) = dialect {
            if !self.dialects.contains_key(name) {
                return Err(TagError::UnknownDialect(name.to_string()));
            }
        }
        self.get_cache(buffer).set_dialect(dialect.map(str::to_string));
        Ok(())
    }

    /// Drop cached spans for a buffer after an edit
    pub fn invalidate(&mut self, buffer: usize) {
        if let Some(cache) = self.caches.get_mut(&buffer) {
            cache.invalidate();
        }
    }

    /// Spans for the visible range of a buffer, from cache when possible
    ///
    /// Returns no spans if the buffer has no dialect or tagging is
    /// switched off.
    pub fn highlight<S: Source + ?Sized>(
        &mut self,
        buffer: usize,
        source: &S,
        visible: Range<usize>,
    ) -> &[Span] {
        let cache = self.caches.entry(buffer).or_default();
        if !is_enabled() {
            cache.invalidate();
            return &cache.spans;
        }
        let rules = match cache.dialect.as_deref().and_then(|name| self.dialects.get(name)) {
            Some(rules) => rules,
            None => {
                cache.invalidate();
                return &cache.spans;
            }
        };

        let revision = source.revision();
        if !cache.is_valid_for(revision, &visible) {
            cache.spans = tag(source.text(), rules, visible.clone());
            cache.key = Some((revision, visible));
        }
        &cache.spans
    }

    /// List available dialects
    pub fn list_dialects(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.dialects.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}
