//! Pattern rules for region tagging
//!
//! A rule is plain data: a start pattern, an optional end pattern (which
//! turns the rule into a region), a nesting set and a display category.
//! [`RuleDef`] is the uncompiled form written by dialect authors;
//! [`Rule`] is the compiled form held by a [`RuleSet`](super::RuleSet).

use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, TagError};

/// Index of a rule inside its rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub usize);

/// Index of an interned category name inside a rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(pub usize);

/// Whether a rule tags a single token or a delimited region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Start pattern only; the match is the whole span
    Match,
    /// Start and end pattern; nested rules apply in between
    Region,
}

/// Uncompiled rule definition
///
/// Also the shape of a `[[rule]]` table in a TOML dialect file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RuleDef {
    pub name: String,
    pub start: String,
    pub end: Option<String>,
    /// Consumed inside a region without ending it
    pub skip: Option<String>,
    /// Defaults to the rule name
    pub category: Option<String>,
    /// Category for the start text and (with `keep-end`) the end text
    pub delimiter: Option<String>,
    pub contains: Vec<String>,
    pub contained_only: bool,
    pub keep_end: bool,
    pub extend: bool,
    pub always_active: bool,
    pub close_nested: bool,
}

impl RuleDef {
    /// A single-token rule
    pub fn matching(name: &str, pattern: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            start: pattern.to_string(),
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    /// A start/end delimited region
    pub fn region(name: &str, start: &str, end: &str, category: &str) -> Self {
        Self {
            end: Some(end.to_string()),
            ..Self::matching(name, start, category)
        }
    }

    pub fn contains(mut self, names: &[&str]) -> Self {
        self.contains = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn skip(mut self, pattern: &str) -> Self {
        self.skip = Some(pattern.to_string());
        self
    }

    pub fn delimiter(mut self, category: &str) -> Self {
        self.delimiter = Some(category.to_string());
        self
    }

    pub fn contained_only(mut self) -> Self {
        self.contained_only = true;
        self
    }

    pub fn keep_end(mut self) -> Self {
        self.keep_end = true;
        self
    }

    pub fn extend(mut self) -> Self {
        self.extend = true;
        self
    }

    pub fn always_active(mut self) -> Self {
        self.always_active = true;
        self
    }

    pub fn close_nested(mut self) -> Self {
        self.close_nested = true;
        self
    }

    /// Category name this rule tags with
    pub fn category_name(&self) -> &str {
        self.category.as_deref().unwrap_or(&self.name)
    }

    /// Compile the patterns of this definition
    pub(crate) fn compile_patterns(&self) -> Result<Patterns> {
        let region_only = self.skip.is_some()
            || self.keep_end
            || self.close_nested
            || !self.contains.is_empty();
        if self.end.is_none() && region_only {
            return Err(TagError::MissingEnd(self.name.clone()));
        }

        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|source| TagError::InvalidPattern {
                rule: self.name.clone(),
                source,
            })
        };

        Ok(Patterns {
            start: compile(&self.start)?,
            end: self.end.as_deref().map(compile).transpose()?,
            skip: self.skip.as_deref().map(compile).transpose()?,
        })
    }
}

/// Compiled patterns of one rule
pub(crate) struct Patterns {
    pub start: Regex,
    pub end: Option<Regex>,
    pub skip: Option<Regex>,
}

/// A compiled rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    pub kind: RuleKind,
    pub start: Regex,
    pub end: Option<Regex>,
    pub skip: Option<Regex>,
    pub category: CategoryId,
    pub delimiter: Option<CategoryId>,
    /// Nesting set, in priority order
    pub contains: Vec<RuleId>,
    pub contained_only: bool,
    pub keep_end: bool,
    pub extend: bool,
    pub always_active: bool,
    pub close_nested: bool,
}

impl Rule {
    /// Category used for delimiter text, falling back to the rule's own
    pub fn delimiter_category(&self) -> CategoryId {
        self.delimiter.unwrap_or(self.category)
    }

    pub fn is_region(&self) -> bool {
        self.kind == RuleKind::Region
    }

    /// Find the first non-empty start match at or after `from`
    pub fn find_start(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        find_non_empty(&self.start, text, from)
    }

    /// Find the first end match at or after `from` (may be empty)
    pub fn find_end(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        self.end.as_ref().and_then(|end| find_from(end, text, from))
    }

    /// Find the first non-empty skip match at or after `from`
    pub fn find_skip(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        self.skip.as_ref().and_then(|skip| find_non_empty(skip, text, from))
    }
}

/// Find the first match at or after `from`
///
/// Unlike slicing the haystack, anchors and word boundaries still see
/// the text before `from`.
pub fn find_from(re: &Regex, text: &str, from: usize) -> Option<(usize, usize)> {
    if from > text.len() {
        return None;
    }
    re.find_at(text, from).map(|m| (m.start(), m.end()))
}

/// Find the first non-empty match at or after `from`
pub fn find_non_empty(re: &Regex, text: &str, from: usize) -> Option<(usize, usize)> {
    let mut at = from;
    loop {
        let (start, end) = find_from(re, text, at)?;
        if end > start {
            return Some((start, end));
        }
        // Empty match: retry one character later
        at = next_boundary(text, start)?;
    }
}

/// Byte offset of the character boundary after `pos`
pub fn next_boundary(text: &str, pos: usize) -> Option<usize> {
    text.get(pos..)?.chars().next().map(|c| pos + c.len_utf8())
}

/// Largest character boundary at or before `pos`, clamped to the text
pub fn floor_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_from_keeps_context() {
        let re = Regex::new(r"\bfoo").unwrap();
        // "xfoo" at offset 1 is not at a word boundary
        assert_eq!(find_from(&re, "xfoo foo", 1), Some((5, 8)));

        let line_start = Regex::new(r"(?m)^Error:").unwrap();
        assert_eq!(find_from(&line_start, "ok\nError: x", 1), Some((3, 9)));
    }

    #[test]
    fn test_find_non_empty_skips_empty_matches() {
        let re = Regex::new(r"a*").unwrap();
        assert_eq!(find_non_empty(&re, "bbaab", 0), Some((2, 4)));
        assert_eq!(find_non_empty(&re, "bbb", 0), None);
    }

    #[test]
    fn test_next_boundary_utf8() {
        assert_eq!(next_boundary("αβ", 0), Some(2));
        assert_eq!(next_boundary("ab", 2), None);
    }

    #[test]
    fn test_floor_boundary() {
        assert_eq!(floor_boundary("aé", 2), 1);
        assert_eq!(floor_boundary("aé", 3), 3);
        assert_eq!(floor_boundary("ab", 10), 2);
    }

    #[test]
    fn test_match_rule_with_region_options() {
        let def = RuleDef::matching("kw", "x", "Keyword").keep_end();
        assert!(matches!(def.compile_patterns(), Err(TagError::MissingEnd(name)) if name == "kw"));
    }

    #[test]
    fn test_invalid_pattern() {
        let def = RuleDef::region("bad", "(", r"\)", "Comment");
        assert!(matches!(
            def.compile_patterns(),
            Err(TagError::InvalidPattern { rule, .. }) if rule == "bad"
        ));
    }

    #[test]
    fn test_category_defaults_to_name() {
        let mut def = RuleDef::matching("coqTodo", "TODO", "coqTodo");
        def.category = None;
        assert_eq!(def.category_name(), "coqTodo");
    }
}
