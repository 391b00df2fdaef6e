//! The region tagger
//!
//! [`tag`] scans a buffer once, left to right, keeping the open regions on
//! an explicit stack. At each position every eligible candidate is searched
//! for its next match; the earliest match wins and ties go to the
//! candidate checked first:
//!
//! 1. `always_active` rules, unless the innermost region is one itself
//! 2. end patterns of `close_nested` ancestors, outermost first, but
//!    never from outside an open `always_active` region
//! 3. the innermost region's skip pattern, then its end pattern
//! 4. the innermost region's `contains`, or the top-level rules
//!
//! Every accepted candidate either consumes at least one byte or closes a
//! region, so a scan takes at most two iterations per byte.
//!
//! Regions nest at most [`MAX_DEPTH`] deep. Once the stack is full, region
//! starts are left as plain text inside the innermost region.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::trace;

use super::rules::{floor_boundary, Rule, RuleId};
use super::ruleset::RuleSet;
use super::span::Span;

/// Deepest region nesting the tagger will open
pub const MAX_DEPTH: usize = 256;

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn tagging on or off for the whole process
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

/// Whether tagging is enabled
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Tag `text` with `rules`
///
/// Returns the top-level spans that overlap `visible`. Spans may start
/// before or end after the visible range; the scan always starts at the
/// beginning of `text` so regions opened earlier are honoured. Regions
/// still open at `visible.end` are cut there unless they `extend`.
#[tracing::instrument(level = "trace", skip_all, fields(dialect = rules.name(), len = text.len()))]
pub fn tag(text: &str, rules: &RuleSet, visible: Range<usize>) -> Vec<Span> {
    if !is_enabled() {
        return Vec::new();
    }
    let end = floor_boundary(text, visible.end);
    let start = visible.start.min(end);
    if start >= end {
        return Vec::new();
    }

    let mut spans = Scanner::new(text, rules).run(end);
    spans.retain(|span| span.end > start);
    spans
}

/// An open region
struct Frame {
    rule: RuleId,
    start: usize,
    children: Vec<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pick {
    Begin { rule: RuleId, start: usize, end: usize },
    Skip { start: usize, end: usize },
    /// End of the region at `depth` on the stack
    End { depth: usize, start: usize, end: usize },
}

impl Pick {
    fn start(&self) -> usize {
        match *self {
            Pick::Begin { start, .. } | Pick::Skip { start, .. } | Pick::End { start, .. } => start,
        }
    }
}

/// Keep the earliest candidate; on a tie the one offered first stays
fn offer(best: &mut Option<Pick>, pick: Pick) {
    if best.map_or(true, |b| pick.start() < b.start()) {
        *best = Some(pick);
    }
}

#[derive(Debug, Clone, Copy)]
enum Role {
    Start = 0,
    End = 1,
    Skip = 2,
}

#[derive(Debug, Clone, Copy)]
struct Memo {
    from: usize,
    hit: Option<(usize, usize)>,
}

/// Pattern searches, memoised per rule and role
///
/// The scan position never moves backwards, so a match found from an
/// earlier position is still the first match as long as it starts at or
/// after the new position.
struct Finder<'a> {
    text: &'a str,
    memos: Vec<[Option<Memo>; 3]>,
}

impl<'a> Finder<'a> {
    fn new(text: &'a str, rule_count: usize) -> Self {
        Self {
            text,
            memos: vec![[None; 3]; rule_count],
        }
    }

    fn find(&mut self, rule: &Rule, role: Role, at: usize) -> Option<(usize, usize)> {
        let slot = &mut self.memos[rule.id.0][role as usize];
        if let Some(memo) = slot {
            if at >= memo.from && memo.hit.map_or(true, |(start, _)| start >= at) {
                return memo.hit;
            }
        }
        let hit = match role {
            Role::Start => rule.find_start(self.text, at),
            Role::End => rule.find_end(self.text, at),
            Role::Skip => rule.find_skip(self.text, at),
        };
        *slot = Some(Memo { from: at, hit });
        hit
    }
}

struct Scanner<'a> {
    text: &'a str,
    rules: &'a RuleSet,
    finder: Finder<'a>,
    stack: Vec<Frame>,
    top: Vec<Span>,
    pos: usize,
    /// Number of open regions with `extend`
    extending: usize,
    /// Stack depths of open `close_nested` regions, outermost first
    closers: Vec<usize>,
    /// Stack depths of open `always_active` regions
    guards: Vec<usize>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, rules: &'a RuleSet) -> Self {
        Self {
            text,
            rules,
            finder: Finder::new(text, rules.len()),
            stack: Vec::new(),
            top: Vec::new(),
            pos: 0,
            extending: 0,
            closers: Vec::new(),
            guards: Vec::new(),
        }
    }

    fn run(mut self, limit: usize) -> Vec<Span> {
        let len = self.text.len();
        loop {
            let extending = self.extending > 0;
            if self.pos >= len {
                self.finish(len);
                break;
            }
            if self.pos >= limit && !extending {
                self.finish(self.pos);
                break;
            }
            match self.choose() {
                Some(pick) if pick.start() >= limit && !extending => {
                    self.finish(limit);
                    break;
                }
                Some(pick) => self.apply(pick),
                None => {
                    let at = if extending { len } else { limit.max(self.pos) };
                    self.finish(at);
                    break;
                }
            }
        }
        self.top
    }

    fn choose(&mut self) -> Option<Pick> {
        let rules = self.rules;
        let pos = self.pos;
        let mut best = None;

        let innermost = self.stack.last().map(|frame| rules.rule(frame.rule));
        let full = self.stack.len() >= MAX_DEPTH;

        if innermost.map_or(true, |rule| !rule.always_active) {
            for &id in rules.always_active() {
                let rule = rules.rule(id);
                if (innermost.is_none() && rule.contained_only) || (full && rule.is_region()) {
                    continue;
                }
                if let Some((start, end)) = self.finder.find(rule, Role::Start, pos) {
                    offer(&mut best, Pick::Begin { rule: id, start, end });
                }
            }
        }

        let depth = self.stack.len();
        let floor = self.guards.last().copied();
        for &outer in &self.closers {
            if outer + 1 >= depth {
                break;
            }
            if floor.map_or(false, |guard| outer < guard) {
                continue;
            }
            let rule = rules.rule(self.stack[outer].rule);
            if let Some((start, end)) = self.finder.find(rule, Role::End, pos) {
                offer(&mut best, Pick::End { depth: outer, start, end });
            }
        }

        if let Some(rule) = innermost {
            if let Some((start, end)) = self.finder.find(rule, Role::Skip, pos) {
                offer(&mut best, Pick::Skip { start, end });
            }
            if let Some((start, end)) = self.finder.find(rule, Role::End, pos) {
                offer(&mut best, Pick::End { depth: depth - 1, start, end });
            }
        }

        let context = match innermost {
            Some(rule) => rule.contains.as_slice(),
            None => rules.top_level(),
        };
        for &id in context {
            if best.map_or(false, |b| b.start() == pos) {
                break;
            }
            let rule = rules.rule(id);
            if full && rule.is_region() {
                continue;
            }
            if let Some((start, end)) = self.finder.find(rule, Role::Start, pos) {
                offer(&mut best, Pick::Begin { rule: id, start, end });
            }
        }

        best
    }

    fn apply(&mut self, pick: Pick) {
        match pick {
            Pick::Begin { rule: id, start, end } => {
                let rule = self.rules.rule(id);
                self.pos = end;
                if rule.is_region() {
                    let mut children = Vec::new();
                    if let Some(delimiter) = rule.delimiter {
                        children.push(Span::new(start, end, id, delimiter));
                    }
                    if rule.extend {
                        self.extending += 1;
                    }
                    if rule.close_nested {
                        self.closers.push(self.stack.len());
                    }
                    if rule.always_active {
                        self.guards.push(self.stack.len());
                    }
                    self.stack.push(Frame { rule: id, start, children });
                } else {
                    self.emit(Span::new(start, end, id, rule.category));
                }
            }
            Pick::Skip { end, .. } => self.pos = end,
            Pick::End { depth, start, end } => {
                while self.stack.len() > depth + 1 {
                    self.close(start, None);
                }
                self.close(start, Some((start, end)));
                self.pos = end;
            }
        }
    }

    /// Pop the innermost region, ending it at `at` or after its end match
    fn close(&mut self, at: usize, end_match: Option<(usize, usize)>) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let rule = self.rules.rule(frame.rule);
        if rule.extend {
            self.extending -= 1;
        }
        if rule.close_nested {
            self.closers.pop();
        }
        if rule.always_active {
            self.guards.pop();
        }

        let mut span = Span {
            start: frame.start,
            end: at,
            rule: frame.rule,
            category: rule.category,
            children: frame.children,
        };
        if let Some((start, end)) = end_match {
            span.end = end;
            if rule.keep_end && end > start {
                span.children.push(Span::new(start, end, frame.rule, rule.delimiter_category()));
            }
        }
        self.emit(span);
    }

    /// Close every open region at `at`
    fn finish(&mut self, at: usize) {
        while let Some(frame) = self.stack.last() {
            trace!(
                rule = %self.rules.rule(frame.rule).name,
                start = frame.start,
                end = at,
                "region left open"
            );
            self.close(at, None);
        }
    }

    fn emit(&mut self, span: Span) {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(span),
            None => self.top.push(span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::category::BaseStyle;
    use crate::syntax::rules::RuleDef;

    fn names(rules: &RuleSet, spans: &[Span]) -> Vec<(String, usize, usize)> {
        spans
            .iter()
            .map(|s| (rules.rule(s.rule).name.clone(), s.start, s.end))
            .collect()
    }

    fn all(text: &str, rules: &RuleSet) -> Vec<Span> {
        tag(text, rules, 0..text.len())
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        let rules = RuleSet::builder("tie")
            .rule(RuleDef::matching("first", r"ab", "A"))
            .rule(RuleDef::matching("second", r"abc", "B"))
            .build()
            .unwrap();
        let spans = all("abc", &rules);
        assert_eq!(names(&rules, &spans), vec![("first".to_string(), 0, 2)]);
    }

    #[test]
    fn test_earliest_match_beats_priority() {
        let rules = RuleSet::builder("earliest")
            .rule(RuleDef::matching("late", r"z", "A"))
            .rule(RuleDef::matching("early", r"y", "B"))
            .build()
            .unwrap();
        let spans = all("xyz", &rules);
        assert_eq!(
            names(&rules, &spans),
            vec![("early".to_string(), 1, 2), ("late".to_string(), 2, 3)]
        );
    }

    #[test]
    fn test_unterminated_region_runs_to_end() {
        let rules = RuleSet::builder("open")
            .rule(RuleDef::region("block", r"<", r">", "Block"))
            .build()
            .unwrap();
        let spans = all("a < b c", &rules);
        assert_eq!(names(&rules, &spans), vec![("block".to_string(), 2, 7)]);
    }

    #[test]
    fn test_keep_end_tags_end_text() {
        let rules = RuleSet::builder("keep")
            .rule(RuleDef::region("kept", r"\[", r"\]", "Kept").delimiter("Delim").keep_end())
            .rule(RuleDef::region("plain", r"\{", r"\}", "Plain"))
            .link("Delim", BaseStyle::Delimiter)
            .build()
            .unwrap();

        let spans = all("[x] {y}", &rules);
        assert_eq!(spans.len(), 2);

        let kept = &spans[0];
        assert_eq!((kept.start, kept.end), (0, 3));
        let delims: Vec<_> = kept.children.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(delims, vec![(0, 1), (2, 3)]);
        assert_eq!(rules.style_of(kept.children[1].category), Some(BaseStyle::Delimiter));

        let plain = &spans[1];
        assert_eq!((plain.start, plain.end), (4, 7));
        assert!(plain.children.is_empty());
    }

    #[test]
    fn test_skip_does_not_end_region() {
        let rules = RuleSet::builder("skip")
            .rule(RuleDef::region("string", "\"", "\"", "String").skip("\"\""))
            .build()
            .unwrap();
        let text = r#"x "a""b" y"#;
        let spans = all(text, &rules);
        assert_eq!(names(&rules, &spans), vec![("string".to_string(), 2, 8)]);
    }

    #[test]
    fn test_always_active_not_swallowed_by_end() {
        let rules = RuleSet::builder("always")
            .rule(RuleDef::region("string", "\"", "\"", "String").always_active())
            .rule(RuleDef::region("angle", "<", ">", "Angle"))
            .build()
            .unwrap();
        let text = r#"< ">" >"#;
        let spans = all(text, &rules);
        assert_eq!(names(&rules, &spans), vec![("angle".to_string(), 0, 7)]);
        assert_eq!(names(&rules, &spans[0].children), vec![("string".to_string(), 2, 5)]);
    }

    #[test]
    fn test_contained_only_never_top_level() {
        let rules = RuleSet::builder("contained")
            .rule(RuleDef::matching("inner", r"x", "X").contained_only())
            .rule(RuleDef::region("paren", r"\(", r"\)", "P").contains(&["inner"]))
            .build()
            .unwrap();
        let spans = all("x (x) x", &rules);
        assert_eq!(names(&rules, &spans), vec![("paren".to_string(), 2, 5)]);
        assert_eq!(names(&rules, &spans[0].children), vec![("inner".to_string(), 3, 4)]);
    }

    #[test]
    fn test_zero_length_patterns_terminate() {
        let rules = RuleSet::builder("empty")
            .rule(RuleDef::matching("stars", r"a*", "A"))
            .rule(RuleDef::region("line", r"#", r"(?m)$", "Line"))
            .rule(RuleDef::region("never", r"!", r"(?:)", "Never"))
            .build()
            .unwrap();
        let text = "bab #c\n!d";
        let spans = all(text, &rules);
        assert_eq!(
            names(&rules, &spans),
            vec![
                ("stars".to_string(), 1, 2),
                ("line".to_string(), 4, 6),
                ("never".to_string(), 7, 8),
            ]
        );
    }

    #[test]
    fn test_close_nested_ends_descendants() {
        let rules = RuleSet::builder("close")
            .rule(RuleDef::region("outer", r"\{", r"\}", "Outer").contains(&["inner"]).close_nested())
            .rule(RuleDef::region("inner", r"<", r">", "Inner").contained_only())
            .build()
            .unwrap();
        let spans = all("{ < x } y", &rules);
        assert_eq!(names(&rules, &spans), vec![("outer".to_string(), 0, 7)]);
        assert_eq!(names(&rules, &spans[0].children), vec![("inner".to_string(), 2, 6)]);
    }

    #[test]
    fn test_extend_crosses_visible_end() {
        let rules = RuleSet::builder("extend")
            .rule(RuleDef::region("long", r"<<", r">>", "Long").extend())
            .rule(RuleDef::region("short", r"\[", r"\]", "Short"))
            .build()
            .unwrap();

        let spans = tag("<< abc >>", &rules, 0..4);
        assert_eq!(names(&rules, &spans), vec![("long".to_string(), 0, 9)]);

        let spans = tag("[ abc ]", &rules, 0..4);
        assert_eq!(names(&rules, &spans), vec![("short".to_string(), 0, 4)]);
    }

    #[test]
    fn test_visible_range_filters_spans() {
        let rules = RuleSet::builder("visible")
            .rule(RuleDef::matching("word", r"\w+", "Word"))
            .build()
            .unwrap();
        let spans = tag("aa bb cc dd", &rules, 4..7);
        assert_eq!(
            names(&rules, &spans),
            vec![("word".to_string(), 3, 5), ("word".to_string(), 6, 8)]
        );
        assert!(tag("aa", &rules, 1..1).is_empty());
    }

    fn depth(span: &Span) -> usize {
        let mut deepest = 0;
        span.walk(|_, depth| deepest = deepest.max(depth + 1));
        deepest
    }

    #[test]
    fn test_nesting_capped_at_max_depth() {
        let rules = RuleSet::builder("deep")
            .rule(RuleDef::region("paren", r"\(", r"\)", "P").contains(&["paren", "word"]))
            .rule(RuleDef::matching("word", r"\w+", "W").contained_only())
            .build()
            .unwrap();
        let text = format!("{}x{}", "(".repeat(50_000), ")".repeat(50_000));
        let spans = all(&text, &rules);
        assert_eq!(spans.len(), 1);
        assert_eq!(depth(&spans[0]), MAX_DEPTH + 1);

        // Parens past the cap are text; the closers match the open regions
        assert_eq!(spans[0].end, 50_000 + 1 + MAX_DEPTH);
    }

    #[test]
    fn test_deep_always_active_nesting() {
        let rules = RuleSet::builder("comments")
            .rule(RuleDef::region("comment", r"\(\*", r"\*\)", "C").contains(&["comment"]).always_active())
            .build()
            .unwrap();
        let text = "(*".repeat(200_000);
        let spans = all(&text, &rules);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].end, text.len());
        assert_eq!(depth(&spans[0]), MAX_DEPTH);
        drop(spans);
    }
}
