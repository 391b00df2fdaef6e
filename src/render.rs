//! Terminal output for tagged text
//!
//! Two views: the text re-emitted with ANSI styles, and a span tree dump
//! with `line:column` positions.

use std::io::{self, Write};

use crossterm::style::{Attribute, Color as TermColor, ContentStyle};
use unicode_width::UnicodeWidthStr;

use crate::syntax::{flatten, floor_boundary, Color, RuleSet, Span, Style, Theme};

/// Maps byte offsets to 1-based line and display column
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, line_starts }
    }

    /// 1-based (line, column); columns count display cells
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let start = self.line_starts[line];
        let column = self.text.get(start..offset).map_or(0, UnicodeWidthStr::width);
        (line + 1, column + 1)
    }
}

fn term_color(color: Color) -> Option<TermColor> {
    Some(match color {
        Color::Default => return None,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::White => TermColor::Grey,
        Color::BrightBlack => TermColor::DarkGrey,
        Color::BrightRed => TermColor::Red,
        Color::BrightGreen => TermColor::Green,
        Color::BrightYellow => TermColor::Yellow,
        Color::BrightBlue => TermColor::Blue,
        Color::BrightMagenta => TermColor::Magenta,
        Color::BrightCyan => TermColor::Cyan,
        Color::BrightWhite => TermColor::White,
    })
}

fn content_style(style: Style) -> ContentStyle {
    let mut content = ContentStyle::new();
    content.foreground_color = term_color(style.fg);
    content.background_color = term_color(style.bg);
    if style.bold {
        content.attributes.set(Attribute::Bold);
    }
    if style.italic {
        content.attributes.set(Attribute::Italic);
    }
    content
}

/// Write `text[range]` with the styles of its tagged segments
///
/// The range is clamped to the text and to character boundaries.
pub fn render_ansi<W: Write>(
    out: &mut W,
    text: &str,
    spans: &[Span],
    rules: &RuleSet,
    theme: &Theme,
    range: std::ops::Range<usize>,
) -> io::Result<()> {
    let end = floor_boundary(text, range.end);
    let start = floor_boundary(text, range.start.min(end));
    for segment in flatten(spans, start..end) {
        let piece = &text[segment.range()];
        let style = segment
            .category
            .and_then(|category| rules.style_of(category))
            .map(|base| theme.style(base))
            .unwrap_or_default();
        if style.is_default() {
            out.write_all(piece.as_bytes())?;
        } else {
            write!(out, "{}", content_style(style).apply(piece))?;
        }
    }
    Ok(())
}

/// Write the span tree, one span per line
pub fn dump<W: Write>(out: &mut W, text: &str, spans: &[Span], rules: &RuleSet) -> io::Result<()> {
    let index = LineIndex::new(text);
    let mut nodes = Vec::new();
    for span in spans {
        span.walk(|span, depth| nodes.push((span, depth)));
    }

    for (span, depth) in nodes {
        let (start_line, start_col) = index.position(span.start);
        let (end_line, end_col) = index.position(span.end);
        let style = rules.style_of(span.category).map_or("-", |style| style.name());
        writeln!(
            out,
            "{:indent$}{} [{} -> {}] {}:{}-{}:{} {:?}",
            "",
            rules.rule(span.rule).name,
            rules.category_name(span.category),
            style,
            start_line,
            start_col,
            end_line,
            end_col,
            &text[span.range()],
            indent = depth * 2,
        )?;
    }
    Ok(())
}
