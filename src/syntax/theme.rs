//! Concrete styles for base styles
//!
//! The tagger only deals in categories. A [`Theme`] is the host-side
//! answer to "what does a Keyword look like"; the renderer uses it.

use std::collections::HashMap;

use super::category::BaseStyle;

/// Terminal colors (ANSI 16-color palette for compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub italic: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Highlighted on a background, for messages that must stand out
    pub fn on(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Default look of each base style
pub fn default_style(style: BaseStyle) -> Style {
    match style {
        BaseStyle::Normal => Style::default(),
        BaseStyle::Comment => Style::fg(Color::BrightBlack).italic(),
        BaseStyle::String => Style::fg(Color::Green),
        BaseStyle::Keyword => Style::fg(Color::Magenta).bold(),
        BaseStyle::Identifier => Style::fg(Color::Blue),
        BaseStyle::Type => Style::fg(Color::Yellow),
        BaseStyle::Constant => Style::fg(Color::BrightRed),
        BaseStyle::Special => Style::fg(Color::BrightCyan),
        BaseStyle::Delimiter => Style::fg(Color::BrightWhite),
        BaseStyle::Error => Style::fg(Color::White).on(Color::Red).bold(),
        BaseStyle::Todo => Style::fg(Color::Black).on(Color::Yellow),
    }
}

/// Base style -> concrete style, with overrides
#[derive(Debug, Clone, Default)]
pub struct Theme {
    overrides: HashMap<BaseStyle, Style>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the look of one base style
    pub fn set(&mut self, base: BaseStyle, style: Style) {
        self.overrides.insert(base, style);
    }

    pub fn style(&self, base: BaseStyle) -> Style {
        self.overrides.get(&base).copied().unwrap_or_else(|| default_style(base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_styles_not_empty() {
        assert!(!default_style(BaseStyle::Comment).is_default());
        assert!(!default_style(BaseStyle::Error).is_default());
        assert!(default_style(BaseStyle::Normal).is_default());
    }

    #[test]
    fn test_theme_override() {
        let mut theme = Theme::new();
        assert_eq!(theme.style(BaseStyle::String), default_style(BaseStyle::String));
        theme.set(BaseStyle::String, Style::fg(Color::Cyan).bold());
        assert_eq!(theme.style(BaseStyle::String).fg, Color::Cyan);
        assert!(theme.style(BaseStyle::String).bold);
        assert_eq!(theme.style(BaseStyle::Error).bg, Color::Red);
    }
}
