//! Display categories and the category link table
//!
//! Rules name a category (e.g. `coqThmName`); the link table maps each
//! category onto one of a small fixed set of base styles. Hosts decide
//! what a base style looks like.

use std::collections::HashMap;

/// Symbolic base styles a category can link to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseStyle {
    /// Plain text (linked, but no special treatment)
    Normal,
    /// Comments
    Comment,
    /// String literals
    String,
    /// Keywords and commands
    Keyword,
    /// Names being introduced
    Identifier,
    /// Types and statements
    Type,
    /// Constants
    Constant,
    /// Special messages and markers
    Special,
    /// Delimiters
    Delimiter,
    /// Errors
    Error,
    /// TODO/FIXME markers, warnings
    Todo,
}

impl BaseStyle {
    /// All base styles, in declaration order
    pub const ALL: [BaseStyle; 11] = [
        BaseStyle::Normal,
        BaseStyle::Comment,
        BaseStyle::String,
        BaseStyle::Keyword,
        BaseStyle::Identifier,
        BaseStyle::Type,
        BaseStyle::Constant,
        BaseStyle::Special,
        BaseStyle::Delimiter,
        BaseStyle::Error,
        BaseStyle::Todo,
    ];

    /// Get a human-readable name for this base style
    pub fn name(&self) -> &'static str {
        match self {
            BaseStyle::Normal => "Normal",
            BaseStyle::Comment => "Comment",
            BaseStyle::String => "String",
            BaseStyle::Keyword => "Keyword",
            BaseStyle::Identifier => "Identifier",
            BaseStyle::Type => "Type",
            BaseStyle::Constant => "Constant",
            BaseStyle::Special => "Special",
            BaseStyle::Delimiter => "Delimiter",
            BaseStyle::Error => "Error",
            BaseStyle::Todo => "Todo",
        }
    }

    /// Parse a base style from its name (for TOML loading)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.name() == name)
    }
}

/// Category name -> base style mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTable {
    links: HashMap<String, BaseStyle>,
}

impl LinkTable {
    /// Create an empty link table
    pub fn new() -> Self {
        Self::default()
    }

    /// Link a category to a base style, replacing any previous link
    pub fn link(&mut self, category: &str, style: BaseStyle) {
        self.links.insert(category.to_string(), style);
    }

    /// Builder form of [`LinkTable::link`]
    pub fn with(mut self, category: &str, style: BaseStyle) -> Self {
        self.link(category, style);
        self
    }

    /// Resolve a category. Unlinked categories get the host default.
    pub fn resolve(&self, category: &str) -> Option<BaseStyle> {
        self.links.get(category).copied()
    }

    /// Number of linked categories
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterate over (category, style) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, BaseStyle)> {
        self.links.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
