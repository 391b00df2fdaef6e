//! Configuration file support
//!
//! Loads settings from ~/.regiontag.toml (or %USERPROFILE%\.regiontag.toml
//! on Windows)
//!
//! Example:
//! ```text
//! # regiontag configuration
//! enabled = true
//! nested-comments = false
//! rules = "/home/me/.config/regiontag/ltac.toml"
//!
//! [links]
//! coqThmName = "Type"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, TagError};
use crate::syntax::{self, BaseStyle, CoqInfoOptions, RuleSet};

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Process-wide tagging switch
    pub enabled: bool,
    /// Whether coq-info comments nest
    pub nested_comments: bool,
    /// Extra dialect definition to load
    pub rules: Option<PathBuf>,
    /// Category -> base style overrides
    pub links: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            nested_comments: true,
            rules: None,
            links: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".regiontag.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".regiontag.toml"))
        }
    }

    /// Load configuration from the default path; defaults if there is no file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = Self::parse(&contents)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Options for the built-in coq-info dialect
    pub fn coq_info_options(&self) -> CoqInfoOptions {
        CoqInfoOptions {
            nested_comments: self.nested_comments,
        }
    }

    /// Apply the `[links]` overrides to a rule set
    pub fn apply_links(&self, rules: &mut RuleSet) -> Result<()> {
        for (category, style) in &self.links {
            let style = BaseStyle::from_name(style)
                .ok_or_else(|| TagError::UnknownStyle(style.clone()))?;
            rules.relink(category, style);
        }
        Ok(())
    }

    /// Apply process-wide settings
    pub fn apply_global(&self) {
        syntax::set_enabled(self.enabled);
    }
}
