//! Rule sets
//!
//! A [`RuleSet`] is the validated, read-only collection of rules for one
//! dialect together with its category link table. Build one with
//! [`RuleSet::builder`] or load it from a TOML definition.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::category::{BaseStyle, LinkTable};
use super::rules::{CategoryId, Rule, RuleDef, RuleId, RuleKind};
use crate::error::{Result, TagError};

/// A validated, immutable set of rules for one dialect
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    rules: Vec<Rule>,
    by_name: HashMap<String, RuleId>,
    /// Rules allowed outside any region, in declaration order
    top_level: Vec<RuleId>,
    always_active: Vec<RuleId>,
    categories: Vec<String>,
    links: LinkTable,
}

/// Collects rule definitions and links before validation
pub struct RuleSetBuilder {
    name: String,
    defs: Vec<RuleDef>,
    links: LinkTable,
}

impl RuleSetBuilder {
    /// Add a rule. Declaration order is priority order.
    pub fn rule(mut self, def: RuleDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Link a category to a base style
    pub fn link(mut self, category: &str, style: BaseStyle) -> Self {
        self.links.link(category, style);
        self
    }

    /// Validate and compile the rules
    pub fn build(self) -> Result<RuleSet> {
        let mut by_name = HashMap::new();
        for (idx, def) in self.defs.iter().enumerate() {
            if by_name.insert(def.name.clone(), RuleId(idx)).is_some() {
                return Err(TagError::DuplicateRule(def.name.clone()));
            }
        }

        let resolve = |def: &RuleDef, names: &[String]| -> Result<Vec<RuleId>> {
            names
                .iter()
                .map(|reference| {
                    by_name.get(reference).copied().ok_or_else(|| TagError::UnknownRule {
                        rule: def.name.clone(),
                        reference: reference.clone(),
                    })
                })
                .collect()
        };

        let mut categories: Vec<String> = Vec::new();
        let mut intern = |name: &str| -> CategoryId {
            match categories.iter().position(|c| c == name) {
                Some(idx) => CategoryId(idx),
                None => {
                    categories.push(name.to_string());
                    CategoryId(categories.len() - 1)
                }
            }
        };

        let mut rules = Vec::with_capacity(self.defs.len());
        for (idx, def) in self.defs.iter().enumerate() {
            let patterns = def.compile_patterns()?;
            let kind = if patterns.end.is_some() {
                RuleKind::Region
            } else {
                RuleKind::Match
            };
            rules.push(Rule {
                id: RuleId(idx),
                name: def.name.clone(),
                kind,
                start: patterns.start,
                end: patterns.end,
                skip: patterns.skip,
                category: intern(def.category_name()),
                delimiter: def.delimiter.as_deref().map(&mut intern),
                contains: resolve(def, &def.contains)?,
                contained_only: def.contained_only,
                keep_end: def.keep_end,
                extend: def.extend,
                always_active: def.always_active,
                close_nested: def.close_nested,
            });
        }

        let top_level = rules.iter().filter(|r| !r.contained_only).map(|r| r.id).collect();
        let always_active = rules.iter().filter(|r| r.always_active).map(|r| r.id).collect();

        debug!(dialect = %self.name, rules = rules.len(), "built rule set");

        Ok(RuleSet {
            name: self.name,
            rules,
            by_name,
            top_level,
            always_active,
            categories,
            links: self.links,
        })
    }
}

/// On-disk shape of a dialect definition
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSetFile {
    name: String,
    #[serde(default, rename = "rule")]
    rules: Vec<RuleDef>,
    #[serde(default)]
    links: BTreeMap<String, String>,
}

impl RuleSet {
    /// Start building a rule set for the named dialect
    pub fn builder(name: &str) -> RuleSetBuilder {
        RuleSetBuilder {
            name: name.to_string(),
            defs: Vec::new(),
            links: LinkTable::new(),
        }
    }

    /// Parse a TOML dialect definition
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: RuleSetFile = toml::from_str(contents)?;
        let mut builder = Self::builder(&file.name);
        for def in file.rules {
            builder = builder.rule(def);
        }
        for (category, style) in &file.links {
            let style = BaseStyle::from_name(style)
                .ok_or_else(|| TagError::UnknownStyle(style.clone()))?;
            builder = builder.link(category, style);
        }
        builder.build()
    }

    /// Load a TOML dialect definition from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Dialect name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.0]
    }

    /// Look up a rule by name
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.by_name.get(name).map(|id| self.rule(*id))
    }

    pub fn top_level(&self) -> &[RuleId] {
        &self.top_level
    }

    pub fn always_active(&self) -> &[RuleId] {
        &self.always_active
    }

    pub fn category_name(&self, id: CategoryId) -> &str {
        &self.categories[id.0]
    }

    /// Resolve a category through the link table
    pub fn style_of(&self, id: CategoryId) -> Option<BaseStyle> {
        self.links.resolve(self.category_name(id))
    }

    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    /// Retarget a category to a different base style
    pub fn relink(&mut self, category: &str, style: BaseStyle) {
        self.links.link(category, style);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
