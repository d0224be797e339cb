//! Rule registry
//!
//! One flat table of every rule, built at startup and never changed
//! afterwards. Ids are unique; lookups are by id.

use crate::error::ConfigError;
use crate::rule::Rule;
use std::collections::HashMap;

/// Registered rules, in registration order
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
    by_id: HashMap<&'static str, usize>,
}

impl RuleRegistry {
    /// Create a registry from a rule table
    ///
    /// # Errors
    /// Returns [`ConfigError::DuplicateRule`] if two rules share an id
    pub fn new(rules: Vec<Rule>) -> Result<Self, ConfigError> {
        let mut by_id = HashMap::with_capacity(rules.len());
        for (idx, rule) in rules.iter().enumerate() {
            if by_id.insert(rule.id, idx).is_some() {
                return Err(ConfigError::DuplicateRule(rule.id.to_string()));
            }
        }
        Ok(Self { rules, by_id })
    }

    /// Registry with every built-in rule
    ///
    /// # Errors
    /// Returns error if the built-in table repeats an id
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(crate::rules::all())
    }

    /// Rule by id
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.by_id.get(id).map(|idx| &self.rules[*idx])
    }

    /// Check if a rule is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Iterate rules in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
