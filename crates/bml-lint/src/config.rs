//! Lint configuration
//!
//! `bml-lint.toml`:
//!
//! ```toml
//! profile = "recommended"   # or "all"
//! fix = false
//!
//! [rules]
//! "persona-require-goals" = "off"
//! ```
//!
//! A [`LintConfig`] becomes a [`SeverityTable`] once checked against the
//! registry; every configuration error surfaces there, before analysis.

use crate::error::ConfigError;
use crate::profile::{self, Profile, PROFILE_TABLE};
use crate::registry::RuleRegistry;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Default config file name
pub const CONFIG_FILE: &str = "bml-lint.toml";

/// User configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    /// Base profile
    pub profile: Profile,
    /// Attach fixes to findings
    pub fix: bool,
    /// Per-rule overrides
    pub rules: BTreeMap<String, Severity>,
}

impl LintConfig {
    /// Create default configuration (`recommended`, no fixes, no overrides)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on invalid TOML or unknown keys
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: CONFIG_FILE.into(),
            message: e.to_string(),
        })
    }

    /// Load from a file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if unreadable, [`ConfigError::Parse`] if invalid
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), profile = %config.profile, overrides = config.rules.len(), "loaded config");
        Ok(config)
    }

    /// With profile
    #[inline]
    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// With fixes enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    /// With a rule override
    #[inline]
    #[must_use]
    pub fn with_rule(mut self, id: impl Into<String>, severity: Severity) -> Self {
        self.rules.insert(id.into(), severity);
        self
    }

    /// With a `rule-id=severity` override, as given on the command line
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidOverride`] or [`ConfigError::InvalidSeverity`]
    pub fn with_override(self, spec: &str) -> Result<Self, ConfigError> {
        let (id, severity) = spec
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidOverride(spec.to_string()))?;
        let id = id.trim();
        if id.is_empty() {
            return Err(ConfigError::InvalidOverride(spec.to_string()));
        }
        Ok(self.with_rule(id, severity.trim().parse()?))
    }

    /// Resolve against the registry
    ///
    /// # Errors
    /// Returns error if the profile table drifted from the registry or an
    /// override names an unknown rule
    pub fn severity_table(&self, registry: &RuleRegistry) -> Result<SeverityTable, ConfigError> {
        SeverityTable::from_profile(registry, self.profile, &self.rules)
    }
}

/// Effective severity of every registered rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityTable {
    severities: HashMap<&'static str, Severity>,
}

impl SeverityTable {
    /// Profile severities plus overrides
    ///
    /// # Errors
    /// Returns error if the profile table does not cover the registry exactly,
    /// or an override names an unregistered rule
    pub fn from_profile(
        registry: &RuleRegistry,
        profile: Profile,
        overrides: &BTreeMap<String, Severity>,
    ) -> Result<Self, ConfigError> {
        profile::validate(registry, PROFILE_TABLE)?;

        let mut severities: HashMap<&'static str, Severity> = PROFILE_TABLE
            .iter()
            .map(|entry| (entry.0, profile::severity(entry, profile)))
            .collect();
        for (id, severity) in overrides {
            let rule = registry
                .get(id)
                .ok_or_else(|| ConfigError::UnknownRule(id.clone()))?;
            severities.insert(rule.id, *severity);
        }
        Ok(Self { severities })
    }

    /// Explicit map covering every rule, no profile
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownRule`] for unregistered ids and
    /// [`ConfigError::UnmappedRule`] for rules the map leaves out
    pub fn from_map(registry: &RuleRegistry, map: &BTreeMap<String, Severity>) -> Result<Self, ConfigError> {
        let mut severities = HashMap::with_capacity(map.len());
        for (id, severity) in map {
            let rule = registry
                .get(id)
                .ok_or_else(|| ConfigError::UnknownRule(id.clone()))?;
            severities.insert(rule.id, *severity);
        }
        if let Some(rule) = registry.iter().find(|rule| !severities.contains_key(rule.id)) {
            return Err(ConfigError::UnmappedRule(rule.id.to_string()));
        }
        Ok(Self { severities })
    }

    /// Severity of a rule (`off` for unknown ids)
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Severity {
        self.severities.get(id).copied().unwrap_or(Severity::Off)
    }

    /// Number of enabled rules
    #[must_use]
    pub fn enabled(&self) -> usize {
        self.severities.values().filter(|s| s.is_enabled()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_toml() {
        let config = LintConfig::from_toml_str(
            "profile = \"all\"\nfix = true\n[rules]\n\"persona-require-goals\" = \"off\"\n",
        )
        .unwrap();
        assert_eq!(
            config,
            LintConfig::new()
                .with_profile(Profile::All)
                .with_fix(true)
                .with_rule("persona-require-goals", Severity::Off)
        );
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(LintConfig::from_toml_str("").unwrap(), LintConfig::default());
    }

    #[test]
    fn rejects_unknown_keys_and_values() {
        assert!(matches!(
            LintConfig::from_toml_str("profiel = \"all\""),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            LintConfig::from_toml_str("profile = \"strict\""),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn overrides_apply_on_top_of_profile() {
        let registry = RuleRegistry::builtin().unwrap();
        let table = LintConfig::new()
            .with_rule("persona-require-pain-points", Severity::Error)
            .with_rule("require-name", Severity::Off)
            .severity_table(&registry)
            .unwrap();
        assert_eq!(table.get("persona-require-pain-points"), Severity::Error);
        assert_eq!(table.get("require-name"), Severity::Off);
        assert_eq!(table.get("journey-require-outcomes"), Severity::Warn);
        assert_eq!(table.enabled(), registry.len() - 1);
    }

    #[test]
    fn unknown_override_is_fatal() {
        let registry = RuleRegistry::builtin().unwrap();
        let err = LintConfig::new()
            .with_rule("persona-require-hobbies", Severity::Warn)
            .severity_table(&registry)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRule(id) if id == "persona-require-hobbies"));
    }

    #[test]
    fn command_line_overrides() {
        let config = LintConfig::new().with_override("require-name = warn").unwrap();
        assert_eq!(config.rules.get("require-name"), Some(&Severity::Warn));
        assert!(matches!(
            LintConfig::new().with_override("require-name"),
            Err(ConfigError::InvalidOverride(_))
        ));
        assert!(matches!(
            LintConfig::new().with_override("require-name=loud"),
            Err(ConfigError::InvalidSeverity(_))
        ));
    }

    #[test]
    fn explicit_map_must_cover_registry() {
        let registry = RuleRegistry::builtin().unwrap();
        let mut map: BTreeMap<String, Severity> = registry
            .iter()
            .map(|rule| (rule.id.to_string(), Severity::Warn))
            .collect();
        assert!(SeverityTable::from_map(&registry, &map).is_ok());

        map.remove("require-name");
        assert!(matches!(
            SeverityTable::from_map(&registry, &map),
            Err(ConfigError::UnmappedRule(id)) if id == "require-name"
        ));
    }
}
