//! Severity profiles
//!
//! Both profiles are one flat table: rule id → (recommended, all). The table
//! is data, not logic; [`validate`] checks it against the registry at startup
//! so a rule added without a mapping (or a mapping left behind for a removed
//! rule) stops the run before any file is read.

use crate::error::ConfigError;
use crate::registry::RuleRegistry;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use Severity::{Error as E, Warn as W};

/// Named severity preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Structural rules `error`, best-practice rules `warn`
    #[default]
    Recommended,
    /// Every rule `error`
    All,
}

impl Profile {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Profile::Recommended => "recommended",
            Profile::All => "all",
        }
    }
}

impl Display for Profile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recommended" => Ok(Profile::Recommended),
            "all" => Ok(Profile::All),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }
}

/// `(rule id, recommended, all)`
pub type ProfileEntry = (&'static str, Severity, Severity);

/// Severity of every built-in rule under each profile
pub const PROFILE_TABLE: &[ProfileEntry] = &[
    // generic
    ("malformed-annotation", E, E),
    ("require-name", E, E),
    ("no-unknown-fields", E, E),
    ("field-type", E, E),
    ("no-dynamic-fields", W, E),
    ("no-empty-lists", W, E),
    ("require-description", W, E),
    ("no-unresolved-references", W, E),
    ("prefer-reference-over-string", W, E),
    ("method-annotation-placement", E, E),
    ("no-duplicate-names", E, E),
    ("no-conflicting-kinds", E, E),
    // strategy
    ("strategy-require-vision", E, E),
    ("strategy-require-objectives", E, E),
    ("strategy-valid-time-horizon", E, E),
    ("strategy-initiatives-reference", E, E),
    // context
    ("context-require-domain", E, E),
    ("context-owner-reference", E, E),
    ("context-strategy-reference", E, E),
    // persona
    ("persona-require-goals", E, E),
    ("persona-require-pain-points", W, E),
    ("persona-valid-tech-savviness", E, E),
    ("persona-age-range-order", E, E),
    // stakeholder
    ("stakeholder-require-role", E, E),
    ("stakeholder-persona-reference", E, E),
    ("stakeholder-valid-influence", E, E),
    ("stakeholder-valid-interest", E, E),
    ("stakeholder-context-reference", W, E),
    // journey
    ("journey-require-primary-stakeholder", E, E),
    ("journey-primary-stakeholder-reference", E, E),
    ("journey-secondary-stakeholders-reference", E, E),
    ("journey-no-duplicate-stakeholders", W, E),
    ("journey-actions-reference", E, E),
    ("journey-entry-action-reference", E, E),
    ("journey-entry-action-in-actions", W, E),
    ("journey-require-outcomes", W, E),
    ("journey-metrics-reference", E, E),
    ("journey-duration-format", E, E),
    ("journey-duration-realistic", W, E),
    // action
    ("action-actor-reference", E, E),
    ("action-triggers-shape", E, E),
    ("action-trigger-condition-non-empty", W, E),
    ("action-expectations-reference", E, E),
    ("action-timeout-format", E, E),
    ("action-timeout-realistic", W, E),
    ("action-retry-bounds", E, E),
    ("action-no-trigger-cycles", E, E),
    ("action-unreachable", W, E),
    // expectation
    ("expectation-valid-priority", E, E),
    ("expectation-require-criteria", W, E),
    ("expectation-metric-reference", E, E),
    ("expectation-action-reference", E, E),
    ("expectation-latency-percentile-order", E, E),
    ("expectation-latency-realistic", W, E),
    ("expectation-availability-range", E, E),
    // interaction
    ("interaction-from-reference", E, E),
    ("interaction-to-reference", E, E),
    ("interaction-no-self-interaction", E, E),
    ("interaction-action-reference", E, E),
    ("interaction-valid-channel", E, E),
    ("interaction-latency-percentile-order", E, E),
    // behavior
    ("behavior-expectation-reference", E, E),
    ("behavior-require-given-when-then", E, E),
    ("behavior-witnessed", W, E),
    // witness
    ("witness-behavior-reference", E, E),
    ("witness-valid-kind", E, E),
    ("witness-require-evidence", W, E),
    ("witness-timeout-format", E, E),
    ("witness-timeout-realistic", W, E),
    // collaboration
    ("collaboration-min-participants", E, E),
    ("collaboration-participants-reference", E, E),
    ("collaboration-no-duplicate-participants", W, E),
    ("collaboration-require-purpose", W, E),
    // metric
    ("metric-require-unit", E, E),
    ("metric-valid-direction", E, E),
    ("metric-threshold-order", E, E),
    ("metric-target-within-healthy", W, E),
    ("metric-valid-frequency", E, E),
    ("metric-owner-reference", W, E),
    ("metric-baseline-numeric", E, E),
    // business initiative
    ("initiative-budget-positive", E, E),
    ("initiative-budget-reconciliation", E, E),
    ("initiative-timeline-order", E, E),
    ("initiative-milestones-within-timeline", W, E),
    ("initiative-milestones-order", W, E),
    ("initiative-owner-reference", E, E),
    ("initiative-strategy-reference", E, E),
    ("initiative-metrics-reference", E, E),
    ("initiative-valid-status", E, E),
    ("initiative-valid-currency", E, E),
    ("initiative-require-metrics", W, E),
];

/// Check a profile table against the registry
///
/// # Errors
/// - [`ConfigError::DuplicateMapping`] if an id appears twice
/// - [`ConfigError::UnknownRule`] if an id is not registered
/// - [`ConfigError::UnmappedRule`] if a registered rule is missing
pub fn validate(registry: &RuleRegistry, table: &[ProfileEntry]) -> Result<(), ConfigError> {
    let mut mapped = HashSet::with_capacity(table.len());
    for (id, _, _) in table {
        if !mapped.insert(*id) {
            return Err(ConfigError::DuplicateMapping((*id).to_string()));
        }
        if !registry.contains(id) {
            return Err(ConfigError::UnknownRule((*id).to_string()));
        }
    }
    if let Some(rule) = registry.iter().find(|rule| !mapped.contains(rule.id)) {
        return Err(ConfigError::UnmappedRule(rule.id.to_string()));
    }
    Ok(())
}

/// Severity of `entry` under `profile`
#[inline]
#[must_use]
pub fn severity(entry: &ProfileEntry, profile: Profile) -> Severity {
    match profile {
        Profile::Recommended => entry.1,
        Profile::All => entry.2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Category;

    #[test]
    fn table_covers_every_builtin_rule_once() {
        let registry = RuleRegistry::builtin().unwrap();
        validate(&registry, PROFILE_TABLE).unwrap();
        assert_eq!(PROFILE_TABLE.len(), registry.len());
    }

    #[test]
    fn recommended_follows_category_and_all_is_error() {
        let registry = RuleRegistry::builtin().unwrap();
        for entry in PROFILE_TABLE {
            let rule = registry.get(entry.0).unwrap();
            let expected = match rule.category {
                Category::Structural => Severity::Error,
                Category::BestPractice => Severity::Warn,
            };
            assert_eq!(severity(entry, Profile::Recommended), expected, "{}", entry.0);
            assert_eq!(severity(entry, Profile::All), Severity::Error, "{}", entry.0);
        }
    }

    #[test]
    fn drifted_tables_are_rejected() {
        let registry = RuleRegistry::builtin().unwrap();

        let missing = &PROFILE_TABLE[1..];
        assert!(matches!(
            validate(&registry, missing),
            Err(ConfigError::UnmappedRule(id)) if id == "malformed-annotation"
        ));

        let mut unknown = PROFILE_TABLE.to_vec();
        unknown.push(("persona-require-hobbies", E, E));
        assert!(matches!(validate(&registry, &unknown), Err(ConfigError::UnknownRule(_))));

        let mut repeated = PROFILE_TABLE.to_vec();
        repeated.push(PROFILE_TABLE[0]);
        assert!(matches!(validate(&registry, &repeated), Err(ConfigError::DuplicateMapping(_))));
    }

    #[test]
    fn profile_names() {
        assert_eq!("all".parse::<Profile>().unwrap(), Profile::All);
        assert!(matches!("strict".parse::<Profile>(), Err(ConfigError::UnknownProfile(_))));
    }
}
