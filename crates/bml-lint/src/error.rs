//! Configuration errors
//!
//! These are the only errors that stop analysis. They are detected before
//! any file is analyzed: the rule set and its configuration have drifted.

use std::path::PathBuf;

/// Fatal configuration problems
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Two registered rules share an id
    #[error("rule '{0}' is registered twice")]
    DuplicateRule(String),

    /// A registered rule has no entry in the profile table (or explicit map)
    #[error("rule '{0}' has no severity mapping")]
    UnmappedRule(String),

    /// The profile table names a rule twice
    #[error("rule '{0}' appears more than once in the profile table")]
    DuplicateMapping(String),

    /// A severity map (profile table or override) names an unregistered rule
    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    /// Profile name is not `recommended` or `all`
    #[error("unknown profile '{0}' (expected 'recommended' or 'all')")]
    UnknownProfile(String),

    /// Severity string is not `off`, `warn` or `error`
    #[error("invalid severity '{0}' (expected 'off', 'warn' or 'error')")]
    InvalidSeverity(String),

    /// `--rule` override not written as `id=severity`
    #[error("invalid rule override '{0}' (expected 'rule-id=severity')")]
    InvalidOverride(String),

    /// Config file could not be parsed
    #[error("invalid config {path}: {message}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_rule() {
        assert_eq!(
            ConfigError::UnmappedRule("persona-require-goals".into()).to_string(),
            "rule 'persona-require-goals' has no severity mapping"
        );
        assert!(ConfigError::UnknownProfile("strict".into())
            .to_string()
            .contains("strict"));
    }
}
