//! Severity levels

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Configured severity of a rule (and reported severity of a finding)
///
/// Ordered `Off < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Rule disabled; never invoked
    Off,
    /// Reported, does not fail the run
    Warn,
    /// Reported, fails the run
    Error,
}

impl Severity {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Off => "off",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }

    /// Check if the rule runs at this severity
    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Severity::Off)
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" | "0" => Ok(Severity::Off),
            "warn" | "warning" | "1" => Ok(Severity::Warn),
            "error" | "2" => Ok(Severity::Error),
            other => Err(ConfigError::InvalidSeverity(other.to_string())),
        }
    }
}
