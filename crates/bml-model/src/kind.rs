//! Annotation kinds
//!
//! The analyzer only understands its own vocabulary: the thirteen decorator
//! names below. Any other decorator is ignored during extraction.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Recognized annotation names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    /// Long-term direction of the business
    Strategy,
    /// Bounded context / business domain
    Context,
    /// User archetype
    Persona,
    /// Party with an interest in the system
    Stakeholder,
    /// End-to-end flow through actions
    Journey,
    /// Single step performed by an actor
    Action,
    /// Measurable expectation on an action
    Expectation,
    /// Exchange between two stakeholders
    Interaction,
    /// Given/when/then behavior of an expectation
    Behavior,
    /// Evidence that a behavior holds
    Witness,
    /// Group of stakeholders working together
    Collaboration,
    /// Tracked quantity with thresholds
    Metric,
    /// Funded initiative with budget and timeline
    BusinessInitiative,
}

impl AnnotationKind {
    /// All kinds, in declaration order
    pub const ALL: [AnnotationKind; 13] = [
        AnnotationKind::Strategy,
        AnnotationKind::Context,
        AnnotationKind::Persona,
        AnnotationKind::Stakeholder,
        AnnotationKind::Journey,
        AnnotationKind::Action,
        AnnotationKind::Expectation,
        AnnotationKind::Interaction,
        AnnotationKind::Behavior,
        AnnotationKind::Witness,
        AnnotationKind::Collaboration,
        AnnotationKind::Metric,
        AnnotationKind::BusinessInitiative,
    ];

    /// Decorator name as written in source
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Strategy => "Strategy",
            AnnotationKind::Context => "Context",
            AnnotationKind::Persona => "Persona",
            AnnotationKind::Stakeholder => "Stakeholder",
            AnnotationKind::Journey => "Journey",
            AnnotationKind::Action => "Action",
            AnnotationKind::Expectation => "Expectation",
            AnnotationKind::Interaction => "Interaction",
            AnnotationKind::Behavior => "Behavior",
            AnnotationKind::Witness => "Witness",
            AnnotationKind::Collaboration => "Collaboration",
            AnnotationKind::Metric => "Metric",
            AnnotationKind::BusinessInitiative => "BusinessInitiative",
        }
    }

    /// Look up a kind by exact decorator name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether the annotation may be applied to methods as well as classes
    #[inline]
    #[must_use]
    pub const fn allows_methods(&self) -> bool {
        matches!(
            self,
            AnnotationKind::Action
                | AnnotationKind::Expectation
                | AnnotationKind::Interaction
                | AnnotationKind::Behavior
                | AnnotationKind::Witness
        )
    }
}

impl Display for AnnotationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnnotationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown annotation kind: {s}"))
    }
}

/// What an annotation is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    /// Class declaration
    Class,
    /// Method inside a class body
    Method,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in AnnotationKind::ALL {
            assert_eq!(AnnotationKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(AnnotationKind::from_name("persona"), None);
        assert_eq!(AnnotationKind::from_name("Injectable"), None);
    }

    #[test]
    fn method_annotatable_kinds() {
        let methods: Vec<_> = AnnotationKind::ALL
            .into_iter()
            .filter(AnnotationKind::allows_methods)
            .collect();
        assert_eq!(methods.len(), 5);
        assert!(!AnnotationKind::Persona.allows_methods());
        assert!(AnnotationKind::Witness.allows_methods());
    }

    #[test]
    fn parse_from_str() {
        assert_eq!("Metric".parse::<AnnotationKind>(), Ok(AnnotationKind::Metric));
        assert!("Unknown".parse::<AnnotationKind>().is_err());
    }
}
