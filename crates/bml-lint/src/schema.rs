//! Field schemas per annotation kind
//!
//! Mirrors the option types of the annotation definitions: which keys each
//! annotation accepts and what shape their values have. Generic rules
//! (`no-unknown-fields`, `field-type`) read these tables; kind-specific rules
//! check the values.

use bml_model::AnnotationKind;

use AnnotationKind as K;

/// Expected shape of a field value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldType {
    /// String
    Text,
    /// Number
    Number,
    /// Boolean
    Bool,
    /// Array of strings
    TextList,
    /// Identifier of a class annotated with one of the kinds
    Ref(&'static [AnnotationKind]),
    /// Array of such identifiers
    RefList(&'static [AnnotationKind]),
    /// String from a fixed set
    Enum(&'static [&'static str]),
    /// Duration string (`250ms`, `2h`)
    Duration,
    /// `YYYY-MM-DD` string
    Date,
    /// Nested object with known keys
    Object(&'static [FieldSpec]),
    /// Array of such objects
    ObjectList(&'static [FieldSpec]),
    /// Object with arbitrary keys and numeric values
    NumberMap,
    /// Action triggers: identifiers or `{ action, condition }` objects
    Triggers,
    /// Shape checked by a dedicated rule
    Any,
}

impl FieldType {
    /// Short description for messages
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            FieldType::Text | FieldType::Enum(_) | FieldType::Duration | FieldType::Date => "a string",
            FieldType::Number => "a number",
            FieldType::Bool => "a boolean",
            FieldType::TextList => "an array of strings",
            FieldType::Ref(_) => "a class reference",
            FieldType::RefList(_) => "an array of class references",
            FieldType::Object(_) | FieldType::NumberMap => "an object",
            FieldType::ObjectList(_) => "an array of objects",
            FieldType::Triggers => "an array of triggers",
            FieldType::Any => "a value",
        }
    }

    /// Check if this field holds class references
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            FieldType::Ref(_) | FieldType::RefList(_) | FieldType::Triggers
        )
    }
}

/// One accepted key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Key
    pub name: &'static str,
    /// Value shape
    pub ty: FieldType,
}

const fn f(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec { name, ty }
}

/// Stakeholder or Persona
pub const PEOPLE: &[AnnotationKind] = &[K::Stakeholder, K::Persona];

/// Allowed `Strategy.timeHorizon`
pub const TIME_HORIZONS: &[&str] = &["short", "medium", "long"];
/// Allowed low/medium/high levels
pub const LEVELS: &[&str] = &["low", "medium", "high"];
/// Allowed `Expectation.priority`
pub const PRIORITIES: &[&str] = &["must", "should", "could", "wont"];
/// Allowed `Interaction.channel`
pub const CHANNELS: &[&str] = &["web", "mobile", "email", "phone", "api", "in-person", "chat"];
/// Allowed `Witness.kind`
pub const WITNESS_KINDS: &[&str] = &["unit", "integration", "e2e", "manual", "monitor"];
/// Allowed `Metric.direction`
pub const DIRECTIONS: &[&str] = &["higherIsBetter", "lowerIsBetter"];
/// Allowed `Metric.frequency`
pub const FREQUENCIES: &[&str] = &["realtime", "hourly", "daily", "weekly", "monthly", "quarterly"];
/// Allowed `BusinessInitiative.status`
pub const STATUSES: &[&str] = &["proposed", "approved", "active", "completed", "cancelled"];
/// Allowed `BusinessInitiative.priority`
pub const INITIATIVE_PRIORITIES: &[&str] = &["low", "medium", "high", "critical"];

const COMMON: &[FieldSpec] = &[
    f("name", FieldType::Text),
    f("description", FieldType::Text),
    f("tags", FieldType::TextList),
];

const LATENCY: &[FieldSpec] = &[
    f("p50", FieldType::Number),
    f("p95", FieldType::Number),
    f("p99", FieldType::Number),
    f("max", FieldType::Number),
];

const STRATEGY: &[FieldSpec] = &[
    f("vision", FieldType::Text),
    f("mission", FieldType::Text),
    f("objectives", FieldType::TextList),
    f("principles", FieldType::TextList),
    f("timeHorizon", FieldType::Enum(TIME_HORIZONS)),
    f("initiatives", FieldType::RefList(&[K::BusinessInitiative])),
];

const CONTEXT: &[FieldSpec] = &[
    f("domain", FieldType::Text),
    f("subdomains", FieldType::TextList),
    f("owner", FieldType::Ref(&[K::Stakeholder])),
    f("strategy", FieldType::Ref(&[K::Strategy])),
    f("boundaries", FieldType::TextList),
];

const PERSONA: &[FieldSpec] = &[
    f("role", FieldType::Text),
    f("goals", FieldType::TextList),
    f("painPoints", FieldType::TextList),
    f("behaviors", FieldType::TextList),
    f("techSavviness", FieldType::Enum(LEVELS)),
    f(
        "ageRange",
        FieldType::Object(&[f("min", FieldType::Number), f("max", FieldType::Number)]),
    ),
    f("quote", FieldType::Text),
];

const STAKEHOLDER: &[FieldSpec] = &[
    f("role", FieldType::Text),
    f("persona", FieldType::Ref(&[K::Persona])),
    f("influence", FieldType::Enum(LEVELS)),
    f("interest", FieldType::Enum(LEVELS)),
    f("responsibilities", FieldType::TextList),
    f("context", FieldType::Ref(&[K::Context])),
];

const JOURNEY: &[FieldSpec] = &[
    f("primaryStakeholder", FieldType::Ref(PEOPLE)),
    f("secondaryStakeholders", FieldType::RefList(PEOPLE)),
    f("entryAction", FieldType::Ref(&[K::Action])),
    f("actions", FieldType::RefList(&[K::Action])),
    f("outcomes", FieldType::TextList),
    f("metrics", FieldType::RefList(&[K::Metric])),
    f("estimatedDuration", FieldType::Duration),
];

const ACTION: &[FieldSpec] = &[
    f("actor", FieldType::Ref(PEOPLE)),
    f("triggers", FieldType::Triggers),
    f("preconditions", FieldType::TextList),
    f("postconditions", FieldType::TextList),
    f("expectations", FieldType::RefList(&[K::Expectation])),
    f("timeout", FieldType::Duration),
    f(
        "retry",
        FieldType::Object(&[f("maxAttempts", FieldType::Number), f("backoff", FieldType::Duration)]),
    ),
];

const EXPECTATION: &[FieldSpec] = &[
    f("priority", FieldType::Enum(PRIORITIES)),
    f("criteria", FieldType::TextList),
    f("metric", FieldType::Ref(&[K::Metric])),
    f("action", FieldType::Ref(&[K::Action])),
    f("latency", FieldType::Object(LATENCY)),
    f("availability", FieldType::Number),
    f("given", FieldType::Text),
    f("when", FieldType::Text),
    f("then", FieldType::Text),
];

const INTERACTION: &[FieldSpec] = &[
    f("from", FieldType::Ref(PEOPLE)),
    f("to", FieldType::Ref(PEOPLE)),
    f("action", FieldType::Ref(&[K::Action])),
    f("channel", FieldType::Enum(CHANNELS)),
    f("frequency", FieldType::Text),
    f("latency", FieldType::Object(LATENCY)),
];

const BEHAVIOR: &[FieldSpec] = &[
    f("expectation", FieldType::Ref(&[K::Expectation])),
    f("given", FieldType::Text),
    f("when", FieldType::Text),
    f("then", FieldType::Text),
];

const WITNESS: &[FieldSpec] = &[
    f("behavior", FieldType::Ref(&[K::Behavior])),
    f("kind", FieldType::Enum(WITNESS_KINDS)),
    f("evidence", FieldType::Text),
    f("timeout", FieldType::Duration),
];

const COLLABORATION: &[FieldSpec] = &[
    f("participants", FieldType::RefList(PEOPLE)),
    f("purpose", FieldType::Text),
    f("protocol", FieldType::Text),
    f("cadence", FieldType::Text),
];

const METRIC: &[FieldSpec] = &[
    f("unit", FieldType::Text),
    f("target", FieldType::Number),
    f("baseline", FieldType::Any),
    f(
        "thresholds",
        FieldType::Object(&[
            f("healthy", FieldType::Number),
            f("warning", FieldType::Number),
            f("critical", FieldType::Number),
        ]),
    ),
    f("direction", FieldType::Enum(DIRECTIONS)),
    f("frequency", FieldType::Enum(FREQUENCIES)),
    f("owner", FieldType::Ref(&[K::Stakeholder])),
    f("formula", FieldType::Text),
];

const INITIATIVE: &[FieldSpec] = &[
    f("owner", FieldType::Ref(&[K::Stakeholder])),
    f("strategy", FieldType::Ref(&[K::Strategy])),
    f("budget", FieldType::Number),
    f("budgetBreakdown", FieldType::NumberMap),
    f("currency", FieldType::Text),
    f(
        "timeline",
        FieldType::Object(&[f("start", FieldType::Date), f("end", FieldType::Date)]),
    ),
    f(
        "milestones",
        FieldType::ObjectList(&[f("name", FieldType::Text), f("date", FieldType::Date)]),
    ),
    f("metrics", FieldType::RefList(&[K::Metric])),
    f("status", FieldType::Enum(STATUSES)),
    f("priority", FieldType::Enum(INITIATIVE_PRIORITIES)),
];

/// List fields whose emptiness a kind-specific rule already reports
pub const REQUIRED_LISTS: &[(AnnotationKind, &str)] = &[
    (K::Strategy, "objectives"),
    (K::Persona, "goals"),
    (K::Persona, "painPoints"),
    (K::Journey, "outcomes"),
    (K::Expectation, "criteria"),
    (K::Collaboration, "participants"),
    (K::BusinessInitiative, "metrics"),
];

/// Kind-specific fields (excluding `name`, `description`, `tags`)
#[must_use]
pub fn kind_fields(kind: AnnotationKind) -> &'static [FieldSpec] {
    match kind {
        K::Strategy => STRATEGY,
        K::Context => CONTEXT,
        K::Persona => PERSONA,
        K::Stakeholder => STAKEHOLDER,
        K::Journey => JOURNEY,
        K::Action => ACTION,
        K::Expectation => EXPECTATION,
        K::Interaction => INTERACTION,
        K::Behavior => BEHAVIOR,
        K::Witness => WITNESS,
        K::Collaboration => COLLABORATION,
        K::Metric => METRIC,
        K::BusinessInitiative => INITIATIVE,
    }
}

/// Spec of a top-level field, if the kind accepts it
#[must_use]
pub fn field(kind: AnnotationKind, name: &str) -> Option<&'static FieldSpec> {
    COMMON
        .iter()
        .chain(kind_fields(kind))
        .find(|spec| spec.name == name)
}

/// Spec of a key inside a nested object schema
#[must_use]
pub fn nested(specs: &'static [FieldSpec], name: &str) -> Option<&'static FieldSpec> {
    specs.iter().find(|spec| spec.name == name)
}

/// All accepted top-level keys of a kind, for messages
#[must_use]
pub fn field_names(kind: AnnotationKind) -> Vec<&'static str> {
    COMMON
        .iter()
        .chain(kind_fields(kind))
        .map(|spec| spec.name)
        .collect()
}
