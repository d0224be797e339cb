//! Field values built from annotation argument objects
//!
//! Conversion is structural: the extractor never evaluates expressions. What
//! it cannot model (calls, arrow functions, member access) is kept as
//! [`FieldValue::Opaque`] with the syntax node kind, so rules can still say
//! what they found.

use bml_syntax::Span;
use indexmap::IndexMap;
use serde::Serialize;

/// Primitive literal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Literal {
    /// String or substitution-free template string
    String(String),
    /// Numeric literal (negation folded in)
    Number(f64),
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,
    /// `undefined`
    Undefined,
}

impl Literal {
    /// Type name used in messages
    #[inline]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Number(_) => "number",
            Literal::Bool(_) => "boolean",
            Literal::Null => "null",
            Literal::Undefined => "undefined",
        }
    }
}

/// A value together with the source span it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spanned<T> {
    /// The value
    pub value: T,
    /// Where it was written
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Wrap a value
    #[inline]
    #[must_use]
    pub const fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

/// Structured value of one annotation field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    /// Primitive literal
    Literal(Literal),
    /// Array literal
    List(Vec<Spanned<FieldValue>>),
    /// Nested object literal
    Object(FieldMap),
    /// Bare identifier, to be resolved to an annotated class
    Reference(String),
    /// Unmodelled expression; holds the syntax node kind
    Opaque(String),
}

impl FieldValue {
    /// String contents, if this is a string literal
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Literal(Literal::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Number, if this is a numeric literal
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Literal(Literal::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Boolean, if this is a boolean literal
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Literal(Literal::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Identifier, if this is a reference
    #[inline]
    #[must_use]
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            FieldValue::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// Elements, if this is a list
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Spanned<FieldValue>]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Properties, if this is an object
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&FieldMap> {
        match self {
            FieldValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Check for `null` / `undefined`
    #[inline]
    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(
            self,
            FieldValue::Literal(Literal::Null | Literal::Undefined)
        )
    }

    /// Short type description used in messages (`string`, `array`, `reference`, ...)
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            FieldValue::Literal(lit) => lit.type_name(),
            FieldValue::List(_) => "array",
            FieldValue::Object(_) => "object",
            FieldValue::Reference(_) => "reference",
            FieldValue::Opaque(kind) => kind,
        }
    }
}

/// One `key: value` pair of an argument object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    /// Property name
    pub key: String,
    /// Span of the key
    pub key_span: Span,
    /// Span of the whole pair (key through value)
    pub span: Span,
    /// Converted value
    pub value: Spanned<FieldValue>,
}

/// Why a property was left out of a [`FieldMap`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum SkipReason {
    /// `...other`
    Spread,
    /// `[key]: value`
    ComputedKey,
    /// `name() {}` inside the object
    Method,
    /// Key already defined earlier in the same object
    DuplicateKey {
        /// The repeated key
        key: String,
    },
}

/// A property whose value is unknown to the analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedProperty {
    /// Why it was skipped
    #[serde(flatten)]
    pub reason: SkipReason,
    /// Where it was written
    pub span: Span,
}

/// Ordered property map of an object literal
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct FieldMap {
    props: IndexMap<String, Property>,
}

impl FieldMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property; returns it back if the key is already present
    pub(crate) fn insert(&mut self, prop: Property) -> Result<(), Property> {
        if self.props.contains_key(&prop.key) {
            return Err(prop);
        }
        self.props.insert(prop.key.clone(), prop);
        Ok(())
    }

    /// Property by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Property> {
        self.props.get(key)
    }

    /// Value by key
    #[inline]
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.props.get(key).map(|p| &p.value.value)
    }

    /// String value by key
    #[inline]
    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(FieldValue::as_str)
    }

    /// Numeric value by key
    #[inline]
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.value(key).and_then(FieldValue::as_number)
    }

    /// List value by key
    #[inline]
    #[must_use]
    pub fn list(&self, key: &str) -> Option<&[Spanned<FieldValue>]> {
        self.value(key).and_then(FieldValue::as_list)
    }

    /// Object value by key
    #[inline]
    #[must_use]
    pub fn object(&self, key: &str) -> Option<&FieldMap> {
        self.value(key).and_then(FieldValue::as_object)
    }

    /// Check if key is present
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    /// Iterate properties in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.props.values()
    }

    /// Keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }

    /// Number of properties
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}
