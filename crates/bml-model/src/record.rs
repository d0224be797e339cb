//! Annotation records
//!
//! An [`AnnotationRecord`] is created once per extraction pass and shared as
//! `Arc<AnnotationRecord>`; nothing mutates it afterwards.

use crate::kind::{AnnotationKind, OwnerKind};
use crate::value::{FieldMap, FieldValue, Property, SkippedProperty};
use bml_syntax::{FileId, Span};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Why an annotation's argument could not be read as an object literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "camelCase")]
pub enum Malformed {
    /// `@Persona` or `@Persona()`
    MissingArgument,
    /// `@Persona('Ann')`; `found` is the syntax node kind
    NotObjectLiteral {
        /// Node kind of the argument
        found: String,
    },
    /// `@Persona({ ... }, extra)`
    ExtraArguments {
        /// Number of arguments after the first
        count: usize,
    },
}

impl Display for Malformed {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Malformed::MissingArgument => f.write_str("expects a single object literal argument"),
            Malformed::NotObjectLiteral { found } => {
                write!(f, "expects an object literal argument, found {found}")
            }
            Malformed::ExtraArguments { count } => {
                write!(f, "takes a single argument, {count} extra ignored")
            }
        }
    }
}

/// One recognized annotation application
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationRecord {
    kind: AnnotationKind,
    owner_name: String,
    owner: OwnerKind,
    class_name: String,
    source_file: FileId,
    span: Span,
    args_span: Option<Span>,
    fields: FieldMap,
    malformed: Option<Malformed>,
    skipped: Vec<SkippedProperty>,
}

impl AnnotationRecord {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        kind: AnnotationKind,
        owner: OwnerKind,
        class_name: String,
        method_name: Option<&str>,
        source_file: FileId,
        span: Span,
        args_span: Option<Span>,
        fields: FieldMap,
        malformed: Option<Malformed>,
        skipped: Vec<SkippedProperty>,
    ) -> Self {
        let owner_name = match method_name {
            Some(method) => format!("{class_name}.{method}"),
            None => class_name.clone(),
        };
        Self {
            kind,
            owner_name,
            owner,
            class_name,
            source_file,
            span,
            args_span,
            fields,
            malformed,
            skipped,
        }
    }

    /// Annotation kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    /// Annotated class name, or `Class.method`
    #[inline]
    #[must_use]
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// Class or method
    #[inline]
    #[must_use]
    pub fn owner(&self) -> OwnerKind {
        self.owner
    }

    /// Name of the class the annotation is in
    #[inline]
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// File the record was extracted from
    #[inline]
    #[must_use]
    pub fn source_file(&self) -> &FileId {
        &self.source_file
    }

    /// Span of the whole decorator
    #[inline]
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Span of the argument object, if there is one
    #[inline]
    #[must_use]
    pub fn args_span(&self) -> Option<Span> {
        self.args_span
    }

    /// Fields of the argument object
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Property by key
    #[inline]
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Property> {
        self.fields.get(key)
    }

    /// Field value by key
    #[inline]
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.fields.value(key)
    }

    /// Declared `name` field
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.fields.str("name")
    }

    /// Malformation marker
    #[inline]
    #[must_use]
    pub fn malformed(&self) -> Option<&Malformed> {
        self.malformed.as_ref()
    }

    /// Check if the argument could not be read (fields are empty)
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self.malformed,
            Some(Malformed::MissingArgument | Malformed::NotObjectLiteral { .. })
        )
    }

    /// Properties left out of the field map
    #[inline]
    #[must_use]
    pub fn skipped(&self) -> &[SkippedProperty] {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(method: Option<&str>, malformed: Option<Malformed>) -> AnnotationRecord {
        AnnotationRecord::new(
            AnnotationKind::Action,
            if method.is_some() { OwnerKind::Method } else { OwnerKind::Class },
            "Checkout".into(),
            method,
            FileId::new("a.ts"),
            Span::default(),
            None,
            FieldMap::new(),
            malformed,
            Vec::new(),
        )
    }

    #[test]
    fn owner_name_includes_method() {
        assert_eq!(record(None, None).owner_name(), "Checkout");
        assert_eq!(record(Some("pay"), None).owner_name(), "Checkout.pay");
        assert_eq!(record(Some("pay"), None).class_name(), "Checkout");
    }

    #[test]
    fn extra_arguments_keep_fields_readable() {
        assert!(record(None, Some(Malformed::MissingArgument)).is_malformed());
        assert!(!record(None, Some(Malformed::ExtraArguments { count: 1 })).is_malformed());
        assert_eq!(
            Malformed::NotObjectLiteral { found: "string".into() }.to_string(),
            "expects an object literal argument, found string"
        );
    }
}
