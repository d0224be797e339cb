//! Rules for every annotation kind

use crate::finding::Diagnostic;
use crate::fix::{removal_range, TextEdit};
use crate::rule::Category::{BestPractice, Structural};
use crate::rule::{FixContext, Rule, RuleContext, UnresolvedPolicy};
use crate::schema::{self, FieldSpec, FieldType};
use crate::support;
use bml_model::{
    AnnotationKind, AnnotationRecord, FieldMap, FieldValue, Malformed, OwnerKind, SkipReason, Spanned,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

const ALL: &[AnnotationKind] = &AnnotationKind::ALL;

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record(
            "malformed-annotation",
            "Annotation takes exactly one object literal argument",
            Structural,
            ALL,
            malformed,
        )
        .accepting_malformed(),
        Rule::record("require-name", "Every annotation has a non-empty name", Structural, ALL, require_name),
        Rule::record(
            "no-unknown-fields",
            "Only fields the annotation defines are allowed",
            Structural,
            ALL,
            unknown_fields,
        )
        .with_fix(remove_property),
        Rule::record("field-type", "Field values have the declared shape", Structural, ALL, field_type),
        Rule::record(
            "no-dynamic-fields",
            "Field values are literals the analyzer can read",
            BestPractice,
            ALL,
            dynamic_fields,
        ),
        Rule::record("no-empty-lists", "List fields are not empty", BestPractice, ALL, empty_lists),
        Rule::record(
            "require-description",
            "Every annotation has a description",
            BestPractice,
            ALL,
            require_description,
        ),
        Rule::record(
            "no-unresolved-references",
            "Identifiers outside reference fields name annotated classes",
            BestPractice,
            ALL,
            unresolved_references,
        )
        .with_unresolved(UnresolvedPolicy::Warn),
        Rule::record(
            "prefer-reference-over-string",
            "Reference fields use class identifiers, not strings",
            BestPractice,
            ALL,
            string_references,
        )
        .with_fix(string_to_reference),
        Rule::record(
            "method-annotation-placement",
            "Class-only annotations are not used on methods",
            Structural,
            ALL,
            placement,
        ),
        Rule::graph(
            "no-duplicate-names",
            "Names are unique per annotation kind",
            Structural,
            ALL,
            duplicate_names,
        ),
        Rule::graph(
            "no-conflicting-kinds",
            "A class carries one kind of annotation, once",
            Structural,
            ALL,
            conflicting_kinds,
        ),
    ]
}

fn malformed(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if let Some(problem) = record.malformed() {
        let message_id = match problem {
            Malformed::ExtraArguments { .. } => "extraArguments",
            Malformed::MissingArgument | Malformed::NotObjectLiteral { .. } => "malformedArgument",
        };
        out.push(Diagnostic::on(
            record,
            record.args_span().unwrap_or(record.span()),
            message_id,
            format!("@{} on '{}' {problem}", record.kind(), record.owner_name()),
        ));
    }
    for skipped in record.skipped() {
        if let SkipReason::DuplicateKey { key } = &skipped.reason {
            out.push(Diagnostic::on(
                record,
                skipped.span,
                "duplicateKey",
                format!("'{key}' is defined more than once; only the first value is used"),
            ));
        }
    }
    out
}

fn require_name(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    match record.field("name") {
        None => vec![Diagnostic::on(
            record,
            record.span(),
            "missingName",
            format!("@{} on '{}' is missing 'name'", record.kind(), record.owner_name()),
        )],
        Some(prop) => match prop.value.value.as_str() {
            Some(name) if name.trim().is_empty() => vec![Diagnostic::on(
                record,
                prop.value.span,
                "emptyName",
                format!("@{} on '{}' has an empty name", record.kind(), record.owner_name()),
            )],
            _ => Vec::new(),
        },
    }
}

fn unknown_fields(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for prop in record.fields().iter() {
        match schema::field(record.kind(), &prop.key) {
            None => out.push(
                Diagnostic::on(
                    record,
                    prop.span,
                    "unknownField",
                    format!("'{}' is not a field of @{}", prop.key, record.kind()),
                )
                .with_fix(),
            ),
            Some(spec) => unknown_nested(record, spec, &prop.value, &mut out),
        }
    }
    out
}

fn unknown_nested(record: &AnnotationRecord, spec: &FieldSpec, value: &Spanned<FieldValue>, out: &mut Vec<Diagnostic>) {
    let check_map = |map: &FieldMap, specs: &'static [FieldSpec], out: &mut Vec<Diagnostic>| {
        for prop in map.iter() {
            match schema::nested(specs, &prop.key) {
                None => out.push(
                    Diagnostic::on(
                        record,
                        prop.span,
                        "unknownField",
                        format!("'{}' is not a field of '{}'", prop.key, spec.name),
                    )
                    .with_fix(),
                ),
                Some(inner) => unknown_nested(record, inner, &prop.value, out),
            }
        }
    };

    match (spec.ty, &value.value) {
        (FieldType::Object(specs), FieldValue::Object(map)) => check_map(map, specs, out),
        (FieldType::ObjectList(specs), FieldValue::List(items)) => {
            for item in items {
                if let FieldValue::Object(map) = &item.value {
                    check_map(map, specs, out);
                }
            }
        }
        _ => {}
    }
}

fn remove_property(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    Some(TextEdit::delete(removal_range(ctx.text, diagnostic.span.range)))
}

fn field_type(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for prop in record.fields().iter() {
        if let Some(spec) = schema::field(record.kind(), &prop.key) {
            type_errors(record, &prop.key, spec.ty, &prop.value, &mut out);
        }
    }
    out
}

fn type_errors(
    record: &AnnotationRecord,
    path: &str,
    ty: FieldType,
    value: &Spanned<FieldValue>,
    out: &mut Vec<Diagnostic>,
) {
    if value.value.is_nullish() || matches!(value.value, FieldValue::Opaque(_)) {
        return;
    }
    let mismatch = |out: &mut Vec<Diagnostic>, expected: &str, value: &Spanned<FieldValue>| {
        out.push(Diagnostic::on(
            record,
            value.span,
            "wrongType",
            format!("'{path}' should be {expected}, found {}", value.value.type_name()),
        ));
    };

    match ty {
        FieldType::Text | FieldType::Enum(_) | FieldType::Duration | FieldType::Date => {
            if value.value.as_str().is_none() {
                mismatch(out, ty.describe(), value);
            }
        }
        FieldType::Number => {
            if value.value.as_number().is_none() {
                mismatch(out, ty.describe(), value);
            }
        }
        FieldType::Bool => {
            if value.value.as_bool().is_none() {
                mismatch(out, ty.describe(), value);
            }
        }
        FieldType::Ref(_) => {
            if !matches!(value.value, FieldValue::Reference(_)) && value.value.as_str().is_none() {
                mismatch(out, ty.describe(), value);
            }
        }
        FieldType::TextList | FieldType::RefList(_) | FieldType::ObjectList(_) => {
            let Some(items) = value.value.as_list() else {
                mismatch(out, ty.describe(), value);
                return;
            };
            let element = match ty {
                FieldType::TextList => FieldType::Text,
                FieldType::RefList(kinds) => FieldType::Ref(kinds),
                FieldType::ObjectList(specs) => FieldType::Object(specs),
                _ => FieldType::Any,
            };
            for (idx, item) in items.iter().enumerate() {
                type_errors(record, &format!("{path}[{idx}]"), element, item, out);
            }
        }
        FieldType::Object(specs) => {
            let Some(map) = value.value.as_object() else {
                mismatch(out, ty.describe(), value);
                return;
            };
            for prop in map.iter() {
                if let Some(inner) = schema::nested(specs, &prop.key) {
                    type_errors(record, &format!("{path}.{}", prop.key), inner.ty, &prop.value, out);
                }
            }
        }
        FieldType::NumberMap => {
            if value.value.as_object().is_none() {
                mismatch(out, ty.describe(), value);
            }
        }
        FieldType::Triggers => {
            if value.value.as_list().is_none() {
                mismatch(out, ty.describe(), value);
            }
        }
        FieldType::Any => {}
    }
}

fn dynamic_fields(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut out: Vec<Diagnostic> = record
        .skipped()
        .iter()
        .filter_map(|skipped| {
            let what = match &skipped.reason {
                SkipReason::Spread => "spread element",
                SkipReason::ComputedKey => "computed key",
                SkipReason::Method => "method",
                SkipReason::DuplicateKey { .. } => return None,
            };
            Some(Diagnostic::on(
                record,
                skipped.span,
                "dynamicField",
                format!("{what} in @{} cannot be checked statically", record.kind()),
            ))
        })
        .collect();

    support::visit_values(record.fields(), &mut |value| {
        if let FieldValue::Opaque(kind) = &value.value {
            out.push(Diagnostic::on(
                record,
                value.span,
                "opaqueValue",
                format!("{} value cannot be checked statically; use a literal", kind.replace('_', " ")),
            ));
        }
    });
    out
}

fn empty_lists(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    record
        .fields()
        .iter()
        .filter(|prop| matches!(prop.value.value.as_list(), Some([])))
        .filter(|prop| !schema::REQUIRED_LISTS.contains(&(record.kind(), prop.key.as_str())))
        .map(|prop| {
            Diagnostic::on(
                record,
                prop.value.span,
                "emptyList",
                format!("'{}' is an empty list; remove it or add entries", prop.key),
            )
        })
        .collect()
}

fn require_description(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    support::require_text(record, "description", "missingDescription")
}

fn unresolved_references(record: &AnnotationRecord, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for prop in record.fields().iter() {
        if schema::field(record.kind(), &prop.key).is_some_and(|spec| spec.ty.is_reference()) {
            continue;
        }
        support::visit_property(&prop.value, &mut |value| {
            let Some(name) = value.value.as_reference() else {
                return;
            };
            if let Some(reason) = ctx.resolve(name, record.source_file()).reason() {
                let message = format!("'{name}' in '{}' cannot be resolved: {reason}", prop.key);
                out.extend(support::unresolved(record, ctx, value.span, message));
            }
        });
    }
    out
}

fn string_references(record: &AnnotationRecord, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for prop in record.fields().iter() {
        let (kinds, values): (&[AnnotationKind], Vec<&Spanned<FieldValue>>) =
            match (schema::field(record.kind(), &prop.key).map(|s| s.ty), &prop.value.value) {
                (Some(FieldType::Ref(kinds)), _) => (kinds, vec![&prop.value]),
                (Some(FieldType::RefList(kinds)), FieldValue::List(items)) => (kinds, items.iter().collect()),
                _ => continue,
            };

        for value in values {
            let Some(text) = value.value.as_str() else {
                continue;
            };
            let resolved = ctx.resolve(text, record.source_file());
            let fixable = kinds.iter().any(|kind| resolved.has_kind(*kind));
            let diagnostic = Diagnostic::on(
                record,
                value.span,
                "stringReference",
                if fixable {
                    format!("'{}' should reference the class {text} instead of the string '{text}'", prop.key)
                } else {
                    format!(
                        "'{}' should reference a {} class, not the string '{text}'",
                        prop.key,
                        support::kinds_label(kinds)
                    )
                },
            );
            out.push(if fixable { diagnostic.with_fix() } else { diagnostic });
        }
    }
    out
}

fn string_to_reference(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    let inner = support::string_contents_range(ctx, diagnostic.span.range)?;
    let identifier = ctx.slice(inner)?;
    let valid = identifier
        .chars()
        .enumerate()
        .all(|(i, c)| c == '_' || c == '$' || c.is_alphabetic() || (i > 0 && c.is_alphanumeric()));
    (valid && !identifier.is_empty()).then(|| TextEdit::replace(diagnostic.span.range, identifier))
}

fn placement(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    if record.owner() == OwnerKind::Method && !record.kind().allows_methods() {
        return vec![Diagnostic::on(
            record,
            record.span(),
            "methodNotAllowed",
            format!(
                "@{} cannot annotate method '{}'; it applies to classes only",
                record.kind(),
                record.owner_name()
            ),
        )];
    }
    Vec::new()
}

fn duplicate_names(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut groups: BTreeMap<(AnnotationKind, &str), Vec<&Arc<AnnotationRecord>>> = BTreeMap::new();
    for record in ctx.records().iter() {
        if let Some(name) = record.name().map(str::trim).filter(|n| !n.is_empty()) {
            groups.entry((record.kind(), name)).or_default().push(record);
        }
    }

    let mut out = Vec::new();
    for ((kind, name), records) in groups {
        let Some((first, rest)) = records.split_first() else {
            continue;
        };
        for record in rest {
            let span = record.field("name").map_or(record.span(), |p| p.value.span);
            out.push(Diagnostic::on(
                record,
                span,
                "duplicateName",
                format!(
                    "{kind} name '{name}' is already used by '{}' ({})",
                    first.owner_name(),
                    first.source_file()
                ),
            ));
        }
    }
    out
}

fn conflicting_kinds(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut classes: BTreeMap<(&bml_syntax::FileId, &str), Vec<&Arc<AnnotationRecord>>> = BTreeMap::new();
    for record in ctx.records().iter().filter(|r| r.owner() == OwnerKind::Class) {
        classes
            .entry((record.source_file(), record.class_name()))
            .or_default()
            .push(record);
    }

    let mut out = Vec::new();
    for ((_, class), records) in classes {
        let mut seen = BTreeSet::new();
        let mut first_kind: Option<AnnotationKind> = None;
        for record in records {
            let kind = record.kind();
            if !seen.insert(kind) {
                out.push(Diagnostic::on(
                    record,
                    record.span(),
                    "repeatedAnnotation",
                    format!("class '{class}' is annotated with @{kind} more than once"),
                ));
                continue;
            }
            match first_kind {
                None => first_kind = Some(kind),
                Some(first) => out.push(Diagnostic::on(
                    record,
                    record.span(),
                    "conflictingKinds",
                    format!("class '{class}' is annotated as both {first} and {kind}"),
                )),
            }
        }
    }
    out
}
