//! Annotation extractor
//!
//! Walks one file's tree-sitter tree and builds its [`ModuleIndex`]:
//! annotation records (class and method decorators), the module-scope class
//! table, import bindings and export declarations.
//!
//! The extractor never fails. An argument it cannot read produces a record
//! with an empty field map and a [`Malformed`] marker; properties it cannot
//! model are listed in [`AnnotationRecord::skipped`].

use crate::kind::{AnnotationKind, OwnerKind};
use crate::module::{ClassDecl, ImportBinding, ModuleIndex, ReExport};
use crate::record::{AnnotationRecord, Malformed};
use crate::value::{FieldMap, FieldValue, Literal, Property, SkipReason, SkippedProperty, Spanned};
use bml_syntax::{SourceFile, Span};
use std::sync::Arc;
use tree_sitter::Node;

/// Extract the annotation index of one parsed file
#[must_use]
pub fn extract_module(source: &SourceFile) -> ModuleIndex {
    let mut extractor = Extractor {
        source,
        index: ModuleIndex::new(source.id().clone()),
    };
    extractor.walk(source.tree().root_node());

    let index = extractor.index;
    tracing::debug!(
        file = %source.id(),
        records = index.records.len(),
        classes = index.classes.len(),
        imports = index.imports.len(),
        "extracted module"
    );
    index
}

/// Named children without comments
fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .any(|child| !child.is_named() && child.kind() == token)
}

/// Strip wrappers that do not change the value (`(x)`, `x as T`, `x satisfies T`, `x!`)
fn unwrap_expression(mut node: Node<'_>) -> Node<'_> {
    while matches!(
        node.kind(),
        "parenthesized_expression" | "as_expression" | "satisfies_expression" | "non_null_expression"
    ) {
        match named_children(node).first() {
            Some(inner) => node = *inner,
            None => break,
        }
    }
    node
}

fn is_module_scope(node: Node<'_>) -> bool {
    match node.parent() {
        Some(parent) if parent.kind() == "program" => true,
        Some(parent) if parent.kind() == "export_statement" => {
            parent.parent().is_some_and(|p| p.kind() == "program")
        }
        _ => false,
    }
}

struct Extractor<'a> {
    source: &'a SourceFile,
    index: ModuleIndex,
}

impl<'a> Extractor<'a> {
    fn text(&self, node: Node<'_>) -> &'a str {
        self.source.node_text(&node)
    }

    fn walk(&mut self, root: Node<'a>) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let top_level = node.parent().is_some_and(|p| p.kind() == "program");
            match node.kind() {
                "import_statement" if top_level => self.import(node),
                "export_statement" if top_level => self.export(node),
                "class_declaration" | "abstract_class_declaration" => self.class(node),
                // `export default class X {}` may parse as a class expression
                "class" if node.parent().is_some_and(|p| p.kind() == "export_statement") => {
                    self.class(node);
                }
                _ => {}
            }
            stack.extend(named_children(node).into_iter().rev());
        }
    }

    fn class(&mut self, node: Node<'a>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let class_name = self.text(name_node).to_string();
        let export = node.parent().filter(|p| p.kind() == "export_statement");

        let mut decl = is_module_scope(node).then(|| {
            ClassDecl::new(
                class_name.clone(),
                Span::of(&export.unwrap_or(node)),
                export.is_some(),
            )
        });
        if let (Some(export), Some(_)) = (export, &decl) {
            let exported = if has_token(export, "default") {
                "default".to_string()
            } else {
                class_name.clone()
            };
            self.index.exports.insert(exported, class_name.clone());
        }

        // decorators written before `export` belong to the export statement
        let decorators = export
            .map(named_children)
            .unwrap_or_default()
            .into_iter()
            .chain(named_children(node))
            .filter(|child| child.kind() == "decorator");
        for decorator in decorators {
            if let Some(record) = self.decorator(decorator, &class_name, None) {
                let record = Arc::new(record);
                if let Some(decl) = decl.as_mut() {
                    decl.push(Arc::clone(&record));
                }
                self.index.records.push(record);
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.methods(body, &class_name);
        }

        if let Some(decl) = decl {
            self.index.classes.entry(class_name).or_insert(decl);
        }
    }

    fn methods(&mut self, body: Node<'a>, class_name: &str) {
        let mut pending = Vec::new();
        for member in named_children(body) {
            match member.kind() {
                "decorator" => pending.push(member),
                "method_definition" | "method_signature" | "abstract_method_signature" => {
                    let method = member
                        .child_by_field_name("name")
                        .map(|name| self.property_key(name).unwrap_or_else(|| self.text(name).to_string()))
                        .unwrap_or_default();
                    let own = named_children(member)
                        .into_iter()
                        .filter(|child| child.kind() == "decorator");
                    let decorators: Vec<_> = pending.drain(..).chain(own).collect();
                    for decorator in decorators {
                        if let Some(record) = self.decorator(decorator, class_name, Some(&method)) {
                            self.index.records.push(Arc::new(record));
                        }
                    }
                }
                _ => pending.clear(),
            }
        }
    }

    fn decorator(
        &self,
        decorator: Node<'a>,
        class_name: &str,
        method: Option<&str>,
    ) -> Option<AnnotationRecord> {
        let expr = *named_children(decorator).first()?;
        let (callee, call) = match expr.kind() {
            "identifier" => (expr, None),
            "call_expression" => (expr.child_by_field_name("function")?, Some(expr)),
            _ => return None,
        };
        if callee.kind() != "identifier" {
            return None;
        }
        let kind = AnnotationKind::from_name(self.text(callee))?;

        let mut skipped = Vec::new();
        let (fields, args_span, malformed) = match call.and_then(|c| c.child_by_field_name("arguments")) {
            None => (FieldMap::new(), None, Some(Malformed::MissingArgument)),
            Some(args) if args.kind() != "arguments" => (
                FieldMap::new(),
                Some(Span::of(&args)),
                Some(Malformed::NotObjectLiteral {
                    found: args.kind().to_string(),
                }),
            ),
            Some(args) => {
                let args = named_children(args);
                match args.first().map(|first| unwrap_expression(*first)) {
                    None => (FieldMap::new(), None, Some(Malformed::MissingArgument)),
                    Some(first) if first.kind() == "object" => {
                        let fields = self.object(first, &mut skipped);
                        let extra = (args.len() > 1).then(|| Malformed::ExtraArguments {
                            count: args.len() - 1,
                        });
                        (fields, Some(Span::of(&first)), extra)
                    }
                    Some(first) => (
                        FieldMap::new(),
                        Some(Span::of(&first)),
                        Some(Malformed::NotObjectLiteral {
                            found: first.kind().to_string(),
                        }),
                    ),
                }
            }
        };

        if let Some(problem) = &malformed {
            tracing::debug!(
                file = %self.source.id(),
                class = class_name,
                kind = %kind,
                %problem,
                "malformed annotation"
            );
        }

        let owner = if method.is_some() {
            OwnerKind::Method
        } else {
            OwnerKind::Class
        };
        Some(AnnotationRecord::new(
            kind,
            owner,
            class_name.to_string(),
            method,
            self.source.id().clone(),
            Span::of(&decorator),
            args_span,
            fields,
            malformed,
            skipped,
        ))
    }

    fn object(&self, node: Node<'a>, skipped: &mut Vec<SkippedProperty>) -> FieldMap {
        let mut map = FieldMap::new();
        for child in named_children(node) {
            let span = Span::of(&child);
            let prop = match child.kind() {
                "pair" => {
                    let (Some(key_node), Some(value_node)) = (
                        child.child_by_field_name("key"),
                        child.child_by_field_name("value"),
                    ) else {
                        continue;
                    };
                    let Some(key) = self.property_key(key_node) else {
                        skipped.push(SkippedProperty {
                            reason: SkipReason::ComputedKey,
                            span,
                        });
                        continue;
                    };
                    Property {
                        key,
                        key_span: Span::of(&key_node),
                        span,
                        value: self.value(value_node, skipped),
                    }
                }
                "shorthand_property_identifier" => {
                    let name = self.text(child).to_string();
                    Property {
                        key: name.clone(),
                        key_span: span,
                        span,
                        value: Spanned::new(FieldValue::Reference(name), span),
                    }
                }
                "spread_element" => {
                    skipped.push(SkippedProperty {
                        reason: SkipReason::Spread,
                        span,
                    });
                    continue;
                }
                "method_definition" => {
                    skipped.push(SkippedProperty {
                        reason: SkipReason::Method,
                        span,
                    });
                    continue;
                }
                _ => continue,
            };

            if let Err(duplicate) = map.insert(prop) {
                skipped.push(SkippedProperty {
                    reason: SkipReason::DuplicateKey {
                        key: duplicate.key,
                    },
                    span: duplicate.span,
                });
            }
        }
        map
    }

    /// Static property name; `None` for computed keys
    fn property_key(&self, node: Node<'a>) -> Option<String> {
        match node.kind() {
            "string" => Some(self.string_contents(node)),
            "computed_property_name" => None,
            _ => Some(self.text(node).to_string()),
        }
    }

    fn value(&self, node: Node<'a>, skipped: &mut Vec<SkippedProperty>) -> Spanned<FieldValue> {
        let node = unwrap_expression(node);
        let span = Span::of(&node);
        let value = match node.kind() {
            "string" => FieldValue::Literal(Literal::String(self.string_contents(node))),
            "template_string" => {
                let dynamic = named_children(node)
                    .iter()
                    .any(|child| child.kind() == "template_substitution");
                if dynamic {
                    FieldValue::Opaque("template_string".to_string())
                } else {
                    FieldValue::Literal(Literal::String(self.string_contents(node)))
                }
            }
            "number" => match parse_number(self.text(node)) {
                Some(n) => FieldValue::Literal(Literal::Number(n)),
                None => FieldValue::Opaque("number".to_string()),
            },
            "true" => FieldValue::Literal(Literal::Bool(true)),
            "false" => FieldValue::Literal(Literal::Bool(false)),
            "null" => FieldValue::Literal(Literal::Null),
            "undefined" => FieldValue::Literal(Literal::Undefined),
            "identifier" => match self.text(node) {
                "undefined" => FieldValue::Literal(Literal::Undefined),
                name => FieldValue::Reference(name.to_string()),
            },
            "array" => {
                let mut items = Vec::new();
                for element in named_children(node) {
                    if element.kind() == "spread_element" {
                        skipped.push(SkippedProperty {
                            reason: SkipReason::Spread,
                            span: Span::of(&element),
                        });
                    } else {
                        items.push(self.value(element, skipped));
                    }
                }
                FieldValue::List(items)
            }
            "object" => FieldValue::Object(self.object(node, skipped)),
            "unary_expression" => self.signed_number(node),
            other => FieldValue::Opaque(other.to_string()),
        };
        Spanned::new(value, span)
    }

    /// `-5` / `+5`
    fn signed_number(&self, node: Node<'a>) -> FieldValue {
        let operator = node.child_by_field_name("operator").map(|op| self.text(op));
        let argument = node
            .child_by_field_name("argument")
            .map(unwrap_expression)
            .filter(|arg| arg.kind() == "number")
            .and_then(|arg| parse_number(self.text(arg)));

        match (operator, argument) {
            (Some("-"), Some(n)) => FieldValue::Literal(Literal::Number(-n)),
            (Some("+"), Some(n)) => FieldValue::Literal(Literal::Number(n)),
            _ => FieldValue::Opaque("unary_expression".to_string()),
        }
    }

    /// Contents of a string or template literal, escapes decoded
    fn string_contents(&self, node: Node<'a>) -> String {
        let raw = self.text(node);
        let inner = if raw.len() >= 2 {
            &raw[1..raw.len() - 1]
        } else {
            ""
        };
        unescape(inner)
    }

    fn import(&mut self, node: Node<'a>) {
        let Some(source) = node.child_by_field_name("source") else {
            return;
        };
        let specifier = self.string_contents(source);

        for clause in named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "import_clause")
        {
            for part in named_children(clause) {
                match part.kind() {
                    "identifier" => {
                        self.index.imports.insert(
                            self.text(part).to_string(),
                            ImportBinding::Default {
                                specifier: specifier.clone(),
                            },
                        );
                    }
                    "namespace_import" => {
                        if let Some(local) = named_children(part)
                            .into_iter()
                            .find(|n| n.kind() == "identifier")
                        {
                            self.index.imports.insert(
                                self.text(local).to_string(),
                                ImportBinding::Namespace {
                                    specifier: specifier.clone(),
                                },
                            );
                        }
                    }
                    "named_imports" => {
                        for spec in named_children(part)
                            .into_iter()
                            .filter(|n| n.kind() == "import_specifier")
                        {
                            let Some(name) = spec.child_by_field_name("name") else {
                                continue;
                            };
                            let imported = self.module_export_name(name);
                            let local = spec
                                .child_by_field_name("alias")
                                .map_or_else(|| imported.clone(), |alias| self.text(alias).to_string());
                            self.index.imports.insert(
                                local,
                                ImportBinding::Named {
                                    imported,
                                    specifier: specifier.clone(),
                                },
                            );
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn export(&mut self, node: Node<'a>) {
        let specifier = node
            .child_by_field_name("source")
            .map(|source| self.string_contents(source));

        if let Some(value) = node.child_by_field_name("value") {
            if value.kind() == "identifier" && has_token(node, "default") {
                self.index
                    .exports
                    .insert("default".to_string(), self.text(value).to_string());
            }
        }

        let mut listed = false;
        for child in named_children(node) {
            match child.kind() {
                "export_clause" => {
                    listed = true;
                    for spec in named_children(child)
                        .into_iter()
                        .filter(|n| n.kind() == "export_specifier")
                    {
                        let Some(name) = spec.child_by_field_name("name") else {
                            continue;
                        };
                        let local = self.module_export_name(name);
                        let exported = spec
                            .child_by_field_name("alias")
                            .map_or_else(|| local.clone(), |alias| self.module_export_name(alias));
                        match &specifier {
                            Some(specifier) => self.index.re_exports.push(ReExport::Named {
                                exported,
                                imported: local,
                                specifier: specifier.clone(),
                            }),
                            None => {
                                self.index.exports.insert(exported, local);
                            }
                        }
                    }
                }
                "namespace_export" => {
                    listed = true;
                    if let (Some(specifier), Some(name)) = (&specifier, named_children(child).first()) {
                        self.index.re_exports.push(ReExport::Namespace {
                            exported: self.module_export_name(*name),
                            specifier: specifier.clone(),
                        });
                    }
                }
                _ => {}
            }
        }

        if let Some(specifier) = specifier {
            if !listed && has_token(node, "*") {
                self.index.re_exports.push(ReExport::All { specifier });
            }
        }
    }

    fn module_export_name(&self, node: Node<'a>) -> String {
        if node.kind() == "string" {
            self.string_contents(node)
        } else {
            self.text(node).to_string()
        }
    }
}

/// Parse a JavaScript numeric literal
#[allow(clippy::cast_precision_loss)]
fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let cleaned = cleaned.strip_suffix('n').unwrap_or(&cleaned);
    let lower = cleaned.to_ascii_lowercase();

    let radix = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| lower.strip_prefix(prefix).map(|digits| (digits, radix)));
    match radix {
        Some((digits, radix)) => u64::from_str_radix(digits, radix).ok().map(|n| n as f64),
        None => lower.parse::<f64>().ok(),
    }
}

/// Decode JavaScript string escapes
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            // line continuation
            Some('\n') => {}
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if let Some(decoded) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(decoded);
                }
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                if let Some(decoded) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(decoded);
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
