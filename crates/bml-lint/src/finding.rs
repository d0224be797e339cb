//! Diagnostics and findings
//!
//! A rule's `check` returns [`Diagnostic`]s: where, what, and whether a fix is
//! available. The analyzer turns each into a [`Finding`] by stamping on the
//! rule id and the configured severity.

use crate::fix::TextEdit;
use crate::severity::Severity;
use bml_model::AnnotationRecord;
use bml_syntax::{FileId, Span, TextRange};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// One problem reported by a rule, before severity is applied
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// File the problem is in
    pub file: FileId,
    /// Offending source region
    pub span: Span,
    /// Stable message identifier (`wrongKind`, `triggerCycle`, ...)
    pub message_id: &'static str,
    /// Human-readable message
    pub message: String,
    /// The originating rule can compute a fix for this diagnostic
    pub fixable: bool,
    /// Cap on the reported severity (e.g. unresolved references under a
    /// warn-only policy)
    pub max_severity: Option<Severity>,
}

impl Diagnostic {
    /// Create a diagnostic in `file`
    #[must_use]
    pub fn new(file: &FileId, span: Span, message_id: &'static str, message: impl Into<String>) -> Self {
        Self {
            file: file.clone(),
            span,
            message_id,
            message: message.into(),
            fixable: false,
            max_severity: None,
        }
    }

    /// Create a diagnostic in the record's file
    #[inline]
    #[must_use]
    pub fn on(
        record: &AnnotationRecord,
        span: Span,
        message_id: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::new(record.source_file(), span, message_id, message)
    }

    /// Mark as fixable
    #[inline]
    #[must_use]
    pub fn with_fix(mut self) -> Self {
        self.fixable = true;
        self
    }

    /// Cap the reported severity
    #[inline]
    #[must_use]
    pub fn at_most(mut self, severity: Severity) -> Self {
        self.max_severity = Some(severity);
        self
    }
}

/// A reported rule violation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Rule that produced it
    pub rule_id: &'static str,
    /// Stable message identifier
    pub message_id: &'static str,
    /// Reported severity (`warn` or `error`)
    pub severity: Severity,
    /// File
    pub file: FileId,
    /// Byte range
    pub range: TextRange,
    /// Start line (1-based)
    pub line: usize,
    /// Start column (1-based)
    pub column: usize,
    /// Message
    pub message: String,
    /// The rule offers a fix
    pub fix_offered: bool,
    /// The fix, when fixes were requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<TextEdit>,
}

impl Finding {
    pub(crate) fn from_diagnostic(rule_id: &'static str, severity: Severity, diagnostic: Diagnostic) -> Self {
        let severity = diagnostic
            .max_severity
            .map_or(severity, |cap| severity.min(cap));
        Self {
            rule_id,
            message_id: diagnostic.message_id,
            severity,
            file: diagnostic.file,
            range: diagnostic.span.range,
            line: diagnostic.span.start.line,
            column: diagnostic.span.start.column,
            message: diagnostic.message,
            fix_offered: diagnostic.fixable,
            fix: None,
        }
    }

    /// Check if this finding fails the run
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} {} [{}]",
            self.file, self.line, self.column, self.severity, self.message, self.rule_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bml_syntax::Position;

    fn span() -> Span {
        Span {
            range: TextRange::new(10, 20),
            start: Position { line: 2, column: 5 },
            end: Position { line: 2, column: 15 },
        }
    }

    #[test]
    fn severity_is_capped() {
        let diagnostic = Diagnostic::new(&FileId::new("a.ts"), span(), "unresolvedReference", "x")
            .at_most(Severity::Warn);
        let finding = Finding::from_diagnostic("context-owner-reference", Severity::Error, diagnostic);
        assert_eq!(finding.severity, Severity::Warn);
        assert!(!finding.is_error());
    }

    #[test]
    fn display_is_compiler_style() {
        let diagnostic = Diagnostic::new(&FileId::new("src/a.ts"), span(), "missingName", "missing name");
        let finding = Finding::from_diagnostic("require-name", Severity::Error, diagnostic);
        assert_eq!(finding.to_string(), "src/a.ts:2:5: error missing name [require-name]");
    }

    #[test]
    fn serializes_camel_case_without_empty_fix() {
        let diagnostic = Diagnostic::new(&FileId::new("a.ts"), span(), "missingName", "m").with_fix();
        let finding = Finding::from_diagnostic("require-name", Severity::Warn, diagnostic);
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["ruleId"], "require-name");
        assert_eq!(json["fixOffered"], true);
        assert_eq!(json["severity"], "warn");
        assert!(json.get("fix").is_none());
    }
}
