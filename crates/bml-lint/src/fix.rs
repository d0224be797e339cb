//! Source edits
//!
//! Fixes are pure range replacements computed against the original text. A
//! batch is applied in one pass, sorted by start offset; an edit overlapping
//! one already accepted is deferred (returned, not applied), so no fix can
//! corrupt the text another fix was computed against.

use bml_syntax::TextRange;
use serde::Serialize;

/// Replace `range` of the source text with `replacement`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TextEdit {
    /// Byte range to replace
    pub range: TextRange,
    /// Replacement text
    pub replacement: String,
}

impl TextEdit {
    /// Replace a range
    #[inline]
    #[must_use]
    pub fn replace(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Delete a range
    #[inline]
    #[must_use]
    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, "")
    }
}

/// Result of [`apply_fixes`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixOutcome {
    /// Text with the applied edits
    pub text: String,
    /// Edits applied, sorted by start offset
    pub applied: Vec<TextEdit>,
    /// Edits not applied (overlapping or out of bounds)
    pub deferred: Vec<TextEdit>,
}

/// Split items into a non-overlapping prefix-sorted selection and the rest
///
/// Items are sorted by `(start, end)`; each is accepted unless it overlaps
/// the previously accepted one.
pub(crate) fn select_non_overlapping<T>(
    mut items: Vec<T>,
    range_of: impl Fn(&T) -> TextRange,
) -> (Vec<T>, Vec<T>) {
    items.sort_by_key(|item| {
        let range = range_of(item);
        (range.start, range.end)
    });

    let mut accepted: Vec<T> = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();
    for item in items {
        let range = range_of(&item);
        match accepted.last() {
            Some(last) if range_of(last).overlaps(&range) => rejected.push(item),
            _ => accepted.push(item),
        }
    }
    (accepted, rejected)
}

/// Apply a batch of edits to `text` in a single pass
#[must_use]
pub fn apply_fixes(text: &str, edits: impl IntoIterator<Item = TextEdit>) -> FixOutcome {
    let (valid, mut deferred): (Vec<_>, Vec<_>) = edits.into_iter().partition(|edit| {
        edit.range.start <= edit.range.end
            && edit.range.end <= text.len()
            && text.is_char_boundary(edit.range.start)
            && text.is_char_boundary(edit.range.end)
    });
    if !deferred.is_empty() {
        tracing::warn!(count = deferred.len(), "skipping edits outside the source text");
    }

    let (applied, overlapping) = select_non_overlapping(valid, |edit| edit.range);
    deferred.extend(overlapping);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in &applied {
        out.push_str(&text[cursor..edit.range.start]);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(&text[cursor..]);

    FixOutcome {
        text: out,
        applied,
        deferred,
    }
}

fn is_horizontal_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t')
}

/// Range covering `start..end` extended to whole lines, if nothing else is on them
fn whole_lines(bytes: &[u8], start: usize, end: usize) -> Option<TextRange> {
    let line_start = bytes[..start]
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |idx| idx + 1);
    if !bytes[line_start..start].iter().all(|b| is_horizontal_space(*b)) {
        return None;
    }

    let mut idx = end;
    while idx < bytes.len() && is_horizontal_space(bytes[idx]) {
        idx += 1;
    }
    match bytes.get(idx) {
        Some(b'\n') => Some(TextRange::new(line_start, idx + 1)),
        Some(b'\r') if bytes.get(idx + 1) == Some(&b'\n') => {
            Some(TextRange::new(line_start, idx + 2))
        }
        _ => None,
    }
}

/// Range to delete when removing one element of a comma-separated list
/// (array elements, object properties)
///
/// Takes the trailing comma when there is one, otherwise the preceding comma,
/// and the whole line when the element sits on a line of its own.
#[must_use]
pub fn removal_range(text: &str, item: TextRange) -> TextRange {
    let bytes = text.as_bytes();
    if item.end > bytes.len() || item.start > item.end {
        return item;
    }

    let mut after = item.end;
    while after < bytes.len() && bytes[after].is_ascii_whitespace() {
        after += 1;
    }
    if bytes.get(after) == Some(&b',') {
        let mut end = after + 1;
        while end < bytes.len() && is_horizontal_space(bytes[end]) {
            end += 1;
        }
        return whole_lines(bytes, item.start, end).unwrap_or(TextRange::new(item.start, end));
    }

    let mut before = item.start;
    while before > 0 && bytes[before - 1].is_ascii_whitespace() {
        before -= 1;
    }
    if before > 0 && bytes[before - 1] == b',' {
        return TextRange::new(before - 1, item.end);
    }

    whole_lines(bytes, item.start, item.end).unwrap_or(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn remove(text: &str, needle: &str) -> String {
        let start = text.find(needle).unwrap();
        let range = removal_range(text, TextRange::new(start, start + needle.len()));
        apply_fixes(text, [TextEdit::delete(range)]).text
    }

    #[test]
    fn removes_middle_element_with_comma() {
        assert_eq!(remove("[A, B, C]", "B"), "[A, C]");
    }

    #[test]
    fn removes_last_element_with_preceding_comma() {
        assert_eq!(remove("[A, B, C]", "C"), "[A, B]");
    }

    #[test]
    fn removes_sole_element() {
        assert_eq!(remove("{ bogus: 1 }", "bogus: 1"), "{  }");
    }

    #[test]
    fn removes_whole_line_property() {
        let text = "{\n  name: 'A',\n  bogus: 1,\n  goals: [],\n}";
        assert_eq!(remove(text, "bogus: 1"), "{\n  name: 'A',\n  goals: [],\n}");
    }

    #[test]
    fn removes_last_line_property_keeping_layout() {
        let text = "{\n  name: 'A',\n  bogus: 1\n}";
        assert_eq!(remove(text, "bogus: 1"), "{\n  name: 'A'\n}");
    }

    #[test]
    fn applies_in_one_pass_and_defers_overlaps() {
        let text = "abcdef";
        let outcome = apply_fixes(
            text,
            [
                TextEdit::replace(TextRange::new(4, 6), "EF"),
                TextEdit::replace(TextRange::new(0, 2), "AB"),
                TextEdit::replace(TextRange::new(1, 3), "xx"),
            ],
        );
        assert_eq!(outcome.text, "ABcdEF");
        assert_eq!(outcome.applied.len(), 2);
        assert_eq!(outcome.deferred, vec![TextEdit::replace(TextRange::new(1, 3), "xx")]);
    }

    #[test]
    fn out_of_bounds_edits_are_deferred() {
        let outcome = apply_fixes("abc", [TextEdit::delete(TextRange::new(2, 10))]);
        assert_eq!(outcome.text, "abc");
        assert_eq!(outcome.deferred.len(), 1);
    }
}
