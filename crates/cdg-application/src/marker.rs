//! Generation markers and staleness hashes
//!
//! Every generated docstring carries a trailing marker line and a
//! SHA-256 hash of the unit's source with the docstring excluded. On a
//! later run the stored hash tells us whether the code changed under a
//! generated doc (regenerate) or not (skip). Hand-written docstrings
//! carry no marker and are never rewritten by the hash rule.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use cdg_domain::constants::{GENERATED_MARKER, HASH_LINE_PREFIX};
use cdg_domain::entities::CodeUnit;
use cdg_domain::value_objects::Span;

static HASH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^\s*{}([0-9a-f]{{64}})\s*$",
        regex::escape(HASH_LINE_PREFIX)
    ))
    .expect("hash line regex")
});

/// SHA-256 hex digest of the unit's code
///
/// The digest covers the unit body line by line, skipping lines that
/// belong to any docstring span in the file and blank lines, and
/// trimming trailing whitespace. Inserting or rewriting docstrings
/// therefore never changes a unit's hash; editing its code does.
pub fn unit_hash(unit: &CodeUnit, file_text: &str, doc_spans: &[Span]) -> String {
    let mut hasher = Sha256::new();
    let mut offset = unit.body_span.start_byte;
    for line in unit.body_text(file_text).split_inclusive('\n') {
        let line_end = offset + line.len();
        let in_doc = doc_spans
            .iter()
            .any(|d| d.start_byte < line_end && offset < d.end_byte);
        if !in_doc {
            let trimmed = line.trim_end();
            if !trimmed.is_empty() {
                hasher.update(trimmed.as_bytes());
                hasher.update(b"\n");
            }
        }
        offset = line_end;
    }
    hex::encode(hasher.finalize())
}

/// Append the marker and hash lines to generated documentation content
pub fn append_marker(content: &str, hash: &str) -> String {
    format!(
        "{}\n\n{GENERATED_MARKER}\n{HASH_LINE_PREFIX}{hash}",
        content.trim_end()
    )
}

/// Whether this docstring content was produced by the generator
pub fn has_marker(doc_content: &str) -> bool {
    doc_content.contains(GENERATED_MARKER)
}

/// The stored staleness hash, when the content carries one
pub fn stored_hash(doc_content: &str) -> Option<&str> {
    HASH_LINE
        .captures(doc_content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Strip the quote delimiters from a docstring expression, yielding the
/// inner content
pub fn doc_content(doc_expression: &str) -> &str {
    let trimmed = doc_expression.trim();
    for prefix in ["r", "R", "u", "U", ""] {
        for quote in ["\"\"\"", "'''", "\"", "'"] {
            let open = format!("{prefix}{quote}");
            if trimmed.len() >= open.len() + quote.len()
                && trimmed.starts_with(&open)
                && trimmed.ends_with(quote)
            {
                return &trimmed[open.len()..trimmed.len() - quote.len()];
            }
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdg_domain::value_objects::{Span, UnitKind};

    fn unit_for(text: &str, doc_span: Option<Span>) -> CodeUnit {
        CodeUnit {
            kind: UnitKind::Function,
            qualified_name: "f".to_string(),
            header_span: Span::new(0, 8, 1, 1),
            body_span: Span::new(0, text.len(), 1, 2),
            doc_span,
            body_indent: "    ".to_string(),
            parent_class: None,
        }
    }

    #[test]
    fn test_hash_is_stable_and_hex() {
        let text = "def f():\n    return 1\n";
        let unit = unit_for(text, None);
        let a = unit_hash(&unit, text, &[]);
        let b = unit_hash(&unit, text, &[]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hash_ignores_docstring_lines() {
        let bare = "def f():\n    return 1\n";
        let documented = "def f():\n    \"\"\"\n    Doc.\n    \"\"\"\n    return 1\n";
        // The docstring expression spans from the opening quotes to the
        // closing quotes
        let doc_span = Span::new(13, 33, 2, 4);
        assert_eq!(&documented[13..16], "\"\"\"");
        assert_eq!(&documented[30..33], "\"\"\"");

        let without = unit_hash(&unit_for(bare, None), bare, &[]);
        let with = unit_hash(
            &unit_for(documented, Some(doc_span)),
            documented,
            &[doc_span],
        );
        assert_eq!(without, with);
    }

    #[test]
    fn test_hash_changes_when_code_changes() {
        let a = "def f():\n    return 1\n";
        let b = "def f():\n    return 2\n";
        assert_ne!(
            unit_hash(&unit_for(a, None), a, &[]),
            unit_hash(&unit_for(b, None), b, &[])
        );
    }

    #[test]
    fn test_marker_round_trip() {
        let marked = append_marker("Adds two numbers.", &"a".repeat(64));
        assert!(has_marker(&marked));
        assert_eq!(stored_hash(&marked), Some("a".repeat(64).as_str()));
    }

    #[test]
    fn test_unmarked_content_has_no_hash() {
        assert!(!has_marker("A hand-written docstring."));
        assert_eq!(stored_hash("A hand-written docstring."), None);
    }

    #[test]
    fn test_doc_content_strips_quotes() {
        assert_eq!(doc_content("\"\"\"Doc text.\"\"\""), "Doc text.");
        assert_eq!(doc_content("'''Doc text.'''"), "Doc text.");
        assert_eq!(doc_content("\"one-liner\""), "one-liner");
        assert_eq!(doc_content("r\"\"\"raw doc\"\"\""), "raw doc");
    }
}
