//! Code Unit Entity
//!
//! The core domain entity: one documentable construct (module header,
//! class, or function/method) with precise text spans into its owning
//! file. Units are produced once by the extractor and consumed by the
//! prompt builder, merge engine, and coordinator without re-inspection.

use serde::{Deserialize, Serialize};

use crate::value_objects::{Span, UnitKind};

/// One documentable construct within a source file
///
/// ## Invariants
///
/// - Sibling units' spans within a file never overlap
/// - A nested unit's span is fully contained in its parent's body span
/// - `doc_span`, when present, covers the existing docstring expression
///   including its quotes, and lies inside `body_span`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUnit {
    /// Kind of construct
    pub kind: UnitKind,
    /// Dotted path from the file top, e.g. `Outer.method`
    pub qualified_name: String,
    /// Span of the definition header (`def`/`class` through the colon);
    /// for a module unit, a zero-length span at the insertion point
    pub header_span: Span,
    /// Span of the whole definition, header included
    pub body_span: Span,
    /// Span of the existing docstring expression, absent if none
    pub doc_span: Option<Span>,
    /// Indentation string of the unit's body statements
    pub body_indent: String,
    /// Qualified name of the enclosing class, if this is a method
    pub parent_class: Option<String>,
}

impl CodeUnit {
    /// The header text of this unit
    pub fn header_text<'a>(&self, file_text: &'a str) -> &'a str {
        self.header_span.slice(file_text)
    }

    /// The full body text of this unit
    pub fn body_text<'a>(&self, file_text: &'a str) -> &'a str {
        self.body_span.slice(file_text)
    }

    /// The existing docstring expression text, if any
    pub fn doc_text<'a>(&self, file_text: &'a str) -> Option<&'a str> {
        self.doc_span.map(|span| span.slice(file_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_accessors_slice_the_owning_text() {
        let text = "def f():\n    \"\"\"old doc\"\"\"\n    return 1\n";
        let unit = CodeUnit {
            kind: UnitKind::Function,
            qualified_name: "f".to_string(),
            header_span: Span::new(0, 8, 1, 1),
            body_span: Span::new(0, text.len(), 1, 3),
            doc_span: Some(Span::new(13, 26, 2, 2)),
            body_indent: "    ".to_string(),
            parent_class: None,
        };

        assert_eq!(unit.header_text(text), "def f():");
        assert_eq!(unit.doc_text(text), Some("\"\"\"old doc\"\"\""));
        assert!(unit.body_text(text).ends_with("return 1\n"));
    }
}
