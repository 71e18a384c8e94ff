//! Python unit extractor
//!
//! Implements the `UnitExtractor` port with tree-sitter and the Python
//! grammar. Produces the ordered unit sequence for a file: one synthetic
//! module unit (when the file has any content) followed by every class
//! and function definition in source order, outermost first, each with
//! its header span, body span, existing-docstring span, and body
//! indentation.

use std::path::Path;

use tree_sitter::{Node, Parser};

use cdg_domain::entities::CodeUnit;
use cdg_domain::error::{Error, Result};
use cdg_domain::ports::UnitExtractor;
use cdg_domain::value_objects::{Span, UnitKind};

/// Indentation used when a body has to move to its own line
const SYNTHETIC_INDENT: &str = "    ";

/// Python source extractor backed by tree-sitter
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonExtractor;

impl PythonExtractor {
    /// Create a new Python extractor
    pub fn new() -> Self {
        Self
    }
}

impl UnitExtractor for PythonExtractor {
    fn extract(&self, path: &Path, text: &str) -> Result<Vec<CodeUnit>> {
        let display = path.display().to_string();

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| Error::parse(&display, format!("grammar load failed: {e}")))?;

        let tree = parser
            .parse(text, None)
            .ok_or_else(|| Error::parse(&display, "parser produced no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            // A broken AST cannot yield reliable spans; skip the file whole
            return Err(Error::parse(&display, "file contains syntax errors"));
        }

        let mut units = Vec::new();
        if !text.trim().is_empty() {
            units.push(module_unit(path, text, &root));
        }

        let mut scope: Vec<String> = Vec::new();
        collect_definitions(&root, text, &display, &mut scope, None, &mut units)?;

        Ok(units)
    }

    fn extension(&self) -> &str {
        cdg_domain::constants::PYTHON_EXTENSION
    }
}

/// Build the synthetic module unit for a non-empty file
fn module_unit(path: &Path, text: &str, root: &Node<'_>) -> CodeUnit {
    let (insert_at, insert_line) = module_insertion_point(text);

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module")
        .to_string();

    CodeUnit {
        kind: UnitKind::Module,
        qualified_name: name,
        header_span: Span::new(insert_at, insert_at, insert_line, insert_line),
        body_span: node_span(root),
        doc_span: module_doc_span(root),
        body_indent: String::new(),
        parent_class: None,
    }
}

/// Byte offset and line where a module docstring belongs: after a shebang
/// and an encoding comment, before everything else
fn module_insertion_point(text: &str) -> (usize, u32) {
    let mut offset = 0usize;
    let mut line = 1u32;
    for raw in text.split_inclusive('\n') {
        let trimmed = raw.trim_start();
        let is_shebang = line == 1 && trimmed.starts_with("#!");
        let is_coding =
            line <= 2 && trimmed.starts_with('#') && (raw.contains("coding:") || raw.contains("coding="));
        if is_shebang || is_coding {
            offset += raw.len();
            line += 1;
        } else {
            break;
        }
    }
    (offset, line)
}

/// Span of the module docstring, when the first statement is a string
fn module_doc_span(root: &Node<'_>) -> Option<Span> {
    let mut cursor = root.walk();
    let first = root
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;
    expression_string_span(&first)
}

/// Recursively collect class and function definitions in source order
fn collect_definitions(
    node: &Node<'_>,
    text: &str,
    path: &str,
    scope: &mut Vec<String>,
    enclosing_class: Option<&str>,
    units: &mut Vec<CodeUnit>,
) -> Result<()> {
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    for child in children {
        match child.kind() {
            "class_definition" | "function_definition" => {
                capture_definition(&child, text, path, scope, enclosing_class, units)?;
            }
            "decorated_definition" => {
                if let Some(def) = child.child_by_field_name("definition") {
                    capture_definition(&def, text, path, scope, enclosing_class, units)?;
                }
            }
            // Definitions can hide inside conditionals, try blocks, etc.
            _ => collect_definitions(&child, text, path, scope, enclosing_class, units)?,
        }
    }
    Ok(())
}

/// Capture one definition node as a unit, then descend into its body
fn capture_definition(
    node: &Node<'_>,
    text: &str,
    path: &str,
    scope: &mut Vec<String>,
    enclosing_class: Option<&str>,
    units: &mut Vec<CodeUnit>,
) -> Result<()> {
    let name_node = node
        .child_by_field_name("name")
        .ok_or_else(|| Error::parse(path, "definition without a name"))?;
    let body_node = node
        .child_by_field_name("body")
        .ok_or_else(|| Error::parse(path, "definition without a body"))?;

    let name = &text[name_node.byte_range()];
    let qualified_name = if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope.join("."), name)
    };

    let kind = match node.kind() {
        "class_definition" => UnitKind::Class,
        _ => UnitKind::Function,
    };

    // Header runs from the def/class keyword through the colon; trim the
    // whitespace between the colon and the first body statement
    let mut header_end = body_node.start_byte();
    let bytes = text.as_bytes();
    while header_end > node.start_byte() && bytes[header_end - 1].is_ascii_whitespace() {
        header_end -= 1;
    }

    let header_span = Span::new(
        node.start_byte(),
        header_end,
        node.start_position().row as u32 + 1,
        line_at(text, header_end),
    );

    let inline_body = !text[header_end..body_node.start_byte()].contains('\n');
    let body_indent = if inline_body {
        format!("{}{}", line_indent(text, node.start_byte()), SYNTHETIC_INDENT)
    } else {
        line_indent(text, body_node.start_byte()).to_string()
    };

    units.push(CodeUnit {
        kind,
        qualified_name: qualified_name.clone(),
        header_span,
        body_span: node_span(node),
        doc_span: body_doc_span(&body_node),
        body_indent,
        parent_class: enclosing_class.map(str::to_string),
    });

    let class_context = if kind == UnitKind::Class {
        Some(qualified_name.clone())
    } else {
        enclosing_class.map(str::to_string)
    };
    scope.push(name.to_string());
    collect_definitions(&body_node, text, path, scope, class_context.as_deref(), units)?;
    scope.pop();
    Ok(())
}

/// Span of an existing docstring: the body's first statement when it is a
/// bare string expression
fn body_doc_span(body: &Node<'_>) -> Option<Span> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;
    expression_string_span(&first)
}

/// If `node` is an expression statement wrapping a string literal, the
/// string's span
fn expression_string_span(node: &Node<'_>) -> Option<Span> {
    if node.kind() != "expression_statement" {
        return None;
    }
    let child = node.named_child(0)?;
    if child.kind() == "string" || child.kind() == "concatenated_string" {
        Some(node_span(&child))
    } else {
        None
    }
}

/// Full span of a node
fn node_span(node: &Node<'_>) -> Span {
    Span::new(
        node.start_byte(),
        node.end_byte(),
        node.start_position().row as u32 + 1,
        node.end_position().row as u32 + 1,
    )
}

/// 1-based line containing `byte`
fn line_at(text: &str, byte: usize) -> u32 {
    text[..byte.min(text.len())]
        .bytes()
        .filter(|b| *b == b'\n')
        .count() as u32
        + 1
}

/// The literal indentation characters of the line containing `byte`
fn line_indent(text: &str, byte: usize) -> &str {
    let line_start = text[..byte.min(text.len())].rfind('\n').map_or(0, |i| i + 1);
    let line = &text[line_start..];
    let indent_len = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..indent_len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extract(text: &str) -> Vec<CodeUnit> {
        PythonExtractor::new()
            .extract(&PathBuf::from("sample.py"), text)
            .expect("extraction failed")
    }

    #[test]
    fn test_simple_function() {
        let text = "def add(a, b):\n    return a + b\n";
        let units = extract(text);

        // module unit + the function
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].kind, UnitKind::Module);
        let func = &units[1];
        assert_eq!(func.kind, UnitKind::Function);
        assert_eq!(func.qualified_name, "add");
        assert_eq!(func.header_text(text), "def add(a, b):");
        assert_eq!(func.body_indent, "    ");
        assert!(func.doc_span.is_none());
    }

    #[test]
    fn test_method_qualified_name_and_parent() {
        let text = "class Greeter:\n    def greet(self):\n        return 'hi'\n";
        let units = extract(text);

        assert_eq!(units.len(), 3);
        let class = &units[1];
        assert_eq!(class.kind, UnitKind::Class);
        assert_eq!(class.qualified_name, "Greeter");

        let method = &units[2];
        assert_eq!(method.kind, UnitKind::Function);
        assert_eq!(method.qualified_name, "Greeter.greet");
        assert_eq!(method.parent_class.as_deref(), Some("Greeter"));
        assert_eq!(method.body_indent, "        ");
    }

    #[test]
    fn test_span_containment_and_no_sibling_overlap() {
        let text = concat!(
            "class A:\n",
            "    def f(self):\n",
            "        pass\n",
            "\n",
            "    def g(self):\n",
            "        pass\n",
            "\n",
            "def h():\n",
            "    pass\n",
        );
        let units = extract(text);
        let class = units.iter().find(|u| u.qualified_name == "A").unwrap();
        let f = units.iter().find(|u| u.qualified_name == "A.f").unwrap();
        let g = units.iter().find(|u| u.qualified_name == "A.g").unwrap();
        let h = units.iter().find(|u| u.qualified_name == "h").unwrap();

        assert!(class.body_span.contains(&f.body_span));
        assert!(class.body_span.contains(&g.body_span));
        assert!(!f.body_span.overlaps(&g.body_span));
        assert!(!class.body_span.overlaps(&h.body_span));
    }

    #[test]
    fn test_existing_docstring_span() {
        let text = "def f():\n    \"\"\"Existing doc.\"\"\"\n    return 1\n";
        let units = extract(text);
        let func = &units[1];
        let doc = func.doc_text(text).expect("docstring not detected");
        assert_eq!(doc, "\"\"\"Existing doc.\"\"\"");
    }

    #[test]
    fn test_module_docstring_and_shebang() {
        let text = "#!/usr/bin/env python\n\"\"\"Module doc.\"\"\"\n\nX = 1\n";
        let units = extract(text);
        let module = &units[0];
        assert_eq!(module.kind, UnitKind::Module);
        // Insertion point sits after the shebang line
        assert_eq!(module.header_span.start_byte, 22);
        assert_eq!(module.doc_text(text), Some("\"\"\"Module doc.\"\"\""));
    }

    #[test]
    fn test_inline_body_gets_synthetic_indent() {
        let text = "def f(): return 1\n";
        let units = extract(text);
        let func = &units[1];
        assert_eq!(func.header_text(text), "def f():");
        assert_eq!(func.body_indent, "    ");
    }

    #[test]
    fn test_decorated_function_is_captured() {
        let text = "@staticmethod\ndef f():\n    pass\n";
        let units = extract(text);
        assert!(units.iter().any(|u| u.qualified_name == "f"));
    }

    #[test]
    fn test_nested_function_inside_conditional() {
        let text = "if True:\n    def hidden():\n        pass\n";
        let units = extract(text);
        assert!(units.iter().any(|u| u.qualified_name == "hidden"));
    }

    #[test]
    fn test_syntax_error_rejects_whole_file() {
        let err = PythonExtractor::new()
            .extract(&PathBuf::from("bad.py"), "def broken(:\n")
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_empty_file_yields_no_units() {
        let units = extract("");
        assert!(units.is_empty());
    }
}
