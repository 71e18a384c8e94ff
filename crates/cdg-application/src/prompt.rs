//! Prompt construction
//!
//! Turns one unit plus a bounded window of its own body into a request
//! for the model: produce ONLY a documentation block in reStructuredText,
//! never modified code. Over-budget bodies are truncated from the middle,
//! keeping the signature and the first and last lines, and the request
//! records that truncation so the validator can stay lenient about how
//! general the resulting text is.

use cdg_domain::constants::{DEFAULT_PROMPT_BUDGET, TRUNCATION_KEEP_LINES};
use cdg_domain::entities::CodeUnit;
use cdg_domain::value_objects::UnitKind;

/// Marker inserted where body lines were removed
const TRUNCATION_MARKER: &str = "    # ... body truncated ...";

/// Prompt construction limits
#[derive(Debug, Clone, Copy)]
pub struct PromptConfig {
    /// Maximum characters of unit body included in a prompt
    pub max_body_chars: usize,
    /// Lines kept at each end when truncating from the middle
    pub keep_lines: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_body_chars: DEFAULT_PROMPT_BUDGET,
            keep_lines: TRUNCATION_KEEP_LINES,
        }
    }
}

/// A finished request for one unit
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    /// Full request text sent to the model
    pub text: String,
    /// Whether the unit body was truncated to fit the budget
    pub truncated: bool,
}

/// Builds bounded natural-language requests from code units
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    config: PromptConfig,
}

impl PromptBuilder {
    /// Create a prompt builder with the given limits
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    /// Build the request for `unit`; `strict` selects the tighter retry
    /// wording used after an invalid completion
    pub fn build(&self, unit: &CodeUnit, file_text: &str, strict: bool) -> BuiltPrompt {
        let (body, truncated) = self.bounded_body(unit, file_text);

        let subject = match unit.kind {
            UnitKind::Module => "Python module",
            UnitKind::Class => "Python class",
            UnitKind::Function => "Python function",
        };

        let mut text = String::new();

        if let Some(parent) = &unit.parent_class {
            text.push_str("Class context: this function is a method of the class ");
            text.push_str(parent);
            text.push_str(".\n\n");
        }

        text.push_str(&format!(
            "Write documentation for the following {subject} in reStructuredText (reST) format. \
             Include a description{}. Be clear and concise.\n",
            match unit.kind {
                UnitKind::Module => ", the module's purpose, and its main contents",
                UnitKind::Class => ", attribute explanations, and method summaries",
                UnitKind::Function =>
                    ", parameter explanations (`:param:`), and the return value (`:returns:`)",
            }
        ));

        if truncated {
            text.push_str(
                "The body shown is truncated from the middle; document only what the visible \
                 signature and code support.\n",
            );
        }

        if strict {
            text.push_str(
                "Return ONLY the documentation text itself: no code, no code fences, no quotes, \
                 no surrounding prose, no repetition of the source.\n",
            );
        } else {
            text.push_str(
                "Return only the documentation text. Do not include code, code fences, or the \
                 original source.\n",
            );
        }

        text.push_str(&format!("\n{subject} source:\n{body}\n\nDocumentation:\n"));

        BuiltPrompt { text, truncated }
    }

    /// The unit body, truncated from the middle when over budget
    fn bounded_body(&self, unit: &CodeUnit, file_text: &str) -> (String, bool) {
        let body = unit.body_text(file_text);
        if body.len() <= self.config.max_body_chars {
            return (body.to_string(), false);
        }

        let lines: Vec<&str> = body.lines().collect();
        let keep = self.config.keep_lines.min(lines.len() / 2);
        let mut kept = Vec::with_capacity(keep * 2 + 1);
        kept.extend_from_slice(&lines[..keep]);
        kept.push(TRUNCATION_MARKER);
        kept.extend_from_slice(&lines[lines.len() - keep..]);
        let mut text = kept.join("\n");

        // Line-based trimming can still exceed the budget on files with
        // very long lines
        if text.len() > self.config.max_body_chars {
            let cut = text
                .char_indices()
                .take_while(|(i, _)| *i < self.config.max_body_chars)
                .last()
                .map_or(0, |(i, c)| i + c.len_utf8());
            text.truncate(cut);
            text.push('\n');
            text.push_str(TRUNCATION_MARKER);
        }

        (text, true)
    }
}
