//! Response validation
//!
//! Decides VALID/INVALID for raw model completions and normalizes valid
//! ones into plain documentation content: no fences, no surrounding
//! prose wrappers, no repeated source code, bounded length. The same
//! checks decide whether an existing docstring counts as well-formed for
//! the idempotent skip.

use cdg_domain::constants::{DEFAULT_LENGTH_FLOOR, DEFAULT_LENGTH_MULTIPLIER};

/// Validation limits
#[derive(Debug, Clone, Copy)]
pub struct ValidatorConfig {
    /// Completion may be at most `multiplier × header length` characters
    pub length_multiplier: usize,
    /// But never less than this many characters are allowed
    pub length_floor: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            length_multiplier: DEFAULT_LENGTH_MULTIPLIER,
            length_floor: DEFAULT_LENGTH_FLOOR,
        }
    }
}

/// Validator for model completions and existing docstrings
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator {
    config: ValidatorConfig,
}

impl ResponseValidator {
    /// Create a validator with the given limits
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate a raw completion against the unit whose header is
    /// `header_len` characters long
    ///
    /// Returns the normalized documentation content, or the rejection
    /// reason.
    pub fn validate(&self, raw: &str, header_len: usize) -> Result<String, String> {
        let mut text = raw.replace("\r\n", "\n");
        text = text.trim().to_string();

        if text.is_empty() {
            return Err("empty completion".to_string());
        }

        // Models sometimes wrap the whole answer in a fence or in
        // docstring quotes; unwrap a single whole-body wrapper before
        // rejecting interior markers as ambiguous.
        text = strip_whole_wrapper(&text, "```").unwrap_or(text);
        text = strip_whole_wrapper(&text, "\"\"\"").unwrap_or(text);
        text = text.trim().to_string();

        if text.is_empty() {
            return Err("completion was only a fence or quotes".to_string());
        }
        if text.contains("```") {
            return Err("completion contains a code fence".to_string());
        }
        if text.contains("\"\"\"") || text.contains("'''") {
            return Err("completion contains multiple candidate blocks".to_string());
        }

        let max_len = self
            .config
            .length_floor
            .max(header_len.saturating_mul(self.config.length_multiplier));
        if text.len() > max_len {
            return Err(format!(
                "completion length {} exceeds sanity limit {max_len}",
                text.len()
            ));
        }

        Ok(text)
    }

    /// Whether an existing docstring's content would pass validation,
    /// used for the idempotent skip
    pub fn is_well_formed(&self, doc_content: &str, header_len: usize) -> bool {
        self.validate(doc_content, header_len).is_ok()
    }
}

/// If `text` both starts and ends with `marker` (with an optional
/// language tag after an opening fence), return the inner content
fn strip_whole_wrapper(text: &str, marker: &str) -> Option<String> {
    let rest = text.strip_prefix(marker)?;
    let rest = rest.strip_suffix(marker)?;
    // Drop a fence language tag like ```rst
    let rest = match rest.split_once('\n') {
        Some((first, tail))
            if marker == "```" && !first.trim().is_empty() && !first.trim().contains(' ') =>
        {
            tail
        }
        _ => rest,
    };
    Some(rest.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> ResponseValidator {
        ResponseValidator::default()
    }

    #[test]
    fn test_accepts_plain_documentation() {
        let doc = "Adds two numbers.\n\n:param a: first operand\n:param b: second operand\n:returns: the sum";
        let out = validator().validate(doc, 14).unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert!(validator().validate("", 14).is_err());
        assert!(validator().validate("   \n\t  ", 14).is_err());
    }

    #[test]
    fn test_unwraps_whole_fence_but_rejects_interior_fence() {
        let wrapped = "```rst\nAdds two numbers.\n```";
        assert_eq!(validator().validate(wrapped, 14).unwrap(), "Adds two numbers.");

        let interior = "Here is the doc:\n```python\ndef add(a, b): ...\n```";
        assert!(validator().validate(interior, 14).is_err());
    }

    #[test]
    fn test_unwraps_whole_docstring_quotes() {
        let wrapped = "\"\"\"Adds two numbers.\"\"\"";
        assert_eq!(validator().validate(wrapped, 14).unwrap(), "Adds two numbers.");
    }

    #[test]
    fn test_rejects_multiple_candidate_blocks() {
        let ambiguous = "\"\"\"First.\"\"\"\n\n\"\"\"Second.\"\"\"";
        assert!(validator().validate(ambiguous, 14).is_err());
    }

    #[test]
    fn test_rejects_runaway_length() {
        let validator = ResponseValidator::new(ValidatorConfig {
            length_multiplier: 2,
            length_floor: 10,
        });
        let long = "x".repeat(100);
        assert!(validator.validate(&long, 14).is_err());
        assert!(validator.validate("short doc", 14).is_ok());
    }

    #[test]
    fn test_normalizes_crlf() {
        let out = validator().validate("line one\r\nline two", 14).unwrap();
        assert_eq!(out, "line one\nline two");
    }
}
