//! Source File Entity

use std::path::{Path, PathBuf};

use crate::entities::CodeUnit;

/// One discovered source file: its path, its original text (loaded once
/// per run), and the ordered units parsed from it
///
/// A `SourceFile` owns its units exclusively and is dropped once its
/// rewritten content is flushed to disk or the run abandons it.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute or root-relative path of the file
    pub path: PathBuf,
    /// Original file content
    pub text: String,
    /// Units in source order, outermost first
    pub units: Vec<CodeUnit>,
}

impl SourceFile {
    /// Create a source file from its path, text, and extracted units
    pub fn new(path: impl Into<PathBuf>, text: String, units: Vec<CodeUnit>) -> Self {
        Self {
            path: path.into(),
            text,
            units,
        }
    }

    /// Path as a displayable string
    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// Borrow the path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
