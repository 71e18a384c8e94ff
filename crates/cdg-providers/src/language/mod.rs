//! Language extraction providers
//!
//! One extractor per supported language, each implementing the
//! `UnitExtractor` domain port on top of tree-sitter.

pub mod python;

pub use python::PythonExtractor;
