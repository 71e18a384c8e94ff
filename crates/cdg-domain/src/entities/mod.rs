//! Domain entities

pub mod code_unit;
pub mod source_file;

pub use code_unit::CodeUnit;
pub use source_file::SourceFile;
