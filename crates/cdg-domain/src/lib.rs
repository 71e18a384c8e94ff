//! Domain layer for the code documentation generator
//!
//! Contains the entities, value objects, ports, and error types shared by
//! every other crate in the workspace. This crate has no I/O and no
//! knowledge of any concrete parser, model endpoint, or filesystem layout.
//!
//! ## Layout
//!
//! - [`entities`] - `CodeUnit` and `SourceFile`, the units of work
//! - [`value_objects`] - spans, unit/file states, annotation values, the run report
//! - [`ports`] - traits implemented by provider and infrastructure crates
//! - [`error`] - the workspace error type and failure taxonomy

pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use entities::{CodeUnit, SourceFile};
pub use error::{Error, Result};
pub use value_objects::{FailureKind, FileState, RunReport, Span, UnitKind, UnitState};
