//! Value objects - immutable values with no identity

pub mod report;
pub mod span;
pub mod state;

pub use report::{FileOutcome, RunReport, UnitOutcome};
pub use span::Span;
pub use state::{FailureKind, FileState, UnitKind, UnitState};
