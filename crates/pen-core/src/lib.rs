pub mod id;
pub mod lint;
pub mod model;
pub mod size;

pub use id::NodeId;
pub use lint::{ComponentGraph, LintDiagnostic, LintSeverity, lint_document};
pub use model::*;
pub use size::{SizeMode, parse_size_keyword};
