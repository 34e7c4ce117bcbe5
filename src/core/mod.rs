/*!
# Core Module

Core functionality shared by every pipeline stage: diagnostics,
configuration errors, source positions and document reading.
*/

pub mod errors;
pub mod fs_utils;
pub mod position;

pub use errors::{ConfigError, Diagnostic, DiagnosticCollector, DiagnosticKind};
pub use fs_utils::read_document;
pub use position::{line_span, LineIndex, Position};
