/*!
# Analyzer Module

Slot-identifier analysis and the extraction engine that drives the pipeline.
*/

pub mod engine;
pub mod variables;

pub use engine::{ExtractionEngine, ExtractionReport, ExtractionStats};
pub use variables::{RoleHint, SlotIdentifier, SlotUsage, Variable, VariableAnalyzer};
