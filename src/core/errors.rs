/*!
# Error System for Component Miner

Two families of problems exist:

- **Diagnostics** are document-dependent (an element that never closes, an
  empty document). They are recorded and the run continues.
- **ConfigError** is a caller mistake (invalid thresholds). It is reported
  before any document is processed.
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::position::{LineIndex, Position};

/// Kind of a document diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A tag-open without a matching tag-close (or a close that matches nothing open)
    UnbalancedBlock,
    /// The document contains nothing but whitespace
    EmptyDocument,
}

impl DiagnosticKind {
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::UnbalancedBlock => "CM001",
            DiagnosticKind::EmptyDocument => "CM002",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnbalancedBlock => write!(f, "UnbalancedBlock"),
            DiagnosticKind::EmptyDocument => write!(f, "EmptyDocument"),
        }
    }
}

/// Document diagnostic with position and context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub offset: usize,
    pub position: Position,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, position: Position, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset: position.offset,
            position,
            message: message.into(),
        }
    }

    pub fn empty_document() -> Self {
        Self::new(
            DiagnosticKind::EmptyDocument,
            Position::start(),
            "document is empty",
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.kind.code(),
            self.position,
            self.message,
            self.kind
        )
    }
}

/// Diagnostic collection for one document run
#[derive(Debug)]
pub struct DiagnosticCollector {
    index: LineIndex,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new(text: &str) -> Self {
        Self {
            index: LineIndex::new(text),
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Records a diagnostic at a byte offset, resolving its line and column.
    pub fn report(&mut self, kind: DiagnosticKind, offset: usize, message: impl Into<String>) {
        let position = self.index.to_position(offset);
        self.add(Diagnostic::new(kind, position, message));
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    /// Diagnostics sorted by offset, in the order they were recorded for equal offsets.
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|d| d.offset);
        self.diagnostics
    }
}

impl fmt::Display for DiagnosticCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

/// Invalid extractor configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("min_occurrences must be at least 2, got {0}")]
    MinOccurrencesTooSmall(usize),

    #[error("max_components must be positive")]
    NonPositiveMaxComponents,

    #[error("{set} contains an empty entry")]
    EmptyKeyword { set: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_resolves_positions() {
        let mut collector = DiagnosticCollector::new("<div>\n  <p>\n");
        collector.report(DiagnosticKind::UnbalancedBlock, 8, "element <p> is never closed");
        let diagnostics = collector.into_sorted();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].position.line, 2);
        assert_eq!(diagnostics[0].position.column, 3);
        assert_eq!(diagnostics[0].offset, 8);
    }

    #[test]
    fn test_sorted_by_offset() {
        let mut collector = DiagnosticCollector::new("<a><b><c>");
        collector.report(DiagnosticKind::UnbalancedBlock, 6, "c");
        collector.report(DiagnosticKind::UnbalancedBlock, 0, "a");
        let diagnostics = collector.into_sorted();
        assert_eq!(diagnostics[0].message, "a");
        assert_eq!(diagnostics[1].message, "c");
    }

    #[test]
    fn test_display_contains_code() {
        let d = Diagnostic::empty_document();
        let text = d.to_string();
        assert!(text.contains("CM002"));
        assert!(text.contains("1:1"));
    }

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::MinOccurrencesTooSmall(1).to_string(),
            "min_occurrences must be at least 2, got 1"
        );
    }
}
