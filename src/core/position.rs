/*!
# Source position types (Position, LineIndex)

Offsets inside the pipeline are byte offsets into the document. These types
turn them into human-readable line/column pairs for diagnostics and reports.
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Position in a document. `line` and `column` are 1-based, `offset` is a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line index for fast offset -> (line, column) mapping.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets where each line starts.
    line_starts: Arc<Vec<usize>>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = Vec::with_capacity(text.len() / 32 + 1);
        starts.push(0);
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { line_starts: Arc::new(starts) }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Maps a byte offset to a 1-based position. Offsets past the end clamp to the last line.
    pub fn to_position(&self, offset: usize) -> Position {
        let starts = &self.line_starts;
        // last line_start <= offset
        let idx = match starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = starts[idx];
        Position::new(idx + 1, offset - line_start + 1, offset)
    }

    pub fn line_of(&self, offset: usize) -> usize {
        self.to_position(offset).line
    }
}

/// Number of lines a piece of text spans (a text without newlines spans one line).
pub fn line_span(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count() + 1
}
