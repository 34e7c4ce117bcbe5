/*!
# Reports Module

Renders extraction reports for people and for tools.

## Supported formats:
- **Text** - console report: summary, ranked components, occurrences, diagnostics
- **JSON** - the serialized reports, for tooling that applies the occurrence map

## Usage:

```rust,ignore
use component_miner::reports::{DocumentReport, ReportConfig, ReportFormat, ReportManager};

let documents = vec![DocumentReport::new("page.jsx", engine.extract(&text))];
let config = ReportConfig { format: ReportFormat::Json, ..Default::default() };
let output = ReportManager::new().generate_report(&documents, &config)?;
```
*/

pub mod json;
pub mod text;

pub use json::JsonReporter;
pub use text::TextReporter;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analyzer::ExtractionReport;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    /// Human-readable console report
    Text,
    /// JSON for tooling
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(anyhow::anyhow!("Unknown report format: {}", s)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "Text"),
            ReportFormat::Json => write!(f, "JSON"),
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub format: ReportFormat,
    /// Print component bodies in text reports
    pub include_bodies: bool,
    /// List occurrence entries with their arguments
    pub include_occurrences: bool,
    /// Pretty-print JSON
    pub pretty: bool,
    /// ANSI colors in text reports
    pub use_colors: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            include_bodies: false,
            include_occurrences: true,
            pretty: true,
            use_colors: false,
        }
    }
}

/// Extraction report of one named document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub source: String,
    #[serde(flatten)]
    pub report: ExtractionReport,
}

impl DocumentReport {
    pub fn new(source: impl Into<String>, report: ExtractionReport) -> Self {
        Self {
            source: source.into(),
            report,
        }
    }
}

/// Report generator for one format
pub trait ReportGenerator {
    fn generate_report(&self, documents: &[DocumentReport], config: &ReportConfig) -> Result<String>;

    fn supported_format() -> ReportFormat
    where
        Self: Sized;
}

/// Dispatches to the generator for the configured format
#[derive(Debug, Default)]
pub struct ReportManager;

impl ReportManager {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_report(
        &self,
        documents: &[DocumentReport],
        config: &ReportConfig,
    ) -> Result<String> {
        match config.format {
            ReportFormat::Text => {
                TextReporter::with_colors(config.use_colors).generate_report(documents, config)
            }
            ReportFormat::Json => JsonReporter::new().generate_report(documents, config),
        }
    }

    pub fn save_report<P: AsRef<Path>>(
        &self,
        documents: &[DocumentReport],
        config: &ReportConfig,
        output_path: P,
    ) -> Result<()> {
        let content = self.generate_report(documents, config)?;
        std::fs::write(&output_path, content)?;
        tracing::info!(
            "Generated {} report: {}",
            config.format,
            output_path.as_ref().display()
        );
        Ok(())
    }
}
