//! JSON reporter: an array with one object per document.

use anyhow::{Context, Result};

use super::{DocumentReport, ReportConfig, ReportFormat, ReportGenerator};

#[derive(Debug, Default)]
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportGenerator for JsonReporter {
    fn generate_report(&self, documents: &[DocumentReport], config: &ReportConfig) -> Result<String> {
        let output = if config.pretty {
            serde_json::to_string_pretty(documents)
        } else {
            serde_json::to_string(documents)
        };
        output.context("Failed to serialize extraction report")
    }

    fn supported_format() -> ReportFormat {
        ReportFormat::Json
    }
}
