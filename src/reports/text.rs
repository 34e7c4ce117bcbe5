/*!
# Text Reporter

Console report for extraction results.

## Features:
- Optional ANSI colors (honours `NO_COLOR` / `FORCE_COLOR` / `TERM=dumb`)
- Per-document summary
- Ranked components with parameters and role hints
- Occurrence map with argument values
- Diagnostics with positions
*/

use anyhow::Result;
use std::fmt::Write as _;

use super::{DocumentReport, ReportConfig, ReportFormat, ReportGenerator};
use crate::analyzer::ExtractionReport;
use crate::synthesis::Component;

/// Text reporter for console output
pub struct TextReporter {
    use_colors: bool,
}

/// ANSI color codes
struct Colors;

impl Colors {
    const RESET: &'static str = "\x1b[0m";
    const BOLD: &'static str = "\x1b[1m";
    const RED: &'static str = "\x1b[31m";
    const YELLOW: &'static str = "\x1b[33m";
    const GREEN: &'static str = "\x1b[32m";
    const CYAN: &'static str = "\x1b[36m";
    const GRAY: &'static str = "\x1b[90m";
}

impl TextReporter {
    pub fn new() -> Self {
        Self {
            use_colors: Self::supports_colors(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Plain output for CI logs and files
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    /// Whether the terminal is expected to render ANSI colors
    pub fn supports_colors() -> bool {
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }
        if std::env::var("FORCE_COLOR").is_ok() {
            return true;
        }
        !matches!(std::env::var("TERM"), Ok(term) if term == "dumb" || term.is_empty())
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", color, text, Colors::RESET)
        } else {
            text.to_string()
        }
    }

    fn generate_header(&self) -> String {
        let heading = format!("{}{}", Colors::BOLD, Colors::CYAN);
        let title = self.colorize("Component Miner Report", &heading);
        let separator = self.colorize(&"=".repeat(50), Colors::GRAY);
        format!("{}\n{}\n\n", title, separator)
    }

    fn generate_summary(&self, out: &mut String, report: &ExtractionReport) {
        let stats = &report.stats;
        let _ = writeln!(out, "{}", self.colorize("Summary:", Colors::BOLD));
        let _ = writeln!(out, "  Components: {}", report.components.len());
        let _ = writeln!(out, "  Blocks covered: {}", report.occurrences.len());
        let _ = writeln!(
            out,
            "  Blocks: {} retained of {} balanced ({} signatures, {} clusters)",
            stats.retained_blocks, stats.candidate_blocks, stats.signatures, stats.clusters
        );
        let diagnostics = format!("  Diagnostics: {}", report.diagnostics.len());
        let color = if report.diagnostics.is_empty() {
            Colors::GREEN
        } else {
            Colors::YELLOW
        };
        let _ = writeln!(out, "{}\n", self.colorize(&diagnostics, color));
    }

    fn generate_component(
        &self,
        out: &mut String,
        rank: usize,
        component: &Component,
        report: &ExtractionReport,
        config: &ReportConfig,
    ) {
        let title = format!("{}. {}", rank, component.name);
        let _ = writeln!(
            out,
            "{} <{}> x{}, {} lines {}",
            self.colorize(&title, Colors::BOLD),
            component.tag_name,
            component.occurrence_count,
            component.line_count,
            self.colorize(&format!("[{}]", component.signature.short()), Colors::GRAY)
        );

        if component.params.is_empty() {
            let _ = writeln!(out, "   params: none");
        } else {
            let params: Vec<String> = component
                .params
                .iter()
                .map(|p| format!("{} ({})", p.name, p.role_hint))
                .collect();
            let _ = writeln!(out, "   params: {}", params.join(", "));
        }

        if config.include_bodies {
            for line in component.body.lines() {
                let _ = writeln!(out, "   | {}", line);
            }
        }

        if config.include_occurrences {
            for entry in report.occurrences_of(&component.name) {
                let arguments: Vec<String> = entry
                    .arguments
                    .iter()
                    .map(|(param, value)| format!("{}={}", param, value))
                    .collect();
                let _ = writeln!(
                    out,
                    "   - line {} [{}..{}) {}",
                    entry.line,
                    entry.start,
                    entry.end,
                    arguments.join(", ")
                );
            }
        }
        out.push('\n');
    }

    fn generate_diagnostics(&self, out: &mut String, report: &ExtractionReport) {
        if report.diagnostics.is_empty() {
            return;
        }
        let _ = writeln!(out, "{}", self.colorize("Diagnostics:", Colors::YELLOW));
        for diagnostic in &report.diagnostics {
            let _ = writeln!(
                out,
                "  {} {} {}",
                self.colorize(diagnostic.kind.code(), Colors::RED),
                diagnostic.position,
                diagnostic.message
            );
        }
        out.push('\n');
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for TextReporter {
    fn generate_report(&self, documents: &[DocumentReport], config: &ReportConfig) -> Result<String> {
        let mut out = self.generate_header();

        for document in documents {
            let report = &document.report;
            let _ = writeln!(out, "{}", self.colorize(&document.source, Colors::BOLD));
            self.generate_summary(&mut out, report);

            if report.components.is_empty() {
                let _ = writeln!(
                    out,
                    "{}\n",
                    self.colorize("No duplicated blocks found", Colors::GREEN)
                );
            }
            for (i, component) in report.components.iter().enumerate() {
                self.generate_component(&mut out, i + 1, component, report, config);
            }

            self.generate_diagnostics(&mut out, report);
        }

        Ok(out)
    }

    fn supported_format() -> ReportFormat {
        ReportFormat::Text
    }
}
