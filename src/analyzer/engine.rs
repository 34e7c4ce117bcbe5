/*!
# Extraction Engine

Runs the whole pipeline for one document:
scanner -> blocks -> signatures -> clusters -> components.

Each run builds fresh scanner and extractor state, so one engine can serve
many documents at once; [`ExtractionEngine::extract_batch`] does exactly that
with `rayon`.
*/

use rayon::prelude::*;
use serde::Serialize;

use crate::blocks::BlockExtractor;
use crate::cluster::ClusterIndex;
use crate::config::ExtractorConfig;
use crate::core::{ConfigError, Diagnostic, DiagnosticCollector};
use crate::normalizer::Normalizer;
use crate::synthesis::{Component, ComponentSynthesizer, OccurrenceEntry};

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    /// Scanner events consumed
    pub events: usize,
    /// Balanced blocks of any size
    pub candidate_blocks: usize,
    /// Blocks meeting `min_block_lines`
    pub retained_blocks: usize,
    /// Distinct signatures among retained blocks
    pub signatures: usize,
    /// Groups meeting `min_occurrences`
    pub clusters: usize,
}

/// Result of one document run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    pub components: Vec<Component>,
    pub occurrences: Vec<OccurrenceEntry>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ExtractionStats,
}

impl ExtractionReport {
    pub fn has_components(&self) -> bool {
        !self.components.is_empty()
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Occurrence entries of one component, in document order
    pub fn occurrences_of<'a>(
        &'a self,
        component_name: &'a str,
    ) -> impl Iterator<Item = &'a OccurrenceEntry> + 'a {
        self.occurrences
            .iter()
            .filter(move |entry| entry.component_name == component_name)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    config: ExtractorConfig,
}

impl ExtractionEngine {
    /// Validates `config` before any document is processed.
    pub fn new(config: ExtractorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn extract(&self, text: &str) -> ExtractionReport {
        if text.trim().is_empty() {
            tracing::info!("Document is empty, nothing to extract");
            return ExtractionReport {
                diagnostics: vec![Diagnostic::empty_document()],
                ..ExtractionReport::default()
            };
        }

        let mut diagnostics = DiagnosticCollector::new(text);
        let extraction = BlockExtractor::new(&self.config).extract(text, &mut diagnostics);
        if !diagnostics.is_empty() {
            tracing::warn!("{} unbalanced elements recovered", diagnostics.len());
        }

        let mut stats = ExtractionStats {
            events: extraction.events,
            candidate_blocks: extraction.candidates,
            retained_blocks: extraction.blocks.len(),
            ..ExtractionStats::default()
        };

        let normalizer = Normalizer::new(&self.config);
        let index = ClusterIndex::build(&normalizer, extraction.blocks);
        stats.signatures = index.group_count();

        let clusters = index.into_clusters(self.config.min_occurrences);
        stats.clusters = clusters.len();

        let synthesis = ComponentSynthesizer::new(&self.config).synthesize(text, &clusters);

        if synthesis.components.is_empty() {
            tracing::info!(
                "No duplicated blocks met the thresholds (min_block_lines={}, min_occurrences={})",
                self.config.min_block_lines,
                self.config.min_occurrences
            );
        } else {
            tracing::info!(
                "Synthesized {} components covering {} blocks",
                synthesis.components.len(),
                synthesis.occurrences.len()
            );
        }

        ExtractionReport {
            components: synthesis.components,
            occurrences: synthesis.occurrences,
            diagnostics: diagnostics.into_sorted(),
            stats,
        }
    }

    /// Runs independent documents in parallel; reports keep input order.
    pub fn extract_batch<S>(&self, documents: &[S]) -> Vec<ExtractionReport>
    where
        S: AsRef<str> + Sync,
    {
        tracing::debug!("Extracting {} documents in parallel", documents.len());
        documents
            .par_iter()
            .map(|document| self.extract(document.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DiagnosticKind;
    use pretty_assertions::assert_eq;

    fn card(title: &str) -> String {
        format!("<div class=\"card\">\n  <h3>Card</h3>\n  <p>{{{title}}}</p>\n</div>\n")
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ExtractorConfig::default().with_min_occurrences(0);
        assert_eq!(
            ExtractionEngine::new(config).unwrap_err(),
            ConfigError::MinOccurrencesTooSmall(0)
        );
    }

    #[test]
    fn test_blank_document() {
        let engine = ExtractionEngine::new(ExtractorConfig::default()).unwrap();
        let report = engine.extract(" \n\t ");
        assert!(report.components.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::EmptyDocument);
        assert_eq!(report.stats, ExtractionStats::default());
    }

    #[test]
    fn test_stats_and_components() {
        let config = ExtractorConfig::default().with_min_block_lines(4);
        let engine = ExtractionEngine::new(config).unwrap();
        let document = format!("{}{}{}", card("a"), card("b"), card("c"));
        let report = engine.extract(&document);

        assert_eq!(report.stats.candidate_blocks, 9);
        assert_eq!(report.stats.retained_blocks, 3);
        assert_eq!(report.stats.signatures, 1);
        assert_eq!(report.stats.clusters, 1);
        assert_eq!(report.components.len(), 1);
        assert_eq!(report.components[0].name, "Card");
        assert_eq!(report.occurrences_of("Card").count(), 3);
        assert!(!report.has_diagnostics());
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let config = ExtractorConfig::default().with_min_block_lines(4);
        let engine = ExtractionEngine::new(config).unwrap();
        let duplicated = format!("{}{}", card("a"), card("b"));
        let documents = vec![duplicated.clone(), String::new(), duplicated];
        let reports = engine.extract_batch(&documents);

        assert_eq!(reports.len(), 3);
        assert!(reports[0].has_components());
        assert!(!reports[1].has_components());
        assert_eq!(reports[1].diagnostics[0].kind, DiagnosticKind::EmptyDocument);
        assert_eq!(reports[0], reports[2]);
    }
}
