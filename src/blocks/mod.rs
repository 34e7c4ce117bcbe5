/*!
# Block Extraction

Carves balanced blocks out of the scanner's event stream. Every element is a
candidate block anchored at its own open tag, so duplicated children inside a
single root element are found as well.

Recovery rules for unbalanced markup:

- a close tag matching a deeper open element reports every element above it
  as unclosed; the matched element and its ancestors are *tainted* and are
  dropped silently when they close;
- a close tag matching nothing is ignored when nothing is open, otherwise it
  is reported and taints every open element;
- elements still open at the end of the document are reported.

A tainted or unclosed element never becomes a [`Block`].
*/

use serde::Serialize;
use std::collections::BTreeSet;

use crate::config::ExtractorConfig;
use crate::core::{line_span, DiagnosticCollector, DiagnosticKind};
use crate::scanner::{EventKind, Scanner};

/// A balanced element span: `text == document[start..end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub start: usize,
    pub end: usize,
    pub tag_name: String,
    pub text: String,
    /// 1-based line of `start`
    pub line: usize,
    /// Element nesting depth, 0 for top-level elements
    pub depth: usize,
}

impl Block {
    pub fn line_count(&self) -> usize {
        line_span(&self.text)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Result of one extraction pass
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Balanced blocks meeting `min_block_lines`, ordered by start offset
    pub blocks: Vec<Block>,
    /// Number of balanced blocks before the line filter
    pub candidates: usize,
    /// Number of scanner events consumed
    pub events: usize,
}

#[derive(Debug)]
struct OpenElement<'a> {
    name: &'a str,
    start: usize,
    tainted: bool,
}

pub struct BlockExtractor<'c> {
    min_block_lines: usize,
    self_closing_tags: &'c BTreeSet<String>,
}

impl<'c> BlockExtractor<'c> {
    pub fn new(config: &'c ExtractorConfig) -> Self {
        Self {
            min_block_lines: config.min_block_lines,
            self_closing_tags: &config.self_closing_tags,
        }
    }

    /// Runs one pass over `text`, recording unbalanced elements in `diagnostics`.
    pub fn extract(&self, text: &str, diagnostics: &mut DiagnosticCollector) -> Extraction {
        let mut stack: Vec<OpenElement<'_>> = Vec::new();
        let mut extraction = Extraction::default();

        for event in Scanner::new(text, self.self_closing_tags) {
            extraction.events += 1;
            match event.kind {
                EventKind::OpenTag => stack.push(OpenElement {
                    name: event.name,
                    start: event.offset,
                    tainted: false,
                }),
                EventKind::SelfClose => {}
                EventKind::CloseTag => {
                    let Some(idx) = stack
                        .iter()
                        .rposition(|open| same_tag(open.name, event.name))
                    else {
                        if stack.is_empty() {
                            tracing::trace!("Ignoring stray </{}> at {}", event.name, event.offset);
                        } else {
                            diagnostics.report(
                                DiagnosticKind::UnbalancedBlock,
                                event.offset,
                                format!("closing tag </{}> matches no open element", event.name),
                            );
                            stack.iter_mut().for_each(|open| open.tainted = true);
                        }
                        continue;
                    };

                    if idx + 1 < stack.len() {
                        for open in stack.drain(idx + 1..).filter(|open| !open.tainted) {
                            report_unclosed(diagnostics, &open);
                        }
                        stack.iter_mut().for_each(|open| open.tainted = true);
                    }

                    let Some(open) = stack.pop() else { continue };
                    if open.tainted {
                        tracing::trace!("Discarding tainted <{}> at {}", open.name, open.start);
                        continue;
                    }

                    extraction.candidates += 1;
                    let block = Block {
                        start: open.start,
                        end: event.end,
                        tag_name: open.name.to_string(),
                        text: text[open.start..event.end].to_string(),
                        line: diagnostics.line_index().line_of(open.start),
                        depth: stack.len(),
                    };
                    if block.line_count() >= self.min_block_lines {
                        extraction.blocks.push(block);
                    }
                }
            }
        }

        for open in stack.iter().filter(|open| !open.tainted) {
            report_unclosed(diagnostics, open);
        }

        // Blocks finish in close order; downstream wants document order.
        extraction.blocks.sort_by_key(|block| block.start);

        tracing::debug!(
            "Extracted {} blocks ({} balanced candidates, {} events)",
            extraction.blocks.len(),
            extraction.candidates,
            extraction.events
        );
        extraction
    }
}

fn same_tag(open: &str, close: &str) -> bool {
    open.eq_ignore_ascii_case(close)
}

fn report_unclosed(diagnostics: &mut DiagnosticCollector, open: &OpenElement<'_>) {
    tracing::warn!("Element <{}> at offset {} is never closed", open.name, open.start);
    diagnostics.report(
        DiagnosticKind::UnbalancedBlock,
        open.start,
        format!("element <{}> is never closed", open.name),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(text: &str, min_block_lines: usize) -> (Extraction, Vec<crate::core::Diagnostic>) {
        let config = ExtractorConfig::default().with_min_block_lines(min_block_lines);
        let mut diagnostics = DiagnosticCollector::new(text);
        let extraction = BlockExtractor::new(&config).extract(text, &mut diagnostics);
        (extraction, diagnostics.into_sorted())
    }

    #[test]
    fn test_nested_blocks_in_document_order() {
        let text = "<ul>\n<li>a</li>\n<li>b</li>\n</ul>";
        let (extraction, diagnostics) = run(text, 1);
        assert!(diagnostics.is_empty());
        let spans: Vec<_> = extraction
            .blocks
            .iter()
            .map(|b| (b.tag_name.as_str(), b.start, b.depth))
            .collect();
        assert_eq!(spans, vec![("ul", 0, 0), ("li", 5, 1), ("li", 16, 1)]);
        assert_eq!(extraction.blocks[0].text, text);
        assert_eq!(extraction.blocks[1].text, "<li>a</li>");
        assert_eq!(extraction.blocks[2].line, 3);
    }

    #[test]
    fn test_min_block_lines_filters_small_elements() {
        let text = "<div>\n<p>x</p>\n</div>";
        let (extraction, _) = run(text, 3);
        assert_eq!(extraction.candidates, 2);
        assert_eq!(extraction.blocks.len(), 1);
        assert_eq!(extraction.blocks[0].tag_name, "div");
        assert_eq!(extraction.blocks[0].line_count(), 3);
    }

    #[test]
    fn test_unclosed_at_end_reports_start_offset() {
        let text = "<p>ok</p>\n<div>\n<span>x</span>\n";
        let (extraction, diagnostics) = run(text, 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnbalancedBlock);
        assert_eq!(diagnostics[0].offset, 10);
        assert!(extraction.blocks.iter().all(|b| b.tag_name != "div"));
        assert_eq!(extraction.blocks.len(), 2);
    }

    #[test]
    fn test_skipped_close_taints_ancestors() {
        let text = "<a><b><c></b></a><d></d>";
        let (extraction, diagnostics) = run(text, 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].offset, 6);
        let names: Vec<_> = extraction.blocks.iter().map(|b| b.tag_name.as_str()).collect();
        assert_eq!(names, vec!["d"]);
    }

    #[test]
    fn test_stray_close_on_empty_stack_is_ignored() {
        let text = "</x><p>y</p>";
        let (extraction, diagnostics) = run(text, 1);
        assert!(diagnostics.is_empty());
        assert_eq!(extraction.blocks.len(), 1);
    }

    #[test]
    fn test_unmatched_close_taints_open_elements() {
        let text = "<div><p>y</p></span></div>";
        let (extraction, diagnostics) = run(text, 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].offset, 13);
        let names: Vec<_> = extraction.blocks.iter().map(|b| b.tag_name.as_str()).collect();
        assert_eq!(names, vec!["p"]);
    }

    #[test]
    fn test_fake_tags_in_literal_do_not_split_block() {
        let text = "<div>\n{\"<section><p>\"}\n</div>";
        let (extraction, diagnostics) = run(text, 1);
        assert!(diagnostics.is_empty());
        assert_eq!(extraction.events, 2);
        assert_eq!(extraction.blocks.len(), 1);
        assert_eq!(extraction.blocks[0].start, 0);
        assert_eq!(extraction.blocks[0].end, text.len());
    }

    #[test]
    fn test_multiline_template_literal_stays_inside_block() {
        let text = "<section>\n  {`<b>one\n  <i>two</i>\n  </section> three`}\n</section>";
        let (extraction, diagnostics) = run(text, 1);
        assert!(diagnostics.is_empty());
        assert_eq!(extraction.events, 2);
        assert_eq!(extraction.blocks.len(), 1);
        assert_eq!(extraction.blocks[0].end, text.len());
        assert_eq!(extraction.blocks[0].line_count(), 5);

        let (extraction, _) = run(text, 6);
        assert!(extraction.blocks.is_empty());
    }

    #[test]
    fn test_void_elements_do_not_open_blocks() {
        let text = "<div><br><img src=\"x\"></div>";
        let (extraction, diagnostics) = run(text, 1);
        assert!(diagnostics.is_empty());
        assert_eq!(extraction.blocks.len(), 1);
    }
}
