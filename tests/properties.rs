//! Property-based tests over generated well-formed documents
//!
//! Documents are random element trees mixing plain text, expression slots,
//! void tags and string literals that contain tag-like text.

use component_miner::blocks::BlockExtractor;
use component_miner::core::DiagnosticCollector;
use component_miner::{
    extract_components, EventKind, ExtractionEngine, ExtractorConfig, Normalizer, Scanner,
};
use proptest::prelude::*;

/// Marks where a string literal's content goes
const LITERAL: &str = "@LIT@";

fn literal_content_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("<b>not a tag</b>".to_string()),
        Just("</div><span>".to_string()),
        Just("{<p>}".to_string()),
        "[a-z ]{0,12}",
    ]
}

fn leaf_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,8}( [a-z]{1,8}){0,3}",
        (0u32..100).prop_map(|n| format!("{{count + {}}}", n)),
        Just(format!("{{\"{}\"}}", LITERAL)),
        Just("<br>".to_string()),
    ]
}

fn element_strategy() -> impl Strategy<Value = String> {
    leaf_strategy().prop_recursive(4, 48, 4, |inner| {
        (
            prop::sample::select(vec!["div", "span", "li", "p"]),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, children)| format!("<{tag}>\n{}\n</{tag}>", children.join("\n")))
    })
}

fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(element_strategy(), 1..6)
        .prop_map(|parts| format!("<main>\n{}\n</main>\n", parts.join("\n")))
}

fn fill(template: &str, content: &str) -> String {
    template.replace(LITERAL, content)
}

fn event_shape(text: &str, config: &ExtractorConfig) -> Vec<(EventKind, String)> {
    Scanner::new(text, &config.self_closing_tags)
        .map(|event| (event.kind, event.name.to_string()))
        .collect()
}

#[cfg(test)]
mod pipeline_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_extraction_is_deterministic(
            template in document_strategy(),
            content in literal_content_strategy(),
        ) {
            let document = fill(&template, &content);
            let engine = ExtractionEngine::new(ExtractorConfig::default().with_min_block_lines(1)).unwrap();
            prop_assert_eq!(engine.extract(&document), engine.extract(&document));
        }

        #[test]
        fn test_balanced_documents_have_no_diagnostics(
            template in document_strategy(),
            content in literal_content_strategy(),
        ) {
            let document = fill(&template, &content);
            let config = ExtractorConfig::default().with_min_block_lines(1);
            let report = extract_components(&document, &config).unwrap();
            prop_assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        }

        #[test]
        fn test_every_block_is_balanced(
            template in document_strategy(),
            content in literal_content_strategy(),
        ) {
            let document = fill(&template, &content);
            let config = ExtractorConfig::default().with_min_block_lines(1);
            let mut diagnostics = DiagnosticCollector::new(&document);
            let extraction = BlockExtractor::new(&config).extract(&document, &mut diagnostics);
            prop_assert!(!extraction.blocks.is_empty());

            for block in &extraction.blocks {
                prop_assert_eq!(&document[block.start..block.end], block.text.as_str());
                let mut depth: i64 = 0;
                for event in Scanner::new(&block.text, &config.self_closing_tags) {
                    match event.kind {
                        EventKind::OpenTag => depth += 1,
                        EventKind::CloseTag => depth -= 1,
                        EventKind::SelfClose => {}
                    }
                    prop_assert!(depth >= 0);
                }
                prop_assert_eq!(depth, 0);
            }
        }

        #[test]
        fn test_literal_content_never_changes_events(
            template in document_strategy(),
            first in literal_content_strategy(),
            second in literal_content_strategy(),
        ) {
            let config = ExtractorConfig::default();
            prop_assert_eq!(
                event_shape(&fill(&template, &first), &config),
                event_shape(&fill(&template, &second), &config)
            );
        }

        #[test]
        fn test_occurrences_share_component_signature(
            template in document_strategy(),
            content in literal_content_strategy(),
        ) {
            let document = fill(&template, &content);
            let config = ExtractorConfig::default().with_min_block_lines(1);
            let report = extract_components(&document, &config).unwrap();
            let normalizer = Normalizer::new(&config);

            for component in &report.components {
                let mut count = 0;
                for entry in report.occurrences_of(&component.name) {
                    let text = &document[entry.start..entry.end];
                    prop_assert_eq!(normalizer.signature(text), component.signature);
                    count += 1;
                }
                prop_assert_eq!(count, component.occurrence_count);
                prop_assert!(count >= config.min_occurrences);
            }
        }

        #[test]
        fn test_limits_are_respected(
            template in document_strategy(),
            content in literal_content_strategy(),
        ) {
            let document = fill(&template, &content);
            let config = ExtractorConfig::default()
                .with_min_block_lines(1)
                .with_max_components(2)
                .with_max_params(1);
            let report = extract_components(&document, &config).unwrap();

            prop_assert!(report.components.len() <= 2);
            for component in &report.components {
                prop_assert!(component.params.len() <= 1);
                let names: Vec<&str> = component.params.iter().map(|p| p.name.as_str()).collect();
                for entry in report.occurrences_of(&component.name) {
                    let keys: Vec<&str> = entry.arguments.keys().map(String::as_str).collect();
                    prop_assert_eq!(&keys, &names);
                }
            }
        }
    }
}
