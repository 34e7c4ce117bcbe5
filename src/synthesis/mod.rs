/*!
# Component Synthesis

Turns ranked clusters into components and an occurrence map.

- **Name**: see [`naming`]; unique across one run.
- **Params**: referenced slot identifiers of the representative, sorted by
  name and truncated to `max_params`. Every referenced identifier becomes a
  parameter, whether or not its value differs between members.
- **Body**: the representative's text, unchanged. Parameters keep their
  original identifier names.
- **Occurrences**: one entry per member. Members share the signature, so the
  identifier at the representative's ordinal for a parameter is that
  member's argument.
*/

pub mod naming;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzer::variables::{reference_ordinals, SlotIdentifier, Variable, VariableAnalyzer};
use crate::cluster::Cluster;
use crate::config::ExtractorConfig;
use crate::normalizer::Signature;
use naming::{derive_name, NameRegistry};

/// A parameterized definition for one cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    pub params: Vec<Variable>,
    pub body: String,
    pub occurrence_count: usize,
    pub signature: Signature,
    pub tag_name: String,
    pub line_count: usize,
}

/// Where a component would replace an original block, with its arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceEntry {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub component_name: String,
    pub arguments: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct Synthesis {
    pub components: Vec<Component>,
    pub occurrences: Vec<OccurrenceEntry>,
}

pub struct ComponentSynthesizer<'c> {
    max_components: usize,
    max_params: usize,
    analyzer: VariableAnalyzer<'c>,
}

impl<'c> ComponentSynthesizer<'c> {
    pub fn new(config: &'c ExtractorConfig) -> Self {
        Self {
            max_components: config.max_components,
            max_params: config.max_params,
            analyzer: VariableAnalyzer::new(config),
        }
    }

    /// Synthesizes up to `max_components` components from ranked clusters.
    /// `document` is the full text the cluster members were cut from.
    pub fn synthesize(&self, document: &str, clusters: &[Cluster]) -> Synthesis {
        let mut registry = NameRegistry::new();
        let mut synthesis = Synthesis::default();

        for (i, cluster) in clusters.iter().take(self.max_components).enumerate() {
            let representative = cluster.representative();
            let name = registry.claim(derive_name(document, representative, i + 1));

            let identifiers = self.analyzer.slot_identifiers(&representative.text);
            let chosen: Vec<(String, usize)> = reference_ordinals(&identifiers)
                .into_iter()
                .take(self.max_params)
                .collect();
            let params: Vec<Variable> = chosen
                .iter()
                .map(|(param, _)| Variable::new(param.as_str()))
                .collect();

            tracing::trace!(
                "Component {} from {} blocks, params: {:?}",
                name,
                cluster.len(),
                params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
            );

            for member in &cluster.members {
                let member_identifiers = if member.start == representative.start {
                    identifiers.clone()
                } else {
                    self.analyzer.slot_identifiers(&member.text)
                };
                synthesis.occurrences.push(OccurrenceEntry {
                    start: member.start,
                    end: member.end,
                    line: member.line,
                    component_name: name.clone(),
                    arguments: arguments(&chosen, &member_identifiers),
                });
            }

            synthesis.components.push(Component {
                name,
                params,
                body: representative.text.clone(),
                occurrence_count: cluster.len(),
                signature: cluster.signature,
                tag_name: representative.tag_name.clone(),
                line_count: representative.line_count(),
            });
        }

        if clusters.len() > self.max_components {
            tracing::debug!(
                "Kept {} of {} clusters (max_components)",
                self.max_components,
                clusters.len()
            );
        }
        synthesis
    }
}

/// Argument per parameter: the member's identifier at the aligned ordinal.
fn arguments(
    chosen: &[(String, usize)],
    member_identifiers: &[SlotIdentifier],
) -> BTreeMap<String, String> {
    chosen
        .iter()
        .map(|(param, ordinal)| {
            let value = member_identifiers
                .get(*ordinal)
                .map_or_else(|| param.clone(), |id| id.name.clone());
            (param.clone(), value)
        })
        .collect()
}
