/*!
# Cluster Index

Groups blocks by signature and ranks the groups that pass the occurrence
threshold. Ranking order:

1. member count, descending;
2. representative line count, descending;
3. representative start offset, ascending.

A block belongs to exactly one group, so representative offsets are unique
and the order is total.
*/

use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::blocks::Block;
use crate::normalizer::{Normalizer, Signature};

/// Blocks sharing a signature. Members are ordered by start offset; the first
/// member is the representative.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub signature: Signature,
    pub members: Vec<Block>,
}

impl Cluster {
    pub fn representative(&self) -> &Block {
        // never empty: clusters are built from non-empty groups
        &self.members[0]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ClusterIndex {
    groups: HashMap<Signature, Vec<Block>>,
}

impl ClusterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every block under its normalized signature.
    pub fn build(normalizer: &Normalizer<'_>, blocks: Vec<Block>) -> Self {
        let mut index = Self::new();
        for block in blocks {
            let signature = normalizer.signature(&block.text);
            tracing::trace!(
                "Block <{}> at line {} -> {}",
                block.tag_name,
                block.line,
                signature.short()
            );
            index.insert(signature, block);
        }
        index
    }

    pub fn insert(&mut self, signature: Signature, block: Block) {
        self.groups.entry(signature).or_default().push(block);
    }

    /// Number of distinct signatures seen
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Groups with at least `min_occurrences` members, ranked.
    pub fn into_clusters(self, min_occurrences: usize) -> Vec<Cluster> {
        let mut clusters: Vec<Cluster> = self
            .groups
            .into_iter()
            .filter(|(_, members)| !members.is_empty() && members.len() >= min_occurrences)
            .map(|(signature, mut members)| {
                members.sort_by_key(|block| block.start);
                Cluster { signature, members }
            })
            .collect();

        clusters.sort_by_key(|cluster| {
            let representative = cluster.representative();
            (
                Reverse(cluster.len()),
                Reverse(representative.line_count()),
                representative.start,
            )
        });

        tracing::debug!(
            "{} clusters with at least {} members",
            clusters.len(),
            min_occurrences
        );
        clusters
    }
}
