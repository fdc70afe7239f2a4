//! Labeling & cleanup (§4.4): decides SERIES / PARALLEL / PRIME for a freshly assembled
//! internal node, then normalizes the tree so that no SERIES node has a SERIES child, no
//! PARALLEL node has a PARALLEL child, and no internal node has exactly one child.

use crate::error::{Error, Phase, Result};
use crate::forest::{Forest, Label, NodeId};
use crate::graph::Graph;

/// Labels `node` by comparing one representative leaf per child against every other.
/// Every pair of distinct children of a true module agrees on the cross-child relation —
/// that is what makes the quotient well-defined — so a single representative per child
/// suffices. The full pairwise matrix is computed regardless of the verdict (not just up
/// to the first disagreement), since a PRIME node keeps it as its quotient matrix, the
/// adjacency relation between children representatives that [`crate::tree::MDTree`]'s
/// reconstruction needs to rebuild exactly the edges a SERIES/PARALLEL label alone
/// cannot recover.
#[tracing::instrument(level = "trace", skip(forest, graph), fields(?node))]
pub(crate) fn assign_label(forest: &mut Forest, graph: &Graph, node: NodeId) -> Result<()> {
    let children: Vec<NodeId> = forest.children(node).collect();

    #[cfg(debug_assertions)]
    debug_assert!(children.len() >= 2, "an assembled internal node has fewer than two children");
    #[cfg(not(debug_assertions))]
    {
        if children.len() < 2 {
            return Err(Error::InternalInvariant {
                phase: Phase::Labeling,
                detail: "an assembled internal node has fewer than two children",
                node: None,
            });
        }
    }

    let reps: Vec<_> = children.iter().map(|&c| forest.min_leaf(c)).collect();
    let n = reps.len();
    let mut matrix = vec![vec![false; n]; n];
    let mut all_edges = true;
    let mut all_non_edges = true;
    for i in 0..n {
        for j in (i + 1)..n {
            let edge = graph.has_edge(reps[i], reps[j]);
            matrix[i][j] = edge;
            matrix[j][i] = edge;
            all_edges &= edge;
            all_non_edges &= !edge;
        }
    }

    let label = if all_edges {
        Label::Series
    } else if all_non_edges {
        Label::Parallel
    } else {
        forest.set_quotient(node, matrix);
        Label::Prime
    };
    tracing::trace!(?node, ?label, "assigned label");
    forest.set_label(node, label);
    Ok(())
}

/// Post-order collapse pass, run once over the finished forest's root.
#[tracing::instrument(level = "trace", skip(forest), fields(?node))]
pub(crate) fn finalize(forest: &mut Forest, node: NodeId) {
    if forest.is_leaf(node) {
        return;
    }
    for child in forest.children(node).collect::<Vec<_>>() {
        finalize(forest, child);
    }

    let label = forest.label(node);
    if matches!(label, Label::Series | Label::Parallel) {
        for child in forest.children(node).collect::<Vec<_>>() {
            if !forest.is_leaf(child) && forest.label(child) == label {
                tracing::trace!(?node, ?child, "collapsing same-labelled child");
                forest.promote(child);
            }
        }
        sort_children_by_min_leaf(forest, node);
    }

    if forest.num_children(node) == 1 {
        tracing::trace!(?node, "collapsing single-child node");
        forest.promote(node);
    }
}

fn sort_children_by_min_leaf(forest: &mut Forest, node: NodeId) {
    let mut children: Vec<NodeId> = forest.children(node).collect();
    children.sort_by_key(|&c| forest.min_leaf(c));
    for &c in &children {
        forest.detach(c);
    }
    for &c in &children {
        forest.append_child(Some(node), c);
    }
}
