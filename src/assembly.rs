//! Assembly (§4.3): places the pivot and its refined classes as children of the new
//! internal node and recurses into each class to build its own subtree.
//!
//! Since the pivot and the classes coming out of [`crate::refine`] are exactly the
//! maximal strong modules partitioning `S`, *any* fixed deterministic order over them is
//! a valid assembly (the module property does not constrain sibling order, only which
//! vertices are grouped together) — so this orders them by minimum member vertex rather
//! than replaying the outward sweep's split-tag bookkeeping.

use crate::error::{Error, Phase, Result};
use crate::forest::{Forest, NodeId};
use crate::graph::{Graph, Node};
use crate::pivot::decompose_rec;

/// One child-to-be of the node under assembly: either the bare pivot, or a class that
/// still needs its own recursive decomposition.
enum PendingChild {
    Pivot(Node),
    Class(Vec<Node>),
}

impl PendingChild {
    fn min_vertex(&self) -> Node {
        match self {
            PendingChild::Pivot(v) => *v,
            PendingChild::Class(c) => *c.iter().min().expect("a refined class is never empty"),
        }
    }
}

/// Appends the pivot and every class in `classes` as children of `root`, in ascending
/// minimum-vertex order, recursing into classes via [`decompose_rec`]. `depth` is the
/// recursion depth of the enclosing call, purely for diagnostics.
#[tracing::instrument(level = "trace", skip(forest, graph, classes), fields(depth, pivot, class_count = classes.len()))]
pub(crate) fn assemble_prime_children(
    forest: &mut Forest,
    root: NodeId,
    graph: &Graph,
    pivot: Node,
    classes: Vec<Vec<Node>>,
    depth: usize,
) -> Result<()> {
    #[cfg(debug_assertions)]
    debug_assert!(classes.iter().all(|c| !c.is_empty()), "refinement produced an empty class");
    #[cfg(not(debug_assertions))]
    {
        if classes.iter().any(|c| c.is_empty()) {
            return Err(Error::InternalInvariant {
                phase: Phase::Assembly,
                detail: "refinement produced an empty class",
                node: None,
            });
        }
    }

    let mut children: Vec<PendingChild> = classes.into_iter().map(PendingChild::Class).collect();
    children.push(PendingChild::Pivot(pivot));
    children.sort_by_key(PendingChild::min_vertex);

    for child in children {
        match child {
            PendingChild::Pivot(v) => {
                tracing::trace!(depth, vertex = v, "placing pivot leaf");
                let leaf = forest.push_leaf_root(v);
                forest.detach(leaf);
                forest.append_child(Some(root), leaf);
            }
            PendingChild::Class(class) => {
                tracing::trace!(depth, class_len = class.len(), "recursing into refined class");
                let sub = decompose_rec(graph, &class, depth)?;
                forest.graft_children(root, sub);
            }
        }
    }
    Ok(())
}
