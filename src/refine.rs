//! Partition refinement: turns the initial `{N(p), Ñ(p)}` split into the partition of
//! `S \ {p}` into its maximal strong modules not containing the pivot `p`.
//!
//! This is the textbook "refine by every vertex" procedure (Habib-Paul): repeatedly pick
//! a refiner `v` and cut every current class into `class ∩ N(v)` and `class \ N(v)`,
//! dropping empty halves, until a full pass over all refiners leaves every class intact.
//! `v` never needs special-casing when it is itself a member of the class being cut,
//! since `v` is never adjacent to itself and so always lands in the "non-adjacent" half.

use crate::graph::{Graph, Node};

/// Refines `classes` against every vertex in `refiners`, in place, to a fixed point.
#[tracing::instrument(level = "trace", skip(graph, classes, refiners), fields(class_count = classes.len(), refiner_count = refiners.len()))]
pub(crate) fn refine_to_fixpoint(graph: &Graph, mut classes: Vec<Vec<Node>>, refiners: &[Node]) -> Vec<Vec<Node>> {
    let mut changed = true;
    let mut pass = 0;
    while changed {
        changed = false;
        pass += 1;
        for &v in refiners {
            let mut next = Vec::with_capacity(classes.len());
            for class in classes.drain(..) {
                if class.len() <= 1 {
                    next.push(class);
                    continue;
                }
                let (adjacent, rest): (Vec<Node>, Vec<Node>) =
                    class.into_iter().partition(|&u| graph.has_edge(u, v));
                match (adjacent.is_empty(), rest.is_empty()) {
                    (true, _) => next.push(rest),
                    (_, true) => next.push(adjacent),
                    (false, false) => {
                        changed = true;
                        tracing::trace!(refiner = v, "splitting class around refiner");
                        next.push(adjacent);
                        next.push(rest);
                    }
                }
            }
            classes = next;
        }
    }
    tracing::trace!(passes = pass, class_count = classes.len(), "refinement fixed point reached");
    classes
}
