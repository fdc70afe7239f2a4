//! Pivot selection & recursion driver (§4.1): splits a vertex set around a pivot into
//! components, co-components, or (failing both) a genuine prime case, and recurses.
//!
//! Rather than reconstructing the fully amortized active-edge refinement machinery for
//! the general case, the component/co-component shortcut is taken first: a disconnected
//! induced subgraph's maximal strong modules are exactly its connected components
//! (dually for the complement), a classical fact that resolves every non-prime call
//! without touching [`crate::refine`] at all. Only when both the graph and its
//! complement are connected does the pivot/refine path run.

use hashbrown::HashSet;

use crate::assembly;
use crate::error::{Error, Phase, Result};
use crate::forest::Forest;
use crate::graph::{Graph, Node};
use crate::label;
use crate::refine;

/// Builds the raw forest for `s`: a single leaf for a singleton, an empty forest for the
/// empty set, and otherwise exactly one internal root labelled by [`label::assign_label`].
/// `depth` is the recursion depth of this call, purely for diagnostics.
#[tracing::instrument(level = "trace", skip(graph, s), fields(depth, s_len = s.len()))]
pub(crate) fn decompose_rec(graph: &Graph, s: &[Node], depth: usize) -> Result<Forest> {
    match s.len() {
        0 => return Ok(Forest::new()),
        1 => {
            let mut forest = Forest::new();
            forest.push_leaf_root(s[0]);
            return Ok(forest);
        }
        _ => {}
    }

    let components = connected_components(graph, s);
    if components.len() > 1 {
        tracing::trace!(depth, count = components.len(), "induced subgraph is disconnected");
        return build_degenerate_root(graph, components, depth);
    }

    let co_components = connected_components_complement(graph, s);
    if co_components.len() > 1 {
        tracing::trace!(depth, count = co_components.len(), "complement is disconnected");
        return build_degenerate_root(graph, co_components, depth);
    }

    tracing::trace!(depth, "graph and complement both connected, entering prime case");
    build_prime_root(graph, s, depth)
}

/// Builds the PARALLEL/SERIES root over `groups` (components or co-components), each
/// group recursed independently and grafted on in ascending minimum-vertex order.
#[tracing::instrument(level = "trace", skip(graph, groups), fields(depth, group_count = groups.len()))]
fn build_degenerate_root(graph: &Graph, mut groups: Vec<Vec<Node>>, depth: usize) -> Result<Forest> {
    groups.sort_by_key(|g| *g.iter().min().expect("a connected component is never empty"));

    let mut forest = Forest::new();
    let root = forest.push_internal_root();
    for group in groups {
        let sub = decompose_rec(graph, &group, depth + 1)?;
        forest.graft_children(root, sub);
    }
    label::assign_label(&mut forest, graph, root)?;
    Ok(forest)
}

/// Pivot/N(p)/Ñ(p) split (§4.1), refined into the maximal strong modules not containing
/// the pivot (§4.2, via [`refine::refine_to_fixpoint`]), then assembled (§4.3).
#[tracing::instrument(level = "trace", skip(graph, s), fields(depth, s_len = s.len()))]
fn build_prime_root(graph: &Graph, s: &[Node], depth: usize) -> Result<Forest> {
    let pivot = s[0];
    let rest = &s[1..];

    let (neighbors, non_neighbors): (Vec<Node>, Vec<Node>) =
        rest.iter().copied().partition(|&v| graph.has_edge(pivot, v));

    let mut classes = Vec::with_capacity(2);
    if !neighbors.is_empty() {
        classes.push(neighbors);
    }
    if !non_neighbors.is_empty() {
        classes.push(non_neighbors);
    }

    #[cfg(debug_assertions)]
    debug_assert_eq!(
        classes.len(),
        2,
        "a call reaching the prime case has both a connected graph and a connected \
         complement, so the pivot has a neighbour and a non-neighbour in s"
    );
    #[cfg(not(debug_assertions))]
    {
        if classes.len() != 2 {
            return Err(Error::InternalInvariant {
                phase: Phase::Pivot,
                detail: "prime case reached with no neighbour or no non-neighbour of the pivot",
                node: None,
            });
        }
    }

    let classes = refine::refine_to_fixpoint(graph, classes, rest);
    tracing::trace!(depth, class_count = classes.len(), "refinement reached its fixed point");

    let mut forest = Forest::new();
    let root = forest.push_internal_root();
    assembly::assemble_prime_children(&mut forest, root, graph, pivot, classes, depth)?;
    label::assign_label(&mut forest, graph, root)?;
    Ok(forest)
}

fn connected_components(graph: &Graph, s: &[Node]) -> Vec<Vec<Node>> {
    let members: HashSet<Node> = s.iter().copied().collect();
    let mut visited: HashSet<Node> = HashSet::new();
    let mut components = Vec::new();
    for &start in s {
        if !visited.insert(start) {
            continue;
        }
        let mut stack = vec![start];
        let mut component = Vec::new();
        while let Some(v) = stack.pop() {
            component.push(v);
            for &w in graph.neighbors(v) {
                if members.contains(&w) && visited.insert(w) {
                    stack.push(w);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Same traversal, but over the complement of `graph` restricted to `s`: `v` and `w` are
/// adjacent here exactly when they are distinct members of `s` with no edge in `graph`.
fn connected_components_complement(graph: &Graph, s: &[Node]) -> Vec<Vec<Node>> {
    let mut visited: HashSet<Node> = HashSet::new();
    let mut components = Vec::new();
    for &start in s {
        if !visited.insert(start) {
            continue;
        }
        let mut stack = vec![start];
        let mut component = Vec::new();
        while let Some(v) = stack.pop() {
            component.push(v);
            for &w in s {
                if w != v && !graph.has_edge(v, w) && visited.insert(w) {
                    stack.push(w);
                }
            }
        }
        components.push(component);
    }
    components
}
