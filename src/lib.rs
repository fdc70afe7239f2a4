//! Modular decomposition tree construction for finite, simple, undirected graphs.
//!
//! The pivot/recursion driver (§4.1) splits each call around a pivot vertex into
//! components, co-components, or a genuine prime case; the prime case is resolved by
//! refining `{N(p), Ñ(p)}` to a fixed point against every other vertex (the classical
//! Habib-Paul "refine by every vertex" procedure) rather than the amortized active-edge
//! automaton of the Tedder-Corneil-Habib-Paul algorithm — see `DESIGN.md` for why. This
//! trades the linear-time bound for a construction that is straightforward to verify by
//! hand; worst-case complexity is polynomial, not linear, in `|V|`.
//!
//! ```
//! use mdtree::Graph;
//!
//! let graph = Graph::new(3, [(0, 1), (0, 2), (1, 2)]).unwrap();
//! let tree = mdtree::decompose(&graph).unwrap();
//! let root = tree.root().unwrap();
//! assert_eq!(tree.label(root), mdtree::Label::Series);
//! ```

mod assembly;
pub mod error;
pub mod graph;
mod forest;
mod label;
mod pivot;
mod refine;
pub mod tree;

pub use error::{Error, InvalidGraph, Result};
pub use graph::Graph;
pub use tree::{Label, MDTree, TreeNode};

/// Computes the modular decomposition tree of `graph`.
///
/// Runs the pivot/recursion driver (§4.1) over the whole vertex set, then a single
/// cleanup pass (§4.4) over the resulting root. `Ok` always holds a complete tree:
/// runtime errors here indicate a core bug (an [`Error::InternalInvariant`]), never a
/// malformed `graph`, since `Graph` can only be constructed from already-valid input.
#[tracing::instrument(level = "debug", skip(graph), fields(n = graph.len()))]
pub fn decompose(graph: &Graph) -> Result<MDTree> {
    let vertices: Vec<graph::Node> = graph.vertices().collect();
    let mut forest = pivot::decompose_rec(graph, &vertices, 0)?;
    let root = forest.roots().next();
    if let Some(root) = root {
        tracing::trace!(?root, "cleaning up assembled forest");
        label::finalize(&mut forest, root);
    }
    tree::MDTree::from_forest(forest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_decomposes_to_empty_tree() {
        let graph = Graph::new(0, []).unwrap();
        let tree = decompose(&graph).unwrap();
        assert!(tree.root().is_none());
        assert_eq!(tree.leaf_count(), 0);
    }

    #[test]
    fn single_vertex_decomposes_to_a_leaf() {
        let graph = Graph::new(1, []).unwrap();
        let tree = decompose(&graph).unwrap();
        let root = tree.root().unwrap();
        assert!(tree.is_leaf(root));
        assert_eq!(tree.vertex(root), 0);
    }

    #[test]
    fn isolated_vertices_are_parallel() {
        let graph = Graph::new(3, []).unwrap();
        let tree = decompose(&graph).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.label(root), Label::Parallel);
        let children = tree.children(root);
        assert_eq!(children.len(), 3);
        let mut vs: Vec<_> = children.iter().map(|&c| tree.vertex(c)).collect();
        vs.sort();
        assert_eq!(vs, vec![0, 1, 2]);
    }

    #[test]
    fn clique_is_series() {
        let graph = Graph::new(3, [(0, 1), (0, 2), (1, 2)]).unwrap();
        let tree = decompose(&graph).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.label(root), Label::Series);
    }

    #[test]
    fn path_of_four_is_prime() {
        let graph = Graph::new(4, [(0, 1), (1, 2), (2, 3)]).unwrap();
        let tree = decompose(&graph).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.label(root), Label::Prime);
        assert_eq!(tree.children(root).len(), 4);
    }

    #[test]
    fn co_path_of_four_is_prime() {
        // Complement of P4: edges {02, 03, 13}.
        let graph = Graph::new(4, [(0, 2), (0, 3), (1, 3)]).unwrap();
        let tree = decompose(&graph).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.label(root), Label::Prime);
        assert_eq!(tree.children(root).len(), 4);
    }

    #[test]
    fn bowtie_nests_series_parallel_series() {
        let graph =
            Graph::new(5, [(0, 1), (1, 2), (2, 0), (0, 3), (3, 4), (4, 0)]).unwrap();
        let tree = decompose(&graph).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.label(root), Label::Series);
        let top_children = tree.children(root);
        assert_eq!(top_children.len(), 2);

        let (leaf, inner) = if tree.is_leaf(top_children[0]) {
            (top_children[0], top_children[1])
        } else {
            (top_children[1], top_children[0])
        };
        assert_eq!(tree.vertex(leaf), 0);
        assert_eq!(tree.label(inner), Label::Parallel);

        let triangles = tree.children(inner);
        assert_eq!(triangles.len(), 2);
        for &t in &triangles {
            assert_eq!(tree.label(t), Label::Series);
            assert_eq!(tree.children(t).len(), 2);
        }
    }

    #[test]
    fn disjoint_union_of_two_edges_is_parallel_of_series() {
        let graph = Graph::new(4, [(0, 1), (2, 3)]).unwrap();
        let tree = decompose(&graph).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.label(root), Label::Parallel);
        let children = tree.children(root);
        assert_eq!(children.len(), 2);
        for &c in &children {
            assert_eq!(tree.label(c), Label::Series);
            assert_eq!(tree.children(c).len(), 2);
        }
    }

    #[test]
    fn every_internal_node_is_a_module() {
        // (P1): for a handful of graphs, every internal node's leaf set is a module —
        // every outside vertex is either adjacent to all of it or none of it.
        let graphs = [
            Graph::new(5, [(0, 1), (1, 2), (2, 0), (0, 3), (3, 4), (4, 0)]).unwrap(),
            Graph::new(4, [(0, 1), (1, 2), (2, 3)]).unwrap(),
            Graph::new(6, [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (0, 5), (0, 2)]).unwrap(),
        ];
        for graph in graphs {
            let tree = decompose(&graph).unwrap();
            if let Some(root) = tree.root() {
                assert_module_property(&graph, &tree, root);
            }
        }
    }

    fn assert_module_property(graph: &Graph, tree: &MDTree, node: tree::TreeNode) {
        if tree.is_leaf(node) {
            return;
        }
        let mut members = Vec::new();
        collect_leaves(tree, node, &mut members);
        let member_set: std::collections::HashSet<_> = members.iter().copied().collect();
        for v in graph.vertices() {
            if member_set.contains(&v) {
                continue;
            }
            let adjacencies: Vec<bool> = members.iter().map(|&m| graph.has_edge(v, m)).collect();
            assert!(
                adjacencies.iter().all(|&b| b) || adjacencies.iter().all(|&b| !b),
                "vertex {v} splits the module {members:?}"
            );
        }
        for child in tree.children(node) {
            assert_module_property(graph, tree, child);
        }
    }

    fn collect_leaves(tree: &MDTree, node: tree::TreeNode, out: &mut Vec<graph::Node>) {
        if tree.is_leaf(node) {
            out.push(tree.vertex(node));
        } else {
            for child in tree.children(node) {
                collect_leaves(tree, child, out);
            }
        }
    }
}
