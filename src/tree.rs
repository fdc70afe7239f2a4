//! The output MD-tree: an immutable, petgraph-backed view of a finished [`Forest`].
//!
//! Modelled after `free_fermions::graph::algorithms::modular_decomposition::Tree`: a
//! `petgraph::graph::DiGraph` of node payloads with parent-to-child edges, plus an
//! `is_equivalent` comparison that treats SERIES/PARALLEL children as unordered and
//! leaves as interchangeable, so isomorphic inputs compare equal regardless of the
//! particular vertex numbering (§8, P3).

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::Result;
use crate::forest::{self, Forest};
use crate::graph::{Graph, Node};

/// SERIES / PARALLEL / PRIME, as decided by [`crate::label::assign_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Label {
    Series,
    Parallel,
    Prime,
}

impl From<forest::Label> for Label {
    fn from(label: forest::Label) -> Self {
        match label {
            forest::Label::Series => Label::Series,
            forest::Label::Parallel => Label::Parallel,
            forest::Label::Prime => Label::Prime,
            forest::Label::Unknown => {
                unreachable!("a finished tree never carries an unlabelled internal node")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum Payload {
    Leaf(Node),
    /// `quotient` is the PRIME adjacency matrix (`None` for SERIES/PARALLEL, whose
    /// cross-child adjacency is already fully determined by `label` alone).
    Internal { label: Label, quotient: Option<Vec<Vec<bool>>> },
}

/// An identifier for a node of an [`MDTree`]. Stable for the lifetime of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeNode(NodeIndex);

/// The modular decomposition tree of a [`crate::Graph`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MDTree {
    graph: DiGraph<Payload, ()>,
    root: Option<NodeIndex>,
}

impl MDTree {
    pub(crate) fn from_forest(forest: Forest) -> Result<Self> {
        let mut graph = DiGraph::new();
        let root = match forest.roots().next() {
            None => None,
            Some(r) => Some(build(&forest, r, &mut graph)),
        };
        Ok(MDTree { graph, root })
    }

    /// Root of the tree, or `None` for the empty graph's empty tree.
    #[inline]
    pub fn root(&self) -> Option<TreeNode> {
        self.root.map(TreeNode)
    }

    /// Number of vertices of the decomposed graph (i.e. the number of leaves).
    pub fn leaf_count(&self) -> usize {
        self.graph.node_weights().filter(|p| matches!(p, Payload::Leaf(_))).count()
    }

    #[inline]
    pub fn is_leaf(&self, node: TreeNode) -> bool {
        matches!(self.graph[node.0], Payload::Leaf(_))
    }

    /// The vertex at a leaf node. Panics if `node` is internal.
    pub fn vertex(&self, node: TreeNode) -> Node {
        match &self.graph[node.0] {
            Payload::Leaf(v) => *v,
            Payload::Internal { .. } => panic!("vertex() called on an internal tree node"),
        }
    }

    /// The label of an internal node. Panics if `node` is a leaf.
    pub fn label(&self, node: TreeNode) -> Label {
        match &self.graph[node.0] {
            Payload::Internal { label, .. } => *label,
            Payload::Leaf(_) => panic!("label() called on a leaf tree node"),
        }
    }

    /// The PRIME adjacency matrix captured at labeling time: `matrix[i][j]` is whether
    /// child `i` and child `j` (in `children()` order) are adjacent. `None` for leaves
    /// and for SERIES/PARALLEL nodes, whose cross-child adjacency is already implied by
    /// the label.
    pub fn quotient_matrix(&self, node: TreeNode) -> Option<&Vec<Vec<bool>>> {
        match &self.graph[node.0] {
            Payload::Internal { quotient, .. } => quotient.as_ref(),
            Payload::Leaf(_) => None,
        }
    }

    /// Children of `node`, left to right. Empty for a leaf.
    pub fn children(&self, node: TreeNode) -> Vec<TreeNode> {
        let mut out: Vec<NodeIndex> =
            self.graph.neighbors_directed(node.0, Direction::Outgoing).collect();
        out.reverse(); // petgraph hands back edges in reverse insertion order
        out.into_iter().map(TreeNode).collect()
    }

    /// Whether `self` and `other` have the same shape up to leaf identity and
    /// SERIES/PARALLEL child reordering (§8, P3). PRIME children must match in order,
    /// since a prime quotient carries no symmetry to exploit.
    pub fn is_equivalent(&self, other: &MDTree) -> bool {
        match (self.root, other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => nodes_equivalent(self, a, other, b),
            _ => false,
        }
    }

    /// Rebuilds the edge relation the tree implies (§8, P6): for any two leaves, the
    /// node at which their paths to the root first diverge decides adjacency — SERIES
    /// children are pairwise complete, PARALLEL children pairwise edgeless, and PRIME
    /// children follow [`Self::quotient_matrix`]. Round-tripping a decomposed graph
    /// through `decompose` then `reconstruct` yields the original edge set exactly.
    pub fn reconstruct(&self) -> Graph {
        let n = self.leaf_count();
        let mut edges = Vec::new();
        if let Some(root) = self.root {
            collect_edges(self, TreeNode(root), &mut edges);
        }
        Graph::new(n, edges).expect("a reconstruction from a valid tree is always a valid graph")
    }
}

fn build(forest: &Forest, id: forest::NodeId, graph: &mut DiGraph<Payload, ()>) -> NodeIndex {
    let payload = if forest.is_leaf(id) {
        Payload::Leaf(forest.vertex(id))
    } else {
        Payload::Internal { label: forest.label(id).into(), quotient: forest.quotient(id).cloned() }
    };
    let idx = graph.add_node(payload);
    if !forest.is_leaf(id) {
        for child in forest.children(id) {
            let child_idx = build(forest, child, graph);
            graph.add_edge(idx, child_idx, ());
        }
    }
    idx
}

fn nodes_equivalent(t1: &MDTree, a: NodeIndex, t2: &MDTree, b: NodeIndex) -> bool {
    match (&t1.graph[a], &t2.graph[b]) {
        (Payload::Leaf(_), Payload::Leaf(_)) => true,
        (Payload::Internal { label: l1, .. }, Payload::Internal { label: l2, .. }) if l1 == l2 => {
            let c1 = t1.children(TreeNode(a));
            let c2 = t2.children(TreeNode(b));
            if c1.len() != c2.len() {
                return false;
            }
            if *l1 == Label::Prime {
                return c1.iter().zip(c2.iter()).all(|(&x, &y)| nodes_equivalent(t1, x.0, t2, y.0));
            }
            let mut used = vec![false; c2.len()];
            for &x in &c1 {
                let Some(slot) = used
                    .iter()
                    .enumerate()
                    .position(|(j, &taken)| !taken && nodes_equivalent(t1, x.0, t2, c2[j].0))
                else {
                    return false;
                };
                used[slot] = true;
            }
            true
        }
        _ => false,
    }
}

/// Collects edges implied under `node` into `edges` and returns `node`'s leaf set.
fn collect_edges(tree: &MDTree, node: TreeNode, edges: &mut Vec<(Node, Node)>) -> Vec<Node> {
    if tree.is_leaf(node) {
        return vec![tree.vertex(node)];
    }
    let children = tree.children(node);
    let child_leaves: Vec<Vec<Node>> =
        children.iter().map(|&c| collect_edges(tree, c, edges)).collect();
    let label = tree.label(node);
    let quotient = tree.quotient_matrix(node);

    for i in 0..child_leaves.len() {
        for j in (i + 1)..child_leaves.len() {
            let adjacent = match label {
                Label::Series => true,
                Label::Parallel => false,
                Label::Prime => {
                    debug_assert!(quotient.is_some(), "a PRIME node always carries a quotient matrix");
                    quotient.map(|m| m[i][j]).unwrap_or(false)
                }
            };
            if adjacent {
                for &a in &child_leaves[i] {
                    for &b in &child_leaves[j] {
                        edges.push((a, b));
                    }
                }
            }
        }
    }
    child_leaves.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose;
    use crate::graph::Graph;

    #[test]
    fn roundtrips_clique_through_tree_accessors() {
        let graph = Graph::new(3, [(0, 1), (0, 2), (1, 2)]).unwrap();
        let tree = decompose(&graph).unwrap();
        let root = tree.root().unwrap();
        assert!(!tree.is_leaf(root));
        assert_eq!(tree.label(root), Label::Series);
        assert_eq!(tree.children(root).len(), 3);
        assert_eq!(tree.leaf_count(), 3);
    }

    #[test]
    fn relabelled_isomorphic_graphs_are_equivalent() {
        let g1 = Graph::new(4, [(0, 1), (1, 2), (2, 3)]).unwrap();
        // Same path 1-0-3-2, under the relabelling 0<->1, 2<->3.
        let g2 = Graph::new(4, [(1, 0), (0, 3), (3, 2)]).unwrap();
        let t1 = decompose(&g1).unwrap();
        let t2 = decompose(&g2).unwrap();
        assert!(t1.is_equivalent(&t2));
    }

    #[test]
    fn reconstruct_recovers_series_and_parallel_graphs_exactly() {
        for edges in [vec![(0, 1), (0, 2), (1, 2)], vec![(0, 1), (2, 3)]] {
            let n = edges.iter().flat_map(|&(a, b)| [a, b]).max().unwrap() + 1;
            let graph = Graph::new(n, edges.clone()).unwrap();
            let tree = decompose(&graph).unwrap();
            let rebuilt = tree.reconstruct();
            for u in 0..n {
                for v in (u + 1)..n {
                    assert_eq!(graph.has_edge(u, v), rebuilt.has_edge(u, v), "edge ({u},{v}) mismatched");
                }
            }
        }
    }

    #[test]
    fn reconstruct_recovers_a_prime_graph_via_its_quotient_matrix() {
        let graph = Graph::new(4, [(0, 1), (1, 2), (2, 3)]).unwrap();
        let tree = decompose(&graph).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.label(root), Label::Prime);
        assert!(tree.quotient_matrix(root).is_some());

        let rebuilt = tree.reconstruct();
        for u in 0..4 {
            for v in (u + 1)..4 {
                assert_eq!(graph.has_edge(u, v), rebuilt.has_edge(u, v), "edge ({u},{v}) mismatched");
            }
        }
    }

    #[test]
    fn empty_trees_are_equivalent() {
        let g = Graph::new(0, []).unwrap();
        let t1 = decompose(&g).unwrap();
        let t2 = decompose(&g).unwrap();
        assert!(t1.is_equivalent(&t2));
        assert!(t1.root().is_none());
    }
}
