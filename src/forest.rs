//! The working forest: an arena of nodes with intrusive sibling links and O(1)
//! detach/splice.
//!
//! Every node lives in a single `Vec` (the arena) and is addressed by [`NodeId`], a
//! `u32` index newtype. Parent and sibling links are plain indices rather than owned
//! pointers, which sidesteps the aliasing issues of a doubly-linked structure and makes
//! the whole forest droppable in one shot — the same trick `oooutlk/trees`' `potted`
//! representation uses for its arena-backed forests. A PRIME internal node additionally
//! carries a quotient matrix recording the adjacency relation between its children's
//! representatives, since that is the one piece of the label that reconstruction needs
//! and a bare SERIES/PARALLEL/PRIME tag cannot supply on its own.

use crate::graph::Node as Vertex;

/// Index into the [`Forest`] arena. `u32` keeps nodes compact; graphs with more than
/// 2^32 vertices are not a target for this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Debug for NodeIdOpt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id:?}"),
            None => f.write_str("None"),
        }
    }
}

/// `Option<NodeId>` with a friendlier name at call sites that treat "no such link" as a
/// first-class value (parent of a root, next sibling of the last child, ...).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NodeIdOpt(Option<NodeId>);

impl NodeIdOpt {
    pub(crate) const NONE: NodeIdOpt = NodeIdOpt(None);

    #[inline]
    pub(crate) fn some(id: NodeId) -> Self {
        NodeIdOpt(Some(id))
    }

    #[inline]
    pub(crate) fn get(self) -> Option<NodeId> {
        self.0
    }
}

/// The label of an internal node. Every internal node carries one by the time it leaves
/// [`crate::label::assign_label`]; `Unknown` only exists between a node's allocation and
/// that call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Unknown,
    Series,
    Parallel,
    Prime,
}

enum Kind {
    Leaf(Vertex),
    Internal {
        label: Label,
        num_children: u32,
        first_child: NodeIdOpt,
        last_child: NodeIdOpt,
        /// For a PRIME node only: the adjacency matrix between children representatives,
        /// indexed by child position. `None` until [`Forest::set_quotient`] sets it (and
        /// always `None` for SERIES/PARALLEL/UNKNOWN, whose cross-child adjacency is
        /// already fully determined by the label alone).
        quotient: Option<Vec<Vec<bool>>>,
    },
}

struct Node {
    kind: Kind,
    parent: NodeIdOpt,
    prev_sibling: NodeIdOpt,
    next_sibling: NodeIdOpt,
}

/// An ordered forest of rooted trees, backed by a single arena.
///
/// Roots form their own intrusive sibling chain headed by `first_root`/`last_root`,
/// exactly like any other sibling chain in the arena, so root insertion/removal is the
/// same O(1) operation as for any other child list.
pub struct Forest {
    nodes: Vec<Node>,
    first_root: NodeIdOpt,
    last_root: NodeIdOpt,
}

impl Forest {
    pub fn new() -> Self {
        Forest {
            nodes: Vec::new(),
            first_root: NodeIdOpt::NONE,
            last_root: NodeIdOpt::NONE,
        }
    }

    fn push_node(&mut self, kind: Kind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: NodeIdOpt::NONE,
            prev_sibling: NodeIdOpt::NONE,
            next_sibling: NodeIdOpt::NONE,
        });
        id
    }

    /// Allocates a new leaf and appends it as a forest root.
    pub fn push_leaf_root(&mut self, vertex: Vertex) -> NodeId {
        let id = self.push_node(Kind::Leaf(vertex));
        self.append_root(id);
        id
    }

    /// Allocates a new, empty, `Unknown`-labelled internal node and appends it as a
    /// forest root.
    pub fn push_internal_root(&mut self) -> NodeId {
        let id = self.push_node(Kind::Internal {
            label: Label::Unknown,
            num_children: 0,
            first_child: NodeIdOpt::NONE,
            last_child: NodeIdOpt::NONE,
            quotient: None,
        });
        self.append_root(id);
        id
    }

    #[inline]
    fn append_root(&mut self, id: NodeId) {
        let after = self.last_root.get();
        self.insert_after(None, after, id);
    }

    #[inline]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.index()].kind, Kind::Leaf(_))
    }

    #[inline]
    pub fn vertex(&self, id: NodeId) -> Vertex {
        match self.nodes[id.index()].kind {
            Kind::Leaf(v) => v,
            Kind::Internal { .. } => panic!("vertex() called on an internal node"),
        }
    }

    #[inline]
    pub fn label(&self, id: NodeId) -> Label {
        match self.nodes[id.index()].kind {
            Kind::Internal { label, .. } => label,
            Kind::Leaf(_) => panic!("label() called on a leaf"),
        }
    }

    #[inline]
    pub fn set_label(&mut self, id: NodeId, label: Label) {
        match &mut self.nodes[id.index()].kind {
            Kind::Internal { label: l, .. } => *l = label,
            Kind::Leaf(_) => panic!("set_label() called on a leaf"),
        }
    }

    /// Attaches a PRIME node's quotient matrix (§10.4): `matrix[i][j]` is the adjacency
    /// between children `i` and `j` in `id`'s current child order.
    pub fn set_quotient(&mut self, id: NodeId, matrix: Vec<Vec<bool>>) {
        match &mut self.nodes[id.index()].kind {
            Kind::Internal { quotient, .. } => *quotient = Some(matrix),
            Kind::Leaf(_) => panic!("set_quotient() called on a leaf"),
        }
    }

    #[inline]
    pub fn quotient(&self, id: NodeId) -> Option<&Vec<Vec<bool>>> {
        match &self.nodes[id.index()].kind {
            Kind::Internal { quotient, .. } => quotient.as_ref(),
            Kind::Leaf(_) => None,
        }
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent.get()
    }

    #[inline]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].next_sibling.get()
    }

    #[inline]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].prev_sibling.get()
    }

    #[inline]
    pub fn num_children(&self, id: NodeId) -> u32 {
        match self.nodes[id.index()].kind {
            Kind::Internal { num_children, .. } => num_children,
            Kind::Leaf(_) => 0,
        }
    }

    #[inline]
    fn first_child(&self, id: NodeId) -> Option<NodeId> {
        match self.nodes[id.index()].kind {
            Kind::Internal { first_child, .. } => first_child.get(),
            Kind::Leaf(_) => None,
        }
    }

    #[inline]
    fn last_child(&self, id: NodeId) -> Option<NodeId> {
        match self.nodes[id.index()].kind {
            Kind::Internal { last_child, .. } => last_child.get(),
            Kind::Leaf(_) => None,
        }
    }

    /// Children of `id` left to right.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut cur = self.first_child(id);
        std::iter::from_fn(move || {
            let next = cur?;
            cur = self.next_sibling(next);
            Some(next)
        })
    }

    /// Current forest roots, left to right.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut cur = self.first_root.get();
        std::iter::from_fn(move || {
            let next = cur?;
            cur = self.next_sibling(next);
            Some(next)
        })
    }

    /// Detaches `id` from its current parent/root chain. `id` becomes a parentless node
    /// with no sibling links, ready to be spliced elsewhere.
    pub fn detach(&mut self, id: NodeId) {
        let node = &self.nodes[id.index()];
        let parent = node.parent.get();
        let prev = node.prev_sibling.get();
        let next = node.next_sibling.get();

        match prev {
            Some(p) => self.nodes[p.index()].next_sibling = NodeIdOpt(next),
            None => self.set_first_in_scope(parent, next),
        }
        match next {
            Some(n) => self.nodes[n.index()].prev_sibling = NodeIdOpt(prev),
            None => self.set_last_in_scope(parent, prev),
        }
        if let Some(parent) = parent {
            self.decrement_num_children(parent);
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeIdOpt::NONE;
        node.prev_sibling = NodeIdOpt::NONE;
        node.next_sibling = NodeIdOpt::NONE;
    }

    fn set_first_in_scope(&mut self, parent: Option<NodeId>, value: Option<NodeId>) {
        match parent {
            Some(p) => match &mut self.nodes[p.index()].kind {
                Kind::Internal { first_child, .. } => *first_child = NodeIdOpt(value),
                Kind::Leaf(_) => unreachable!("leaf cannot be a parent"),
            },
            None => self.first_root = NodeIdOpt(value),
        }
    }

    fn set_last_in_scope(&mut self, parent: Option<NodeId>, value: Option<NodeId>) {
        match parent {
            Some(p) => match &mut self.nodes[p.index()].kind {
                Kind::Internal { last_child, .. } => *last_child = NodeIdOpt(value),
                Kind::Leaf(_) => unreachable!("leaf cannot be a parent"),
            },
            None => self.last_root = NodeIdOpt(value),
        }
    }

    fn decrement_num_children(&mut self, parent: NodeId) {
        if let Kind::Internal { num_children, .. } = &mut self.nodes[parent.index()].kind {
            debug_assert!(*num_children > 0, "detach underflowed a parent's child count");
            *num_children -= 1;
        }
    }

    fn increment_num_children(&mut self, parent: NodeId) {
        if let Kind::Internal { num_children, .. } = &mut self.nodes[parent.index()].kind {
            *num_children += 1;
        }
    }

    /// Appends `id` as the last child of `parent` (or as the last root, if `parent` is
    /// `None`). `id` must already be detached.
    pub fn append_child(&mut self, parent: Option<NodeId>, id: NodeId) {
        let after = self.last_child_or_root(parent);
        self.insert_after(parent, after, id);
    }

    fn last_child_or_root(&self, parent: Option<NodeId>) -> Option<NodeId> {
        match parent {
            Some(p) => self.last_child(p),
            None => self.last_root.get(),
        }
    }

    /// Inserts already-detached `id` right after `after` within `parent`'s child list (or
    /// the root list, if `parent` is `None`). `after = None` inserts at the front.
    pub fn insert_after(&mut self, parent: Option<NodeId>, after: Option<NodeId>, id: NodeId) {
        let next = match after {
            Some(a) => self.next_sibling(a),
            None => match parent {
                Some(p) => self.first_child(p),
                None => self.first_root.get(),
            },
        };

        self.nodes[id.index()].parent = NodeIdOpt(parent);
        self.nodes[id.index()].prev_sibling = NodeIdOpt(after);
        self.nodes[id.index()].next_sibling = NodeIdOpt(next);

        match after {
            Some(a) => self.nodes[a.index()].next_sibling = NodeIdOpt::some(id),
            None => self.set_first_in_scope(parent, Some(id)),
        }
        match next {
            Some(n) => self.nodes[n.index()].prev_sibling = NodeIdOpt::some(id),
            None => self.set_last_in_scope(parent, Some(id)),
        }
        if let Some(parent) = parent {
            self.increment_num_children(parent);
        }
    }

    /// Promotes `id`'s children one level: they become siblings of `id` (in `id`'s former
    /// position) and `id` is discarded. No-op bookkeeping if `id` has no children.
    pub fn promote(&mut self, id: NodeId) {
        let parent = self.parent(id);
        let mut after = self.prev_sibling(id);
        let children: Vec<NodeId> = self.children(id).collect();
        self.detach(id);
        for child in children {
            self.detach(child);
            self.insert_after(parent, after, child);
            after = Some(child);
        }
    }

    /// Appends every root of `other` as a new child of `parent`, in `other`'s
    /// left-to-right order, then discards `other`. Used to splice a subproblem's result
    /// forest into the forest under construction for the enclosing recursion.
    pub fn graft_children(&mut self, parent: NodeId, other: Forest) {
        let roots: Vec<NodeId> = other.roots().collect();
        let offset = self.nodes.len();
        for node in other.nodes {
            self.nodes.push(remap_node(node, offset));
        }
        for root in roots {
            let mapped = NodeId::new(root.index() + offset);
            self.append_child(Some(parent), mapped);
        }
    }

    /// The smallest vertex among `id`'s descendant leaves (or `id` itself, if it is a
    /// leaf). Used to pick a canonical, deterministic child order.
    pub fn min_leaf(&self, id: NodeId) -> Vertex {
        if self.is_leaf(id) {
            return self.vertex(id);
        }
        self.children(id).map(|c| self.min_leaf(c)).min().expect("internal node has children")
    }
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

/// Shifts every arena-internal index a [`Node`] holds by `offset`, for splicing one
/// arena's storage onto the end of another's.
fn remap_node(mut node: Node, offset: usize) -> Node {
    let shift = |opt: NodeIdOpt| NodeIdOpt(opt.get().map(|id| NodeId::new(id.index() + offset)));
    node.parent = shift(node.parent);
    node.prev_sibling = shift(node.prev_sibling);
    node.next_sibling = shift(node.next_sibling);
    if let Kind::Internal { first_child, last_child, .. } = &mut node.kind {
        *first_child = shift(*first_child);
        *last_child = shift(*last_child);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_iterate_roots() {
        let mut f = Forest::new();
        let a = f.push_leaf_root(0);
        let b = f.push_leaf_root(1);
        let c = f.push_leaf_root(2);
        assert_eq!(f.roots().collect::<Vec<_>>(), vec![a, b, c]);
    }

    #[test]
    fn append_child_builds_tree() {
        let mut f = Forest::new();
        let root = f.push_internal_root();
        let l0 = f.push_leaf_root(0);
        let l1 = f.push_leaf_root(1);
        f.detach(l0);
        f.detach(l1);
        f.append_child(Some(root), l0);
        f.append_child(Some(root), l1);
        assert_eq!(f.children(root).collect::<Vec<_>>(), vec![l0, l1]);
        assert_eq!(f.num_children(root), 2);
        assert_eq!(f.roots().collect::<Vec<_>>(), vec![root]);
    }

    #[test]
    fn detach_updates_siblings_and_root_list() {
        let mut f = Forest::new();
        let a = f.push_leaf_root(0);
        let b = f.push_leaf_root(1);
        let c = f.push_leaf_root(2);
        f.detach(b);
        assert_eq!(f.roots().collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(f.parent(b), None);
    }

    #[test]
    fn promote_splices_children_into_grandparent() {
        let mut f = Forest::new();
        let root = f.push_internal_root();
        let mid = f.push_internal_root();
        f.detach(mid);
        f.append_child(Some(root), mid);
        let l0 = f.push_leaf_root(0);
        let l1 = f.push_leaf_root(1);
        f.detach(l0);
        f.detach(l1);
        f.append_child(Some(mid), l0);
        f.append_child(Some(mid), l1);

        f.promote(mid);
        assert_eq!(f.children(root).collect::<Vec<_>>(), vec![l0, l1]);
        assert_eq!(f.num_children(root), 2);
    }

    #[test]
    fn quotient_matrix_roundtrips_through_the_node() {
        let mut f = Forest::new();
        let root = f.push_internal_root();
        assert!(f.quotient(root).is_none());
        let matrix = vec![vec![false, true, false], vec![true, false, true], vec![false, true, false]];
        f.set_quotient(root, matrix.clone());
        assert_eq!(f.quotient(root), Some(&matrix));
    }

    #[test]
    fn graft_children_splices_subtree_in_order() {
        let mut sub = Forest::new();
        let sub_root = sub.push_internal_root();
        let s0 = sub.push_leaf_root(10);
        let s1 = sub.push_leaf_root(11);
        sub.detach(s0);
        sub.detach(s1);
        sub.append_child(Some(sub_root), s0);
        sub.append_child(Some(sub_root), s1);

        let mut f = Forest::new();
        let root = f.push_internal_root();
        let other_leaf = f.push_leaf_root(5);
        f.detach(other_leaf);
        f.append_child(Some(root), other_leaf);
        f.graft_children(root, sub);

        let children: Vec<Vertex> = f
            .children(root)
            .map(|c| if f.is_leaf(c) { f.vertex(c) } else { f.min_leaf(c) })
            .collect();
        assert_eq!(children, vec![5, 10]);
        assert_eq!(f.num_children(root), 2);
    }
}
