//! Error types surfaced by graph construction and decomposition.

use crate::graph::Node;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building a [`crate::Graph`] or running
/// [`crate::decompose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidGraph(#[from] InvalidGraph),

    /// A core invariant (I1-I4 in the design notes) did not hold. This indicates a bug in
    /// the decomposition algorithm, never a caller error, and is never returned with a
    /// partial tree.
    #[error("internal invariant violated during {phase}: {detail} (node {node:?})")]
    InternalInvariant {
        phase: Phase,
        detail: &'static str,
        node: Option<u32>,
    },
}

/// Why a [`crate::Graph`] constructor rejected its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidGraph {
    #[error("self loop detected on vertex {0}")]
    SelfLoop(Node),
    #[error("edge endpoint {node} is out of range for a graph with {len} vertices")]
    OutOfRange { node: usize, len: usize },
}

/// The phase of the algorithm in which an [`Error::InternalInvariant`] was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pivot,
    Refine,
    Assembly,
    Labeling,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Pivot => "pivot selection",
            Phase::Refine => "refinement",
            Phase::Assembly => "assembly",
            Phase::Labeling => "labeling",
        };
        f.write_str(name)
    }
}
