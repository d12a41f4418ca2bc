//! A mutable, ordered tree and forest abstraction over an index arena.
//!
//! Nodes live in a [`Forest`] and are addressed by stable [`NodeIndex`]
//! handles. Child lists are owned and order-significant, parent links are
//! plain back-references, so the usual ownership headaches of linked trees
//! never come up.
//!
//! On top of the link model the crate provides:
//!
//!  - bounded directional navigation ([`Forest::right_sibling`],
//!    [`Forest::left_sibling`] and the single-step primitives
//!    [`Forest::dfs_left`], [`Forest::dfs_right`], [`Forest::upward`]),
//!  - a generic traversal driver ([`Forest::search`]) parameterized by a
//!    [`Step`] strategy and a caller-supplied action,
//!  - a forest-reconstruction algorithm ([`Forest::reconstruct_forest`])
//!    that rebuilds a minimal set of well-formed trees from scattered nodes
//!    that only know their intended parent.

pub mod arena;
pub mod forest;
pub mod lines;
pub mod navigate;
pub mod rebuild;
pub mod traverse;

pub use crate::forest::{AttachError, DetachError, Forest};
pub use crate::navigate::{Probe, Step};
pub use crate::rebuild::RebuildError;
pub use crate::traverse::Visit;

/// Index of a node within a [`Forest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(u32);

impl NodeIndex {
    /// Creates a new node index.
    ///
    /// # Panics
    ///
    /// Panics when the index does not fit into the backing integer type.
    #[inline]
    pub fn new(index: usize) -> Self {
        Self::try_new(index).expect("node index out of bounds")
    }

    /// Creates a new node index, returning `None` when the index does not
    /// fit into the backing integer type.
    #[inline]
    pub fn try_new(index: usize) -> Option<Self> {
        if index <= u32::MAX as usize {
            Some(NodeIndex(index as u32))
        } else {
            None
        }
    }

    /// Returns the index as a `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeIndex({})", self.0)
    }
}
