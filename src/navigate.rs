//! Bounded directional navigation between nodes.
//!
//! Sibling searches ascend through the tree when a node is the first or last
//! child of its parent. An optional boundary node caps the ascent: the search
//! never crosses it, and reports [`Probe::Boundary`] instead. Running off the
//! root is [`Probe::Exhausted`]. Neither outcome is an error; "no further
//! node" is an expected terminal state.

use crate::{Forest, NodeIndex};

/// Outcome of a bounded sibling search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The next sibling in the requested direction.
    Found(NodeIndex),
    /// The ascent reached the boundary node without finding a sibling.
    Boundary,
    /// The ascent ran off the root without finding a sibling.
    Exhausted,
}

impl Probe {
    /// Collapses the probe into the found node, if any.
    #[inline]
    pub fn node(self) -> Option<NodeIndex> {
        match self {
            Probe::Found(node) => Some(node),
            Probe::Boundary | Probe::Exhausted => None,
        }
    }

    /// Returns whether a sibling was found.
    #[inline]
    pub fn is_found(self) -> bool {
        matches!(self, Probe::Found(_))
    }
}

/// Traversal strategy for [`Forest::search`].
///
/// The built-in strategies cover pre-order, mirrored pre-order, ancestor
/// walks and single-node visits. `Custom` is the extension point for other
/// orders (e.g. level-order): a plain function with the same contract as the
/// built-in step primitives, plus access to the traversal's scratch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<A, S> {
    /// One step of pre-order traversal; children first, left to right.
    DfsLeft,
    /// One step of mirrored pre-order traversal; children first, right to left.
    DfsRight,
    /// Ascend to the parent.
    Upward,
    /// Never yields a next node; visits the start node only.
    NoStep,
    /// Caller-supplied step function.
    Custom(fn(&Forest<A>, NodeIndex, &mut S, Option<NodeIndex>) -> Option<NodeIndex>),
}

impl<A, S> Step<A, S> {
    /// Computes the node following `node` under this strategy, or `None`
    /// when the traversal is complete.
    pub fn advance(
        &self,
        forest: &Forest<A>,
        node: NodeIndex,
        scratch: &mut S,
        boundary: Option<NodeIndex>,
    ) -> Option<NodeIndex> {
        match self {
            Step::DfsLeft => forest.dfs_left(node, boundary),
            Step::DfsRight => forest.dfs_right(node, boundary),
            Step::Upward => forest.upward(node, boundary),
            Step::NoStep => None,
            Step::Custom(step) => step(forest, node, scratch, boundary),
        }
    }
}

impl<A> Forest<A> {
    /// Finds the node immediately to the right of `node` among its parent's
    /// children, ascending when `node` is a last child.
    ///
    /// The ascent stops with [`Probe::Boundary`] instead of moving above
    /// `boundary`, and with [`Probe::Exhausted`] when a root is reached. A
    /// sibling below the boundary is still found even when the parent is the
    /// boundary itself; the search only refuses to leave its subtree.
    pub fn right_sibling(&self, node: NodeIndex, boundary: Option<NodeIndex>) -> Probe {
        self.sibling_walk(node, boundary, false)
    }

    /// Finds the node immediately to the left of `node` among its parent's
    /// children, ascending when `node` is a first child.
    ///
    /// Boundary handling matches [`Forest::right_sibling`].
    pub fn left_sibling(&self, node: NodeIndex, boundary: Option<NodeIndex>) -> Probe {
        self.sibling_walk(node, boundary, true)
    }

    fn sibling_walk(&self, node: NodeIndex, boundary: Option<NodeIndex>, leftward: bool) -> Probe {
        let mut node = node;

        loop {
            let Some(parent) = self.parent(node) else {
                return Probe::Exhausted;
            };

            let position = self
                .position_of(parent, node)
                .expect("parent link without child membership");

            let sibling = if leftward {
                position.checked_sub(1).and_then(|p| self.child_at(parent, p))
            } else {
                self.child_at(parent, position + 1)
            };

            if let Some(sibling) = sibling {
                return Probe::Found(sibling);
            }

            if Some(parent) == boundary {
                return Probe::Boundary;
            }

            node = parent;
        }
    }

    /// One step of pre-order traversal: the first child if there is one,
    /// otherwise the bounded right-sibling search.
    pub fn dfs_left(&self, node: NodeIndex, boundary: Option<NodeIndex>) -> Option<NodeIndex> {
        match self.first_child(node) {
            Some(child) => Some(child),
            None => self.right_sibling(node, boundary).node(),
        }
    }

    /// One step of mirrored pre-order traversal: the last child if there is
    /// one, otherwise the bounded left-sibling search.
    pub fn dfs_right(&self, node: NodeIndex, boundary: Option<NodeIndex>) -> Option<NodeIndex> {
        match self.last_child(node) {
            Some(child) => Some(child),
            None => self.left_sibling(node, boundary).node(),
        }
    }

    /// One step upward: the parent, or `None` when `node` is the boundary or
    /// a root.
    pub fn upward(&self, node: NodeIndex, boundary: Option<NodeIndex>) -> Option<NodeIndex> {
        if Some(node) == boundary {
            return None;
        }
        self.parent(node)
    }
}
