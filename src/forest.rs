//! The link model: an ordered forest of nodes stored in an index arena.

use std::fmt::{self, Display};
use std::iter::FusedIterator;

use thiserror::Error;

use crate::arena::Arena;
use crate::NodeIndex;

/// An ordered forest of nodes carrying weights of type `A`.
///
/// Every node owns an order-significant list of children and holds a plain
/// back-reference to at most one parent. Nodes without a parent are roots.
/// [`Forest::attach`] and [`Forest::attach_at`] are the only linking paths,
/// which keeps the structure a forest: one parent per node, no cycles, and
/// parent/child links that always agree.
///
/// The weight is opaque to every algorithm in this crate. Callers that need
/// per-node attributes or per-node behavior variants put them in `A`;
/// display-name resolution for [`Forest::tree_view`] goes through
/// `A: Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forest<A> {
    nodes: Arena<NodeData<A>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeData<A> {
    pub(crate) weight: A,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) children: Vec<NodeIndex>,
}

impl<A> Forest<A> {
    /// Creates a new empty forest.
    pub fn new() -> Self {
        Self { nodes: Arena::new() }
    }

    /// Creates a new empty forest with preallocated capacity for nodes.
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(nodes),
        }
    }

    /// Adds a detached node to the forest and returns its index.
    pub fn add_node(&mut self, weight: A) -> NodeIndex {
        self.nodes.insert(NodeData {
            weight,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Removes a node from the forest, returning its weight if it existed.
    ///
    /// The node is detached from its parent first. Its children become roots;
    /// their parent back-references are cleared.
    pub fn remove(&mut self, node: NodeIndex) -> Option<A> {
        if !self.nodes.contains(node) {
            return None;
        }

        if let Some(parent) = self.nodes[node].parent {
            self.nodes[parent].children.retain(|&c| c != node);
        }

        let data = self.nodes.remove(node)?;
        for child in data.children {
            self.nodes[child].parent = None;
        }

        Some(data.weight)
    }

    /// Returns whether the forest contains a node with the given index.
    #[inline]
    pub fn contains(&self, node: NodeIndex) -> bool {
        self.nodes.contains(node)
    }

    /// Returns the number of nodes in the forest.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over the indices of all nodes in the forest.
    #[inline]
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.indices()
    }

    /// Iterates over the indices of all root nodes.
    pub fn roots(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes
            .indices()
            .filter(|&node| self.nodes[node].parent.is_none())
    }

    /// Borrows the weight of a node.
    #[inline]
    pub fn weight(&self, node: NodeIndex) -> Option<&A> {
        self.nodes.get(node).map(|data| &data.weight)
    }

    /// Mutably borrows the weight of a node.
    #[inline]
    pub fn weight_mut(&mut self, node: NodeIndex) -> Option<&mut A> {
        self.nodes.get_mut(node).map(|data| &mut data.weight)
    }

    /// Attaches a detached node as the last child of a parent node.
    ///
    /// # Errors
    ///
    ///  - When the node is already attached.
    ///  - When the attachment would introduce a cycle.
    pub fn attach(&mut self, parent: NodeIndex, child: NodeIndex) -> Result<(), AttachError> {
        let index = self.nodes[parent].children.len();
        self.attach_at(parent, child, index)
    }

    /// Attaches a detached node as a child of a parent node at `index`.
    ///
    /// Siblings at and after `index` shift one position to the right;
    /// `index == child_count` appends. The relative order of the untouched
    /// siblings is preserved.
    ///
    /// # Errors
    ///
    ///  - When `index` is greater than the number of children.
    ///  - When the node is already attached.
    ///  - When the attachment would introduce a cycle.
    pub fn attach_at(
        &mut self,
        parent: NodeIndex,
        child: NodeIndex,
        index: usize,
    ) -> Result<(), AttachError> {
        let len = self.nodes[parent].children.len();

        if index > len {
            return Err(AttachError::IndexOutOfRange { index, len });
        } else if self.nodes[child].parent.is_some() {
            return Err(AttachError::AlreadyAttached);
        } else if !self.cycle_check(child, parent) {
            return Err(AttachError::Cycle);
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.insert(index, child);
        Ok(())
    }

    /// Ensures that making `node` a child of `parent` would not introduce a cycle.
    fn cycle_check(&self, node: NodeIndex, mut parent: NodeIndex) -> bool {
        // When `node` does not have any children it can't contain `parent`.
        if self.nodes[node].children.is_empty() {
            return true;
        }

        loop {
            if parent == node {
                return false;
            } else if let Some(next) = self.nodes[parent].parent {
                parent = next;
            } else {
                return true;
            }
        }
    }

    /// Detaches and returns the child of `parent` at `index`.
    ///
    /// The removed child's parent back-reference is cleared, so the detached
    /// node is a well-formed root afterwards.
    ///
    /// # Errors
    ///
    /// Fails when `index` is not a valid child position.
    pub fn detach(&mut self, parent: NodeIndex, index: usize) -> Result<NodeIndex, DetachError> {
        let len = self.nodes[parent].children.len();

        if index >= len {
            return Err(DetachError::IndexOutOfRange { index, len });
        }

        let child = self.nodes[parent].children.remove(index);
        self.nodes[child].parent = None;
        Ok(child)
    }

    /// Returns a node's parent or `None` if it is a root.
    #[inline]
    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.nodes[node].parent
    }

    /// Returns whether the node has no parent.
    #[inline]
    pub fn is_root(&self, node: NodeIndex) -> bool {
        self.nodes[node].parent.is_none()
    }

    /// Returns the number of the node's children.
    #[inline]
    pub fn child_count(&self, node: NodeIndex) -> usize {
        self.nodes[node].children.len()
    }

    /// Returns the child of `parent` at `index`, if any.
    #[inline]
    pub fn child_at(&self, parent: NodeIndex, index: usize) -> Option<NodeIndex> {
        self.nodes[parent].children.get(index).copied()
    }

    /// Returns a node's first child, if any.
    #[inline]
    pub fn first_child(&self, parent: NodeIndex) -> Option<NodeIndex> {
        self.nodes[parent].children.first().copied()
    }

    /// Returns a node's last child, if any.
    #[inline]
    pub fn last_child(&self, parent: NodeIndex) -> Option<NodeIndex> {
        self.nodes[parent].children.last().copied()
    }

    /// Returns the position of `child` within `parent`'s children, if present.
    #[inline]
    pub fn position_of(&self, parent: NodeIndex, child: NodeIndex) -> Option<usize> {
        self.nodes[parent].children.iter().position(|&c| c == child)
    }

    /// Iterates over the node's children in order.
    #[inline]
    pub fn children(&self, node: NodeIndex) -> Children<'_> {
        Children {
            inner: self.nodes[node].children.iter(),
        }
    }

    /// Iterates over the node's ancestors, from the immediate parent up to
    /// the root of its tree.
    #[inline]
    pub fn ancestors(&self, node: NodeIndex) -> Ancestors<'_, A> {
        Ancestors {
            forest: self,
            next: self.nodes[node].parent,
        }
    }

    pub(crate) fn index_bound(&self) -> usize {
        self.nodes.upper_bound()
    }

    pub(crate) fn data(&self, node: NodeIndex) -> &NodeData<A> {
        &self.nodes[node]
    }

    pub(crate) fn data_mut(&mut self, node: NodeIndex) -> &mut NodeData<A> {
        &mut self.nodes[node]
    }
}

impl<A: Display> Forest<A> {
    /// Returns a [`Display`] adapter rendering the subtree under `node`, one
    /// node per line, indented by depth. Node labels come from the weight's
    /// `Display` implementation.
    pub fn tree_view(&self, node: NodeIndex) -> TreeView<'_, A> {
        TreeView { forest: self, node }
    }
}

impl<A> Default for Forest<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::ops::Index<NodeIndex> for Forest<A> {
    type Output = A;

    fn index(&self, node: NodeIndex) -> &Self::Output {
        &self.nodes[node].weight
    }
}

impl<A> std::ops::IndexMut<NodeIndex> for Forest<A> {
    fn index_mut(&mut self, node: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[node].weight
    }
}

/// Iterator over the children of a node.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    inner: std::slice::Iter<'a, NodeIndex>,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeIndex;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().copied()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> DoubleEndedIterator for Children<'a> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().copied()
    }
}

impl<'a> ExactSizeIterator for Children<'a> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<'a> FusedIterator for Children<'a> {}

/// Iterator over the ancestors of a node, nearest first.
#[derive(Clone)]
pub struct Ancestors<'a, A> {
    forest: &'a Forest<A>,
    next: Option<NodeIndex>,
}

impl<'a, A> Iterator for Ancestors<'a, A> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.forest.parent(current);
        Some(current)
    }
}

impl<'a, A> FusedIterator for Ancestors<'a, A> {}

/// Renders a subtree as indented text. Created by [`Forest::tree_view`].
pub struct TreeView<'a, A> {
    forest: &'a Forest<A>,
    node: NodeIndex,
}

impl<'a, A: Display> Display for TreeView<'a, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.node, 0usize)];

        while let Some((node, depth)) = stack.pop() {
            for _ in 0..depth {
                f.write_str("  ")?;
            }
            writeln!(f, "{}", self.forest[node])?;

            for child in self.forest.children(node).rev() {
                stack.push((child, depth + 1));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    #[error("child index {index} is out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("the node is already attached")]
    AlreadyAttached,
    #[error("attaching the node would introduce a cycle")]
    Cycle,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetachError {
    #[error("child index {index} is out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },
}
