//! Forest reconstruction from scattered nodes.
//!
//! Given an arbitrary collection of nodes that each carry a declared parent
//! reference, [`Forest::reconstruct_forest`] rebuilds the minimal set of
//! well-formed trees consistent with those references. Declared links are
//! only read while the passes run; the forest is rewritten in one step at the
//! end, so a failed call leaves it untouched.

use std::collections::BTreeMap;

use bitvec::bitvec;
use bitvec::vec::BitVec;
use thiserror::Error;

use crate::{Forest, NodeIndex};

/// Upper bound on the length of a declared ancestor chain.
///
/// Chains are walked iteratively, so this is a resource guard rather than a
/// stack limit; exceeding it surfaces as [`RebuildError::DepthExceeded`].
pub const MAX_CHAIN_DEPTH: usize = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RebuildError {
    /// The same node was submitted more than once. Intent is ambiguous, so
    /// the input is rejected rather than deduplicated.
    #[error("{0} was submitted more than once")]
    DuplicateNode(NodeIndex),
    /// A node's declared parent chain revisits a node. Cycles are rejected,
    /// never repaired.
    #[error("{0} declares itself as its own ancestor")]
    CyclicParent(NodeIndex),
    /// A declared ancestor chain is longer than [`MAX_CHAIN_DEPTH`].
    #[error("the declared ancestor chain of {0} exceeds the supported depth")]
    DepthExceeded(NodeIndex),
}

/// Candidate tree tops and the shadow child arrays of every touched node.
///
/// A shadow array has one slot per declared child and is filled as children
/// are discovered, so a child is placed at its declared position exactly once
/// no matter in which order the input arrives.
struct Scaffold {
    roots: Vec<NodeIndex>,
    shadows: BTreeMap<NodeIndex, Vec<Option<NodeIndex>>>,
}

impl<A> Forest<A> {
    /// Sets `child`'s declared parent to `parent` without any of the checks
    /// that [`Forest::attach`] performs, appending it to `parent`'s child
    /// list.
    ///
    /// This is the staging path for reconstruction producers: the links it
    /// creates may violate the forest invariants (a cycle, most notably)
    /// until a [`Forest::reconstruct_forest`] pass normalizes or rejects
    /// them. Everything else in this crate expects links built through
    /// `attach`/`attach_at`.
    pub fn declare_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.data_mut(child).parent = Some(parent);
        self.data_mut(parent).children.push(child);
    }

    /// Rebuilds the minimal set of well-formed trees from `inputs`, a
    /// collection of node sequences in which every node carries a declared
    /// parent reference (its current `parent` link) and a declared child
    /// order (its current child list).
    ///
    /// Returns the reconstructed roots in first-discovery order. Every input
    /// node ends up in exactly one tree; sibling order under a rebuilt parent
    /// follows the declared child positions. A node whose declared ancestors
    /// are all absent from the input becomes a root, as does a node whose
    /// present ancestors are only reachable through absent intermediates.
    ///
    /// Nodes referenced by stale links but not part of the input are left as
    /// detached, well-formed roots.
    ///
    /// # Errors
    ///
    /// Rejects duplicate submissions, declared-parent cycles and ancestor
    /// chains beyond [`MAX_CHAIN_DEPTH`]. On error the forest is unchanged.
    pub fn reconstruct_forest<I>(&mut self, inputs: I) -> Result<Vec<NodeIndex>, RebuildError>
    where
        I: IntoIterator,
        I::Item: IntoIterator<Item = NodeIndex>,
    {
        let mut seen: BitVec = bitvec![0; self.index_bound()];
        let mut scaffold = Scaffold {
            roots: Vec::new(),
            shadows: BTreeMap::new(),
        };

        for sequence in inputs {
            for node in sequence {
                if seen.replace(node.index(), true) {
                    return Err(RebuildError::DuplicateNode(node));
                }
                self.absorb(&mut scaffold, node)?;
            }
        }

        // Candidate tops may still be ancestors of one another when an
        // attachment path was incomplete at the time it was probed. Re-feed
        // the tops until a pass produces no further merge.
        loop {
            let before = scaffold.roots.len();
            let pending = std::mem::take(&mut scaffold.roots);
            for node in pending {
                self.absorb(&mut scaffold, node)?;
            }
            if scaffold.roots.len() == before {
                break;
            }
        }

        self.finalize(&scaffold);
        Ok(scaffold.roots)
    }

    /// Places one node into the scaffold: as the new top of a tree whose
    /// current top declares it as parent, into the shadow slot of an already
    /// materialized parent, or as a new candidate root.
    fn absorb(&self, scaffold: &mut Scaffold, node: NodeIndex) -> Result<(), RebuildError> {
        let chain = self.declared_chain(node)?;

        scaffold
            .shadows
            .entry(node)
            .or_insert_with(|| vec![None; self.child_count(node)]);

        // Absorb-as-parent: a current top that declares `node` as its parent
        // moves into `node`'s shadow slots, and `node` takes over its `roots`
        // entry. Replacing in place keeps first-discovery root order.
        for ix in 0..scaffold.roots.len() {
            let top = scaffold.roots[ix];
            if self.parent(top) == Some(node) {
                let slot = self
                    .position_of(node, top)
                    .expect("declared parent without child membership");
                scaffold.shadow_mut(node)[slot] = Some(top);
                scaffold.roots[ix] = node;
                return Ok(());
            }
        }

        // Attach-into-existing: find a current top on the declared ancestor
        // chain and walk the chain back down, requiring every intermediate
        // ancestor to already occupy a shadow slot of its predecessor. A
        // broken path disqualifies only this top.
        'tops: for ix in 0..scaffold.roots.len() {
            let top = scaffold.roots[ix];
            let Some(position) = chain.iter().position(|&a| a == top) else {
                continue;
            };

            let mut parent = top;
            for &ancestor in chain[..position].iter().rev() {
                if scaffold.shadow(parent).contains(&Some(ancestor)) {
                    parent = ancestor;
                } else {
                    continue 'tops;
                }
            }

            let slot = self
                .position_of(parent, node)
                .expect("declared parent without child membership");
            scaffold.shadow_mut(parent)[slot] = Some(node);
            return Ok(());
        }

        scaffold.roots.push(node);
        Ok(())
    }

    /// Collects `node`'s declared ancestors, nearest first.
    ///
    /// A chain longer than the number of live nodes has revisited one by
    /// pigeonhole, which proves a declared cycle.
    fn declared_chain(&self, node: NodeIndex) -> Result<Vec<NodeIndex>, RebuildError> {
        let live = self.node_count();
        let mut chain = Vec::new();
        let mut current = node;

        while let Some(parent) = self.parent(current) {
            if chain.len() >= MAX_CHAIN_DEPTH {
                return Err(RebuildError::DepthExceeded(node));
            }
            if parent == node || chain.len() >= live {
                return Err(RebuildError::CyclicParent(node));
            }
            chain.push(parent);
            current = parent;
        }

        Ok(chain)
    }

    /// Rewrites the forest links to match the scaffold: every touched node is
    /// unlinked from its stale surroundings, then given the dense collapse of
    /// its shadow slots as children.
    fn finalize(&mut self, scaffold: &Scaffold) {
        for &node in scaffold.shadows.keys() {
            let children = std::mem::take(&mut self.data_mut(node).children);
            for child in children {
                self.data_mut(child).parent = None;
            }
        }

        for &node in scaffold.shadows.keys() {
            if let Some(stale) = self.data(node).parent {
                self.data_mut(stale).children.retain(|&c| c != node);
                self.data_mut(node).parent = None;
            }
        }

        for (&node, slots) in &scaffold.shadows {
            let children: Vec<NodeIndex> = slots.iter().flatten().copied().collect();
            for &child in &children {
                self.data_mut(child).parent = Some(node);
            }
            self.data_mut(node).children = children;
        }
    }
}

impl Scaffold {
    fn shadow(&self, node: NodeIndex) -> &[Option<NodeIndex>] {
        self.shadows
            .get(&node)
            .expect("materialized node without a shadow array")
    }

    fn shadow_mut(&mut self, node: NodeIndex) -> &mut Vec<Option<NodeIndex>> {
        self.shadows
            .get_mut(&node)
            .expect("materialized node without a shadow array")
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    /// a
    /// ├── b
    /// │   └── d
    /// └── c
    fn sample_forest() -> (Forest<&'static str>, [NodeIndex; 4]) {
        let mut forest = Forest::new();
        let a = forest.add_node("a");
        let b = forest.add_node("b");
        let c = forest.add_node("c");
        let d = forest.add_node("d");
        forest.attach(a, b).unwrap();
        forest.attach(a, c).unwrap();
        forest.attach(b, d).unwrap();
        (forest, [a, b, c, d])
    }

    #[test]
    fn rebuilds_single_tree_from_scattered_order() {
        let (mut forest, [a, b, c, d]) = sample_forest();
        let original = forest.clone();

        let roots = forest.reconstruct_forest([[d, c, a, b]]).unwrap();

        assert_eq!(roots, vec![a]);
        assert!(forest.children(a).eq([b, c]));
        assert!(forest.children(b).eq([d]));
        assert_eq!(forest, original);
    }

    #[test]
    fn interleaved_trees_keep_first_discovery_root_order() {
        let mut forest = Forest::new();
        let x = forest.add_node("x");
        let y = forest.add_node("y");
        let p = forest.add_node("p");
        let q = forest.add_node("q");
        forest.attach(x, y).unwrap();
        forest.attach(p, q).unwrap();

        let roots = forest.reconstruct_forest([[y, p, x, q]]).unwrap();

        assert_eq!(roots, vec![x, p]);
        assert!(forest.children(x).eq([y]));
        assert!(forest.children(p).eq([q]));
    }

    #[test]
    fn input_may_arrive_in_several_sequences() {
        let (mut forest, [a, b, c, d]) = sample_forest();

        let roots = forest.reconstruct_forest([vec![d, c], vec![a, b]]).unwrap();

        assert_eq!(roots, vec![a]);
        assert!(forest.children(a).eq([b, c]));
        assert!(forest.children(b).eq([d]));
    }

    #[test]
    fn duplicate_submission_is_rejected() {
        let (mut forest, [a, b, ..]) = sample_forest();

        assert_eq!(
            forest.reconstruct_forest([[a, b, a]]),
            Err(RebuildError::DuplicateNode(a))
        );
    }

    #[test]
    fn declared_cycle_is_rejected_without_mutation() {
        let (mut forest, [a, b, c, d]) = sample_forest();
        let s = forest.add_node("s");
        let t = forest.add_node("t");
        forest.declare_child(t, s);
        forest.declare_child(s, t);
        let staged = forest.clone();

        assert_eq!(
            forest.reconstruct_forest([[d, s, c, a, b, t]]),
            Err(RebuildError::CyclicParent(s))
        );
        assert_eq!(forest, staged);
    }

    #[test]
    fn self_parent_is_rejected() {
        let mut forest = Forest::new();
        let s = forest.add_node("s");
        forest.declare_child(s, s);

        assert_eq!(
            forest.reconstruct_forest([[s]]),
            Err(RebuildError::CyclicParent(s))
        );
    }

    #[test]
    fn absent_intermediate_starts_a_new_root() {
        // a -> b -> c, but b is not part of the input: c cannot be attached
        // through the missing link and heads its own tree.
        let mut forest = Forest::new();
        let a = forest.add_node("a");
        let b = forest.add_node("b");
        let c = forest.add_node("c");
        forest.attach(a, b).unwrap();
        forest.attach(b, c).unwrap();

        let roots = forest.reconstruct_forest([[a, c]]).unwrap();

        assert_eq!(roots, vec![a, c]);
        // The stale links through b are dissolved, so b is a detached root.
        assert_eq!(forest.child_count(a), 0);
        assert!(forest.is_root(b));
        assert_eq!(forest.child_count(b), 0);
        assert!(forest.is_root(c));
    }

    #[test]
    fn late_link_completion_is_merged_by_the_reduction_pass() {
        // Children arrive before every intermediate is materialized, leaving
        // two candidate tops that only connect once the input is exhausted.
        let mut forest = Forest::new();
        let a = forest.add_node("a");
        let b = forest.add_node("b");
        let c = forest.add_node("c");
        let d = forest.add_node("d");
        forest.attach(a, b).unwrap();
        forest.attach(b, c).unwrap();
        forest.attach(c, d).unwrap();

        let roots = forest.reconstruct_forest([[d, a, c, b]]).unwrap();

        assert_eq!(roots, vec![a]);
        assert!(forest.children(a).eq([b]));
        assert!(forest.children(b).eq([c]));
        assert!(forest.children(c).eq([d]));
    }

    #[test]
    fn reconstruction_is_idempotent_over_the_full_node_set() {
        let (mut forest, [a, b, c, d]) = sample_forest();

        forest.reconstruct_forest([[d, c, a, b]]).unwrap();
        let first = forest.clone();

        // Feed the full node set of the rebuilt forest in pre-order.
        let roots = forest.reconstruct_forest([[a, b, d, c]]).unwrap();

        assert_eq!(roots, vec![a]);
        assert_eq!(forest, first);
    }

    #[test]
    fn empty_input_yields_empty_forest() {
        let mut forest = Forest::<&str>::new();
        let roots = forest
            .reconstruct_forest(std::iter::empty::<Vec<NodeIndex>>())
            .unwrap();
        assert!(roots.is_empty());
    }

    #[test]
    fn childless_node_is_a_trivial_root() {
        let mut forest = Forest::new();
        let lone = forest.add_node("lone");

        let roots = forest.reconstruct_forest([[lone]]).unwrap();

        assert_eq!(roots, vec![lone]);
        assert!(forest.is_root(lone));
        assert_eq!(forest.child_count(lone), 0);
    }

    /// A random tree as a parent table (`parents[i]` is the parent of node
    /// `i + 1`), a shuffled processing order and a handful of cut points.
    fn tree_inputs() -> impl Strategy<Value = (Vec<usize>, Vec<usize>, Vec<usize>)> {
        (2usize..32).prop_flat_map(|n| {
            let parents = proptest::collection::vec(any::<proptest::sample::Index>(), n - 1)
                .prop_map(|picks| {
                    picks
                        .iter()
                        .enumerate()
                        .map(|(i, pick)| pick.index(i + 1))
                        .collect::<Vec<_>>()
                });
            let order = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
            let cuts = proptest::collection::vec(0..n, 0..4);
            (parents, order, cuts)
        })
    }

    fn build_tree(parents: &[usize]) -> (Forest<usize>, Vec<NodeIndex>) {
        let mut forest = Forest::new();
        let mut nodes = vec![forest.add_node(0)];
        for (i, &parent) in parents.iter().enumerate() {
            let node = forest.add_node(i + 1);
            forest.attach(nodes[parent], node).unwrap();
            nodes.push(node);
        }
        (forest, nodes)
    }

    proptest! {
        /// Any shuffle of a tree's full node set, split into arbitrary
        /// sub-sequences, reconstructs the identical tree.
        #[test]
        fn rebuilds_any_shuffle_and_split((parents, order, mut cuts) in tree_inputs()) {
            let (mut forest, nodes) = build_tree(&parents);
            let original = forest.clone();

            let shuffled: Vec<NodeIndex> = order.iter().map(|&i| nodes[i]).collect();
            cuts.sort_unstable();
            cuts.dedup();

            let mut sequences = Vec::new();
            let mut start = 0usize;
            for &cut in &cuts {
                if cut > start {
                    sequences.push(shuffled[start..cut].to_vec());
                    start = cut;
                }
            }
            sequences.push(shuffled[start..].to_vec());

            let roots = forest.reconstruct_forest(sequences).unwrap();

            prop_assert_eq!(roots, vec![nodes[0]]);
            prop_assert_eq!(forest, original);
        }
    }
}
