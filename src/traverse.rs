//! Generic traversal driver over the navigation primitives.
//!
//! One loop serves every traversal order: the caller supplies an action run
//! at each visited node, a [`Step`] strategy producing the next node, and a
//! scratch value threaded through both. Pre-order, mirrored pre-order,
//! ancestor walks and single-node visits all fall out of the same driver by
//! picking a strategy; custom strategies slot in through [`Step::Custom`].

use crate::navigate::Step;
use crate::{Forest, NodeIndex};

/// Verdict returned by a traversal action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep traversing.
    Continue,
    /// Halt the traversal; the current node's action has already run.
    Stop,
}

impl<A> Forest<A> {
    /// Drives `action` over the nodes reachable from `start` under `step`.
    ///
    /// The loop runs `action(node, scratch)` for the current node, halts on
    /// [`Visit::Stop`], and otherwise advances with `step`. When the step
    /// lands on `boundary` the traversal halts without visiting it; the
    /// boundary is carried out as the final node. A step yielding no node
    /// ends the traversal with `None`.
    ///
    /// `scratch` is caller-owned state passed to every action and custom
    /// step; it is the channel for traversal-local accumulation and for
    /// external cancellation (observe a flag, return [`Visit::Stop`]). The
    /// driver never interprets it.
    ///
    /// Returns the final node.
    pub fn search<S>(
        &self,
        start: NodeIndex,
        scratch: &mut S,
        step: Step<A, S>,
        boundary: Option<NodeIndex>,
        action: impl FnMut(NodeIndex, &mut S) -> Visit,
    ) -> Option<NodeIndex> {
        self.search_with(start, scratch, step, boundary, action, |node, _| Some(node), |node, _| {
            node
        })
    }

    /// [`Forest::search`] with entry and exit hooks.
    ///
    /// `enter` runs once and maps `start` to the actual first node (or ends
    /// the traversal immediately by returning `None`); it is the place to
    /// pre-seed `scratch` or redirect the entry point. `exit` runs once after
    /// the loop and maps the final node to the returned value.
    pub fn search_with<S>(
        &self,
        start: NodeIndex,
        scratch: &mut S,
        step: Step<A, S>,
        boundary: Option<NodeIndex>,
        mut action: impl FnMut(NodeIndex, &mut S) -> Visit,
        enter: impl FnOnce(NodeIndex, &mut S) -> Option<NodeIndex>,
        exit: impl FnOnce(Option<NodeIndex>, &mut S) -> Option<NodeIndex>,
    ) -> Option<NodeIndex> {
        let mut current = enter(start, scratch);

        while let Some(node) = current {
            if let Visit::Stop = action(node, scratch) {
                break;
            }

            let next = step.advance(self, node, scratch, boundary);
            current = next;

            if next.is_some() && next == boundary {
                break;
            }
        }

        exit(current, scratch)
    }
}
