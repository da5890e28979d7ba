//! # Trigger Binding Worklist
//!
//! Tracks open-trigger elements that appear in the document after mount and
//! hands each one out for binding exactly once.
//!
//! ## Detection vs Action
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Late-Bound Trigger Flow                               │
//! │                                                                         │
//! │  host mutation observer ──► notice(nodes) ──► pending worklist          │
//! │                                                     │                   │
//! │  host frame tick ─────────► drain() ──► newly bound nodes ──► surface  │
//! │                                                                         │
//! │  notice() only records; it never binds. That decoupling is what keeps  │
//! │  the binder from re-entering during its own mutation notifications,    │
//! │  and it makes the batching testable without real DOM timing.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A node stays bound for the binder's lifetime even if the host removes and
//! reinserts it - the handler travels with the element, so rebinding would
//! double it.

use std::collections::HashSet;

use crate::surface::NodeId;

/// Pending-rebind worklist for open triggers.
#[derive(Debug, Default)]
pub struct TriggerBinder {
    /// Nodes already handed out for binding.
    bound: HashSet<NodeId>,

    /// Nodes noticed since the last drain, in notice order.
    pending: Vec<NodeId>,
}

impl TriggerBinder {
    pub fn new() -> Self {
        TriggerBinder::default()
    }

    /// Records trigger nodes the host observed appearing. Already-bound and
    /// already-pending nodes are ignored.
    pub fn notice<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        for node in nodes {
            if !self.bound.contains(&node) && !self.pending.contains(&node) {
                self.pending.push(node);
            }
        }
    }

    /// True if a drain would hand out at least one node.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drains the worklist: marks every pending node bound and returns them
    /// in notice order. Called on a frame boundary by the owner.
    pub fn drain(&mut self) -> Vec<NodeId> {
        let newly: Vec<NodeId> = std::mem::take(&mut self.pending);
        for node in &newly {
            self.bound.insert(*node);
        }
        newly
    }

    /// Whether a node has already been handed out for binding.
    pub fn is_bound(&self, node: NodeId) -> bool {
        self.bound.contains(&node)
    }

    /// Forgets everything. Used by controller teardown.
    pub fn clear(&mut self) {
        self.bound.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noticed_node_binds_on_next_drain() {
        // P6: a trigger inserted after mount becomes bindable within one
        // frame tick.
        let mut binder = TriggerBinder::new();
        binder.notice([NodeId(1)]);

        assert!(binder.has_pending());
        assert_eq!(binder.drain(), vec![NodeId(1)]);
        assert!(binder.is_bound(NodeId(1)));
    }

    #[test]
    fn test_node_is_never_bound_twice() {
        let mut binder = TriggerBinder::new();
        binder.notice([NodeId(1)]);
        binder.drain();

        // Re-noticed after a remove/reinsert cycle: stays bound, no rebind.
        binder.notice([NodeId(1)]);
        assert!(!binder.has_pending());
        assert!(binder.drain().is_empty());
    }

    #[test]
    fn test_rapid_duplicate_notices_collapse() {
        // P6: inserted-then-removed-then-reinserted before a single drain.
        let mut binder = TriggerBinder::new();
        binder.notice([NodeId(7)]);
        binder.notice([NodeId(7)]);
        binder.notice([NodeId(7), NodeId(8)]);

        assert_eq!(binder.drain(), vec![NodeId(7), NodeId(8)]);
    }

    #[test]
    fn test_drain_preserves_notice_order() {
        let mut binder = TriggerBinder::new();
        binder.notice([NodeId(3), NodeId(1), NodeId(2)]);
        assert_eq!(binder.drain(), vec![NodeId(3), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_clear_forgets_bindings() {
        let mut binder = TriggerBinder::new();
        binder.notice([NodeId(1)]);
        binder.drain();
        binder.clear();

        assert!(!binder.is_bound(NodeId(1)));
    }
}
