//! Network State
//!
//! Holds the three nodes of one run. A fresh `Network` is built at the start
//! of every run, so no node state leaks between runs.
//!
//! # Critical Invariants
//!
//! 1. **Fixed topology**: exactly one node per [`NodeKind`]
//! 2. **Busy accounting**: a node's busy time never exceeds elapsed time

use crate::models::node::{Node, NodeKind, NodeState};
use serde::Serialize;

/// The Master, Worker and Lazy nodes of a run
#[derive(Debug, Clone)]
pub struct Network {
    master: Node,
    worker: Node,
    lazy: Node,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Self {
            master: Node::new(NodeKind::Master),
            worker: Node::new(NodeKind::Worker),
            lazy: Node::new(NodeKind::Lazy),
        }
    }

    pub fn node(&self, kind: NodeKind) -> &Node {
        match kind {
            NodeKind::Master => &self.master,
            NodeKind::Worker => &self.worker,
            NodeKind::Lazy => &self.lazy,
        }
    }

    pub fn node_mut(&mut self, kind: NodeKind) -> &mut Node {
        match kind {
            NodeKind::Master => &mut self.master,
            NodeKind::Worker => &mut self.worker,
            NodeKind::Lazy => &mut self.lazy,
        }
    }

    /// Nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        [&self.master, &self.worker, &self.lazy].into_iter()
    }

    /// Whether all three nodes are serving a message
    pub fn all_busy(&self) -> bool {
        self.nodes().all(Node::is_busy)
    }

    /// Messages waiting in any queue
    pub fn total_queued(&self) -> usize {
        self.nodes().map(Node::queue_len).sum()
    }

    /// Read-only view for presentation layers
    pub fn snapshot(&self, clock: f64, run_index: usize) -> NetworkSnapshot {
        NetworkSnapshot {
            clock,
            run_index,
            nodes: self.nodes().map(NodeSnapshot::from).collect(),
        }
    }
}

/// Point-in-time view of one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub kind: NodeKind,
    pub state: NodeState,
    pub queue_length: usize,
    pub received_messages: u64,
    pub sent_messages: u64,
    pub rejected_messages: u64,
}

impl From<&Node> for NodeSnapshot {
    fn from(node: &Node) -> Self {
        Self {
            kind: node.kind(),
            state: node.state(),
            queue_length: node.queue_len(),
            received_messages: node.received_messages(),
            sent_messages: node.sent_messages(),
            rejected_messages: node.rejected_messages(),
        }
    }
}

/// Point-in-time view of the whole network
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    /// Simulated time of the last processed event
    pub clock: f64,

    /// Zero-based index of the run in progress
    pub run_index: usize,

    /// Master, Worker, Lazy
    pub nodes: Vec<NodeSnapshot>,
}

impl NetworkSnapshot {
    pub fn node(&self, kind: NodeKind) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| n.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;

    #[test]
    fn test_snapshot_reports_queue_and_state() {
        let mut network = Network::new();
        network
            .node_mut(NodeKind::Lazy)
            .enqueue(Message::new(NodeKind::Lazy, 1.0), 1.0);
        network.node_mut(NodeKind::Lazy).receive_message();

        let snapshot = network.snapshot(1.0, 0);
        let lazy = snapshot.node(NodeKind::Lazy).unwrap();
        assert_eq!(lazy.queue_length, 1);
        assert_eq!(lazy.received_messages, 1);
        assert_eq!(lazy.state, NodeState::Idle);
        assert_eq!(snapshot.nodes.len(), 3);
        assert!(!network.all_busy());
    }
}
