//! Node (computer) model
//!
//! The network has exactly three nodes, one per [`NodeKind`]:
//! - **Master** (id 1): receives processed messages from Worker and Lazy and
//!   either sends them out of the system or returns them for reprocessing
//! - **Worker** (id 2): receives external messages, always forwards to Master
//! - **Lazy** (id 3): receives external messages, rejects most of them and
//!   forwards the rest to Master
//!
//! Each node serves one message at a time from a FIFO queue. A node is busy
//! exactly while `busy_since` is set; the start marker and the busy flag are
//! the same field, so one can never exist without the other.

use crate::config::NetworkConfig;
use crate::models::event::{Event, EventKind};
use crate::models::message::Message;
use crate::rng::RandomStream;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// The three node variants of the fixed topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Master,
    Worker,
    Lazy,
}

impl NodeKind {
    /// All nodes, in id order
    pub const ALL: [NodeKind; 3] = [NodeKind::Master, NodeKind::Worker, NodeKind::Lazy];

    /// Fixed numeric id (Master=1, Worker=2, Lazy=3)
    pub fn id(self) -> u8 {
        match self {
            NodeKind::Master => 1,
            NodeKind::Worker => 2,
            NodeKind::Lazy => 3,
        }
    }

    /// Whether the node receives messages from outside the system
    pub fn has_external_arrivals(self) -> bool {
        !matches!(self, NodeKind::Master)
    }

    /// Draw a service duration from this node's distribution
    pub fn processing_time<R: RandomStream + ?Sized>(
        self,
        network: &NetworkConfig,
        rng: &mut R,
    ) -> f64 {
        network.service_distribution(self).sample(rng)
    }

    /// Event that starts service at this node
    pub fn start_of_service(self) -> EventKind {
        EventKind::ProcessingStart { node: self }
    }

    /// Event that ends service of `message` at this node
    pub fn end_of_service(self, message: Message) -> EventKind {
        EventKind::ProcessingEnd {
            node: self,
            message,
        }
    }

    /// Decide where a processed message goes next
    ///
    /// Returns the single follow-up event, scheduled at `now`.
    pub fn determine_outcome<R: RandomStream + ?Sized>(
        self,
        now: f64,
        message: Message,
        rng: &mut R,
        network: &NetworkConfig,
    ) -> Result<Event, NodeError> {
        let kind = match self {
            NodeKind::Worker => EventKind::InternalArrival {
                target: NodeKind::Master,
                message,
            },
            NodeKind::Lazy => {
                if rng.next_f64() <= network.lazy_reject_probability {
                    EventKind::Reject { message }
                } else {
                    EventKind::InternalArrival {
                        target: NodeKind::Master,
                        message,
                    }
                }
            }
            NodeKind::Master => {
                let draw = rng.next_f64();
                match message.source() {
                    NodeKind::Worker if draw <= network.master_to_worker_probability => {
                        EventKind::InternalArrival {
                            target: NodeKind::Worker,
                            message,
                        }
                    }
                    NodeKind::Lazy if draw <= network.master_to_lazy_probability => {
                        EventKind::InternalArrival {
                            target: NodeKind::Lazy,
                            message,
                        }
                    }
                    NodeKind::Master => {
                        return Err(NodeError::UnroutableSource {
                            node: self,
                            id: message.id().to_string(),
                        })
                    }
                    _ => EventKind::Send { message },
                }
            }
        };

        Ok(Event::new(now, kind))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Master => "master",
            NodeKind::Worker => "worker",
            NodeKind::Lazy => "lazy",
        };
        f.write_str(name)
    }
}

/// Idle (nothing in service) or Busy (one message in service)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Idle,
    Busy,
}

/// Errors raised by node state transitions
///
/// Every variant means the scheduler drove a node into an impossible
/// transition; none of them is recoverable.
#[derive(Debug, Error, PartialEq)]
pub enum NodeError {
    #[error("{node} cannot begin service at t={time}: queue is empty")]
    EmptyQueue { node: NodeKind, time: f64 },

    #[error("{node} cannot begin service at t={time}: already busy")]
    AlreadyBusy { node: NodeKind, time: f64 },

    #[error("{node} cannot end service at t={time}: not busy")]
    NotBusy { node: NodeKind, time: f64 },

    #[error("{node} cannot route message {id}: it originated at the master")]
    UnroutableSource { node: NodeKind, id: String },
}

/// A computer in the network
///
/// # Example
/// ```
/// use routing_sim_core::{Message, Node, NodeKind, NodeState, NetworkConfig};
/// use routing_sim_core::rng::ScriptedStream;
///
/// let mut worker = Node::new(NodeKind::Worker);
/// worker.enqueue(Message::new(NodeKind::Worker, 1.0), 1.0);
///
/// let mut rng = ScriptedStream::new([0.4]);
/// let end = worker.begin_service(1.0, &mut rng, &NetworkConfig::default()).unwrap();
/// assert_eq!(worker.state(), NodeState::Busy);
/// assert!((end.time() - 8.0).abs() < 1e-9); // uniform(5, 10) at u = 0.4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    kind: NodeKind,

    /// Messages waiting for service, head is served next
    queue: VecDeque<Message>,

    /// Start of the current busy interval, `None` while idle
    busy_since: Option<f64>,

    /// Sum of completed busy intervals
    busy_time: f64,

    /// A processing-start event is already scheduled for this node
    start_pending: bool,

    received_messages: u64,
    sent_messages: u64,
    rejected_messages: u64,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            queue: VecDeque::new(),
            busy_since: None,
            busy_time: 0.0,
            start_pending: false,
            received_messages: 0,
            sent_messages: 0,
            rejected_messages: 0,
        }
    }

    /// Append a message to the tail of the queue
    pub fn enqueue(&mut self, mut message: Message, now: f64) {
        message.mark_enqueue_time(now);
        self.queue.push_back(message);
    }

    /// Whether a processing-start must be scheduled now
    ///
    /// True when the node is idle, has work queued and no start is pending.
    pub fn needs_start(&self) -> bool {
        !self.is_busy() && !self.start_pending && !self.queue.is_empty()
    }

    /// Record that a processing-start event has been scheduled
    pub fn mark_start_pending(&mut self) {
        self.start_pending = true;
    }

    /// Take the head of the queue into service
    ///
    /// Returns the end-of-service event at `now + service_time`.
    pub fn begin_service<R: RandomStream + ?Sized>(
        &mut self,
        now: f64,
        rng: &mut R,
        network: &NetworkConfig,
    ) -> Result<Event, NodeError> {
        if self.is_busy() {
            return Err(NodeError::AlreadyBusy {
                node: self.kind,
                time: now,
            });
        }
        let mut message = self.queue.pop_front().ok_or(NodeError::EmptyQueue {
            node: self.kind,
            time: now,
        })?;

        self.start_pending = false;
        self.busy_since = Some(now);
        message.update_wait_time(now);

        let service_time = self.kind.processing_time(network, rng);
        Ok(Event::new(
            now + service_time,
            self.kind.end_of_service(message),
        ))
    }

    /// Finish serving `message` and decide its outcome
    pub fn end_service<R: RandomStream + ?Sized>(
        &mut self,
        now: f64,
        message: Message,
        rng: &mut R,
        network: &NetworkConfig,
    ) -> Result<Event, NodeError> {
        let since = self.busy_since.take().ok_or(NodeError::NotBusy {
            node: self.kind,
            time: now,
        })?;
        self.busy_time += now - since;

        self.kind.determine_outcome(now, message, rng, network)
    }

    /// Count the open busy interval up to `now` without ending service
    ///
    /// Used when a run stops with a message still in service.
    pub fn close_open_interval(&mut self, now: f64) {
        if let Some(since) = self.busy_since {
            self.busy_time += (now - since).max(0.0);
            self.busy_since = Some(now);
        }
    }

    pub fn receive_message(&mut self) {
        self.received_messages += 1;
    }

    pub fn send_message(&mut self) {
        self.sent_messages += 1;
    }

    pub fn reject_message(&mut self) {
        self.rejected_messages += 1;
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_busy(&self) -> bool {
        self.busy_since.is_some()
    }

    pub fn state(&self) -> NodeState {
        if self.is_busy() {
            NodeState::Busy
        } else {
            NodeState::Idle
        }
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn busy_since(&self) -> Option<f64> {
        self.busy_since
    }

    pub fn busy_time(&self) -> f64 {
        self.busy_time
    }

    pub fn received_messages(&self) -> u64 {
        self.received_messages
    }

    pub fn sent_messages(&self) -> u64 {
        self.sent_messages
    }

    pub fn rejected_messages(&self) -> u64 {
        self.rejected_messages
    }
}
