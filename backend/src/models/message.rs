//! Message model
//!
//! A message is one unit of work routed through the network. It records:
//! - The node it entered the system through (Worker or Lazy)
//! - When it arrived, when it was last enqueued and when it left
//! - How long it has spent waiting in queues so far
//! - Whether it left by being rejected

use crate::models::node::NodeKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during message lifecycle updates
#[derive(Debug, Error, PartialEq)]
pub enum MessageError {
    #[error("Message {id} already departed at t={exit_time}")]
    AlreadyDeparted { id: String, exit_time: f64 },
}

/// A unit of work travelling between nodes
///
/// # Example
/// ```
/// use routing_sim_core::{Message, NodeKind};
///
/// let mut msg = Message::new(NodeKind::Worker, 2.0);
/// msg.mark_enqueue_time(2.0);
/// msg.update_wait_time(8.0);
/// assert_eq!(msg.wait_time(), 6.0);
///
/// msg.mark_departure(11.0, false).unwrap();
/// assert_eq!(msg.time_in_system(), Some(9.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID), informational only
    id: String,

    /// Node the message entered the system through
    source: NodeKind,

    /// Simulated time of the external arrival
    arrival_time: f64,

    /// Time the message entered its current queue
    enqueue_time: f64,

    /// Total time spent queued, across every node visited
    wait_time: f64,

    /// Time the message left the system, set exactly once
    exit_time: Option<f64>,

    /// Whether the message left by rejection
    rejected: bool,
}

impl Message {
    /// Create a message arriving from outside at `arrival_time`
    pub fn new(source: NodeKind, arrival_time: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source,
            arrival_time,
            enqueue_time: arrival_time,
            wait_time: 0.0,
            exit_time: None,
            rejected: false,
        }
    }

    /// Record that the message entered a queue at `now`
    pub fn mark_enqueue_time(&mut self, now: f64) {
        self.enqueue_time = now;
    }

    /// Add the time queued since the last enqueue, returns the increment
    ///
    /// The increment is never negative, so `wait_time` only grows.
    pub fn update_wait_time(&mut self, now: f64) -> f64 {
        let waited = (now - self.enqueue_time).max(0.0);
        self.wait_time += waited;
        waited
    }

    /// Record the terminal departure (sent or rejected)
    pub fn mark_departure(&mut self, now: f64, rejected: bool) -> Result<(), MessageError> {
        if let Some(exit_time) = self.exit_time {
            return Err(MessageError::AlreadyDeparted {
                id: self.id.clone(),
                exit_time,
            });
        }
        self.exit_time = Some(now);
        self.rejected = rejected;
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> NodeKind {
        self.source
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn enqueue_time(&self) -> f64 {
        self.enqueue_time
    }

    pub fn wait_time(&self) -> f64 {
        self.wait_time
    }

    pub fn exit_time(&self) -> Option<f64> {
        self.exit_time
    }

    pub fn is_rejected(&self) -> bool {
        self.rejected
    }

    /// Time between arrival and departure, `None` while still in the system
    pub fn time_in_system(&self) -> Option<f64> {
        self.exit_time.map(|exit| exit - self.arrival_time)
    }
}
