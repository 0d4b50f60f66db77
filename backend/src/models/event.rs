//! Simulation events
//!
//! An [`Event`] is an immutable, time-stamped record that drives the
//! scheduler. Each category carries exactly the data it needs:
//!
//! - **SimulationStart**: bootstraps the external arrival streams at t=0
//! - **ExternalArrival** / **InternalArrival**: a message reaches a node's queue
//! - **ProcessingStart**: a node takes the head of its queue into service
//! - **ProcessingEnd**: a node finishes serving a message
//! - **Reject**: Lazy discards a message (terminal)
//! - **Send**: Master sends a message out of the system (terminal)

use crate::models::message::Message;
use crate::models::node::NodeKind;
use serde::Serialize;

/// What an event does when processed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    SimulationStart,

    ExternalArrival { target: NodeKind, message: Message },

    InternalArrival { target: NodeKind, message: Message },

    ProcessingStart { node: NodeKind },

    ProcessingEnd { node: NodeKind, message: Message },

    Reject { message: Message },

    Send { message: Message },
}

impl EventKind {
    /// Short category name, stable across runs (used in logs and digests)
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::SimulationStart => "simulation_start",
            EventKind::ExternalArrival { .. } => "external_arrival",
            EventKind::InternalArrival { .. } => "internal_arrival",
            EventKind::ProcessingStart { .. } => "processing_start",
            EventKind::ProcessingEnd { .. } => "processing_end",
            EventKind::Reject { .. } => "reject",
            EventKind::Send { .. } => "send",
        }
    }

    /// Node the event is addressed to, if any
    pub fn node(&self) -> Option<NodeKind> {
        match self {
            EventKind::SimulationStart => None,
            EventKind::ExternalArrival { target, .. }
            | EventKind::InternalArrival { target, .. } => Some(*target),
            EventKind::ProcessingStart { node } | EventKind::ProcessingEnd { node, .. } => {
                Some(*node)
            }
            EventKind::Reject { .. } => Some(NodeKind::Lazy),
            EventKind::Send { .. } => Some(NodeKind::Master),
        }
    }

    /// Message carried by the event, if any
    pub fn message(&self) -> Option<&Message> {
        match self {
            EventKind::ExternalArrival { message, .. }
            | EventKind::InternalArrival { message, .. }
            | EventKind::ProcessingEnd { message, .. }
            | EventKind::Reject { message }
            | EventKind::Send { message } => Some(message),
            EventKind::SimulationStart | EventKind::ProcessingStart { .. } => None,
        }
    }
}

/// A scheduled state change
///
/// # Example
/// ```
/// use routing_sim_core::{Event, EventKind, NodeKind};
///
/// let event = Event::new(4.5, EventKind::ProcessingStart { node: NodeKind::Worker });
/// assert_eq!(event.time(), 4.5);
/// assert_eq!(event.kind().label(), "processing_start");
/// assert_eq!(event.kind().node(), Some(NodeKind::Worker));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    time: f64,
    kind: EventKind,
}

impl Event {
    pub fn new(time: f64, kind: EventKind) -> Self {
        Self { time, kind }
    }

    /// Simulated time the event fires at
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Consume the event, yielding its payload
    pub fn into_kind(self) -> EventKind {
        self.kind
    }
}
