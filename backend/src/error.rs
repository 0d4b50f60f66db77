//! Simulation error types
//!
//! Configuration errors are reported by [`crate::Simulator::new`] before any
//! run starts. Every other variant is an internal-consistency violation: the
//! run that hit it is aborted and the error is returned to the caller.

use crate::models::{MessageError, NodeError, NodeKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    /// Configuration validation error
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Node state machine violation
    #[error(transparent)]
    Node(#[from] NodeError),

    /// Message lifecycle violation
    #[error(transparent)]
    Message(#[from] MessageError),

    /// An event was popped with a timestamp before the clock
    #[error("Event at t={event_time} is earlier than the clock (t={clock})")]
    TimeWentBackwards { clock: f64, event_time: f64 },

    /// A completed message fits no statistics category
    #[error("Message {id} from {origin} fits no statistics category")]
    UnclassifiableMessage { id: String, origin: NodeKind },

    /// An event reached a node that cannot handle it
    #[error("Unexpected {event} event for {node}")]
    UnexpectedEvent { event: &'static str, node: NodeKind },
}
