//! Domain models for the routing network

pub mod event;
pub mod message;
pub mod network;
pub mod node;

// Re-exports
pub use event::{Event, EventKind};
pub use message::{Message, MessageError};
pub use network::{Network, NetworkSnapshot, NodeSnapshot};
pub use node::{Node, NodeError, NodeKind, NodeState};
