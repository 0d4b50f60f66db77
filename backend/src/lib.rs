//! Routing Simulator Core - Rust Engine
//!
//! Discrete-event simulation of a three-node message-routing network with
//! deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Simulation clock
//! - **rng**: Seeded random streams and variate generators
//! - **arrivals**: External arrival streams at Worker and Lazy
//! - **models**: Domain types (Message, Node, Event, Network)
//! - **orchestrator**: Event queue and main simulation loop
//! - **stats**: Per-run statistics and cross-run aggregation
//! - **config**: Simulation and network parameters
//!
//! # Critical Invariants
//!
//! 1. Events are processed in non-decreasing time, ties in scheduling order
//! 2. All randomness is deterministic (seeded stream per run)
//! 3. Every consistency violation aborts the run with an error

// Module declarations
pub mod arrivals;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod stats;

// Re-exports for convenience
pub use config::{NetworkConfig, SimulationConfig};
pub use crate::core::time::Clock;
pub use error::SimulationError;
pub use models::{
    event::{Event, EventKind},
    message::{Message, MessageError},
    network::{Network, NetworkSnapshot, NodeSnapshot},
    node::{Node, NodeError, NodeKind, NodeState},
};
pub use orchestrator::Simulator;
pub use rng::{Distribution, RandomStream, RngManager};
pub use stats::{
    CategoryStatistics, ComputerStatistics, MessageCategory, MessageStatistics,
    SimulationStatistics, StatsCollector,
};
