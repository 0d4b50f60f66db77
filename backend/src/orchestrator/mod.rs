//! Orchestrator - event loop of the simulation
//!
//! See `engine.rs` for the run loop and event handlers.

pub mod engine;
pub mod queue;
pub mod trace;

// Re-export main types for convenience
pub use engine::Simulator;
pub use queue::EventQueue;
pub use trace::RunTrace;
