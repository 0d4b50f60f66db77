//! Deterministic random number generation
//!
//! All randomness in the simulator MUST go through a [`RandomStream`].
//! Production runs use [`RngManager`] (ChaCha8, one stream id per run);
//! tests can drive the engine with a [`ScriptedStream`].

mod distribution;
mod stream;

pub use distribution::Distribution;
pub use stream::{RandomStream, RngManager, ScriptedStream};
