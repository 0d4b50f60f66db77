//! Random streams
//!
//! A run draws every variate (interarrival gaps, service times, routing
//! decisions) from a single stream, so a run is a pure function of its
//! stream.
//!
//! # Determinism
//!
//! Same seed + same run index → same sequence of draws. Different run
//! indices select different ChaCha stream ids, which keeps runs of one
//! simulation statistically independent without juggling several seeds.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution as _, StandardNormal};
use std::collections::VecDeque;

/// Source of uniform and standard-normal draws for one run
pub trait RandomStream {
    /// Uniform draw in [0.0, 1.0)
    fn next_f64(&mut self) -> f64;

    /// Draw from N(0, 1)
    fn next_standard_normal(&mut self) -> f64;

    /// Fresh stream for run `run_index` of a multi-run simulation
    fn for_run(&self, run_index: usize) -> Self
    where
        Self: Sized;
}

/// Seeded ChaCha8 generator
///
/// # Example
/// ```
/// use routing_sim_core::rng::{RandomStream, RngManager};
///
/// let mut a = RngManager::new(12345);
/// let mut b = RngManager::new(12345);
/// assert_eq!(a.next_f64(), b.next_f64());
///
/// let u = a.next_f64();
/// assert!((0.0..1.0).contains(&u));
/// ```
#[derive(Debug, Clone)]
pub struct RngManager {
    seed: u64,
    inner: ChaCha8Rng,
}

impl RngManager {
    /// Create a generator on stream 0 of `seed`
    pub fn new(seed: u64) -> Self {
        Self::with_stream(seed, 0)
    }

    /// Create a generator on an explicit ChaCha stream id
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(seed);
        inner.set_stream(stream);
        Self { seed, inner }
    }

    /// Seed this generator was built from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// ChaCha stream id in use
    pub fn stream(&self) -> u64 {
        self.inner.get_stream()
    }
}

impl RandomStream for RngManager {
    fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    fn next_standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    fn for_run(&self, run_index: usize) -> Self {
        Self::with_stream(self.seed, run_index as u64)
    }
}

/// Replays a fixed script of draws
///
/// Uniform draws come from the script in order; once it is exhausted the
/// fallback value is returned. Normal draws work the same way with a
/// fallback of 0.0. Every run restarts the script from the beginning.
///
/// # Example
/// ```
/// use routing_sim_core::rng::{RandomStream, ScriptedStream};
///
/// let mut stream = ScriptedStream::new([0.4, 0.6]).with_fallback(0.9);
/// assert_eq!(stream.next_f64(), 0.4);
/// assert_eq!(stream.next_f64(), 0.6);
/// assert_eq!(stream.next_f64(), 0.9);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedStream {
    uniform_script: Vec<f64>,
    normal_script: Vec<f64>,
    uniforms: VecDeque<f64>,
    normals: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedStream {
    /// Script of uniform draws, each in [0.0, 1.0)
    ///
    /// # Panics
    /// Panics if a scripted value lies outside [0.0, 1.0)
    pub fn new(uniforms: impl IntoIterator<Item = f64>) -> Self {
        let uniform_script: Vec<f64> = uniforms.into_iter().collect();
        assert!(
            uniform_script.iter().all(|u| (0.0..1.0).contains(u)),
            "scripted uniform draws must lie in [0, 1)"
        );
        Self {
            uniforms: uniform_script.iter().copied().collect(),
            uniform_script,
            normal_script: Vec::new(),
            normals: VecDeque::new(),
            fallback: 0.5,
        }
    }

    /// Script of standard-normal draws
    pub fn with_normals(mut self, normals: impl IntoIterator<Item = f64>) -> Self {
        self.normal_script = normals.into_iter().collect();
        self.normals = self.normal_script.iter().copied().collect();
        self
    }

    /// Uniform value returned once the script runs out
    ///
    /// # Panics
    /// Panics if the value lies outside [0.0, 1.0)
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        assert!(
            (0.0..1.0).contains(&fallback),
            "fallback draw must lie in [0, 1)"
        );
        self.fallback = fallback;
        self
    }

    /// Scripted uniform draws not consumed yet
    pub fn remaining(&self) -> usize {
        self.uniforms.len()
    }
}

impl RandomStream for ScriptedStream {
    fn next_f64(&mut self) -> f64 {
        self.uniforms.pop_front().unwrap_or(self.fallback)
    }

    fn next_standard_normal(&mut self) -> f64 {
        self.normals.pop_front().unwrap_or(0.0)
    }

    fn for_run(&self, _run_index: usize) -> Self {
        Self {
            uniforms: self.uniform_script.iter().copied().collect(),
            normals: self.normal_script.iter().copied().collect(),
            uniform_script: self.uniform_script.clone(),
            normal_script: self.normal_script.clone(),
            fallback: self.fallback,
        }
    }
}
