//! External arrival generation
//!
//! Worker and Lazy each receive an independent stream of messages from
//! outside the network. Every processed external arrival schedules the next
//! one of the same stream, which keeps both streams alive for the whole
//! horizon; the scheduler drops whatever falls past it.
//!
//! # Key Principles
//!
//! 1. **Determinism**: Same stream + same config → same arrivals
//! 2. **Per-Node Distributions**: Worker gaps are exponential (mean 15 s),
//!    Lazy gaps triangular(2, 4, 10) by default
//! 3. **Message Creation**: A message is created when its arrival is
//!    generated, stamped with the instant it will arrive
//!
//! # Example
//!
//! ```
//! use routing_sim_core::arrivals::ExternalArrivalGenerator;
//! use routing_sim_core::rng::RngManager;
//! use routing_sim_core::{EventKind, NetworkConfig, NodeKind};
//!
//! let mut rng = RngManager::new(42);
//! let mut generator = ExternalArrivalGenerator::new(&NetworkConfig::default());
//!
//! let event = generator.next_arrival(NodeKind::Lazy, 0.0, &mut rng).unwrap();
//! assert!(event.time() >= 2.0 && event.time() <= 10.0);
//! assert!(matches!(event.kind(), EventKind::ExternalArrival { target: NodeKind::Lazy, .. }));
//! ```

use crate::config::NetworkConfig;
use crate::models::{Event, EventKind, Message, NodeKind};
use crate::rng::{Distribution, RandomStream};

/// Generator for the Worker and Lazy external arrival streams
#[derive(Debug, Clone)]
pub struct ExternalArrivalGenerator {
    worker_interarrival: Distribution,
    lazy_interarrival: Distribution,

    /// Arrivals generated so far (Worker, Lazy)
    generated: (u64, u64),
}

impl ExternalArrivalGenerator {
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            worker_interarrival: network.worker_interarrival,
            lazy_interarrival: network.lazy_interarrival,
            generated: (0, 0),
        }
    }

    /// First arrival of each stream, Worker then Lazy
    pub fn bootstrap<R: RandomStream + ?Sized>(&mut self, now: f64, rng: &mut R) -> Vec<Event> {
        [NodeKind::Worker, NodeKind::Lazy]
            .into_iter()
            .filter_map(|target| self.next_arrival(target, now, rng))
            .collect()
    }

    /// Next external arrival at `target` after `now`
    ///
    /// Returns `None` for Master, which has no external stream.
    pub fn next_arrival<R: RandomStream + ?Sized>(
        &mut self,
        target: NodeKind,
        now: f64,
        rng: &mut R,
    ) -> Option<Event> {
        let gap = match target {
            NodeKind::Master => return None,
            NodeKind::Worker => {
                self.generated.0 += 1;
                self.worker_interarrival.sample(rng)
            }
            NodeKind::Lazy => {
                self.generated.1 += 1;
                self.lazy_interarrival.sample(rng)
            }
        };

        let arrival_time = now + gap;
        Some(Event::new(
            arrival_time,
            EventKind::ExternalArrival {
                target,
                message: Message::new(target, arrival_time),
            },
        ))
    }

    /// Number of arrivals generated for `target` (including ones later
    /// dropped past the horizon)
    pub fn generated(&self, target: NodeKind) -> u64 {
        match target {
            NodeKind::Master => 0,
            NodeKind::Worker => self.generated.0,
            NodeKind::Lazy => self.generated.1,
        }
    }
}
