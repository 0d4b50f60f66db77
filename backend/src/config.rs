//! Simulation configuration
//!
//! [`SimulationConfig`] carries the run parameters (horizon, run count, seed)
//! and a [`NetworkConfig`] with every distribution and routing probability
//! of the three-node network. Defaults reproduce the reference network:
//!
//! | Parameter              | Default                         |
//! |------------------------|---------------------------------|
//! | Worker interarrival    | exponential, rate 1/15          |
//! | Lazy interarrival      | triangular(2, 4, 10)            |
//! | Master service         | normal(3, 1) clamped at 0       |
//! | Worker service         | uniform(5, 10)                  |
//! | Lazy service           | density 3x²/98 on [3, 5]        |
//! | Master → Worker return | 0.2 (Worker-sourced messages)   |
//! | Master → Lazy return   | 0.5 (Lazy-sourced messages)     |
//! | Lazy rejection         | 0.75                            |

use crate::error::SimulationError;
use crate::models::NodeKind;
use crate::rng::Distribution;
use serde::{Deserialize, Serialize};

/// Distributions and routing probabilities of the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Gap between external arrivals at Worker
    pub worker_interarrival: Distribution,

    /// Gap between external arrivals at Lazy
    pub lazy_interarrival: Distribution,

    pub master_service: Distribution,
    pub worker_service: Distribution,
    pub lazy_service: Distribution,

    /// Probability Master sends a Worker-sourced message back to Worker
    pub master_to_worker_probability: f64,

    /// Probability Master sends a Lazy-sourced message back to Lazy
    pub master_to_lazy_probability: f64,

    /// Probability Lazy rejects a message after processing it
    pub lazy_reject_probability: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            worker_interarrival: Distribution::Exponential { rate: 1.0 / 15.0 },
            lazy_interarrival: Distribution::Triangular {
                min: 2.0,
                mode: 4.0,
                max: 10.0,
            },
            master_service: Distribution::ClampedNormal {
                mean: 3.0,
                std_dev: 1.0,
            },
            worker_service: Distribution::Uniform {
                min: 5.0,
                max: 10.0,
            },
            lazy_service: Distribution::QuadraticAcceptanceRejection {
                lower: 3.0,
                upper: 5.0,
            },
            master_to_worker_probability: 0.2,
            master_to_lazy_probability: 0.5,
            lazy_reject_probability: 0.75,
        }
    }
}

impl NetworkConfig {
    /// Service-time distribution of a node
    pub fn service_distribution(&self, kind: NodeKind) -> &Distribution {
        match kind {
            NodeKind::Master => &self.master_service,
            NodeKind::Worker => &self.worker_service,
            NodeKind::Lazy => &self.lazy_service,
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let distributions = [
            ("worker_interarrival", &self.worker_interarrival),
            ("lazy_interarrival", &self.lazy_interarrival),
            ("master_service", &self.master_service),
            ("worker_service", &self.worker_service),
            ("lazy_service", &self.lazy_service),
        ];
        for (name, distribution) in distributions {
            distribution
                .validate()
                .map_err(|e| SimulationError::InvalidConfig(format!("{}: {}", name, e)))?;
        }

        // Zero-gap arrivals would schedule forever at the same instant
        for (name, distribution) in &distributions[..2] {
            if let Distribution::Deterministic { value } = distribution {
                if *value <= 0.0 {
                    return Err(SimulationError::InvalidConfig(format!(
                        "{}: deterministic interarrival must be > 0",
                        name
                    )));
                }
            }
        }

        let probabilities = [
            ("master_to_worker_probability", self.master_to_worker_probability),
            ("master_to_lazy_probability", self.master_to_lazy_probability),
            ("lazy_reject_probability", self.lazy_reject_probability),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }

        // A message that always returns between two nodes with zero service
        // times would bounce forever at the same instant
        let closed_loops = [
            (NodeKind::Worker, self.master_to_worker_probability >= 1.0),
            (
                NodeKind::Lazy,
                self.master_to_lazy_probability >= 1.0 && self.lazy_reject_probability <= 0.0,
            ),
        ];
        for (node, closed) in closed_loops {
            if closed
                && self.master_service.can_yield_zero()
                && self.service_distribution(node).can_yield_zero()
            {
                return Err(SimulationError::InvalidConfig(format!(
                    "master_service and {}_service can both be zero while every {} message returns to {}",
                    node, node, node
                )));
            }
        }

        Ok(())
    }

    /// Parse a JSON document; absent fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json).map_err(|e| {
            SimulationError::Serialization(format!("Config parsing failed: {}", e))
        })
    }
}

/// Complete simulation configuration
///
/// # Example
/// ```
/// use routing_sim_core::SimulationConfig;
///
/// let config = SimulationConfig::new(3_600.0, 10).with_seed(42);
/// assert!(config.validate().is_ok());
///
/// let bad = SimulationConfig::new(0.0, 1);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Horizon of every run in simulated seconds
    pub max_time: f64,

    /// Number of independent runs
    pub runs: usize,

    /// Seed for the run streams
    pub seed: u64,

    pub network: NetworkConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_time: 3_600.0,
            runs: 1,
            seed: 0,
            network: NetworkConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new(max_time: f64, runs: usize) -> Self {
        Self {
            max_time,
            runs,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    /// Parse a JSON document; absent fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json).map_err(|e| {
            SimulationError::Serialization(format!("Config parsing failed: {}", e))
        })
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.max_time.is_finite() || self.max_time <= 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "max_time must be a finite number > 0, got {}",
                self.max_time
            )));
        }

        if self.runs == 0 {
            return Err(SimulationError::InvalidConfig(
                "runs must be >= 1".to_string(),
            ));
        }

        self.network.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_probability_out_of_range() {
        let network = NetworkConfig {
            lazy_reject_probability: 1.5,
            ..Default::default()
        };
        let err = SimulationConfig::default()
            .with_network(network)
            .validate()
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidConfig(msg) if msg.contains("lazy_reject_probability")));
    }

    #[test]
    fn test_zero_deterministic_interarrival_rejected() {
        let network = NetworkConfig {
            worker_interarrival: Distribution::Deterministic { value: 0.0 },
            ..Default::default()
        };
        assert!(network.validate().is_err());
    }
}
