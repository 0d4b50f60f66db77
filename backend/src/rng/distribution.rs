//! Random variate generators
//!
//! Each variant samples one value from a [`RandomStream`]. Interarrival and
//! service times in the network are all expressed as a `Distribution`, so the
//! nodes and the arrival generator never touch raw uniform draws themselves.

use super::RandomStream;
use serde::{Deserialize, Serialize};

/// Continuous distributions used for interarrival and service times (seconds)
///
/// Every variant is sampled from the stream's own uniform / normal draws
/// rather than `rand_distr` samplers, so a [`super::ScriptedStream`] fixes
/// each sampled value exactly.
///
/// # Example
/// ```
/// use routing_sim_core::rng::{Distribution, RngManager};
///
/// let mut rng = RngManager::new(42);
/// let service = Distribution::Uniform { min: 5.0, max: 10.0 };
/// let t = service.sample(&mut rng);
/// assert!((5.0..10.0).contains(&t));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Distribution {
    /// Exponential with the given rate (mean = 1 / rate), inverse transform
    Exponential { rate: f64 },

    /// Triangular(min, mode, max), inverse transform
    Triangular { min: f64, mode: f64, max: f64 },

    /// Uniform on [min, max)
    Uniform { min: f64, max: f64 },

    /// Density proportional to x² on [lower, upper], acceptance-rejection
    ///
    /// With lower=3, upper=5 this is f(x) = 3x²/98.
    QuadraticAcceptanceRejection { lower: f64, upper: f64 },

    /// Normal(mean, std_dev) with negative draws clamped to zero
    ClampedNormal { mean: f64, std_dev: f64 },

    /// Always `value`
    Deterministic { value: f64 },
}

impl Distribution {
    /// Draw one value
    pub fn sample<R: RandomStream + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Distribution::Exponential { rate } => {
                let u = rng.next_f64();
                -(1.0 - u).ln() / rate
            }
            Distribution::Triangular { min, mode, max } => {
                let u = rng.next_f64();
                let split = (mode - min) / (max - min);
                if u < split {
                    min + (u * (mode - min) * (max - min)).sqrt()
                } else {
                    max - ((1.0 - u) * (max - mode) * (max - min)).sqrt()
                }
            }
            Distribution::Uniform { min, max } => min + (max - min) * rng.next_f64(),
            Distribution::QuadraticAcceptanceRejection { lower, upper } => {
                // f is increasing on [lower, upper], so f(upper) bounds it
                let bound = upper * upper;
                loop {
                    let x = lower + (upper - lower) * rng.next_f64();
                    let u = rng.next_f64();
                    if u <= (x * x) / bound {
                        return x;
                    }
                }
            }
            Distribution::ClampedNormal { mean, std_dev } => {
                (mean + std_dev * rng.next_standard_normal()).max(0.0)
            }
            Distribution::Deterministic { value } => value,
        }
    }

    /// Whether a draw can be exactly zero on a non-negligible set of draws
    ///
    /// Exponential and triangular/uniform with a positive lower bound only
    /// reach zero on a single uniform value, which is ignored.
    pub fn can_yield_zero(&self) -> bool {
        match *self {
            Distribution::Exponential { .. } => false,
            Distribution::Triangular { min, .. } | Distribution::Uniform { min, .. } => min <= 0.0,
            Distribution::QuadraticAcceptanceRejection { lower, .. } => lower <= 0.0,
            Distribution::ClampedNormal { mean, std_dev } => mean <= 0.0 || std_dev > 0.0,
            Distribution::Deterministic { value } => value <= 0.0,
        }
    }

    /// Check the parameters describe a proper non-negative distribution
    pub fn validate(&self) -> Result<(), String> {
        let finite = |name: &str, v: f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(format!("{} must be finite, got {}", name, v))
            }
        };

        match *self {
            Distribution::Exponential { rate } => {
                finite("rate", rate)?;
                if rate <= 0.0 {
                    return Err(format!("exponential rate must be > 0, got {}", rate));
                }
            }
            Distribution::Triangular { min, mode, max } => {
                finite("min", min)?;
                finite("mode", mode)?;
                finite("max", max)?;
                if min < 0.0 || !(min <= mode && mode <= max) || min >= max {
                    return Err(format!(
                        "triangular requires 0 <= min <= mode <= max and min < max, got ({}, {}, {})",
                        min, mode, max
                    ));
                }
            }
            Distribution::Uniform { min, max } => {
                finite("min", min)?;
                finite("max", max)?;
                if min < 0.0 || min >= max {
                    return Err(format!(
                        "uniform requires 0 <= min < max, got ({}, {})",
                        min, max
                    ));
                }
            }
            Distribution::QuadraticAcceptanceRejection { lower, upper } => {
                finite("lower", lower)?;
                finite("upper", upper)?;
                if lower <= 0.0 || lower >= upper {
                    return Err(format!(
                        "acceptance-rejection requires 0 < lower < upper, got ({}, {})",
                        lower, upper
                    ));
                }
            }
            Distribution::ClampedNormal { mean, std_dev } => {
                finite("mean", mean)?;
                finite("std_dev", std_dev)?;
                if std_dev < 0.0 {
                    return Err(format!("std_dev must be >= 0, got {}", std_dev));
                }
            }
            Distribution::Deterministic { value } => {
                finite("value", value)?;
                if value < 0.0 {
                    return Err(format!("deterministic value must be >= 0, got {}", value));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedStream;

    #[test]
    fn test_triangular_inverse_transform_branches() {
        let tri = Distribution::Triangular {
            min: 2.0,
            mode: 4.0,
            max: 10.0,
        };

        // u = 0 → min, u at the split (0.25) → mode via the upper branch
        let mut rng = ScriptedStream::new([0.0, 0.25]);
        assert_eq!(tri.sample(&mut rng), 2.0);
        assert!((tri.sample(&mut rng) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_acceptance_rejection_retries_until_accepted() {
        let ar = Distribution::QuadraticAcceptanceRejection {
            lower: 3.0,
            upper: 5.0,
        };

        // x = 3.0 with u = 0.99 is rejected (9/25 = 0.36), x = 5.0 - tiny accepted
        let mut rng = ScriptedStream::new([0.0, 0.99, 0.999_999, 0.5]);
        let x = ar.sample(&mut rng);
        assert!(x > 4.99 && x <= 5.0);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn test_clamped_normal_never_negative() {
        let normal = Distribution::ClampedNormal {
            mean: 3.0,
            std_dev: 1.0,
        };
        let mut rng = ScriptedStream::new([]).with_normals([-5.0, 1.0]);
        assert_eq!(normal.sample(&mut rng), 0.0);
        assert_eq!(normal.sample(&mut rng), 4.0);
    }

    #[test]
    fn test_can_yield_zero() {
        assert!(Distribution::Deterministic { value: 0.0 }.can_yield_zero());
        assert!(!Distribution::Deterministic { value: 0.5 }.can_yield_zero());
        assert!(Distribution::Uniform { min: 0.0, max: 2.0 }.can_yield_zero());
        assert!(!Distribution::Uniform { min: 5.0, max: 10.0 }.can_yield_zero());
        assert!(Distribution::ClampedNormal {
            mean: 3.0,
            std_dev: 1.0
        }
        .can_yield_zero());
        assert!(!Distribution::ClampedNormal {
            mean: 3.0,
            std_dev: 0.0
        }
        .can_yield_zero());
        assert!(!Distribution::Exponential { rate: 2.0 }.can_yield_zero());
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        assert!(Distribution::Exponential { rate: 0.0 }.validate().is_err());
        assert!(Distribution::Uniform { min: 5.0, max: 5.0 }.validate().is_err());
        assert!(Distribution::Triangular {
            min: 2.0,
            mode: 11.0,
            max: 10.0
        }
        .validate()
        .is_err());
        assert!(Distribution::Deterministic { value: f64::NAN }.validate().is_err());
        assert!(Distribution::Exponential { rate: 1.0 / 15.0 }.validate().is_ok());
    }
}
