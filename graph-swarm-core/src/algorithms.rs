//! Particle swarm tuning and kinematics
//!
//! Tuning constants of the velocity/position update and the lock-free
//! per-dimension update rule.

use core::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default inertia weight (momentum retained between steps)
pub const DEFAULT_INERTIA: f64 = 0.86;

/// Default learning factor applied to both the leader and personal-best pulls
pub const DEFAULT_LEARNING_FACTOR: f64 = 0.45;

/// Default cooperative pause between loop iterations
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(50);

/// Particle Swarm Optimization (PSO) configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSwarmConfig {
    /// Inertia weight (momentum)
    pub inertia: f64,
    /// Attraction towards the leader's best and the personal best
    pub learning_factor: f64,
    /// Pause between two iterations of a particle loop
    #[serde(with = "millis")]
    pub pause: Duration,
    /// Seed for the per-particle random source; `None` seeds from entropy
    pub rng_seed: Option<u64>,
}

impl Default for ParticleSwarmConfig {
    fn default() -> Self {
        Self {
            inertia: DEFAULT_INERTIA,
            learning_factor: DEFAULT_LEARNING_FACTOR,
            pause: DEFAULT_PAUSE,
            rng_seed: None,
        }
    }
}

impl ParticleSwarmConfig {
    /// Set the inertia weight
    pub fn with_inertia(mut self, inertia: f64) -> Self {
        self.inertia = inertia;
        self
    }

    /// Set the learning factor
    pub fn with_learning_factor(mut self, learning_factor: f64) -> Self {
        self.learning_factor = learning_factor;
        self
    }

    /// Set the pause between loop iterations
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Seed every particle's random source deterministically
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

/// Advance one particle by a single PSO step.
///
/// For each dimension `i`, with fresh `r1, r2 ~ U(0,1)`:
///
/// ```text
/// v[i] = v[i]*inertia + r1*lf*(leader_best[i] - x[i]) + r2*lf*(own_best[i] - x[i])
/// x[i] += v[i]
/// ```
///
/// Slices of unequal length are walked up to the shortest one; this happens
/// transiently when a problem space is reassigned under a running loop.
pub fn advance<R: Rng + ?Sized>(
    config: &ParticleSwarmConfig,
    rng: &mut R,
    position: &mut [f64],
    velocity: &mut [f64],
    own_best: &[f64],
    leader_best: &[f64],
) {
    let lf = config.learning_factor;
    for (((x, v), &pbest), &lbest) in position
        .iter_mut()
        .zip(velocity.iter_mut())
        .zip(own_best)
        .zip(leader_best)
    {
        let r1: f64 = rng.gen();
        let r2: f64 = rng.gen();
        *v = *v * config.inertia + r1 * lf * (lbest - *x) + r2 * lf * (pbest - *x);
        *x += *v;
    }
}

mod millis {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
