//! Layout configuration and its builder.

use serde::{Deserialize, Serialize};

use graph_swarm_core::{LayoutObjective, ParticleSwarmConfig};

/// Default lower corner of the layout area
pub const DEFAULT_LOWER_BOUNDS: [f64; 2] = [0.0, 0.0];

/// Default upper corner of the layout area
pub const DEFAULT_UPPER_BOUNDS: [f64; 2] = [800.0, 600.0];

/// Configuration for a graph layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmConfig {
    /// Tuning shared by every particle
    pub particle: ParticleSwarmConfig,
    /// Objective assigned to every swarm
    pub objective: LayoutObjective,
    /// Lower corner of the area particles are seeded in
    pub lower_bounds: Vec<f64>,
    /// Upper corner of the area particles are seeded in
    pub upper_bounds: Vec<f64>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            particle: ParticleSwarmConfig::default(),
            objective: LayoutObjective::default(),
            lower_bounds: DEFAULT_LOWER_BOUNDS.to_vec(),
            upper_bounds: DEFAULT_UPPER_BOUNDS.to_vec(),
        }
    }
}

impl SwarmConfig {
    /// Create a new config builder
    pub fn builder() -> SwarmConfigBuilder {
        SwarmConfigBuilder::new()
    }
}

/// Builder for SwarmConfig
#[derive(Debug, Default)]
pub struct SwarmConfigBuilder {
    config: SwarmConfig,
}

impl SwarmConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole particle tuning
    pub fn particle(mut self, particle: ParticleSwarmConfig) -> Self {
        self.config.particle = particle;
        self
    }

    /// Set the velocity inertia
    pub fn inertia(mut self, inertia: f64) -> Self {
        self.config.particle.inertia = inertia;
        self
    }

    /// Set the learning factor
    pub fn learning_factor(mut self, learning_factor: f64) -> Self {
        self.config.particle.learning_factor = learning_factor;
        self
    }

    /// Set the pause between steps
    pub fn pause(mut self, pause: std::time::Duration) -> Self {
        self.config.particle.pause = pause;
        self
    }

    /// Seed every particle's random source
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.config.particle.rng_seed = Some(seed);
        self
    }

    /// Set the layout objective
    pub fn objective(mut self, objective: LayoutObjective) -> Self {
        self.config.objective = objective;
        self
    }

    /// Set the area particles are seeded in
    pub fn bounds(mut self, lower: impl Into<Vec<f64>>, upper: impl Into<Vec<f64>>) -> Self {
        self.config.lower_bounds = lower.into();
        self.config.upper_bounds = upper.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> SwarmConfig {
        self.config
    }
}
