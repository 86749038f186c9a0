//! Objective composition
//!
//! [`CompositeObjective`] merges two objectives into one. It is convenient but
//! evaluates both halves independently, so objectives sharing expensive
//! intermediate work are better written as a single specialised objective.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::particle::Particle;
use crate::traits::Objective;

/// How two objective scores are merged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositeMode {
    /// Arithmetic mean: `(f + g) / 2`
    #[default]
    Additive,
    /// Geometric mean: `sqrt(f * g)`
    Multiplicative,
}

impl CompositeMode {
    /// Merge two scores
    pub fn combine(self, f: f64, g: f64) -> f64 {
        match self {
            CompositeMode::Additive => (f + g) / 2.0,
            CompositeMode::Multiplicative => (f * g).sqrt(),
        }
    }
}

/// An objective combining two other objectives
#[derive(Clone)]
pub struct CompositeObjective {
    f: Arc<dyn Objective>,
    g: Arc<dyn Objective>,
    mode: CompositeMode,
}

impl CompositeObjective {
    /// Combine `f` and `g` with the given mode
    pub fn new(f: Arc<dyn Objective>, g: Arc<dyn Objective>, mode: CompositeMode) -> Self {
        Self { f, g, mode }
    }

    /// Combine `f` and `g` by averaging
    pub fn additive(f: Arc<dyn Objective>, g: Arc<dyn Objective>) -> Self {
        Self::new(f, g, CompositeMode::Additive)
    }

    /// Combine `f` and `g` by geometric mean
    pub fn multiplicative(f: Arc<dyn Objective>, g: Arc<dyn Objective>) -> Self {
        Self::new(f, g, CompositeMode::Multiplicative)
    }

    /// The combination mode
    pub fn mode(&self) -> CompositeMode {
        self.mode
    }
}

impl Objective for CompositeObjective {
    fn compute_fitness(&self, particle: &Particle) -> f64 {
        self.mode.combine(
            self.f.compute_fitness(particle),
            self.g.compute_fitness(particle),
        )
    }
}

impl core::fmt::Debug for CompositeObjective {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompositeObjective")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
