//! Core traits for GraphSwarm
//!
//! These traits are the seams between the particle engine and the code that
//! defines what a good layout is (objectives, problem spaces) or watches it
//! evolve (observers).

use std::sync::Arc;

use crate::particle::Particle;

/// A fitness function for swarm optimization
///
/// Implementations must be deterministic and side-effect free given the
/// particle state they read. Lower scores are better; `0.0` is ideal.
pub trait Objective: Send + Sync {
    /// Score the particle's current position
    fn compute_fitness(&self, particle: &Particle) -> f64;
}

/// A problem specification: search space dimension plus the objective to minimize
pub trait ProblemSpace {
    /// Number of variables in the search space
    fn dimension(&self) -> usize;

    /// The objective shared by every particle solving this problem
    fn objective(&self) -> Arc<dyn Objective>;
}

/// A listener notified of particle or swarm state changes
///
/// `observe` runs synchronously on the notifying particle's execution
/// context, so it must return quickly. It may trigger further notifications
/// or (un)register observers; a registration made during a dispatch takes
/// effect from the next dispatch.
pub trait SwarmObserver: Send + Sync {
    /// Called after the observed particle changed state
    fn observe(&self, particle: &Particle);
}

impl<F> Objective for F
where
    F: Fn(&Particle) -> f64 + Send + Sync,
{
    fn compute_fitness(&self, particle: &Particle) -> f64 {
        self(particle)
    }
}

impl<F> SwarmObserver for F
where
    F: Fn(&Particle) + Send + Sync,
{
    fn observe(&self, particle: &Particle) {
        self(particle)
    }
}
