//! # GraphSwarm Core
//!
//! Core particle swarm primitives for laying out a graph of interacting swarms.
//!
//! This crate provides:
//! - The [`Solution`](solution::Solution) value type (position + fitness)
//! - Pluggable objectives and their composition
//! - The planar graph layout problem space
//! - The particle/swarm engine: membership, leadership broadcast, the
//!   evaluate/update step and observer fan-out
//!
//! ## Concurrency model
//!
//! Every particle is meant to be driven by its own execution context (see
//! `graph-swarm-runtime`). Particles cooperate only through shared memory:
//! reads of another particle's state take a short lock on that particle alone,
//! so a multi-neighbour read is a sequence of individually consistent
//! snapshots, never one atomic view. No operation holds locks on two
//! particles at once.

pub mod algorithms;
pub mod identity;
pub mod layout;
pub mod objective;
pub mod observe;
pub mod particle;
pub mod solution;
pub mod swarm;
pub mod traits;

pub use algorithms::ParticleSwarmConfig;
pub use identity::ParticleId;
pub use layout::{LayoutObjective, PlanarGraphLayout};
pub use objective::{CompositeMode, CompositeObjective};
pub use particle::Particle;
pub use solution::Solution;
pub use swarm::SwarmGroup;
pub use traits::{Objective, ProblemSpace, SwarmObserver};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::*;
    pub use crate::layout::*;
    pub use crate::objective::*;
    pub use crate::observe::{ParticleSnapshot, TracingObserver};
    pub use crate::particle::Particle;
    pub use crate::solution::Solution;
    pub use crate::swarm::SwarmGroup;
    pub use crate::traits::*;
}

/// Result type for GraphSwarm operations
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for GraphSwarm core operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A vector argument does not cover the problem dimension
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    /// The particle has left its swarm and has no leader to follow
    #[error("particle is not a member of any swarm")]
    Detached,
    /// No objective has been assigned to the particle's swarm
    #[error("no objective assigned")]
    NoObjective,
    /// A swarm index does not refer to a known swarm
    #[error("unknown swarm index {0}")]
    UnknownSwarm(usize),
}
