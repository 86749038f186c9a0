//! # GraphSwarm
//!
//! **Lay out a graph in the plane by letting one particle swarm per node
//! search for a good position.**
//!
//! Each node of the graph is a swarm. The swarm's leader is where the node
//! sits; the objective scores positions by distance to the leaders of adjacent
//! swarms. Every particle runs its own loop, so the layout keeps adapting
//! until it is stopped.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use graph_swarm::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> graph_swarm::Result<()> {
//! let config = SwarmConfig::builder()
//!     .objective(LayoutObjective::Equidistant)
//!     .rng_seed(7)
//!     .build();
//!
//! let mut graph = LayoutGraph::new(config);
//! let a = graph.add_swarm(10);
//! let b = graph.add_swarm(10);
//! let c = graph.add_swarm(10);
//! graph.connect(a, b)?;
//! graph.connect(b, c)?;
//! graph.connect(c, a)?;
//! graph.configure()?;
//!
//! let handle = graph.start(Arc::new(graph_swarm::runtime::default_runtime()));
//! tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//! handle.stop();
//! println!("{:?}", graph.layout());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `tokio-runtime` (default): Use Tokio for particle loops
//!
//! ## Crate Structure
//!
//! - [`graph_swarm_core`]: Particles, swarms, objectives and the layout problem
//! - [`graph_swarm_runtime`]: Particle loops on Tokio tasks or OS threads

#![forbid(unsafe_code)]

// Re-export sub-crates
pub use graph_swarm_core as core;
pub use graph_swarm_runtime as runtime;

// Re-export commonly used items at the top level
pub use graph_swarm_core::{
    algorithms::ParticleSwarmConfig,
    layout::{LayoutObjective, PlanarGraphLayout},
    observe::{ObserverScope, ParticleSnapshot, TracingObserver},
    traits::{Objective, ProblemSpace, SwarmObserver},
    Error, Particle, ParticleId, Result, SwarmGroup,
};

pub use graph_swarm_runtime::{StopToken, SwarmHandle, SwarmRuntime};

pub mod config;
pub mod graph;

pub use config::{SwarmConfig, SwarmConfigBuilder, DEFAULT_LOWER_BOUNDS, DEFAULT_UPPER_BOUNDS};
pub use graph::LayoutGraph;

/// Prelude module for convenient imports
///
/// ```rust
/// use graph_swarm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::ObserverScope;
    pub use crate::runtime::{StopToken, SwarmHandle, SwarmRuntime};

    pub use crate::{LayoutGraph, SwarmConfig, SwarmConfigBuilder};
}
