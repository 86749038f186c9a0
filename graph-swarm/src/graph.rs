//! Graph topology builder.
//!
//! A [`LayoutGraph`] owns the particles of every swarm (swarms themselves do
//! not own their members) and an undirected adjacency between swarms.
//! `configure` turns the adjacency into one [`PlanarGraphLayout`] problem per
//! swarm; `start` launches every particle.

use std::collections::BTreeSet;
use std::sync::Arc;

use graph_swarm_core::observe::ParticleSnapshot;
use graph_swarm_core::{Error, Particle, PlanarGraphLayout, Result, SwarmGroup};
use graph_swarm_runtime::threads::{spawn_particle_threads, ThreadedSwarm};
use graph_swarm_runtime::{begin_swarming, SwarmHandle, SwarmRuntime};

use crate::SwarmConfig;

/// A graph whose nodes are swarms
#[derive(Debug, Default)]
pub struct LayoutGraph {
    config: SwarmConfig,
    swarms: Vec<Vec<Arc<Particle>>>,
    edges: BTreeSet<(usize, usize)>,
}

impl LayoutGraph {
    pub fn new(config: SwarmConfig) -> Self {
        Self {
            config,
            swarms: Vec::new(),
            edges: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    /// Add a swarm of `size` particles (at least one) and return its index
    pub fn add_swarm(&mut self, size: usize) -> usize {
        let placeholder = PlanarGraphLayout::new(self.config.objective, Vec::new());
        let members = Particle::swarm(&placeholder, size, self.config.particle.clone());
        self.swarms.push(members);
        self.swarms.len() - 1
    }

    /// Make swarms `a` and `b` adjacent. Connecting a swarm to itself does nothing.
    pub fn connect(&mut self, a: usize, b: usize) -> Result<()> {
        self.check(a)?;
        self.check(b)?;
        if a != b {
            self.edges.insert((a.min(b), a.max(b)));
        }
        Ok(())
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.swarms.len() {
            Ok(())
        } else {
            Err(Error::UnknownSwarm(index))
        }
    }

    /// Number of swarms
    pub fn len(&self) -> usize {
        self.swarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swarms.is_empty()
    }

    /// Number of adjacency edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Indices of the swarms adjacent to `index`, ascending
    pub fn adjacent(&self, index: usize) -> Result<Vec<usize>> {
        self.check(index)?;
        Ok(self
            .edges
            .iter()
            .filter_map(|&(a, b)| {
                if a == index {
                    Some(b)
                } else if b == index {
                    Some(a)
                } else {
                    None
                }
            })
            .collect())
    }

    /// Particles created for swarm `index`
    pub fn swarm(&self, index: usize) -> Result<&[Arc<Particle>]> {
        self.swarms
            .get(index)
            .map(Vec::as_slice)
            .ok_or(Error::UnknownSwarm(index))
    }

    /// Every particle of every swarm
    pub fn particles(&self) -> impl Iterator<Item = &Arc<Particle>> {
        self.swarms.iter().flatten()
    }

    fn group(&self, index: usize) -> Option<SwarmGroup> {
        self.swarms
            .get(index)?
            .iter()
            .find_map(|p| p.swarm_group())
    }

    /// Current leader of swarm `index`
    pub fn leader(&self, index: usize) -> Option<Arc<Particle>> {
        self.group(index)?.leader()
    }

    /// Assign every swarm its layout problem and seed every particle.
    ///
    /// Each swarm's objective reads the leaders of its adjacent swarms.
    /// Particles are placed uniformly within the configured bounds.
    pub fn configure(&self) -> Result<()> {
        for (index, members) in self.swarms.iter().enumerate() {
            let adjacent = self
                .adjacent(index)?
                .into_iter()
                .filter_map(|other| self.group(other))
                .collect();
            let space = PlanarGraphLayout::new(self.config.objective, adjacent);
            if let Some(first) = members.first() {
                first.set_problem_space(&space);
            }
        }
        for particle in self.particles() {
            particle.randomize(&self.config.lower_bounds, &self.config.upper_bounds)?;
        }
        tracing::info!(
            swarms = self.swarms.len(),
            edges = self.edges.len(),
            objective = ?self.config.objective,
            "layout configured"
        );
        Ok(())
    }

    /// Launch one loop per particle on `runtime`
    pub fn start<R: SwarmRuntime>(&self, runtime: Arc<R>) -> SwarmHandle {
        let particles: Vec<_> = self.particles().cloned().collect();
        begin_swarming(runtime, &particles)
    }

    /// Launch one OS thread per particle
    pub fn start_threads(&self) -> graph_swarm_runtime::Result<ThreadedSwarm> {
        let particles: Vec<_> = self.particles().cloned().collect();
        spawn_particle_threads(&particles)
    }

    /// Best position of each swarm's leader, indexed like the swarms
    pub fn layout(&self) -> Vec<Option<Vec<f64>>> {
        (0..self.swarms.len())
            .map(|index| self.leader(index).map(|l| l.best_position()))
            .collect()
    }

    /// Snapshot of every particle
    pub fn snapshots(&self) -> Vec<ParticleSnapshot> {
        self.particles()
            .map(|p| ParticleSnapshot::capture(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_swarm_core::LayoutObjective;
    use graph_swarm_runtime::mock_runtime::MockRuntime;

    fn triangle() -> LayoutGraph {
        let config = SwarmConfig::builder().rng_seed(21).build();
        let mut graph = LayoutGraph::new(config);
        for _ in 0..3 {
            graph.add_swarm(4);
        }
        graph.connect(0, 1).unwrap();
        graph.connect(1, 2).unwrap();
        graph.connect(2, 0).unwrap();
        graph
    }

    #[test]
    fn test_add_swarm_builds_separate_swarms() {
        let graph = triangle();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.particles().count(), 12);
        let a = &graph.swarm(0).unwrap()[0];
        let b = &graph.swarm(1).unwrap()[0];
        assert_eq!(a.size_of_swarm(), 4);
        assert!(!a.is_neighbor(b));
    }

    #[test]
    fn test_connect_is_undirected_and_deduplicated() {
        let mut graph = triangle();
        graph.connect(1, 0).unwrap();
        graph.connect(1, 1).unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.adjacent(0).unwrap(), vec![1, 2]);
        assert_eq!(graph.adjacent(1).unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_unknown_swarm_is_rejected() {
        let mut graph = triangle();
        assert_eq!(graph.connect(0, 3), Err(Error::UnknownSwarm(3)));
        assert_eq!(graph.adjacent(7), Err(Error::UnknownSwarm(7)));
        assert!(graph.swarm(3).is_err());
    }

    #[test]
    fn test_configure_seeds_within_bounds() {
        let graph = triangle();
        graph.configure().unwrap();
        for p in graph.particles() {
            let position = p.position();
            assert_eq!(position.len(), 2);
            assert!((0.0..=800.0).contains(&position[0]));
            assert!((0.0..=600.0).contains(&position[1]));
            assert_eq!(p.fitness(), f64::INFINITY);
            assert!(p.objective().is_some());
        }
    }

    #[test]
    fn test_configure_rejects_short_bounds() {
        let config = SwarmConfig::builder().bounds(vec![0.0], vec![1.0]).build();
        let mut graph = LayoutGraph::new(config);
        graph.add_swarm(1);
        assert_eq!(
            graph.configure(),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_swarms_share_objective_per_swarm() {
        let graph = triangle();
        graph.configure().unwrap();
        let swarm = graph.swarm(2).unwrap();
        let objective = swarm[0].objective().unwrap();
        for p in swarm {
            assert!(Arc::ptr_eq(&p.objective().unwrap(), &objective));
        }
    }

    #[test]
    fn test_stepping_produces_a_layout() {
        let graph = triangle();
        graph.configure().unwrap();
        for _ in 0..50 {
            for p in graph.particles() {
                p.step().unwrap();
            }
        }
        let layout = graph.layout();
        assert_eq!(layout.len(), 3);
        for position in layout {
            assert_eq!(position.map(|p| p.len()), Some(2));
        }
        assert_eq!(graph.snapshots().len(), 12);
    }

    #[test]
    fn test_start_launches_every_particle() {
        let graph = triangle();
        graph.configure().unwrap();
        let runtime = Arc::new(MockRuntime::new());
        let handle = graph.start(runtime.clone());
        assert_eq!(runtime.spawned(), 12);
        assert_eq!(handle.len(), 12);
        handle.stop();
    }

    #[test]
    fn test_objective_follows_config() {
        let config = SwarmConfig::builder()
            .objective(LayoutObjective::ViewCenter)
            .build();
        let mut graph = LayoutGraph::new(config);
        graph.add_swarm(1);
        graph.configure().unwrap();
        let p = &graph.swarm(0).unwrap()[0];
        p.randomize(&[398.0, 287.0], &[398.0, 287.0]).unwrap();
        assert_eq!(p.evaluate().unwrap(), 0.0);
    }
}
