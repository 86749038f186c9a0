//! One OS thread per particle.
//!
//! Threads are named `Particle-<id>` and block in `std::thread::sleep`
//! between steps.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use graph_swarm_core::Particle;

use crate::swarming::step;
use crate::{Result, StopToken};

/// Threads driving a group of particles
#[derive(Debug)]
pub struct ThreadedSwarm {
    stop: StopToken,
    threads: Vec<JoinHandle<Result<u64>>>,
}

impl ThreadedSwarm {
    /// Signal every thread to exit after its current step
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Stop every thread and wait for it, returning each loop's step count.
    ///
    /// A thread that panicked is reported as `None`.
    pub fn join(self) -> Vec<Option<Result<u64>>> {
        self.stop.stop();
        tracing::info!(particles = self.threads.len(), "joining particle threads");
        self.threads
            .into_iter()
            .map(|handle| handle.join().ok())
            .collect()
    }
}

fn run(particle: Arc<Particle>, stop: StopToken) -> Result<u64> {
    let pause = particle.config().pause;
    let mut steps = 0u64;
    while !stop.is_stopped() {
        step(&particle)?;
        steps += 1;
        thread::sleep(pause);
    }
    Ok(steps)
}

/// Start one named thread per particle, all sharing one stop token.
///
/// If a thread cannot be spawned, the ones already started are stopped and
/// the spawn error is returned.
pub fn spawn_particle_threads(particles: &[Arc<Particle>]) -> Result<ThreadedSwarm> {
    let stop = StopToken::new();
    let mut threads = Vec::with_capacity(particles.len());
    for particle in particles {
        let particle = particle.clone();
        let token = stop.clone();
        let spawned = thread::Builder::new()
            .name(format!("Particle-{}", particle.id()))
            .spawn(move || run(particle, token));
        match spawned {
            Ok(handle) => threads.push(handle),
            Err(err) => {
                stop.stop();
                return Err(err.into());
            }
        }
    }
    tracing::info!(particles = threads.len(), "particle threads started");
    Ok(ThreadedSwarm { stop, threads })
}
