//! The per-particle search loop on an async runtime.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use graph_swarm_core::Particle;

use crate::{Result, StopToken, SwarmRuntime};

/// Take one step, logging why a particle cannot
pub(crate) fn step(particle: &Particle) -> Result<f64> {
    particle.step().map_err(|err| {
        tracing::warn!(particle = %particle.id(), error = %err, "particle loop exiting");
        err.into()
    })
}

/// Run `evaluate(); update(); pause` until `stop` fires or `limit` steps have run.
///
/// The pause is the particle's configured delay. Returns the number of
/// completed steps. A particle that is detached or has no objective ends the
/// loop with an error.
pub async fn particle_loop<R: SwarmRuntime>(
    runtime: &R,
    particle: Arc<Particle>,
    stop: StopToken,
    limit: Option<u64>,
) -> Result<u64> {
    let pause = particle.config().pause;
    let started = runtime.now();
    let mut steps = 0u64;
    while !stop.is_stopped() && limit.map_or(true, |limit| steps < limit) {
        step(&particle)?;
        steps += 1;
        runtime.sleep(pause).await;
    }
    tracing::trace!(
        particle = %particle.id(),
        steps,
        elapsed_ms = runtime.now().saturating_sub(started),
        "particle loop finished"
    );
    Ok(steps)
}

/// Handle over a group of running particle loops
#[derive(Debug, Clone)]
pub struct SwarmHandle {
    stop: StopToken,
    running: Arc<AtomicUsize>,
    launched: usize,
}

impl SwarmHandle {
    pub(crate) fn new(stop: StopToken, launched: usize) -> Self {
        Self {
            stop,
            running: Arc::new(AtomicUsize::new(launched)),
            launched,
        }
    }

    /// Signal every loop to exit after its current step
    pub fn stop(&self) {
        if !self.stop.is_stopped() {
            tracing::info!(particles = self.launched, "stopping swarm");
        }
        self.stop.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// The token shared by every loop of this handle
    pub fn token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Number of loops that have not finished yet
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of loops launched
    pub fn len(&self) -> usize {
        self.launched
    }

    pub fn is_empty(&self) -> bool {
        self.launched == 0
    }

    pub(crate) fn finished(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Counts a loop as finished when dropped, including while unwinding
struct Finished(SwarmHandle);

impl Drop for Finished {
    fn drop(&mut self) {
        self.0.finished();
    }
}

/// Spawn one unbounded loop per particle on `runtime`.
///
/// The loops share one stop token; the returned handle stops them all.
pub fn begin_swarming<R: SwarmRuntime>(
    runtime: Arc<R>,
    particles: &[Arc<Particle>],
) -> SwarmHandle {
    let handle = SwarmHandle::new(StopToken::new(), particles.len());
    for particle in particles {
        let runtime_ref = runtime.clone();
        let particle = particle.clone();
        let stop = handle.token();
        let done = handle.clone();
        runtime.spawn(async move {
            let _done = Finished(done);
            let _ = particle_loop(&*runtime_ref, particle, stop, None).await;
        });
    }
    tracing::info!(particles = particles.len(), "swarming started");
    handle
}
