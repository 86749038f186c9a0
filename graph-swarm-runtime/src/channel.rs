//! Observer adapter forwarding snapshots over a Tokio channel.
//!
//! The channel is unbounded so `observe` never blocks the particle loop;
//! snapshots from one particle arrive in notification order.

use std::sync::atomic::{AtomicBool, Ordering};

use graph_swarm_core::observe::ParticleSnapshot;
use graph_swarm_core::{Particle, SwarmObserver};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Sends a [`ParticleSnapshot`] per notification
#[derive(Debug)]
pub struct ChannelObserver {
    tx: UnboundedSender<ParticleSnapshot>,
    closed: AtomicBool,
}

impl ChannelObserver {
    pub fn new(tx: UnboundedSender<ParticleSnapshot>) -> Self {
        Self {
            tx,
            closed: AtomicBool::new(false),
        }
    }

    /// An observer together with the receiving end of its channel
    pub fn channel() -> (Self, UnboundedReceiver<ParticleSnapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl SwarmObserver for ChannelObserver {
    fn observe(&self, particle: &Particle) {
        if self.tx.send(ParticleSnapshot::capture(particle)).is_err()
            && !self.closed.swap(true, Ordering::Relaxed)
        {
            tracing::warn!(particle = %particle.id(), "snapshot receiver dropped");
        }
    }
}
