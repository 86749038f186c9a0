//! Observer fan-out and particle snapshots.
//!
//! Each particle owns two independent registries: one notified after every
//! position update (particle scope) and one notified whenever the particle
//! adopts a leader (swarm scope). Dispatch is synchronous on the notifying
//! thread and serialized per registry; registries of different particles
//! dispatch independently. Dispatch is reentrant: an observer may trigger a
//! notification of the registry it is being called from, which is delivered
//! inline on the same thread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use serde::{Deserialize, Serialize};

use crate::identity::ParticleId;
use crate::particle::Particle;
use crate::solution::Solution;
use crate::traits::SwarmObserver;

/// Which registry of a particle an observer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObserverScope {
    /// Fired after every update step
    Particle,
    /// Fired on every leadership change
    Swarm,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered list of observers with serialized, reentrant dispatch
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    observers: Mutex<Vec<Arc<dyn SwarmObserver>>>,
    /// Held for the whole of a top-level dispatch
    dispatch: Mutex<()>,
    /// Thread currently dispatching, if any
    owner: Mutex<Option<ThreadId>>,
}

/// Clears the dispatch owner, also when an observer panics
struct OwnerReset<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for OwnerReset<'_> {
    fn drop(&mut self) {
        *lock(self.0) = None;
    }
}

impl ObserverRegistry {
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn SwarmObserver>>> {
        lock(&self.observers)
    }

    pub(crate) fn register(&self, observer: Arc<dyn SwarmObserver>) {
        self.lock().push(observer);
    }

    /// Remove the first registration of `observer`; returns whether one was found
    pub(crate) fn unregister(&self, observer: &Arc<dyn SwarmObserver>) -> bool {
        let mut observers = self.lock();
        match observers.iter().position(|o| same_observer(o, observer)) {
            Some(pos) => {
                observers.remove(pos);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Call every observer registered when the dispatch starts
    pub(crate) fn notify(&self, particle: &Particle) {
        let me = thread::current().id();
        let reentrant = *lock(&self.owner) == Some(me);
        let observers = self.lock().clone();

        if reentrant {
            for observer in &observers {
                observer.observe(particle);
            }
            return;
        }

        let _serial = lock(&self.dispatch);
        *lock(&self.owner) = Some(me);
        let _reset = OwnerReset(&self.owner);
        for observer in &observers {
            observer.observe(particle);
        }
    }
}

// Compare data pointers only; vtable pointers for one type may differ across codegen units.
fn same_observer(a: &Arc<dyn SwarmObserver>, b: &Arc<dyn SwarmObserver>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Point-in-time copy of a particle's observable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    pub id: ParticleId,
    /// Id of the particle this one follows, if any
    pub leader: Option<ParticleId>,
    pub current: Solution,
    pub best: Solution,
    pub velocity: Vec<f64>,
    /// Number of members in the particle's swarm (0 when detached)
    pub swarm_size: usize,
}

impl ParticleSnapshot {
    /// Capture the particle's state.
    ///
    /// Each field group is read under its own short lock, so a snapshot taken
    /// while the particle is running may mix two consecutive steps.
    pub fn capture(particle: &Particle) -> Self {
        Self {
            id: particle.id(),
            leader: particle.leader().map(|l| l.id()),
            current: particle.current(),
            best: particle.best(),
            velocity: particle.velocity(),
            swarm_size: particle.size_of_swarm(),
        }
    }

    /// Whether the particle followed itself when captured
    pub fn is_leader(&self) -> bool {
        self.leader == Some(self.id)
    }
}

/// Observer that logs every notification through `tracing`
#[derive(Debug, Clone, Copy)]
pub struct TracingObserver {
    scope: ObserverScope,
}

impl TracingObserver {
    pub fn new(scope: ObserverScope) -> Self {
        Self { scope }
    }
}

impl SwarmObserver for TracingObserver {
    fn observe(&self, particle: &Particle) {
        match self.scope {
            ObserverScope::Particle => tracing::trace!(
                particle = %particle.id(),
                position = %particle.current(),
                fitness = particle.fitness(),
                "particle updated"
            ),
            ObserverScope::Swarm => tracing::debug!(
                particle = %particle.id(),
                leader = ?particle.leader().map(|l| l.id()),
                "leader adopted"
            ),
        }
    }
}
