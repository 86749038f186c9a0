//! # GraphSwarm Runtime
//!
//! Execution contexts for GraphSwarm particles.
//!
//! Every particle runs its own unbounded evaluate → update → pause loop. This
//! crate drives those loops on:
//! - **Tokio**: one task per particle ([`begin_swarming`])
//! - **OS threads**: one named thread per particle ([`threads::spawn_particle_threads`])
//!
//! Loops run until their [`StopToken`] is triggered.
//!
//! ## Feature Flags
//!
//! - `tokio` (default): Tokio runtime and the channel observer adapter

use core::future::Future;
use core::time::Duration;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod swarming;
pub mod threads;

#[cfg(feature = "tokio")]
pub mod channel;

pub use swarming::{begin_swarming, particle_loop, SwarmHandle};

/// Runtime trait for async operations
pub trait SwarmRuntime: Send + Sync + 'static {
    /// Get the current instant in milliseconds
    fn now(&self) -> u64;

    /// Sleep for the specified duration
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;

    /// Spawn a task
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Result type for runtime operations
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while driving particle loops
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The particle could not take a step
    #[error(transparent)]
    Core(#[from] graph_swarm_core::Error),
    /// The OS refused to start a particle thread
    #[error("failed to spawn particle thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),
}

/// Cooperative cancellation shared by a group of particle loops
///
/// Loops check the token once per iteration, so a stop takes effect within
/// one step plus one pause.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every loop holding this token to exit
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[cfg(feature = "tokio")]
pub mod tokio_runtime {
    //! Tokio-based runtime implementation

    use super::*;

    /// Tokio runtime wrapper
    ///
    /// `spawn` must be called from within a Tokio runtime context.
    #[derive(Debug, Clone, Default)]
    pub struct TokioRuntime;

    impl TokioRuntime {
        /// Create a new Tokio runtime wrapper
        pub fn new() -> Self {
            Self
        }
    }

    impl SwarmRuntime for TokioRuntime {
        fn now(&self) -> u64 {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64
        }

        async fn sleep(&self, duration: Duration) {
            tokio::time::sleep(duration).await;
        }

        fn spawn<F>(&self, future: F)
        where
            F: Future<Output = ()> + Send + 'static,
        {
            tokio::spawn(future);
        }
    }
}

/// Mock runtime for testing
pub mod mock_runtime {
    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize};

    /// Deterministic runtime: sleeping advances a virtual clock instantly,
    /// spawned futures are counted and dropped.
    #[derive(Debug, Default)]
    pub struct MockRuntime {
        current_time_ms: AtomicU64,
        spawned: AtomicUsize,
    }

    impl MockRuntime {
        /// Create a new mock runtime
        pub fn new() -> Self {
            Self::default()
        }

        /// Advance the mock clock
        pub fn advance(&self, duration: Duration) {
            self.current_time_ms
                .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
        }

        /// Number of futures handed to `spawn`
        pub fn spawned(&self) -> usize {
            self.spawned.load(Ordering::SeqCst)
        }
    }

    impl SwarmRuntime for MockRuntime {
        fn now(&self) -> u64 {
            self.current_time_ms.load(Ordering::SeqCst)
        }

        async fn sleep(&self, duration: Duration) {
            self.advance(duration);
        }

        fn spawn<F>(&self, _future: F)
        where
            F: Future<Output = ()> + Send + 'static,
        {
            self.spawned.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Get the default runtime based on features
#[cfg(feature = "tokio")]
pub fn default_runtime() -> tokio_runtime::TokioRuntime {
    tokio_runtime::TokioRuntime::new()
}
