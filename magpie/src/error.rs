use std::fmt;
use std::io;

use thiserror::Error;

/// Errors raised while validating construction parameters.
///
/// Invalid parameters are surfaced synchronously to the constructing
/// caller; they are never clamped and no partial pool is left running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker count must be at least 1")]
    ZeroWorkers,
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,
}

/// Errors raised while bringing a worker pool up.
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    #[error("failed to spawn worker thread {worker_id}: {source}")]
    Thread {
        worker_id: usize,
        #[source]
        source: io::Error,
    },
}

/// Rejection returned by a push once the queue inlet is closed.
///
/// Carries the rejected item back to the caller so nothing is silently
/// dropped on the floor.
#[derive(Error)]
#[error("queue inlet is closed")]
pub struct PushError<T>(pub T);

impl<T> PushError<T> {
    /// Recover the rejected item.
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Manual impl so tasks are not required to be Debug, same trick as the
// channel send errors this shape is modelled on.
impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PushError(..)")
    }
}
