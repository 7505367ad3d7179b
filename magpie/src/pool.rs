use std::fmt;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, trace};

use magpie_api::{SharedTask, Task, TaskContext};

use crate::config::PoolConfig;
use crate::error::{PushError, SpawnError};
use crate::queue::BoundedQueue;

/// A fixed-size pool of worker threads fed from one bounded task queue.
///
/// Construction spawns every worker up front; each runs a loop that pops a
/// task, executes it with the worker's stable identity, and repeats until
/// the queue reports it is closed and drained. There is no dynamic
/// resizing, no task prioritization and no work stealing: one pool, one
/// queue, FIFO hand-off.
///
/// Shutdown contract: `submit` until done, then [`close`](Self::close),
/// then [`join`](Self::join). Submitting after the close is well-defined
/// (the task is handed back), and joining before the close is legal: it
/// blocks until some other thread closes the pool.
pub struct WorkerPool {
    worker_count: usize,
    queue: Arc<BoundedQueue<SharedTask>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("worker_count", &self.worker_count)
            .field("queue", &self.queue)
            .finish()
    }
}

impl WorkerPool {
    /// Spawn a pool of `workers` threads fed by a queue of depth
    /// `queue_depth`. Both must be at least 1.
    pub fn new(workers: usize, queue_depth: usize) -> Result<Self, SpawnError> {
        Self::with_config(PoolConfig::new(workers, queue_depth))
    }

    /// Spawn a pool from an explicit configuration.
    ///
    /// The queue handle is fully constructed before the first thread is
    /// spawned, so a worker can never observe a partially initialized
    /// pool. If a spawn fails midway, the already-running workers are shut
    /// down before the error is returned, so a failed construction leaves
    /// nothing behind.
    pub fn with_config(config: PoolConfig) -> Result<Self, SpawnError> {
        config.validate()?;
        let queue = Arc::new(BoundedQueue::new(config.queue_depth)?);

        let mut handles = Vec::with_capacity(config.workers);
        for worker_id in 0..config.workers {
            let queue_handle = Arc::clone(&queue);
            let spawned = thread::Builder::new()
                .name(format!("magpie-worker-{worker_id}"))
                .spawn(move || worker_loop(worker_id, queue_handle));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    queue.close();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(SpawnError::Thread { worker_id, source });
                }
            }
        }

        debug!(
            workers = config.workers,
            queue_depth = config.queue_depth,
            "worker pool started"
        );
        Ok(Self {
            worker_count: config.workers,
            queue,
            workers: Mutex::new(handles),
        })
    }

    /// Hand a task to the pool, blocking while the queue is full and still
    /// open.
    ///
    /// Once the pool is closed the task is rejected and handed back inside
    /// the error.
    pub fn submit(&self, task: SharedTask) -> Result<(), PushError<SharedTask>> {
        self.queue.push(task)
    }

    /// Close the pool inlet. One-way and idempotent.
    ///
    /// No task is accepted afterwards; blocked submitters unblock with a
    /// rejection. Workers keep draining whatever was already queued and
    /// exit once the queue is empty.
    pub fn close(&self) {
        self.queue.close();
    }

    /// Discard every queued-but-unstarted task, returning how many were
    /// dropped. Tasks already handed to a worker are unaffected; there is
    /// no preemptive cancellation of in-flight work.
    pub fn drain_pending(&self) -> usize {
        self.queue.drain()
    }

    /// Block until every worker thread has exited its loop, i.e. until the
    /// queue has been closed and fully drained.
    ///
    /// Idempotent: the handle list is emptied under its mutex, so a second
    /// or concurrent `join` finds nothing left to wait on and returns
    /// immediately after the first completes. A worker that panicked is
    /// logged and does not prevent joining the rest; task panics are the
    /// task author's bug, not the pool's.
    pub fn join(&self) {
        let mut workers = self.workers.lock().expect("pool mutex poisoned");
        for handle in workers.drain(..) {
            let name = handle
                .thread()
                .name()
                .unwrap_or("<unnamed>")
                .to_string();
            if handle.join().is_err() {
                error!(worker = %name, "worker thread panicked");
            }
        }
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Depth of the internal task queue.
    pub fn queue_depth(&self) -> usize {
        self.queue.capacity()
    }

    /// Whether the pool inlet has been closed.
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

impl Drop for WorkerPool {
    /// Dropping the pool closes the inlet and waits for the workers, so a
    /// pool that falls out of scope never leaks running threads. Already-
    /// queued tasks still execute; call [`drain_pending`](Self::drain_pending)
    /// first to abort them.
    fn drop(&mut self) {
        self.queue.close();
        self.join();
    }
}

/// The loop every worker thread runs: pop, execute, repeat, exit on the
/// terminal signal. The queue handle arrives as an owned `Arc`, valid
/// before the thread starts.
fn worker_loop(worker_id: usize, queue: Arc<BoundedQueue<SharedTask>>) {
    debug!(worker_id, "worker started");
    let ctx = TaskContext::new(worker_id);
    while let Some(task) = queue.pop() {
        trace!(worker_id, task = task.description(), "task picked up");
        task.run(ctx);
    }
    debug!(worker_id, "queue closed and drained, worker exiting");
}
