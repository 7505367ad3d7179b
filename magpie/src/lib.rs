//! Bounded work queue and fixed-size worker pool.
//!
//! Magpie implements the classic producer-consumer pattern with an
//! explicit, race-free shutdown protocol. Producers push type-erased tasks
//! into a capacity-bounded FIFO queue; a fixed set of worker threads pops
//! and executes them; closing the inlet lets the backlog drain and then
//! winds every worker down, losing nothing that was accepted.
//!
//! ```no_run
//! use std::sync::Arc;
//! use magpie::{TaskContext, WorkerPool};
//!
//! let pool = WorkerPool::new(3, 4).expect("valid pool parameters");
//! for i in 0..10 {
//!     pool.submit(Arc::new(move |ctx: TaskContext| {
//!         println!("task {i} on worker {}", ctx.worker_id);
//!     }))
//!     .expect("pool is open");
//! }
//! pool.close();
//! pool.join();
//! ```
//!
//! The queue is usable on its own, including as the out-of-band result
//! channel the task contract expects (see `examples/pipeline.rs`).

pub mod config;
pub mod error;
pub mod logging;
pub mod pool;
pub mod queue;

// Re-export the contract layer so downstream code only needs one import.
pub use magpie_api::{SharedTask, Task, TaskContext};

pub use config::{DEFAULT_QUEUE_DEPTH, PoolConfig};
pub use error::{ConfigError, PushError, SpawnError};
pub use pool::WorkerPool;
pub use queue::BoundedQueue;
