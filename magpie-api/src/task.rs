use std::sync::Arc;

use crate::context::TaskContext;

/// A type-erased unit of work.
///
/// A pool accepts any type implementing this trait, so heterogeneous tasks
/// can flow through a single queue. Implementations must be safe to share
/// across threads: the submitter and the pool both hold a reference until
/// the task has executed.
///
/// A task communicates its outcome out of band. The runtime neither catches
/// nor retries failures inside `run`; a task that can fail must report the
/// failure through its own output channel. Panicking out of `run` tears
/// down the executing worker thread and is out of contract.
pub trait Task: Send + Sync {
    /// Execute the task on the calling worker thread.
    fn run(&self, ctx: TaskContext);

    /// Short human-readable label used in diagnostics.
    fn description(&self) -> &str {
        "<unnamed>"
    }
}

/// Shared-ownership handle to a task, as accepted by a worker pool.
pub type SharedTask = Arc<dyn Task>;

/// Plain closures are tasks. This keeps one-off submissions lightweight:
///
/// ```
/// use std::sync::Arc;
/// use magpie_api::{SharedTask, TaskContext};
///
/// let task: SharedTask = Arc::new(|ctx: TaskContext| {
///     println!("running on worker {}", ctx.worker_id);
/// });
/// ```
impl<F> Task for F
where
    F: Fn(TaskContext) + Send + Sync,
{
    fn run(&self, ctx: TaskContext) {
        self(ctx)
    }
}
