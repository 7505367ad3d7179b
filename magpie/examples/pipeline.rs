//! Producer → pool → collector pipeline.
//!
//! A producer thread feeds ten multiplication tasks into a pool of three
//! workers through a depth-4 queue, so the producer periodically blocks on
//! backpressure. Each task reports its result out of band through a second
//! bounded queue owned by this binary and drained by a collector thread.
//!
//! Run with `RUST_LOG=debug cargo run --example pipeline` to watch the
//! worker lifecycle.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use magpie::{logging, BoundedQueue, Task, TaskContext, WorkerPool};
use tracing::{info, warn};

struct MulTask {
    task_id: usize,
    alpha: f64,
    beta: f64,
    think_time: Duration,
    label: String,
    output: Arc<BoundedQueue<MulResult>>,
}

struct MulResult {
    task_id: usize,
    worker_id: usize,
    gamma: f64,
}

impl Task for MulTask {
    fn run(&self, ctx: TaskContext) {
        info!(
            task_id = self.task_id,
            worker_id = ctx.worker_id,
            alpha = self.alpha,
            beta = self.beta,
            "task started"
        );
        thread::sleep(self.think_time);

        let result = MulResult {
            task_id: self.task_id,
            worker_id: ctx.worker_id,
            gamma: self.alpha * self.beta,
        };
        if self.output.push(result).is_err() {
            warn!(task_id = self.task_id, "result queue closed, result dropped");
        }
    }

    fn description(&self) -> &str {
        &self.label
    }
}

fn main() -> Result<()> {
    logging::init_default();

    const NUM_TASKS: usize = 10;
    const QUEUE_DEPTH: usize = 4;

    let results = Arc::new(BoundedQueue::<MulResult>::new(QUEUE_DEPTH)?);

    let collector = {
        let results = Arc::clone(&results);
        thread::spawn(move || {
            let mut collected = 0usize;
            while let Some(result) = results.pop() {
                info!(
                    task_id = result.task_id,
                    worker_id = result.worker_id,
                    gamma = result.gamma,
                    "result collected"
                );
                collected += 1;
            }
            info!("result queue closed and drained, collector shutting down");
            collected
        })
    };

    let pool = WorkerPool::new(3, QUEUE_DEPTH)?;

    let producer = {
        let results = Arc::clone(&results);
        thread::spawn(move || {
            for task_id in 0..NUM_TASKS {
                let task = MulTask {
                    task_id,
                    alpha: task_id as f64,
                    beta: 10.0 + task_id as f64,
                    think_time: Duration::from_millis(100 * (1 + task_id as u64 % 3)),
                    label: format!("mul-task-{task_id}"),
                    output: Arc::clone(&results),
                };
                if pool.submit(Arc::new(task)).is_err() {
                    warn!(task_id, "pool already closed, task rejected");
                    break;
                }
                info!(task_id, "task submitted");
            }

            pool.close();
            info!("pool inlet closed, waiting for workers");
            pool.join();
        })
    };

    producer.join().expect("producer thread panicked");
    info!("all workers shut down");

    // Workers are gone, so no further results can arrive.
    results.close();
    let collected = collector.join().expect("collector thread panicked");
    info!(collected, "pipeline finished");

    Ok(())
}
