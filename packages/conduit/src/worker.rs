//! Worker pool: pulls tasks off the [`TaskQueue`], runs registered
//! handlers, and updates the [`ResultBackend`].
//!
//! The handler interface is grounded on
//! `original_source/include/kcenon/messaging/task/task_handler.h`:
//! `task_handler_interface` (`execute`/`on_retry`/`on_failure`/`on_success`)
//! plus the `lambda_task_handler`/`make_handler` adapter for plain
//! closures, ported here as [`TaskHandler`] and [`FnHandler`]. Panic
//! safety inside handler invocation mirrors the teacher's
//! `catch_unwind(AssertUnwindSafe(...))` pattern in `dispatch.rs`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use dashmap::DashMap;

use crate::backend::ResultBackend;
use crate::container::Container;
use crate::error::{ConduitError, Result};
use crate::task::{Task, TaskContext, TaskState};
use crate::task_queue::TaskQueue;

/// Full-control handler interface. Hooks are no-ops by default.
pub trait TaskHandler: Send + Sync {
    fn execute(&self, task: &Task, ctx: &TaskContext) -> anyhow::Result<Container>;

    /// Called before a retry attempt (1-based attempt number that is about
    /// to run).
    fn on_retry(&self, _task: &Task, _attempt: u32) {}
    fn on_failure(&self, _task: &Task, _error: &str) {}
    fn on_success(&self, _task: &Task, _result: &Container) {}
}

type SimpleTaskHandler = Box<dyn Fn(&Task, &TaskContext) -> anyhow::Result<Container> + Send + Sync>;

/// Adapter wrapping a plain closure as a [`TaskHandler`], mirroring the
/// teacher's `lambda_task_handler`.
pub struct FnHandler {
    handler: SimpleTaskHandler,
}

impl FnHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Task, &TaskContext) -> anyhow::Result<Container> + Send + Sync + 'static,
    {
        FnHandler {
            handler: Box::new(handler),
        }
    }
}

impl TaskHandler for FnHandler {
    fn execute(&self, task: &Task, ctx: &TaskContext) -> anyhow::Result<Container> {
        (self.handler)(task, ctx)
    }
}

/// Per-worker statistics, aggregated by the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerStats {
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub retried: u64,
    pub avg_duration: Duration,
}

#[derive(Default)]
struct Counters {
    processed: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
    total_duration_micros: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> WorkerStats {
        let processed = self.processed.load(AtomicOrdering::Relaxed);
        let total_micros = self.total_duration_micros.load(AtomicOrdering::Relaxed);
        WorkerStats {
            processed,
            succeeded: self.succeeded.load(AtomicOrdering::Relaxed),
            failed: self.failed.load(AtomicOrdering::Relaxed),
            retried: self.retried.load(AtomicOrdering::Relaxed),
            avg_duration: if processed > 0 {
                Duration::from_micros(total_micros / processed)
            } else {
                Duration::ZERO
            },
        }
    }
}

/// Configuration for constructing a [`WorkerPool`].
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    pub worker_count: usize,
    pub dequeue_timeout: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        WorkerPoolConfig {
            worker_count: 4,
            dequeue_timeout: Duration::from_millis(200),
        }
    }
}

/// Pulls tasks off a [`TaskQueue`], dispatches to registered handlers, and
/// updates a [`ResultBackend`].
pub struct WorkerPool {
    queue: Arc<TaskQueue>,
    backend: Arc<dyn ResultBackend>,
    handlers: Arc<DashMap<String, Arc<dyn TaskHandler>>>,
    config: WorkerPoolConfig,
    running: Arc<AtomicBool>,
    counters: Arc<Counters>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(queue: Arc<TaskQueue>, backend: Arc<dyn ResultBackend>, config: WorkerPoolConfig) -> Self {
        WorkerPool {
            queue,
            backend,
            handlers: Arc::new(DashMap::new()),
            config,
            running: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(Counters::default()),
            workers: Mutex::new(Vec::new()),
        }
    }

    pub fn register_handler(&self, name: impl Into<String>, handler: Arc<dyn TaskHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn register_fn<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Task, &TaskContext) -> anyhow::Result<Container> + Send + Sync + 'static,
    {
        self.register_handler(name, Arc::new(FnHandler::new(handler)));
    }

    pub fn start(&self) {
        self.running.store(true, AtomicOrdering::Release);
        let mut workers = self.workers.lock().unwrap();
        for i in 0..self.config.worker_count.max(1) {
            let queue = Arc::clone(&self.queue);
            let backend = Arc::clone(&self.backend);
            let handlers = Arc::clone(&self.handlers);
            let running = Arc::clone(&self.running);
            let counters = Arc::clone(&self.counters);
            let dequeue_timeout = self.config.dequeue_timeout;
            let worker_id = format!("worker-{i}");
            workers.push(std::thread::spawn(move || {
                worker_loop(worker_id, queue, backend, handlers, running, counters, dequeue_timeout)
            }));
        }
    }

    /// Graceful shutdown drains the ready heap (workers keep pulling until
    /// the queue reports empty); forced shutdown stops the queue
    /// immediately, marking any task a worker is mid-handler-return on as
    /// `failed(interrupted)`. No thread-cancellation primitive is assumed
    /// either way — both paths let in-flight handlers run to completion.
    pub fn shutdown(&self, graceful: bool) {
        if !graceful {
            self.queue.stop();
        }
        self.running.store(false, AtomicOrdering::Release);
        if graceful {
            self.queue.stop();
        }
        let mut workers = self.workers.lock().unwrap();
        for handle in workers.drain(..) {
            let _ = handle.join();
        }
    }

    pub fn stats(&self) -> WorkerStats {
        self.counters.snapshot()
    }
}

#[allow(clippy::too_many_arguments)]
fn worker_loop(
    worker_id: String,
    queue: Arc<TaskQueue>,
    backend: Arc<dyn ResultBackend>,
    handlers: Arc<DashMap<String, Arc<dyn TaskHandler>>>,
    running: Arc<AtomicBool>,
    counters: Arc<Counters>,
    dequeue_timeout: Duration,
) {
    while running.load(AtomicOrdering::Acquire) {
        let task = match queue.dequeue(&worker_id, dequeue_timeout) {
            Ok(task) => task,
            Err(_) => continue,
        };

        if backend.get_state(&task.id).map(|s| s == TaskState::Cancelled).unwrap_or(false) {
            continue;
        }

        run_task(task, &backend, &handlers, &queue, &counters);
    }
}

fn run_task(
    mut task: Task,
    backend: &Arc<dyn ResultBackend>,
    handlers: &DashMap<String, Arc<dyn TaskHandler>>,
    queue: &Arc<TaskQueue>,
    counters: &Counters,
) {
    task.attempt += 1;
    let _ = backend.store_state(&task.id, TaskState::Running);

    let ctx = TaskContext::new(Arc::clone(backend) as Arc<dyn ResultBackend>, task.id.clone());
    ctx.set_attempt(task.attempt);

    let Some(handler) = handlers.get(&task.name).map(|h| Arc::clone(h.value())) else {
        let _ = backend.store_error(&task.id, "handler_not_found", None);
        let _ = backend.store_state(&task.id, TaskState::Failed);
        return;
    };

    let started = std::time::Instant::now();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        handler.execute(&task, &ctx)
    }));
    let elapsed = started.elapsed();

    counters.processed.fetch_add(1, AtomicOrdering::Relaxed);
    counters
        .total_duration_micros
        .fetch_add(elapsed.as_micros() as u64, AtomicOrdering::Relaxed);

    let result = match outcome {
        Ok(inner) => inner,
        Err(_) => Err(anyhow::anyhow!("handler panicked")),
    };

    match result {
        Ok(output) => {
            let _ = backend.store_result(&task.id, output.clone());
            let _ = backend.store_state(&task.id, TaskState::Succeeded);
            counters.succeeded.fetch_add(1, AtomicOrdering::Relaxed);
            handler.on_success(&task, &output);
        }
        Err(err) => {
            if task.attempt <= task.config.max_retries {
                let delay = task.config.retry_backoff.delay_for(task.attempt);
                counters.retried.fetch_add(1, AtomicOrdering::Relaxed);
                handler.on_retry(&task, task.attempt);
                let _ = backend.store_state(&task.id, TaskState::Retrying);
                let mut retry_task = task.clone();
                retry_task.eta = Some(chrono::Utc::now() + chrono::Duration::from_std(delay).unwrap_or_default());
                let _ = queue.schedule(retry_task);
            } else {
                let message = err.to_string();
                let _ = backend.store_error(&task.id, &message, None);
                let _ = backend.store_state(&task.id, TaskState::Failed);
                counters.failed.fetch_add(1, AtomicOrdering::Relaxed);
                handler.on_failure(&task, &message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryResultBackend;
    use crate::container::Container;

    fn pool() -> (Arc<TaskQueue>, Arc<InMemoryResultBackend>, WorkerPool) {
        let backend = Arc::new(InMemoryResultBackend::new());
        let queue = Arc::new(TaskQueue::new(backend.clone() as Arc<dyn ResultBackend>));
        let pool = WorkerPool::new(
            queue.clone(),
            backend.clone() as Arc<dyn ResultBackend>,
            WorkerPoolConfig {
                worker_count: 1,
                dequeue_timeout: Duration::from_millis(50),
            },
        );
        (queue, backend, pool)
    }

    #[test]
    fn successful_task_reaches_succeeded_state_with_result() {
        let (queue, backend, pool) = pool();
        pool.register_fn("echo", |task, _ctx| Ok(task.payload.clone()));
        pool.start();

        let task = Task::builder("echo", Container::new().with("x", 1i32)).build();
        let id = task.id.clone();
        queue.schedule(task).unwrap();

        let result = backend.wait_for_result(&id, Duration::from_secs(2)).unwrap();
        assert_eq!(result.get_i64("x").unwrap(), 1);
        pool.shutdown(true);
    }

    #[test]
    fn missing_handler_fails_with_handler_not_found() {
        let (queue, backend, pool) = pool();
        pool.start();
        let task = Task::builder("unregistered", Container::new()).build();
        let id = task.id.clone();
        queue.schedule(task).unwrap();

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(backend.get_state(&id).unwrap(), TaskState::Failed);
        let err = backend.get_error(&id).unwrap();
        assert_eq!(err.message, "handler_not_found");
        pool.shutdown(true);
    }

    #[test]
    fn retry_envelope_caps_invocations_at_max_retries_plus_one() {
        let (queue, backend, pool) = pool();
        let attempts = Arc::new(AtomicU64::new(0));
        let attempts2 = Arc::clone(&attempts);
        pool.register_fn("flaky", move |_task, _ctx| {
            attempts2.fetch_add(1, AtomicOrdering::Relaxed);
            Err(anyhow::anyhow!("always fails"))
        });
        pool.start();

        let task = Task::builder("flaky", Container::new())
            .with_config(crate::task::TaskConfig::default().with_max_retries(2).with_retry_backoff(
                crate::task::RetryBackoff {
                    initial: Duration::from_millis(5),
                    multiplier: 1.0,
                    max: Duration::from_millis(5),
                },
            ))
            .build();
        let id = task.id.clone();
        queue.schedule(task).unwrap();

        std::thread::sleep(Duration::from_millis(400));
        assert_eq!(backend.get_state(&id).unwrap(), TaskState::Failed);
        assert_eq!(attempts.load(AtomicOrdering::Relaxed), 3); // max_retries(2) + 1
        pool.shutdown(true);
    }

    #[test]
    fn handler_panic_is_caught_and_reported_as_failure() {
        let (queue, backend, pool) = pool();
        pool.register_fn("boom", |_task, _ctx| panic!("handler exploded"));
        pool.start();

        let task = Task::builder("boom", Container::new()).build();
        let id = task.id.clone();
        queue.schedule(task).unwrap();

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(backend.get_state(&id).unwrap(), TaskState::Failed);
        pool.shutdown(true);
    }

    #[test]
    fn single_worker_priority_tasks_complete_high_before_low() {
        let backend = Arc::new(InMemoryResultBackend::new());
        let queue = Arc::new(TaskQueue::new(backend.clone() as Arc<dyn ResultBackend>));
        let pool = WorkerPool::new(
            queue.clone(),
            backend.clone() as Arc<dyn ResultBackend>,
            WorkerPoolConfig {
                worker_count: 1,
                dequeue_timeout: Duration::from_millis(50),
            },
        );

        let order: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let order2 = Arc::clone(&order);
        pool.register_fn("mark", move |task, _ctx| {
            std::thread::sleep(Duration::from_millis(20));
            order2.lock().unwrap().push(task.id.clone());
            Ok(Container::new())
        });

        use crate::message::Priority;
        let mut ids = Vec::new();
        for p in [Priority::Low, Priority::Low, Priority::Normal, Priority::Normal, Priority::High] {
            let task = Task::builder("mark", Container::new()).with_priority(p).build();
            ids.push((task.id.clone(), p));
            queue.schedule(task).unwrap();
        }
        pool.start();

        std::thread::sleep(Duration::from_millis(500));
        let completed = order.lock().unwrap().clone();
        assert_eq!(completed.len(), 5);
        let high_id = ids.iter().find(|(_, p)| *p == Priority::High).unwrap().0.clone();
        assert_eq!(completed[0], high_id);
        pool.shutdown(true);
    }
}
