//! Priority thread pool shared by the message bus (router dispatch) and,
//! indirectly, the task subsystem's own queue/worker machinery.
//!
//! A single shared job queue ordered by `(priority desc, fifo-seq asc)`;
//! workers block on a condition variable until work arrives or shutdown is
//! signalled. Job execution errors never stop a worker — they are reported
//! through the job's completion handle.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use tokio::sync::oneshot;

use crate::error::{ConduitError, Result};
use crate::message::Priority;

/// A queued unit of work: an opaque callable returning `anyhow::Result<()>`.
type JobFn = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

struct Job {
    priority: Priority,
    seq: u64,
    func: JobFn,
    completion: oneshot::Sender<Result<()>>,
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}
impl Eq for Job {}

impl PartialOrd for Job {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Job {
    /// `BinaryHeap` is a max-heap; we want highest priority first, and
    /// among equal priorities the lowest (oldest) sequence number first,
    /// so sequence comparison is reversed.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Shared {
    queue: Mutex<BinaryHeap<Job>>,
    condvar: Condvar,
    running: AtomicBool,
    next_seq: AtomicU64,
    pending: AtomicUsize,
    max_queue: Option<usize>,
}

/// A handle to a submitted job's eventual completion.
pub struct JobHandle {
    receiver: oneshot::Receiver<Result<()>>,
}

impl JobHandle {
    pub async fn wait(self) -> Result<()> {
        self.receiver
            .await
            .unwrap_or_else(|_| Err(ConduitError::backend_unavailable("executor dropped job")))
    }
}

/// Priority-aware, work-conserving thread pool.
pub struct ThreadPoolExecutor {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPoolExecutor {
    pub fn new(worker_count: usize) -> Self {
        Self::with_capacity(worker_count, None)
    }

    pub fn with_capacity(worker_count: usize, max_queue: Option<usize>) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(BinaryHeap::new()),
            condvar: Condvar::new(),
            running: AtomicBool::new(true),
            next_seq: AtomicU64::new(0),
            pending: AtomicUsize::new(0),
            max_queue,
        });

        let mut workers = Vec::with_capacity(worker_count.max(1));
        for _ in 0..worker_count.max(1) {
            let shared = Arc::clone(&shared);
            workers.push(std::thread::spawn(move || worker_loop(shared)));
        }

        ThreadPoolExecutor {
            shared,
            workers: Mutex::new(workers),
        }
    }

    /// Enqueue a unit of work; fails with `not_running` when stopped,
    /// `queue_full` when bounded and at capacity.
    pub fn submit<F>(&self, priority: Priority, job: F) -> Result<JobHandle>
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        if !self.shared.running.load(AtomicOrdering::Acquire) {
            return Err(ConduitError::not_running());
        }

        let (tx, rx) = oneshot::channel();
        let seq = self.shared.next_seq.fetch_add(1, AtomicOrdering::Relaxed);
        let job = Job {
            priority,
            seq,
            func: Box::new(job),
            completion: tx,
        };

        {
            let mut queue = self.shared.queue.lock().unwrap();
            if let Some(max) = self.shared.max_queue {
                if queue.len() >= max {
                    return Err(ConduitError::queue_full());
                }
            }
            queue.push(job);
        }
        self.shared.pending.fetch_add(1, AtomicOrdering::Relaxed);
        self.shared.condvar.notify_one();

        Ok(JobHandle { receiver: rx })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.lock().unwrap().len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.shared.pending.load(AtomicOrdering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(AtomicOrdering::Acquire)
    }

    /// Stop accepting new work. `graceful = true` drains the queue before
    /// workers exit; `graceful = false` cancels pending jobs (their handles
    /// resolve with `not_running`). Idempotent: a second call returns
    /// `not_running`.
    pub fn shutdown(&self, graceful: bool) -> Result<()> {
        if !self
            .shared
            .running
            .swap(false, AtomicOrdering::AcqRel)
        {
            return Err(ConduitError::not_running());
        }

        if !graceful {
            let mut queue = self.shared.queue.lock().unwrap();
            while let Some(job) = queue.pop() {
                let _ = job.completion.send(Err(ConduitError::not_running()));
                self.shared.pending.fetch_sub(1, AtomicOrdering::Relaxed);
            }
        }

        self.shared.condvar.notify_all();

        let mut workers = self.workers.lock().unwrap();
        for handle in workers.drain(..) {
            let _ = handle.join();
        }

        Ok(())
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let job = {
            let mut queue = shared.queue.lock().unwrap();
            loop {
                if let Some(job) = queue.pop() {
                    break Some(job);
                }
                if !shared.running.load(AtomicOrdering::Acquire) {
                    break None;
                }
                queue = shared.condvar.wait(queue).unwrap();
            }
        };

        let Some(job) = job else { break };

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job.func))
            .unwrap_or_else(|_| Err(anyhow::anyhow!("job panicked")))
            .map_err(|e| ConduitError::from_internal("job execution", e));

        shared.pending.fetch_sub(1, AtomicOrdering::Relaxed);
        let _ = job.completion.send(result);
    }
}

impl Drop for ThreadPoolExecutor {
    fn drop(&mut self) {
        if self.shared.running.load(AtomicOrdering::Acquire) {
            let _ = self.shutdown(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    #[tokio::test]
    async fn submit_runs_job_and_resolves_handle() {
        let pool = ThreadPoolExecutor::new(2);
        let handle = pool.submit(Priority::Normal, || Ok(())).unwrap();
        handle.wait().await.unwrap();
    }

    #[tokio::test]
    async fn single_worker_runs_highest_priority_first() {
        let pool = ThreadPoolExecutor::new(1);
        let order: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));

        // Block the single worker so all three jobs queue up before any runs.
        let gate = Arc::new((Mutex::new(false), Condvar::new()));
        {
            let gate = Arc::clone(&gate);
            pool.submit(Priority::Critical, move || {
                let (lock, cv) = &*gate;
                let mut ready = lock.lock().unwrap();
                while !*ready {
                    ready = cv.wait(ready).unwrap();
                }
                Ok(())
            })
            .unwrap();
        }

        let mut handles = Vec::new();
        for (p, val) in [(Priority::Low, 1), (Priority::High, 2), (Priority::Normal, 3)] {
            let order = Arc::clone(&order);
            handles.push(
                pool.submit(p, move || {
                    order.lock().unwrap().push(val);
                    Ok(())
                })
                .unwrap(),
            );
        }

        {
            let (lock, cv) = &*gate;
            *lock.lock().unwrap() = true;
            cv.notify_all();
        }

        for h in handles {
            h.wait().await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn job_panic_resolves_handle_with_error_without_killing_worker() {
        let pool = ThreadPoolExecutor::new(1);
        let handle = pool
            .submit(Priority::Normal, || panic!("boom"))
            .unwrap();
        assert!(handle.wait().await.is_err());

        let counter = Arc::new(AtomicI32::new(0));
        let counter2 = Arc::clone(&counter);
        let handle2 = pool
            .submit(Priority::Normal, move || {
                counter2.fetch_add(1, AtomicOrdering::Relaxed);
                Ok(())
            })
            .unwrap();
        handle2.wait().await.unwrap();
        assert_eq!(counter.load(AtomicOrdering::Relaxed), 1);
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let pool = ThreadPoolExecutor::new(1);
        pool.shutdown(true).unwrap();
        assert!(pool.shutdown(true).is_err());
        assert!(!pool.is_running());
    }

    #[test]
    fn submit_after_shutdown_fails() {
        let pool = ThreadPoolExecutor::new(1);
        pool.shutdown(true).unwrap();
        assert!(pool.submit(Priority::Normal, || Ok(())).is_err());
    }

    #[test]
    fn bounded_queue_rejects_when_full() {
        let gate = Arc::new((Mutex::new(false), Condvar::new()));
        let pool = ThreadPoolExecutor::with_capacity(1, Some(1));
        {
            // Occupies the single worker, leaving the queue itself free.
            let gate = Arc::clone(&gate);
            pool.submit(Priority::Normal, move || {
                let (lock, cv) = &*gate;
                let mut ready = lock.lock().unwrap();
                while !*ready {
                    ready = cv.wait(ready).unwrap();
                }
                Ok(())
            })
            .unwrap();
        }
        std::thread::sleep(std::time::Duration::from_millis(20));

        // Fills the one queue slot while the worker is still blocked.
        let first = pool.submit(Priority::Normal, || Ok(()));
        assert!(first.is_ok());
        // Queue is now at capacity; this one must be rejected.
        let second = pool.submit(Priority::Normal, || Ok(()));
        let full = second.is_err();

        {
            let (lock, cv) = &*gate;
            *lock.lock().unwrap() = true;
            cv.notify_all();
        }
        assert!(full);
    }
}
