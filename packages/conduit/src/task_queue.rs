//! Task queue: ready priority heap plus a time-ordered delayed set, with a
//! background promoter thread. Generalizes the executor's
//! heap-plus-condvar shape (§4.C) onto tasks with an `eta`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::backend::ResultBackend;
use crate::error::{ConduitError, Result};
use crate::message::Priority;
use crate::task::{Task, TaskState};

#[derive(Debug, Clone)]
struct ReadyKey {
    priority: Priority,
    seq: u64,
    task_id: String,
}

impl PartialEq for ReadyKey {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}
impl Eq for ReadyKey {}

impl PartialOrd for ReadyKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReadyKey {
    /// `(priority desc, enqueue-seq asc)`.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Inner {
    ready: BinaryHeap<ReadyKey>,
    delayed: BTreeMap<(DateTime<Utc>, u64), String>,
}

struct Shared {
    inner: Mutex<Inner>,
    condvar: Condvar,
    tasks: DashMap<String, Task>,
    next_seq: AtomicU64,
    stopped: AtomicBool,
    backend: Arc<dyn ResultBackend>,
}

/// Ready-priority heap + delayed time-ordered set for task scheduling.
pub struct TaskQueue {
    shared: Arc<Shared>,
    promoter: Mutex<Option<JoinHandle<()>>>,
}

impl TaskQueue {
    pub fn new(backend: Arc<dyn ResultBackend>) -> Self {
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                ready: BinaryHeap::new(),
                delayed: BTreeMap::new(),
            }),
            condvar: Condvar::new(),
            tasks: DashMap::new(),
            next_seq: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
            backend,
        });

        let promoter_shared = Arc::clone(&shared);
        let promoter = std::thread::spawn(move || promoter_loop(promoter_shared));

        TaskQueue {
            shared,
            promoter: Mutex::new(Some(promoter)),
        }
    }

    /// `task.eta <= now` or absent pushes to the ready heap; otherwise to
    /// the delayed set.
    pub fn schedule(&self, task: Task) -> Result<()> {
        if self.shared.stopped.load(AtomicOrdering::Acquire) {
            return Err(ConduitError::not_running());
        }

        let now = Utc::now();
        let seq = self.shared.next_seq.fetch_add(1, AtomicOrdering::Relaxed);
        let id = task.id.clone();
        let ready_now = task.is_ready(now);
        let eta = task.eta;
        let priority = task.priority();
        if self.shared.backend.get_state(&id).is_err() {
            let _ = self.shared.backend.store_state(
                &id,
                if ready_now { TaskState::Pending } else { TaskState::Scheduled },
            );
        }
        self.shared.tasks.insert(id.clone(), task);

        {
            let mut inner = self.shared.inner.lock().unwrap();
            if ready_now {
                inner.ready.push(ReadyKey {
                    priority,
                    seq,
                    task_id: id,
                });
            } else {
                inner.delayed.insert((eta.unwrap(), seq), id);
            }
        }
        self.shared.condvar.notify_all();
        Ok(())
    }

    /// Blocks up to `timeout` on the ready heap's condition, respecting the
    /// next delayed `eta` for wake-up.
    pub fn dequeue(&self, _worker_id: &str, timeout: Duration) -> Result<Task> {
        let deadline = std::time::Instant::now() + timeout;
        let mut inner = self.shared.inner.lock().unwrap();

        loop {
            promote_due(&self.shared, &mut inner);

            if let Some(ready_key) = inner.ready.pop() {
                if let Some((_, task)) = self.shared.tasks.remove(&ready_key.task_id) {
                    return Ok(task);
                }
                // Id missing means it was cancelled after being scheduled;
                // skip this stale entry and keep draining the heap.
                continue;
            }

            if self.shared.stopped.load(AtomicOrdering::Acquire) {
                return Err(ConduitError::queue_empty());
            }

            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                return Err(ConduitError::queue_empty());
            }

            let wait_for = match inner.delayed.keys().next() {
                Some((eta, _)) => {
                    let to_eta = (*eta - Utc::now()).to_std().unwrap_or(Duration::ZERO);
                    remaining.min(to_eta.max(Duration::from_millis(1)))
                }
                None => remaining,
            };

            let (guard, _timeout) = self.shared.condvar.wait_timeout(inner, wait_for).unwrap();
            inner = guard;
        }
    }

    /// Marks the task cancelled in the backend and removes it from either
    /// structure if still present. `task_not_found` if absent (already
    /// dequeued or never scheduled).
    pub fn cancel(&self, task_id: &str) -> Result<()> {
        if self.shared.tasks.remove(task_id).is_some() {
            self.shared.backend.store_state(task_id, TaskState::Cancelled)?;
            self.shared.condvar.notify_all();
            Ok(())
        } else {
            Err(ConduitError::task_not_found(task_id))
        }
    }

    /// Best-effort: cancels every currently-queued task carrying `tag`.
    /// Returns the number cancelled.
    pub fn cancel_by_tag(&self, tag: &str) -> usize {
        let matching: Vec<String> = self
            .shared
            .tasks
            .iter()
            .filter(|entry| entry.value().tags.iter().any(|t| t == tag))
            .map(|entry| entry.key().clone())
            .collect();

        matching
            .into_iter()
            .filter(|id| self.cancel(id).is_ok())
            .count()
    }

    pub fn pending_count(&self) -> usize {
        self.shared.tasks.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(AtomicOrdering::Acquire)
    }

    pub fn stop(&self) {
        self.shared.stopped.store(true, AtomicOrdering::Release);
        self.shared.condvar.notify_all();
        if let Some(handle) = self.promoter.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        if !self.shared.stopped.load(AtomicOrdering::Acquire) {
            self.stop();
        }
    }
}

fn promote_due(shared: &Shared, inner: &mut Inner) {
    let now = Utc::now();
    loop {
        let due = match inner.delayed.keys().next() {
            Some(key) if key.0 <= now => *key,
            _ => break,
        };
        let id = inner.delayed.remove(&due).unwrap();
        if let Some(task) = shared.tasks.get(&id) {
            inner.ready.push(ReadyKey {
                priority: task.priority(),
                seq: due.1,
                task_id: id,
            });
        }
    }
}

fn promoter_loop(shared: Arc<Shared>) {
    loop {
        let mut inner = shared.inner.lock().unwrap();
        if shared.stopped.load(AtomicOrdering::Acquire) {
            return;
        }

        let before = inner.ready.len();
        promote_due(&shared, &mut inner);
        if inner.ready.len() > before {
            shared.condvar.notify_all();
        }

        let wait_for = match inner.delayed.keys().next() {
            Some((eta, _)) => (*eta - Utc::now()).to_std().unwrap_or(Duration::from_millis(10)),
            None => Duration::from_secs(3600),
        };

        let (guard, _timeout) = shared.condvar.wait_timeout(inner, wait_for).unwrap();
        drop(guard);

        if shared.stopped.load(AtomicOrdering::Acquire) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryResultBackend;
    use crate::container::Container;

    fn queue() -> TaskQueue {
        TaskQueue::new(Arc::new(InMemoryResultBackend::new()))
    }

    #[test]
    fn ready_task_dequeues_in_priority_order() {
        let q = queue();
        q.schedule(Task::builder("low", Container::new()).with_priority(Priority::Low).build())
            .unwrap();
        q.schedule(Task::builder("high", Container::new()).with_priority(Priority::High).build())
            .unwrap();
        assert_eq!(q.dequeue("w1", Duration::from_secs(1)).unwrap().name, "high");
        assert_eq!(q.dequeue("w1", Duration::from_secs(1)).unwrap().name, "low");
    }

    #[test]
    fn delayed_task_is_not_dequeued_before_eta() {
        let q = queue();
        let eta = Utc::now() + chrono::Duration::milliseconds(150);
        q.schedule(Task::builder("later", Container::new()).with_eta(eta).build())
            .unwrap();

        let start = std::time::Instant::now();
        let task = q.dequeue("w1", Duration::from_secs(2)).unwrap();
        assert_eq!(task.name, "later");
        assert!(start.elapsed() >= Duration::from_millis(120));
    }

    #[test]
    fn dequeue_times_out_on_empty_queue() {
        let q = queue();
        assert!(q.dequeue("w1", Duration::from_millis(30)).is_err());
    }

    #[test]
    fn cancel_removes_a_still_queued_task() {
        let q = queue();
        let task = Task::builder("t", Container::new()).build();
        let id = task.id.clone();
        q.schedule(task).unwrap();
        assert!(q.cancel(&id).is_ok());
        assert!(q.dequeue("w1", Duration::from_millis(50)).is_err());
    }

    #[test]
    fn cancel_unknown_task_returns_not_found() {
        let q = queue();
        assert!(q.cancel("nonexistent").is_err());
    }

    #[test]
    fn cancel_by_tag_cancels_all_matching() {
        let q = queue();
        q.schedule(Task::builder("a", Container::new()).with_tag("batch1").build())
            .unwrap();
        q.schedule(Task::builder("b", Container::new()).with_tag("batch1").build())
            .unwrap();
        q.schedule(Task::builder("c", Container::new()).with_tag("batch2").build())
            .unwrap();

        let cancelled = q.cancel_by_tag("batch1");
        assert_eq!(cancelled, 2);
        assert_eq!(q.pending_count(), 1);
    }

    #[test]
    fn pending_count_reflects_queued_tasks() {
        let q = queue();
        q.schedule(Task::builder("a", Container::new()).build()).unwrap();
        q.schedule(Task::builder("b", Container::new()).build()).unwrap();
        assert_eq!(q.pending_count(), 2);
        q.dequeue("w1", Duration::from_secs(1)).unwrap();
        assert_eq!(q.pending_count(), 1);
    }
}
