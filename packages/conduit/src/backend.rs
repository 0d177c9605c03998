//! Result backend: state / progress / result / error store with blocking
//! wait-for-result.
//!
//! Grounded directly on
//! `original_source/include/kcenon/messaging/task/memory_result_backend.h`:
//! same operation set, reader-writer locking, and "wake all waiters on every
//! transition, re-check the predicate per task id" idiom. The C++ type uses
//! one shared `condition_variable_any` under a `shared_mutex`; the Rust
//! translation keeps the same shape with `std::sync::{RwLock, Condvar}`
//! rather than per-entry notification, since the original broadcasts to
//! every waiter on each transition and lets each re-check its own id.

use std::collections::HashMap;
use std::sync::{Condvar, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::container::Container;
use crate::error::{ConduitError, Result};
use crate::task::TaskState;

/// Stored error detail for a failed task.
#[derive(Debug, Clone)]
pub struct ErrorData {
    pub message: String,
    pub traceback: Option<String>,
}

/// Stored progress detail for a running task.
#[derive(Debug, Clone, Default)]
pub struct ProgressData {
    pub fraction: f64,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
struct TaskResult {
    state: TaskState,
    result: Option<Container>,
    error: Option<ErrorData>,
    progress: ProgressData,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Default for TaskResult {
    fn default() -> Self {
        let now = Utc::now();
        TaskResult {
            state: TaskState::Pending,
            result: None,
            error: None,
            progress: ProgressData::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

fn is_terminal(state: TaskState) -> bool {
    state.is_terminal()
}

/// Narrow capability interface consumed by the worker pool, task context,
/// and task client. The crate ships the in-memory reference implementation
/// below; alternative (persistent) backends implement the same trait.
pub trait ResultBackend: Send + Sync {
    fn store_state(&self, task_id: &str, state: TaskState) -> Result<()>;
    fn store_result(&self, task_id: &str, result: Container) -> Result<()>;
    fn store_error(&self, task_id: &str, message: &str, traceback: Option<&str>) -> Result<()>;
    fn store_progress(&self, task_id: &str, fraction: f64, message: Option<&str>) -> Result<()>;

    fn get_state(&self, task_id: &str) -> Result<TaskState>;
    fn get_result(&self, task_id: &str) -> Result<Container>;
    fn get_progress(&self, task_id: &str) -> Result<ProgressData>;
    fn get_error(&self, task_id: &str) -> Result<ErrorData>;

    fn wait_for_result(&self, task_id: &str, timeout: Duration) -> Result<Container>;

    fn cleanup_expired(&self, max_age: Duration) -> Result<usize>;

    fn exists(&self, task_id: &str) -> bool;
    fn remove(&self, task_id: &str) -> Result<()>;
    fn size(&self) -> usize;
}

/// In-memory reference implementation of [`ResultBackend`].
pub struct InMemoryResultBackend {
    results: RwLock<HashMap<String, TaskResult>>,
    /// Woken on every state transition; waiters re-check their own task id
    /// on wake, mirroring the C++ backend's shared `condition_variable_any`.
    signal: Mutex<()>,
    condvar: Condvar,
}

impl Default for InMemoryResultBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryResultBackend {
    pub fn new() -> Self {
        InMemoryResultBackend {
            results: RwLock::new(HashMap::new()),
            signal: Mutex::new(()),
            condvar: Condvar::new(),
        }
    }

    fn touch<'a>(
        map: &'a mut HashMap<String, TaskResult>,
        task_id: &str,
    ) -> &'a mut TaskResult {
        map.entry(task_id.to_string()).or_default()
    }

    fn notify_all(&self) {
        let _guard = self.signal.lock().unwrap();
        self.condvar.notify_all();
    }

    /// Remove all stored data. Test-only convenience mirroring the C++
    /// backend's `clear()`.
    pub fn clear(&self) {
        self.results.write().unwrap().clear();
    }
}

impl ResultBackend for InMemoryResultBackend {
    fn store_state(&self, task_id: &str, state: TaskState) -> Result<()> {
        {
            let mut map = self.results.write().unwrap();
            let entry = Self::touch(&mut map, task_id);
            // Once terminal, state and any stored result/error never change.
            if is_terminal(entry.state) {
                return Ok(());
            }
            entry.state = state;
            entry.updated_at = Utc::now();
        }
        self.notify_all();
        Ok(())
    }

    fn store_result(&self, task_id: &str, result: Container) -> Result<()> {
        {
            let mut map = self.results.write().unwrap();
            let entry = Self::touch(&mut map, task_id);
            if is_terminal(entry.state) && entry.result.is_some() {
                return Ok(());
            }
            entry.result = Some(result);
            entry.updated_at = Utc::now();
        }
        self.notify_all();
        Ok(())
    }

    fn store_error(&self, task_id: &str, message: &str, traceback: Option<&str>) -> Result<()> {
        {
            let mut map = self.results.write().unwrap();
            let entry = Self::touch(&mut map, task_id);
            if is_terminal(entry.state) && entry.error.is_some() {
                return Ok(());
            }
            entry.error = Some(ErrorData {
                message: message.to_string(),
                traceback: traceback.map(str::to_string),
            });
            entry.updated_at = Utc::now();
        }
        self.notify_all();
        Ok(())
    }

    fn store_progress(&self, task_id: &str, fraction: f64, message: Option<&str>) -> Result<()> {
        {
            let mut map = self.results.write().unwrap();
            let entry = Self::touch(&mut map, task_id);
            entry.progress = ProgressData {
                fraction: fraction.clamp(0.0, 1.0),
                message: message.map(str::to_string),
            };
            entry.updated_at = Utc::now();
        }
        self.notify_all();
        Ok(())
    }

    fn get_state(&self, task_id: &str) -> Result<TaskState> {
        self.results
            .read()
            .unwrap()
            .get(task_id)
            .map(|e| e.state)
            .ok_or_else(|| ConduitError::task_not_found(task_id))
    }

    fn get_result(&self, task_id: &str) -> Result<Container> {
        let map = self.results.read().unwrap();
        let entry = map
            .get(task_id)
            .ok_or_else(|| ConduitError::task_not_found(task_id))?;
        entry
            .result
            .clone()
            .ok_or_else(|| ConduitError::backend_unavailable("no result stored"))
    }

    fn get_progress(&self, task_id: &str) -> Result<ProgressData> {
        self.results
            .read()
            .unwrap()
            .get(task_id)
            .map(|e| e.progress.clone())
            .ok_or_else(|| ConduitError::task_not_found(task_id))
    }

    fn get_error(&self, task_id: &str) -> Result<ErrorData> {
        let map = self.results.read().unwrap();
        let entry = map
            .get(task_id)
            .ok_or_else(|| ConduitError::task_not_found(task_id))?;
        entry
            .error
            .clone()
            .ok_or_else(|| ConduitError::backend_unavailable("no error stored"))
    }

    fn wait_for_result(&self, task_id: &str, timeout: Duration) -> Result<Container> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            {
                let map = self.results.read().unwrap();
                if let Some(entry) = map.get(task_id) {
                    if entry.state.is_terminal() {
                        return match entry.state {
                            TaskState::Succeeded => entry
                                .result
                                .clone()
                                .ok_or_else(|| ConduitError::backend_unavailable("missing result")),
                            _ => Err(entry
                                .error
                                .as_ref()
                                .map(|e| ConduitError::backend_unavailable(e.message.clone()))
                                .unwrap_or_else(|| ConduitError::backend_unavailable("task did not succeed"))),
                        };
                    }
                }
            }

            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                return Err(ConduitError::timeout(timeout.as_millis() as u64));
            }

            let guard = self.signal.lock().unwrap();
            let (_guard, timed_out) = self.condvar.wait_timeout(guard, remaining).unwrap();
            if timed_out.timed_out() {
                // Fall through to re-check; loop will return timeout if
                // still not terminal on the next deadline check.
                continue;
            }
        }
    }

    fn cleanup_expired(&self, max_age: Duration) -> Result<usize> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::zero());
        let mut map = self.results.write().unwrap();
        let before = map.len();
        map.retain(|_, entry| !(entry.state.is_terminal() && entry.updated_at < cutoff));
        Ok(before - map.len())
    }

    fn exists(&self, task_id: &str) -> bool {
        self.results.read().unwrap().contains_key(task_id)
    }

    fn remove(&self, task_id: &str) -> Result<()> {
        self.results.write().unwrap().remove(task_id);
        Ok(())
    }

    fn size(&self) -> usize {
        self.results.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_and_get_state_round_trips() {
        let backend = InMemoryResultBackend::new();
        backend.store_state("t1", TaskState::Running).unwrap();
        assert_eq!(backend.get_state("t1").unwrap(), TaskState::Running);
    }

    #[test]
    fn terminal_state_is_never_overwritten() {
        let backend = InMemoryResultBackend::new();
        backend.store_state("t1", TaskState::Succeeded).unwrap();
        backend.store_state("t1", TaskState::Failed).unwrap();
        assert_eq!(backend.get_state("t1").unwrap(), TaskState::Succeeded);
    }

    #[test]
    fn wait_for_result_blocks_until_succeeded() {
        use std::sync::Arc;
        let backend = Arc::new(InMemoryResultBackend::new());
        let b2 = Arc::clone(&backend);
        let handle = std::thread::spawn(move || b2.wait_for_result("t1", Duration::from_secs(2)));
        std::thread::sleep(Duration::from_millis(30));
        backend.store_result("t1", Container::new().with("v", 1i32)).unwrap();
        backend.store_state("t1", TaskState::Succeeded).unwrap();
        let result = handle.join().unwrap().unwrap();
        assert_eq!(result.get_i64("v").unwrap(), 1);
    }

    #[test]
    fn wait_for_result_times_out_when_task_never_completes() {
        let backend = InMemoryResultBackend::new();
        backend.store_state("t1", TaskState::Running).unwrap();
        let start = std::time::Instant::now();
        assert!(backend.wait_for_result("t1", Duration::from_millis(30)).is_err());
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn wait_for_result_returns_error_for_failed_task() {
        let backend = InMemoryResultBackend::new();
        backend.store_error("t1", "boom", None).unwrap();
        backend.store_state("t1", TaskState::Failed).unwrap();
        let err = backend.wait_for_result("t1", Duration::from_secs(1));
        assert!(err.is_err());
    }

    #[test]
    fn cleanup_expired_removes_old_terminal_entries_only() {
        let backend = InMemoryResultBackend::new();
        backend.store_state("old", TaskState::Succeeded).unwrap();
        backend.store_state("fresh", TaskState::Running).unwrap();
        {
            let mut map = backend.results.write().unwrap();
            map.get_mut("old").unwrap().updated_at = Utc::now() - chrono::Duration::hours(2);
        }
        let removed = backend.cleanup_expired(Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 1);
        assert!(!backend.exists("old"));
        assert!(backend.exists("fresh"));
    }

    #[test]
    fn exists_remove_and_size() {
        let backend = InMemoryResultBackend::new();
        backend.store_state("t1", TaskState::Pending).unwrap();
        assert!(backend.exists("t1"));
        assert_eq!(backend.size(), 1);
        backend.remove("t1").unwrap();
        assert!(!backend.exists("t1"));
        assert_eq!(backend.size(), 0);
    }
}
