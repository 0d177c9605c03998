//! Task record, configuration, lifecycle state, and execution context.
//!
//! Grounded on `original_source/include/kcenon/messaging/task/task_handler.h`
//! (`task_context` forward declaration, hook signatures) and the task data
//! model in the specification's §3. `Task` is immutable once built — a
//! `TaskBuilder` assembles it, mirroring the teacher's builder-chaining
//! style (`with_*` methods returning `Self`) already used on `Message`.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::ResultBackend;
use crate::container::Container;
use crate::message::Priority;

/// Lifecycle state of a task. Transitions are monotonic with two
/// exceptions: `retrying -> running` and `scheduled -> pending`. Terminal
/// states are `succeeded`, `failed`, `cancelled`, `expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Pending,
    Scheduled,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Expired,
    Retrying,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::Failed | TaskState::Cancelled | TaskState::Expired
        )
    }
}

/// Backoff envelope for task retries: `min(initial * multiplier^(attempt-1), max)`.
#[derive(Debug, Clone, Copy)]
pub struct RetryBackoff {
    pub initial: Duration,
    pub multiplier: f64,
    pub max: Duration,
}

impl Default for RetryBackoff {
    fn default() -> Self {
        RetryBackoff {
            initial: Duration::from_millis(100),
            multiplier: 2.0,
            max: Duration::from_secs(60),
        }
    }
}

impl RetryBackoff {
    /// `attempt` is 1-based (the attempt that just failed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.multiplier.powi((attempt.max(1) - 1) as i32);
        let millis = (self.initial.as_secs_f64() * exp * 1000.0).min(self.max.as_millis() as f64);
        Duration::from_millis(millis.max(0.0) as u64)
    }
}

/// Per-task configuration.
#[derive(Debug, Clone)]
pub struct TaskConfig {
    pub priority: Priority,
    pub max_retries: u32,
    pub retry_backoff: RetryBackoff,
    pub timeout: Option<Duration>,
    pub queue_name: String,
    pub unique_key: Option<String>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        TaskConfig {
            priority: Priority::Normal,
            max_retries: 0,
            retry_backoff: RetryBackoff::default(),
            timeout: None,
            queue_name: "default".to_string(),
            unique_key: None,
        }
    }
}

impl TaskConfig {
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: RetryBackoff) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_queue_name(mut self, name: impl Into<String>) -> Self {
        self.queue_name = name.into();
        self
    }

    pub fn with_unique_key(mut self, key: impl Into<String>) -> Self {
        self.unique_key = Some(key.into());
        self
    }
}

/// An executable work unit: immutable once built.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub payload: Container,
    pub config: TaskConfig,
    pub attempt: u32,
    pub created_at: DateTime<Utc>,
    pub eta: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

impl Task {
    pub fn builder(name: impl Into<String>, payload: Container) -> TaskBuilder {
        TaskBuilder::new(name, payload)
    }

    pub fn priority(&self) -> Priority {
        self.config.priority
    }

    /// A task scheduled with a delay is not ready until its `eta` passes.
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.eta.map_or(true, |eta| eta <= now)
    }

    /// Clones this task's template (name, payload, config, tags) with a
    /// fresh id and no `eta`/attempt history, used by the scheduler to
    /// stamp a new instance on each fire.
    pub fn reinstantiate(&self) -> Task {
        Task {
            id: Uuid::new_v4().to_string(),
            name: self.name.clone(),
            payload: self.payload.clone(),
            config: self.config.clone(),
            attempt: 0,
            created_at: Utc::now(),
            eta: None,
            tags: self.tags.clone(),
        }
    }
}

/// Builder for [`Task`].
pub struct TaskBuilder {
    name: String,
    payload: Container,
    config: TaskConfig,
    eta: Option<DateTime<Utc>>,
    tags: Vec<String>,
}

impl TaskBuilder {
    pub fn new(name: impl Into<String>, payload: Container) -> Self {
        TaskBuilder {
            name: name.into(),
            payload,
            config: TaskConfig::default(),
            eta: None,
            tags: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: TaskConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.config.priority = priority;
        self
    }

    pub fn with_eta(mut self, eta: DateTime<Utc>) -> Self {
        self.eta = Some(eta);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn build(self) -> Task {
        Task {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            payload: self.payload,
            config: self.config,
            attempt: 0,
            created_at: Utc::now(),
            eta: self.eta,
            tags: self.tags,
        }
    }
}

/// Execution context passed to handler invocations. A cheap, `Clone`
/// handle (per the re-architecture guidance against raw-pointer shared
/// state): it owns an `Arc<dyn ResultBackend>`, the task id, and an
/// `Arc<AtomicBool>` cancellation flag set by `cancel()` and polled by
/// `is_cancelled()`. It deliberately diverges from a teacher "immutable
/// context" shape because progress/cancellation are inherently mutable
/// per-invocation state the handler must reach.
#[derive(Clone)]
pub struct TaskContext {
    backend: Arc<dyn ResultBackend>,
    task_id: String,
    cancelled: Arc<AtomicBool>,
    attempt: Arc<AtomicU32>,
}

impl TaskContext {
    pub fn new(backend: Arc<dyn ResultBackend>, task_id: impl Into<String>) -> Self {
        TaskContext {
            backend,
            task_id: task_id.into(),
            cancelled: Arc::new(AtomicBool::new(false)),
            attempt: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn update_progress(&self, fraction: f64, message: Option<&str>) {
        let _ = self
            .backend
            .store_progress(&self.task_id, fraction.clamp(0.0, 1.0), message);
    }

    pub fn log_info(&self, msg: &str) {
        tracing::info!(task_id = %self.task_id, "{msg}");
    }

    pub fn log_warn(&self, msg: &str) {
        tracing::warn!(task_id = %self.task_id, "{msg}");
    }

    pub fn log_error(&self, msg: &str) {
        tracing::error!(task_id = %self.task_id, "{msg}");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::Acquire)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, AtomicOrdering::Release);
    }

    pub fn attempt(&self) -> u32 {
        self.attempt.load(AtomicOrdering::Relaxed)
    }

    pub(crate) fn set_attempt(&self, attempt: u32) {
        self.attempt.store(attempt, AtomicOrdering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryResultBackend;

    #[test]
    fn builder_produces_pending_ready_task() {
        let task = Task::builder("email.send", Container::new().with("to", "a@b.com")).build();
        assert!(task.is_ready(Utc::now()));
        assert_eq!(task.attempt, 0);
    }

    #[test]
    fn task_with_future_eta_is_not_ready() {
        let eta = Utc::now() + chrono::Duration::seconds(60);
        let task = Task::builder("t", Container::new()).with_eta(eta).build();
        assert!(!task.is_ready(Utc::now()));
    }

    #[test]
    fn backoff_grows_geometrically_and_caps_at_max() {
        let backoff = RetryBackoff {
            initial: Duration::from_millis(100),
            multiplier: 2.0,
            max: Duration::from_millis(300),
        };
        assert_eq!(backoff.delay_for(1), Duration::from_millis(100));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(200));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(300)); // capped from 400
    }

    #[test]
    fn reinstantiate_gets_a_fresh_id_and_zero_attempt() {
        let template = Task::builder("heartbeat", Container::new()).build();
        let fresh = template.reinstantiate();
        assert_ne!(template.id, fresh.id);
        assert_eq!(fresh.attempt, 0);
        assert!(fresh.eta.is_none());
    }

    #[test]
    fn context_cancellation_is_observed_cooperatively() {
        let backend = Arc::new(InMemoryResultBackend::new());
        let ctx = TaskContext::new(backend, "t1");
        assert!(!ctx.is_cancelled());
        ctx.cancel();
        assert!(ctx.is_cancelled());
    }
}
