//! Task client: the submission-side fluent API over a [`TaskQueue`] and
//! [`ResultBackend`], plus the chain and chord composition helpers.
//!
//! Grounded on `original_source/include/kcenon/messaging/task/task_client.h`'s
//! method surface (`send`, `send_later`, `send_at`, `send_batch`, `chain`,
//! `chord`, `get_result`, `cancel`, `cancel_by_tag`, `pending_count`,
//! `is_connected`). The header returns plain `async_result` values with no
//! error channel; this port instead returns `Result<AsyncResult>` from the
//! submission calls themselves, consistent with every other fallible
//! operation in this crate, while `AsyncResult::get` carries the per-task
//! failure the same way the original's blocking `get()` does.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::ResultBackend;
use crate::container::Container;
use crate::error::{ConduitError, Result};
use crate::task::{Task, TaskState};
use crate::task_queue::TaskQueue;

/// A handle to a task's eventual result. Cheap to clone; `get` blocks the
/// calling thread on the backend's condition variable.
#[derive(Clone)]
pub struct AsyncResult {
    task_id: String,
    backend: Arc<dyn ResultBackend>,
}

impl AsyncResult {
    pub(crate) fn new(task_id: impl Into<String>, backend: Arc<dyn ResultBackend>) -> Self {
        AsyncResult {
            task_id: task_id.into(),
            backend,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn state(&self) -> Result<TaskState> {
        self.backend.get_state(&self.task_id)
    }

    /// Blocks up to `timeout` for the task to reach a terminal state.
    pub fn get(&self, timeout: Duration) -> Result<Container> {
        self.backend.wait_for_result(&self.task_id, timeout)
    }
}

/// Submission-side API: schedules tasks onto a [`TaskQueue`] and hands back
/// [`AsyncResult`] handles backed by a shared [`ResultBackend`].
pub struct TaskClient {
    queue: Arc<TaskQueue>,
    backend: Arc<dyn ResultBackend>,
}

impl TaskClient {
    pub fn new(queue: Arc<TaskQueue>, backend: Arc<dyn ResultBackend>) -> Self {
        TaskClient { queue, backend }
    }

    fn submit(&self, task: Task) -> Result<AsyncResult> {
        let id = task.id.clone();
        self.queue.schedule(task)?;
        Ok(AsyncResult::new(id, Arc::clone(&self.backend)))
    }

    /// Submit an already-built task for immediate (or `eta`-gated) dispatch.
    pub fn send_task(&self, task: Task) -> Result<AsyncResult> {
        self.submit(task)
    }

    /// Build and submit a task from a name and payload, using default config.
    pub fn send(&self, name: impl Into<String>, payload: Container) -> Result<AsyncResult> {
        self.submit(Task::builder(name, payload).build())
    }

    /// Submit a task to run no earlier than `delay` from now.
    pub fn send_later(&self, task: Task, delay: Duration) -> Result<AsyncResult> {
        let eta = Utc::now()
            + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
        self.send_at(task, eta)
    }

    /// Submit a task to run no earlier than the given instant.
    pub fn send_at(&self, mut task: Task, eta: DateTime<Utc>) -> Result<AsyncResult> {
        task.eta = Some(eta);
        self.submit(task)
    }

    /// Submit many independent tasks. Each is attempted; a submission
    /// failure for one does not prevent the others from being scheduled.
    pub fn send_batch(&self, tasks: Vec<Task>) -> Vec<Result<AsyncResult>> {
        tasks.into_iter().map(|t| self.submit(t)).collect()
    }

    /// Chain tasks so each runs only after its predecessor succeeds, with
    /// the predecessor's result fed in as the next task's payload. Returns
    /// immediately with a handle for the whole chain; a background thread
    /// performs the sequencing. The first failure aborts the remaining
    /// steps and is surfaced through the returned handle.
    pub fn chain(&self, tasks: Vec<Task>) -> Result<AsyncResult> {
        if tasks.is_empty() {
            return Err(ConduitError::invalid_message("chain requires at least one task"));
        }

        let workflow_id = Uuid::new_v4().to_string();
        self.backend.store_state(&workflow_id, TaskState::Pending)?;

        let backend = Arc::clone(&self.backend);
        let queue = Arc::clone(&self.queue);
        let workflow = workflow_id.clone();
        std::thread::spawn(move || run_chain(queue, backend, workflow, tasks));

        Ok(AsyncResult::new(workflow_id, Arc::clone(&self.backend)))
    }

    /// Run `tasks` in parallel (fan-out), then run `callback` once every
    /// task has succeeded, with its payload replaced by a container keyed
    /// by each fan-out task's id mapped to that task's result. A failure in
    /// any fan-out task skips the callback and propagates to the returned
    /// handle. Fan-out tasks are submitted eagerly; a submission failure
    /// there is returned immediately rather than deferred to the handle.
    pub fn chord(&self, tasks: Vec<Task>, callback: Task) -> Result<AsyncResult> {
        if tasks.is_empty() {
            return Err(ConduitError::invalid_message("chord requires at least one task"));
        }

        let workflow_id = Uuid::new_v4().to_string();
        self.backend.store_state(&workflow_id, TaskState::Pending)?;

        let mut ids = Vec::with_capacity(tasks.len());
        for task in &tasks {
            ids.push(task.id.clone());
        }
        for task in tasks {
            self.queue.schedule(task)?;
        }

        let backend = Arc::clone(&self.backend);
        let queue = Arc::clone(&self.queue);
        let workflow = workflow_id.clone();
        std::thread::spawn(move || run_chord(queue, backend, workflow, ids, callback));

        Ok(AsyncResult::new(workflow_id, Arc::clone(&self.backend)))
    }

    /// A handle to a previously-submitted task's result, by id.
    pub fn get_result(&self, task_id: impl Into<String>) -> AsyncResult {
        AsyncResult::new(task_id, Arc::clone(&self.backend))
    }

    pub fn cancel(&self, task_id: &str) -> Result<()> {
        self.queue.cancel(task_id)
    }

    pub fn cancel_by_tag(&self, tag: &str) -> usize {
        self.queue.cancel_by_tag(tag)
    }

    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }

    pub fn is_connected(&self) -> bool {
        !self.queue.is_stopped()
    }
}

/// Large but bounded: orchestration threads wait on each step rather than
/// blocking forever, so a stuck upstream task surfaces as a workflow error
/// instead of leaking the thread permanently.
const STEP_WAIT: Duration = Duration::from_secs(3600);

fn run_chain(queue: Arc<TaskQueue>, backend: Arc<dyn ResultBackend>, workflow_id: String, tasks: Vec<Task>) {
    let mut payload: Option<Container> = None;
    let mut last_result: Option<Container> = None;

    for mut task in tasks {
        if let Some(p) = payload.take() {
            task.payload = p;
        }
        let id = task.id.clone();

        if let Err(e) = queue.schedule(task) {
            fail_workflow(&backend, &workflow_id, &e.to_string());
            return;
        }

        match backend.wait_for_result(&id, STEP_WAIT) {
            Ok(result) => {
                last_result = Some(result.clone());
                payload = Some(result);
            }
            Err(e) => {
                fail_workflow(&backend, &workflow_id, &e.to_string());
                return;
            }
        }
    }

    if let Some(result) = last_result {
        let _ = backend.store_result(&workflow_id, result);
        let _ = backend.store_state(&workflow_id, TaskState::Succeeded);
    }
}

fn run_chord(
    queue: Arc<TaskQueue>,
    backend: Arc<dyn ResultBackend>,
    workflow_id: String,
    fan_out_ids: Vec<String>,
    mut callback: Task,
) {
    let mut results = BTreeMap::new();
    for id in fan_out_ids {
        match backend.wait_for_result(&id, STEP_WAIT) {
            Ok(result) => {
                results.insert(id, result);
            }
            Err(e) => {
                fail_workflow(&backend, &workflow_id, &e.to_string());
                return;
            }
        }
    }

    callback.payload = Container::from_keyed(results);
    let callback_id = callback.id.clone();

    if let Err(e) = queue.schedule(callback) {
        fail_workflow(&backend, &workflow_id, &e.to_string());
        return;
    }

    match backend.wait_for_result(&callback_id, STEP_WAIT) {
        Ok(result) => {
            let _ = backend.store_result(&workflow_id, result);
            let _ = backend.store_state(&workflow_id, TaskState::Succeeded);
        }
        Err(e) => fail_workflow(&backend, &workflow_id, &e.to_string()),
    }
}

fn fail_workflow(backend: &Arc<dyn ResultBackend>, workflow_id: &str, message: &str) {
    let _ = backend.store_error(workflow_id, message, None);
    let _ = backend.store_state(workflow_id, TaskState::Failed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryResultBackend;

    fn client() -> (TaskClient, Arc<TaskQueue>, Arc<dyn ResultBackend>) {
        let backend: Arc<dyn ResultBackend> = Arc::new(InMemoryResultBackend::new());
        let queue = Arc::new(TaskQueue::new(Arc::clone(&backend)));
        let client = TaskClient::new(Arc::clone(&queue), Arc::clone(&backend));
        (client, queue, backend)
    }

    #[test]
    fn send_enqueues_a_dequeueable_task() {
        let (client, queue, _backend) = client();
        let handle = client.send("greet", Container::new().with("name", "a")).unwrap();
        let task = queue.dequeue("w1", Duration::from_secs(1)).unwrap();
        assert_eq!(task.id, handle.task_id());
    }

    #[test]
    fn send_later_is_not_immediately_ready() {
        let (client, queue, _backend) = client();
        let task = Task::builder("delayed", Container::new()).build();
        client.send_later(task, Duration::from_millis(200)).unwrap();
        assert!(queue.dequeue("w1", Duration::from_millis(30)).is_err());
    }

    #[test]
    fn send_batch_returns_one_result_per_task() {
        let (client, _queue, _backend) = client();
        let tasks = vec![
            Task::builder("a", Container::new()).build(),
            Task::builder("b", Container::new()).build(),
        ];
        let results = client.send_batch(tasks);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn chain_feeds_each_result_into_the_next_payload() {
        let (client, queue, backend) = client();
        let t1 = Task::builder("double", Container::new().with("v", 2i64)).build();
        let t2 = Task::builder("double", Container::new()).build();
        let handle = client.chain(vec![t1.clone(), t2.clone()]).unwrap();

        let got1 = queue.dequeue("w1", Duration::from_secs(1)).unwrap();
        assert_eq!(got1.id, t1.id);
        backend
            .store_result(&got1.id, Container::new().with("v", 4i64))
            .unwrap();
        backend.store_state(&got1.id, TaskState::Succeeded).unwrap();

        let got2 = queue.dequeue("w1", Duration::from_secs(1)).unwrap();
        assert_eq!(got2.payload.get_i64("v").unwrap(), 4);
        backend
            .store_result(&got2.id, Container::new().with("v", 8i64))
            .unwrap();
        backend.store_state(&got2.id, TaskState::Succeeded).unwrap();

        let result = handle.get(Duration::from_secs(1)).unwrap();
        assert_eq!(result.get_i64("v").unwrap(), 8);
    }

    #[test]
    fn chain_failure_propagates_to_the_workflow_handle() {
        let (client, queue, backend) = client();
        let t1 = Task::builder("boom", Container::new()).build();
        let t2 = Task::builder("unreached", Container::new()).build();
        let handle = client.chain(vec![t1.clone(), t2]).unwrap();

        let got1 = queue.dequeue("w1", Duration::from_secs(1)).unwrap();
        assert_eq!(got1.id, t1.id);
        backend.store_error(&got1.id, "boom", None).unwrap();
        backend.store_state(&got1.id, TaskState::Failed).unwrap();

        assert!(handle.get(Duration::from_secs(1)).is_err());
        assert!(queue.dequeue("w1", Duration::from_millis(50)).is_err());
    }

    #[test]
    fn chord_merges_fan_out_results_into_callback_payload() {
        let (client, queue, backend) = client();
        let a = Task::builder("a", Container::new()).build();
        let b = Task::builder("b", Container::new()).build();
        let callback = Task::builder("merge", Container::new()).build();
        let (a_id, b_id, callback_id) = (a.id.clone(), b.id.clone(), callback.id.clone());

        let handle = client.chord(vec![a, b], callback).unwrap();

        let first = queue.dequeue("w1", Duration::from_secs(1)).unwrap();
        let second = queue.dequeue("w1", Duration::from_secs(1)).unwrap();
        for (task, n) in [(&first, 1i64), (&second, 2i64)] {
            backend.store_result(&task.id, Container::new().with("n", n)).unwrap();
            backend.store_state(&task.id, TaskState::Succeeded).unwrap();
        }

        let merged = queue.dequeue("w1", Duration::from_secs(1)).unwrap();
        assert_eq!(merged.id, callback_id);
        assert!(merged.payload.get(&a_id).is_some());
        assert!(merged.payload.get(&b_id).is_some());

        backend
            .store_result(&callback_id, Container::new().with("total", 3i64))
            .unwrap();
        backend.store_state(&callback_id, TaskState::Succeeded).unwrap();

        let result = handle.get(Duration::from_secs(1)).unwrap();
        assert_eq!(result.get_i64("total").unwrap(), 3);
    }

    #[test]
    fn get_result_reads_back_a_previously_submitted_task() {
        let (client, queue, backend) = client();
        let handle = client.send("t", Container::new()).unwrap();
        let task = queue.dequeue("w1", Duration::from_secs(1)).unwrap();
        backend.store_result(&task.id, Container::new().with("ok", true)).unwrap();
        backend.store_state(&task.id, TaskState::Succeeded).unwrap();

        let again = client.get_result(handle.task_id());
        assert!(again.get(Duration::from_secs(1)).unwrap().get_bool("ok").unwrap());
    }

    #[test]
    fn cancel_and_pending_count() {
        let (client, _queue, _backend) = client();
        let handle = client.send("t", Container::new()).unwrap();
        assert_eq!(client.pending_count(), 1);
        client.cancel(handle.task_id()).unwrap();
        assert_eq!(client.pending_count(), 0);
    }
}
