//! Periodic and cron-driven task scheduling.
//!
//! Grounded on `original_source/include/kcenon/messaging/task/scheduler.h`'s
//! `schedule_entry`/`scheduler_worker` shape (a named, enable/disable-able
//! entry carrying a task template and a trigger, with a worker that wakes at
//! the earliest next-fire time) and on this crate's own
//! [`crate::task_queue::TaskQueue`] background-promoter idiom for the
//! sleep-until-deadline thread (§4.C/§4.J): one condvar, re-evaluated after
//! every entry mutation or a timed wake.

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::client::TaskClient;
use crate::cron::CronExpr;
use crate::error::{ConduitError, Result};
use crate::task::Task;

/// What causes a [`ScheduleEntry`] to fire again.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Fires every `Duration`, measured from the previous fire time.
    Interval(Duration),
    /// Fires at the next instant matching a parsed cron expression.
    Cron(CronExpr),
}

impl Trigger {
    fn next_after(&self, from: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match self {
            Trigger::Interval(d) => Ok(from
                + chrono::Duration::from_std(*d).unwrap_or_else(|_| chrono::Duration::seconds(1))),
            Trigger::Cron(expr) => expr.next_run_time(from),
        }
    }
}

#[derive(Debug, Clone)]
struct ScheduleEntry {
    name: String,
    task_template: Task,
    trigger: Trigger,
    next_fire: DateTime<Utc>,
    run_count: u64,
    enabled: bool,
}

/// A snapshot of one schedule entry's state, returned by [`Scheduler::entries`].
#[derive(Debug, Clone)]
pub struct ScheduleInfo {
    pub name: String,
    pub next_fire: DateTime<Utc>,
    pub run_count: u64,
    pub enabled: bool,
}

struct Shared {
    entries: Mutex<Vec<ScheduleEntry>>,
    condvar: Condvar,
    stopped: AtomicBool,
    client: Arc<TaskClient>,
}

/// Drives named, repeatable entries (interval or cron) that stamp a fresh
/// task from a template and submit it through a [`TaskClient`] each time
/// they fire.
pub struct Scheduler {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(client: Arc<TaskClient>) -> Self {
        let shared = Arc::new(Shared {
            entries: Mutex::new(Vec::new()),
            condvar: Condvar::new(),
            stopped: AtomicBool::new(false),
            client,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::spawn(move || scheduler_loop(worker_shared));

        Scheduler {
            shared,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Register an entry that fires every `interval`, starting one interval
    /// from now. `name` must be unique among currently-registered entries.
    pub fn add_interval(&self, name: impl Into<String>, task_template: Task, interval: Duration) -> Result<()> {
        self.add(name, task_template, Trigger::Interval(interval))
    }

    /// Register an entry that fires at each instant matching `cron_expr`.
    pub fn add_cron(&self, name: impl Into<String>, task_template: Task, cron_expr: &str) -> Result<()> {
        let expr = CronExpr::parse(cron_expr)?;
        self.add(name, task_template, Trigger::Cron(expr))
    }

    fn add(&self, name: impl Into<String>, task_template: Task, trigger: Trigger) -> Result<()> {
        let name = name.into();
        let next_fire = trigger.next_after(Utc::now())?;

        let mut entries = self.shared.entries.lock().unwrap();
        if entries.iter().any(|e| e.name == name) {
            return Err(ConduitError::invalid_message(format!(
                "schedule entry already exists: {name}"
            )));
        }
        entries.push(ScheduleEntry {
            name,
            task_template,
            trigger,
            next_fire,
            run_count: 0,
            enabled: true,
        });
        drop(entries);
        self.shared.condvar.notify_all();
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let mut entries = self.shared.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e.name != name);
        if entries.len() == before {
            return Err(ConduitError::invalid_message(format!(
                "no such schedule entry: {name}"
            )));
        }
        drop(entries);
        self.shared.condvar.notify_all();
        Ok(())
    }

    /// Disabling an entry does not remove it immediately: the worker thread
    /// removes it the next time its `next_fire` deadline passes, rather
    /// than firing it (§4.M step 4).
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let mut entries = self.shared.entries.lock().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| ConduitError::invalid_message(format!("no such schedule entry: {name}")))?;
        entry.enabled = enabled;
        drop(entries);
        self.shared.condvar.notify_all();
        Ok(())
    }

    pub fn entries(&self) -> Vec<ScheduleInfo> {
        self.shared
            .entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| ScheduleInfo {
                name: e.name.clone(),
                next_fire: e.next_fire,
                run_count: e.run_count,
                enabled: e.enabled,
            })
            .collect()
    }

    pub fn stop(&self) {
        self.shared.stopped.store(true, AtomicOrdering::Release);
        self.shared.condvar.notify_all();
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if !self.shared.stopped.load(AtomicOrdering::Acquire) {
            self.stop();
        }
    }
}

fn scheduler_loop(shared: Arc<Shared>) {
    loop {
        let mut entries = shared.entries.lock().unwrap();
        if shared.stopped.load(AtomicOrdering::Acquire) {
            return;
        }

        let now = Utc::now();
        let mut fire_indices = Vec::new();
        let mut remove_indices = Vec::new();
        for (i, entry) in entries.iter().enumerate() {
            if entry.next_fire <= now {
                if entry.enabled {
                    fire_indices.push(i);
                } else {
                    remove_indices.push(i);
                }
            }
        }

        for &i in &fire_indices {
            let task = entries[i].task_template.reinstantiate();
            let _ = shared.client.send_task(task);
            entries[i].run_count += 1;
            match entries[i].trigger.next_after(now) {
                Ok(next) => entries[i].next_fire = next,
                Err(_) => remove_indices.push(i),
            }
        }

        remove_indices.sort_unstable();
        remove_indices.dedup();
        for &i in remove_indices.iter().rev() {
            entries.remove(i);
        }

        let wait_for = entries
            .iter()
            .map(|e| e.next_fire)
            .min()
            .map(|next| (next - Utc::now()).to_std().unwrap_or(Duration::from_millis(10)))
            .unwrap_or(Duration::from_secs(3600));

        let (guard, _timeout) = shared.condvar.wait_timeout(entries, wait_for).unwrap();
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
    use crate::task_queue::TaskQueue;

    fn scheduler() -> (Scheduler, Arc<TaskQueue>) {
        let backend = Arc::new(InMemoryResultBackend::new());
        let queue = Arc::new(TaskQueue::new(Arc::clone(&backend) as Arc<dyn crate::backend::ResultBackend>));
        let client = Arc::new(TaskClient::new(Arc::clone(&queue), backend as Arc<dyn crate::backend::ResultBackend>));
        (Scheduler::new(client), queue)
    }

    #[test]
    fn interval_entry_fires_a_task_onto_the_queue() {
        let (scheduler, queue) = scheduler();
        let template = Task::builder("heartbeat", Container::new()).build();
        scheduler
            .add_interval("hb", template, Duration::from_millis(40))
            .unwrap();

        let task = queue.dequeue("w1", Duration::from_secs(2)).unwrap();
        assert_eq!(task.name, "heartbeat");
        scheduler.stop();
    }

    #[test]
    fn duplicate_entry_name_is_rejected() {
        let (scheduler, _queue) = scheduler();
        let template = Task::builder("t", Container::new()).build();
        scheduler
            .add_interval("dup", template.clone(), Duration::from_secs(60))
            .unwrap();
        assert!(scheduler
            .add_interval("dup", template, Duration::from_secs(60))
            .is_err());
        scheduler.stop();
    }

    #[test]
    fn remove_drops_the_entry() {
        let (scheduler, _queue) = scheduler();
        let template = Task::builder("t", Container::new()).build();
        scheduler
            .add_interval("once", template, Duration::from_secs(60))
            .unwrap();
        assert_eq!(scheduler.entries().len(), 1);
        scheduler.remove("once").unwrap();
        assert_eq!(scheduler.entries().len(), 0);
        scheduler.stop();
    }

    #[test]
    fn remove_unknown_entry_is_an_error() {
        let (scheduler, _queue) = scheduler();
        assert!(scheduler.remove("nonexistent").is_err());
        scheduler.stop();
    }

    #[test]
    fn disabled_entry_does_not_fire() {
        let (scheduler, queue) = scheduler();
        let template = Task::builder("t", Container::new()).build();
        scheduler
            .add_interval("paused", template, Duration::from_millis(30))
            .unwrap();
        scheduler.set_enabled("paused", false).unwrap();
        assert!(queue.dequeue("w1", Duration::from_millis(100)).is_err());
        scheduler.stop();
    }

    #[test]
    fn disabled_entry_is_removed_once_its_deadline_passes() {
        let (scheduler, _queue) = scheduler();
        let template = Task::builder("t", Container::new()).build();
        scheduler
            .add_interval("paused", template, Duration::from_millis(30))
            .unwrap();
        scheduler.set_enabled("paused", false).unwrap();
        assert_eq!(scheduler.entries().len(), 1);

        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(scheduler.entries().len(), 0);
        scheduler.stop();
    }

    #[test]
    fn cron_entry_computes_a_future_next_fire() {
        let (scheduler, _queue) = scheduler();
        let template = Task::builder("daily", Container::new()).build();
        scheduler.add_cron("daily", template, "0 0 * * *").unwrap();
        let info = &scheduler.entries()[0];
        assert!(info.next_fire > Utc::now());
        scheduler.stop();
    }
}
