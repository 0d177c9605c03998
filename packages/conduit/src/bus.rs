//! Message bus: orchestrates the queue, router, and executor behind a
//! `created → running → stopped` lifecycle, with monotonic statistics.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::error::{ConduitError, Result};
use crate::executor::ThreadPoolExecutor;
use crate::message::Message;
use crate::queue::{MessageQueue, QueueConfig};
use crate::router::{SubscriptionCallback, SubscriptionFilter, TopicRouter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    Created,
    Running,
    Stopped,
}

/// Point-in-time statistics snapshot for the bus.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusStatistics {
    pub published: u64,
    pub processed: u64,
    pub dropped: u64,
    pub queue_depth: usize,
    pub subscriber_count: usize,
}

/// Configuration for constructing a [`MessageBus`].
#[derive(Debug, Clone)]
pub struct BusConfig {
    pub queue: QueueConfig,
    pub worker_count: usize,
    /// When true, `publish_sync` invokes the router directly and awaits
    /// subscriber callbacks on the caller's thread rather than only
    /// bypassing the internal queue.
    pub synchronous_delivery: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        BusConfig {
            queue: QueueConfig::default(),
            worker_count: 4,
            synchronous_delivery: false,
        }
    }
}

struct Counters {
    published: AtomicU64,
    processed: AtomicU64,
    dropped: AtomicU64,
}

/// Topic-routed pub/sub bus with priority queueing.
pub struct MessageBus {
    state: RwLock<LifecycleState>,
    queue: Arc<MessageQueue>,
    router: Arc<TopicRouter>,
    executor: Arc<ThreadPoolExecutor>,
    counters: Counters,
    config: BusConfig,
    dispatcher: Mutex<Option<std::thread::JoinHandle<()>>>,
}

impl MessageBus {
    pub fn new(config: BusConfig) -> Self {
        let queue = Arc::new(MessageQueue::new(config.queue.clone()));
        let router = Arc::new(TopicRouter::new());
        let executor = Arc::new(ThreadPoolExecutor::new(config.worker_count));
        MessageBus {
            state: RwLock::new(LifecycleState::Created),
            queue,
            router,
            executor,
            counters: Counters {
                published: AtomicU64::new(0),
                processed: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            },
            config,
            dispatcher: Mutex::new(None),
        }
    }

    /// `created → running`. Repeats return `already_running`.
    pub fn start(self: &Arc<Self>) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if *state == LifecycleState::Running {
            return Err(ConduitError::already_running());
        }
        *state = LifecycleState::Running;
        drop(state);

        let bus = Arc::clone(self);
        let handle = std::thread::spawn(move || {
            while *bus.state.read().unwrap() == LifecycleState::Running {
                match bus.queue.dequeue(Duration::from_millis(100)) {
                    Ok(msg) => {
                        let _ = bus.dispatch(&msg);
                    }
                    Err(_) => continue,
                }
            }
        });
        *self.dispatcher.lock().unwrap() = Some(handle);
        Ok(())
    }

    /// `running → stopped`. Repeats return `not_running`.
    pub fn stop(&self) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if *state != LifecycleState::Running {
            return Err(ConduitError::not_running());
        }
        *state = LifecycleState::Stopped;
        drop(state);

        self.queue.stop();
        if let Some(handle) = self.dispatcher.lock().unwrap().take() {
            let _ = handle.join();
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        *self.state.read().unwrap() == LifecycleState::Running
    }

    fn dispatch(&self, msg: &Message) -> Result<usize> {
        let result = self.router.route(msg, &self.executor);
        self.record_dispatch(&result);
        result
    }

    fn dispatch_blocking(&self, msg: &Message) -> Result<usize> {
        let result = self.router.route_blocking(msg);
        self.record_dispatch(&result);
        result
    }

    fn record_dispatch(&self, result: &Result<usize>) {
        match result {
            Ok(_) => {
                self.counters.processed.fetch_add(1, AtomicOrdering::Relaxed);
            }
            Err(ConduitError::NoSubscribers { .. }) => {}
            Err(_) => {
                self.counters.dropped.fetch_add(1, AtomicOrdering::Relaxed);
            }
        }
    }

    /// Places `msg` on the internal queue for asynchronous delivery.
    pub fn publish_async(&self, msg: Message) -> Result<()> {
        if !self.is_running() {
            return Err(ConduitError::not_running());
        }
        self.queue.enqueue(msg)?;
        self.counters.published.fetch_add(1, AtomicOrdering::Relaxed);
        Ok(())
    }

    /// Bypasses the queue; invokes the router directly on the caller's
    /// thread. With `synchronous_delivery` configured, subscriber callbacks
    /// also run on the caller's thread and this call does not return until
    /// every matched callback has (§4.G); otherwise callbacks are still
    /// submitted to the executor as with `publish_async`, only the queueing
    /// hop is removed.
    pub fn publish_sync(&self, msg: Message) -> Result<usize> {
        if !self.is_running() {
            return Err(ConduitError::not_running());
        }
        self.counters.published.fetch_add(1, AtomicOrdering::Relaxed);
        if self.config.synchronous_delivery {
            self.dispatch_blocking(&msg)
        } else {
            self.dispatch(&msg)
        }
    }

    pub fn subscribe(
        &self,
        pattern: impl Into<String>,
        callback: SubscriptionCallback,
        filter: Option<SubscriptionFilter>,
        priority: i32,
    ) -> Result<u64> {
        Ok(self.router.subscribe(pattern, callback, filter, priority))
    }

    pub fn unsubscribe(&self, sub_id: u64) -> Result<()> {
        self.router.unsubscribe(sub_id)
    }

    pub fn statistics(&self) -> BusStatistics {
        BusStatistics {
            published: self.counters.published.load(AtomicOrdering::Relaxed),
            processed: self.counters.processed.load(AtomicOrdering::Relaxed),
            dropped: self.counters.dropped.load(AtomicOrdering::Relaxed),
            queue_depth: self.queue.len(),
            subscriber_count: self.router.subscriber_count(),
        }
    }

    pub fn executor(&self) -> &Arc<ThreadPoolExecutor> {
        &self.executor
    }

    pub fn queue(&self) -> &Arc<MessageQueue> {
        &self.queue
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::message::MessageType;
    use std::sync::atomic::AtomicUsize as StdAtomicUsize;

    fn bus() -> Arc<MessageBus> {
        Arc::new(MessageBus::new(BusConfig::default()))
    }

    #[test]
    fn double_start_returns_already_running() {
        let bus = bus();
        bus.start().unwrap();
        assert!(bus.start().is_err());
        bus.stop().unwrap();
    }

    #[test]
    fn stop_before_start_returns_not_running() {
        let bus = bus();
        assert!(bus.stop().is_err());
    }

    #[test]
    fn publish_before_start_is_not_running() {
        let bus = bus();
        let msg = Message::new("a.b", MessageType::Event, Container::new());
        assert!(bus.publish_async(msg).is_err());
    }

    #[test]
    fn publish_after_stop_is_not_running() {
        let bus = bus();
        bus.start().unwrap();
        bus.stop().unwrap();
        let msg = Message::new("a.b", MessageType::Event, Container::new());
        assert!(bus.publish_async(msg).is_err());
    }

    #[test]
    fn publish_sync_dispatches_immediately() {
        let bus = bus();
        bus.start().unwrap();
        let hits = Arc::new(StdAtomicUsize::new(0));
        let hits2 = Arc::clone(&hits);
        bus.subscribe(
            "a.*",
            Arc::new(move |_| {
                hits2.fetch_add(1, AtomicOrdering::Relaxed);
                Ok(())
            }),
            None,
            0,
        )
        .unwrap();

        let msg = Message::new("a.b", MessageType::Event, Container::new());
        bus.publish_sync(msg).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(hits.load(AtomicOrdering::Relaxed), 1);
        bus.stop().unwrap();
    }

    #[test]
    fn publish_async_reaches_subscriber() {
        let bus = bus();
        bus.start().unwrap();
        let hits = Arc::new(StdAtomicUsize::new(0));
        let hits2 = Arc::clone(&hits);
        bus.subscribe(
            "events.#",
            Arc::new(move |_| {
                hits2.fetch_add(1, AtomicOrdering::Relaxed);
                Ok(())
            }),
            None,
            0,
        )
        .unwrap();

        bus.publish_async(Message::new(
            "events.created",
            MessageType::Event,
            Container::new(),
        ))
        .unwrap();

        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(hits.load(AtomicOrdering::Relaxed), 1);
        bus.stop().unwrap();
    }

    #[test]
    fn synchronous_delivery_runs_callback_before_publish_sync_returns() {
        let bus = Arc::new(MessageBus::new(BusConfig {
            synchronous_delivery: true,
            ..BusConfig::default()
        }));
        bus.start().unwrap();
        let hits = Arc::new(StdAtomicUsize::new(0));
        let hits2 = Arc::clone(&hits);
        bus.subscribe(
            "a.*",
            Arc::new(move |_| {
                hits2.fetch_add(1, AtomicOrdering::Relaxed);
                Ok(())
            }),
            None,
            0,
        )
        .unwrap();

        let msg = Message::new("a.b", MessageType::Event, Container::new());
        bus.publish_sync(msg).unwrap();
        // No sleep: synchronous delivery means the callback already ran.
        assert_eq!(hits.load(AtomicOrdering::Relaxed), 1);
        bus.stop().unwrap();
    }

    #[test]
    fn statistics_are_monotonic_counters() {
        let bus = bus();
        bus.start().unwrap();
        bus.subscribe("a.*", Arc::new(|_| Ok(())), None, 0).unwrap();
        bus.publish_async(Message::new("a.b", MessageType::Event, Container::new()))
            .unwrap();
        std::thread::sleep(Duration::from_millis(100));
        let stats = bus.statistics();
        assert_eq!(stats.published, 1);
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.subscriber_count, 1);
        bus.stop().unwrap();
    }
}
