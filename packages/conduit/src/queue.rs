//! Bounded FIFO or priority message queue with blocking dequeue and a
//! `drop_on_full` eviction policy.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::error::{ConduitError, Result};
use crate::message::Message;

/// Ordering discipline for a [`MessageQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueMode {
    Fifo,
    Priority,
}

/// Configuration for a [`MessageQueue`].
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub max_size: Option<usize>,
    pub drop_on_full: bool,
    pub mode: QueueMode,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            max_size: None,
            drop_on_full: false,
            mode: QueueMode::Fifo,
        }
    }
}

impl QueueConfig {
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn with_drop_on_full(mut self, drop_on_full: bool) -> Self {
        self.drop_on_full = drop_on_full;
        self
    }

    pub fn with_mode(mut self, mode: QueueMode) -> Self {
        self.mode = mode;
        self
    }
}

struct Entry {
    seq: u64,
    message: Message,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}
impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    /// `(priority desc, insertion-seq asc)`; `BinaryHeap` pops the greatest
    /// element, so sequence comparison is reversed to keep oldest first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.message
            .priority()
            .cmp(&other.message.priority())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

enum Storage {
    Fifo(VecDeque<Entry>),
    Priority(BinaryHeap<Entry>),
}

impl Storage {
    fn len(&self) -> usize {
        match self {
            Storage::Fifo(d) => d.len(),
            Storage::Priority(h) => h.len(),
        }
    }

    fn push(&mut self, entry: Entry) {
        match self {
            Storage::Fifo(d) => d.push_back(entry),
            Storage::Priority(h) => h.push(entry),
        }
    }

    fn pop(&mut self) -> Option<Entry> {
        match self {
            Storage::Fifo(d) => d.pop_front(),
            Storage::Priority(h) => h.pop(),
        }
    }

    /// Evict the item that would be served last: the back of the FIFO
    /// deque, or the lowest-priority (oldest, for ties) heap entry.
    ///
    /// This is the reverse of `Entry::cmp`'s serving order, not its
    /// `into_sorted_vec()` (which ties newest-first, since `Entry::cmp`
    /// breaks priority ties in favor of serving the oldest entry first —
    /// sorting ascending by that order puts the newest tied entry, not the
    /// oldest, at index 0).
    fn evict_worst(&mut self) {
        match self {
            Storage::Fifo(d) => {
                d.pop_back();
            }
            Storage::Priority(h) => {
                if h.is_empty() {
                    return;
                }
                let mut items: Vec<Entry> = std::mem::take(h).into_vec();
                let worst = items
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| {
                        a.message
                            .priority()
                            .cmp(&b.message.priority())
                            .then_with(|| a.seq.cmp(&b.seq))
                    })
                    .map(|(i, _)| i)
                    .expect("heap is non-empty");
                items.remove(worst);
                *h = items.into_iter().collect();
            }
        }
    }

    fn clear(&mut self) {
        match self {
            Storage::Fifo(d) => d.clear(),
            Storage::Priority(h) => h.clear(),
        }
    }
}

/// Bounded FIFO or priority message queue.
pub struct MessageQueue {
    storage: Mutex<Storage>,
    condvar: Condvar,
    config: QueueConfig,
    next_seq: AtomicU64,
    stopped: AtomicBool,
}

impl MessageQueue {
    pub fn new(config: QueueConfig) -> Self {
        let storage = match config.mode {
            QueueMode::Fifo => Storage::Fifo(VecDeque::new()),
            QueueMode::Priority => Storage::Priority(BinaryHeap::new()),
        };
        MessageQueue {
            storage: Mutex::new(storage),
            condvar: Condvar::new(),
            config,
            next_seq: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn enqueue(&self, message: Message) -> Result<()> {
        if self.stopped.load(AtomicOrdering::Acquire) {
            return Err(ConduitError::queue_stopped());
        }

        let seq = self.next_seq.fetch_add(1, AtomicOrdering::Relaxed);
        let entry = Entry { seq, message };

        {
            let mut storage = self.storage.lock().unwrap();
            if let Some(max) = self.config.max_size {
                if storage.len() >= max {
                    if self.config.drop_on_full {
                        storage.evict_worst();
                    } else {
                        return Err(ConduitError::queue_full());
                    }
                }
            }
            storage.push(entry);
        }
        self.condvar.notify_one();
        Ok(())
    }

    pub fn try_dequeue(&self) -> Result<Message> {
        let mut storage = self.storage.lock().unwrap();
        storage
            .pop()
            .map(|e| e.message)
            .ok_or_else(ConduitError::queue_empty)
    }

    pub fn dequeue(&self, timeout: Duration) -> Result<Message> {
        let mut storage = self.storage.lock().unwrap();
        let deadline = std::time::Instant::now() + timeout;
        loop {
            if let Some(entry) = storage.pop() {
                return Ok(entry.message);
            }
            if self.stopped.load(AtomicOrdering::Acquire) {
                return Err(ConduitError::queue_empty());
            }
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                return Err(ConduitError::queue_empty());
            }
            let (guard, timed_out) = self.condvar.wait_timeout(storage, remaining).unwrap();
            storage = guard;
            if timed_out.timed_out() && storage.len() == 0 {
                return Err(ConduitError::queue_empty());
            }
        }
    }

    /// Blocks enqueues with `queue_stopped`; pending dequeues return
    /// `queue_empty`.
    pub fn stop(&self) {
        self.stopped.store(true, AtomicOrdering::Release);
        self.condvar.notify_all();
    }

    pub fn clear(&self) {
        self.storage.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.storage.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::message::{MessageType, Priority};

    fn msg(topic: &str, priority: Priority) -> Message {
        Message::new(topic, MessageType::Event, Container::new()).with_priority(priority)
    }

    #[test]
    fn fifo_mode_preserves_insertion_order() {
        let q = MessageQueue::new(QueueConfig::default());
        q.enqueue(msg("a", Priority::Low)).unwrap();
        q.enqueue(msg("b", Priority::Critical)).unwrap();
        assert_eq!(q.try_dequeue().unwrap().topic(), "a");
        assert_eq!(q.try_dequeue().unwrap().topic(), "b");
    }

    #[test]
    fn priority_mode_orders_by_priority_then_insertion() {
        let q = MessageQueue::new(QueueConfig::default().with_mode(QueueMode::Priority));
        q.enqueue(msg("low", Priority::Low)).unwrap();
        q.enqueue(msg("high1", Priority::High)).unwrap();
        q.enqueue(msg("normal", Priority::Normal)).unwrap();
        q.enqueue(msg("high2", Priority::High)).unwrap();

        assert_eq!(q.try_dequeue().unwrap().topic(), "high1");
        assert_eq!(q.try_dequeue().unwrap().topic(), "high2");
        assert_eq!(q.try_dequeue().unwrap().topic(), "normal");
        assert_eq!(q.try_dequeue().unwrap().topic(), "low");
    }

    #[test]
    fn try_dequeue_on_empty_returns_queue_empty() {
        let q = MessageQueue::new(QueueConfig::default());
        assert!(q.try_dequeue().is_err());
    }

    #[test]
    fn enqueue_fails_with_queue_full_when_bounded_and_not_dropping() {
        let q = MessageQueue::new(QueueConfig::default().with_max_size(1));
        q.enqueue(msg("a", Priority::Normal)).unwrap();
        assert!(q.enqueue(msg("b", Priority::Normal)).is_err());
    }

    #[test]
    fn drop_on_full_evicts_oldest_in_fifo_mode() {
        let q = MessageQueue::new(
            QueueConfig::default().with_max_size(1).with_drop_on_full(true),
        );
        q.enqueue(msg("a", Priority::Normal)).unwrap();
        q.enqueue(msg("b", Priority::Normal)).unwrap();
        assert_eq!(q.try_dequeue().unwrap().topic(), "b");
        assert!(q.try_dequeue().is_err());
    }

    #[test]
    fn drop_on_full_evicts_lowest_priority_in_priority_mode() {
        let q = MessageQueue::new(
            QueueConfig::default()
                .with_mode(QueueMode::Priority)
                .with_max_size(2)
                .with_drop_on_full(true),
        );
        q.enqueue(msg("low", Priority::Low)).unwrap();
        q.enqueue(msg("high", Priority::High)).unwrap();
        q.enqueue(msg("normal", Priority::Normal)).unwrap();

        assert_eq!(q.try_dequeue().unwrap().topic(), "high");
        assert_eq!(q.try_dequeue().unwrap().topic(), "normal");
        assert!(q.try_dequeue().is_err());
    }

    #[test]
    fn drop_on_full_breaks_same_priority_ties_by_evicting_the_oldest() {
        let q = MessageQueue::new(
            QueueConfig::default()
                .with_mode(QueueMode::Priority)
                .with_max_size(2)
                .with_drop_on_full(true),
        );
        q.enqueue(msg("low-older", Priority::Low)).unwrap();
        q.enqueue(msg("low-newer", Priority::Low)).unwrap();
        // Queue is full at two Low entries; a third Low admits and evicts
        // one of the tied pair. The oldest (low-older) should go, leaving
        // low-newer behind.
        q.enqueue(msg("low-newest", Priority::Low)).unwrap();

        assert_eq!(q.try_dequeue().unwrap().topic(), "low-newer");
        assert_eq!(q.try_dequeue().unwrap().topic(), "low-newest");
        assert!(q.try_dequeue().is_err());
    }

    #[test]
    fn dequeue_blocks_until_enqueue() {
        let q = std::sync::Arc::new(MessageQueue::new(QueueConfig::default()));
        let q2 = std::sync::Arc::clone(&q);
        let handle = std::thread::spawn(move || q2.dequeue(Duration::from_secs(2)));
        std::thread::sleep(Duration::from_millis(30));
        q.enqueue(msg("a", Priority::Normal)).unwrap();
        assert_eq!(handle.join().unwrap().unwrap().topic(), "a");
    }

    #[test]
    fn dequeue_times_out_when_nothing_arrives() {
        let q = MessageQueue::new(QueueConfig::default());
        let start = std::time::Instant::now();
        assert!(q.dequeue(Duration::from_millis(30)).is_err());
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn stop_unblocks_waiters_and_rejects_new_enqueues() {
        let q = std::sync::Arc::new(MessageQueue::new(QueueConfig::default()));
        let q2 = std::sync::Arc::clone(&q);
        let handle = std::thread::spawn(move || q2.dequeue(Duration::from_secs(5)));
        std::thread::sleep(Duration::from_millis(30));
        q.stop();
        assert!(handle.join().unwrap().is_err());
        assert!(q.enqueue(msg("a", Priority::Normal)).is_err());
    }

    #[test]
    fn clear_drops_all_items() {
        let q = MessageQueue::new(QueueConfig::default());
        q.enqueue(msg("a", Priority::Normal)).unwrap();
        q.enqueue(msg("b", Priority::Normal)).unwrap();
        q.clear();
        assert_eq!(q.len(), 0);
    }
}
