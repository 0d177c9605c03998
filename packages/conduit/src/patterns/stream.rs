//! Event streaming: a bounded, per-topic, offset-addressable replay buffer
//! layered on top of [`MessageBus`] subscriptions.
//!
//! Grounded on the bounded circular buffer idiom used throughout the pack's
//! monitoring tooling (fixed capacity, oldest entry evicted on overflow) and
//! on this crate's own subscribe/condvar idioms already used by
//! [`crate::patterns::pubsub`] and [`crate::queue`]. Each matched message is
//! appended to the ring buffer for its exact topic under a monotonically
//! increasing per-topic offset; readers pull everything at or after an
//! offset they last saw, or block for the next one to arrive.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::bus::MessageBus;
use crate::error::Result;
use crate::message::Message;

struct RingBuffer {
    entries: VecDeque<(u64, Message)>,
    next_offset: u64,
    capacity: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        RingBuffer {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            next_offset: 0,
            capacity,
        }
    }

    fn push(&mut self, msg: Message) -> u64 {
        let offset = self.next_offset;
        self.next_offset += 1;
        self.entries.push_back((offset, msg));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        offset
    }

    fn read_from(&self, offset: u64) -> Vec<(u64, Message)> {
        self.entries
            .iter()
            .filter(|(o, _)| *o >= offset)
            .cloned()
            .collect()
    }
}

/// A replayable, capacity-bounded view over a matching set of bus topics.
pub struct EventStream {
    bus: Arc<MessageBus>,
    buffers: DashMap<String, Mutex<RingBuffer>>,
    capacity: usize,
    subscription_id: Mutex<Option<u64>>,
    signal: Mutex<()>,
    condvar: Condvar,
}

impl EventStream {
    /// Subscribes to `pattern` on `bus` and begins buffering matching
    /// messages, up to `capacity` entries per distinct topic.
    pub fn new(bus: Arc<MessageBus>, pattern: impl Into<String>, capacity: usize) -> Result<Arc<Self>> {
        let stream = Arc::new(EventStream {
            bus: Arc::clone(&bus),
            buffers: DashMap::new(),
            capacity: capacity.max(1),
            subscription_id: Mutex::new(None),
            signal: Mutex::new(()),
            condvar: Condvar::new(),
        });

        let callback_stream = Arc::clone(&stream);
        let id = bus.subscribe(
            pattern.into(),
            Arc::new(move |msg: &Message| {
                callback_stream.append(msg.clone());
                Ok(())
            }),
            None,
            0,
        )?;
        *stream.subscription_id.lock().unwrap() = Some(id);

        Ok(stream)
    }

    fn append(&self, msg: Message) {
        let topic = msg.topic().to_string();
        let capacity = self.capacity;
        self.buffers
            .entry(topic)
            .or_insert_with(|| Mutex::new(RingBuffer::new(capacity)))
            .lock()
            .unwrap()
            .push(msg);

        let _guard = self.signal.lock().unwrap();
        self.condvar.notify_all();
    }

    /// Every buffered entry for `topic` at or after `offset`.
    pub fn read_from(&self, topic: &str, offset: u64) -> Vec<(u64, Message)> {
        self.buffers
            .get(topic)
            .map(|buf| buf.lock().unwrap().read_from(offset))
            .unwrap_or_default()
    }

    /// The offset that the next appended entry for `topic` will receive,
    /// i.e. one past the newest currently-buffered entry.
    pub fn latest_offset(&self, topic: &str) -> u64 {
        self.buffers
            .get(topic)
            .map(|buf| buf.lock().unwrap().next_offset)
            .unwrap_or(0)
    }

    /// Blocks up to `timeout` for at least one entry at or after
    /// `after_offset` to appear on `topic`, returning them once they do (or
    /// an empty vector on timeout).
    pub fn wait_for_next(&self, topic: &str, after_offset: u64, timeout: Duration) -> Vec<(u64, Message)> {
        let deadline = Instant::now() + timeout;
        loop {
            let found = self.read_from(topic, after_offset);
            if !found.is_empty() {
                return found;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Vec::new();
            }

            let guard = self.signal.lock().unwrap();
            let _ = self.condvar.wait_timeout(guard, remaining).unwrap();
        }
    }

    pub fn close(&self) {
        if let Some(id) = self.subscription_id.lock().unwrap().take() {
            let _ = self.bus.unsubscribe(id);
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusConfig;
    use crate::container::Container;
    use crate::message::MessageType;

    fn bus() -> Arc<MessageBus> {
        let bus = Arc::new(MessageBus::new(BusConfig::default()));
        bus.start().unwrap();
        bus
    }

    #[test]
    fn buffered_messages_are_readable_from_offset_zero() {
        let bus = bus();
        let stream = EventStream::new(Arc::clone(&bus), "metrics.#", 16).unwrap();

        bus.publish_async(Message::new("metrics.cpu", MessageType::Event, Container::new()))
            .unwrap();
        std::thread::sleep(Duration::from_millis(80));

        let entries = stream.read_from("metrics.cpu", 0);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, 0);
        bus.stop().unwrap();
    }

    #[test]
    fn ring_buffer_evicts_oldest_entry_past_capacity() {
        let bus = bus();
        let stream = EventStream::new(Arc::clone(&bus), "ticks.#", 2).unwrap();

        for i in 0..3 {
            bus.publish_async(
                Message::new("ticks.a", MessageType::Event, Container::new().with("i", i as i64)),
            )
            .unwrap();
        }
        std::thread::sleep(Duration::from_millis(120));

        let entries = stream.read_from("ticks.a", 0);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].1.payload.get_i64("i").unwrap(), 1);
        assert_eq!(entries[1].1.payload.get_i64("i").unwrap(), 2);
        bus.stop().unwrap();
    }

    #[test]
    fn wait_for_next_unblocks_when_a_new_entry_arrives() {
        let bus = bus();
        let stream = EventStream::new(Arc::clone(&bus), "alerts.#", 16).unwrap();

        let bus2 = Arc::clone(&bus);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(40));
            bus2.publish_async(Message::new("alerts.fire", MessageType::Event, Container::new()))
                .unwrap();
        });

        let entries = stream.wait_for_next("alerts.fire", 0, Duration::from_secs(1));
        assert_eq!(entries.len(), 1);
        bus.stop().unwrap();
    }

    #[test]
    fn wait_for_next_times_out_with_no_new_entries() {
        let bus = bus();
        let stream = EventStream::new(Arc::clone(&bus), "quiet.#", 16).unwrap();
        let entries = stream.wait_for_next("quiet.topic", 0, Duration::from_millis(50));
        assert!(entries.is_empty());
        bus.stop().unwrap();
    }
}
