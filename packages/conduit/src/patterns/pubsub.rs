//! Publisher / Subscriber façades over [`MessageBus`].

use std::sync::{Arc, Mutex};

use crate::bus::MessageBus;
use crate::container::Container;
use crate::error::Result;
use crate::message::{Message, MessageType, Priority};
use crate::router::{SubscriptionCallback, SubscriptionFilter};

/// Thin façade binding a default topic prefix for publishing.
pub struct Publisher {
    bus: Arc<MessageBus>,
    prefix: String,
}

impl Publisher {
    pub fn new(bus: Arc<MessageBus>, prefix: impl Into<String>) -> Self {
        Publisher {
            bus,
            prefix: prefix.into(),
        }
    }

    fn full_topic(&self, topic: &str) -> String {
        if self.prefix.is_empty() {
            topic.to_string()
        } else {
            format!("{}.{}", self.prefix, topic)
        }
    }

    pub fn publish(&self, topic: &str, payload: Container) -> Result<()> {
        self.publish_with_priority(topic, payload, Priority::Normal)
    }

    pub fn publish_with_priority(
        &self,
        topic: &str,
        payload: Container,
        priority: Priority,
    ) -> Result<()> {
        let msg = Message::new(self.full_topic(topic), MessageType::Event, payload)
            .with_priority(priority);
        self.bus.publish_async(msg)
    }
}

/// Thin façade tracking subscription-id bookkeeping for bulk unsubscribe.
pub struct Subscriber {
    bus: Arc<MessageBus>,
    prefix: String,
    subscriptions: Mutex<Vec<u64>>,
}

impl Subscriber {
    pub fn new(bus: Arc<MessageBus>, prefix: impl Into<String>) -> Self {
        Subscriber {
            bus,
            prefix: prefix.into(),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    fn full_pattern(&self, pattern: &str) -> String {
        if self.prefix.is_empty() {
            pattern.to_string()
        } else {
            format!("{}.{}", self.prefix, pattern)
        }
    }

    pub fn on(&self, pattern: &str, callback: SubscriptionCallback) -> Result<u64> {
        self.on_filtered(pattern, callback, None, 5)
    }

    pub fn on_filtered(
        &self,
        pattern: &str,
        callback: SubscriptionCallback,
        filter: Option<SubscriptionFilter>,
        priority: i32,
    ) -> Result<u64> {
        let id = self
            .bus
            .subscribe(self.full_pattern(pattern), callback, filter, priority)?;
        self.subscriptions.lock().unwrap().push(id);
        Ok(id)
    }

    /// Removes every subscription this subscriber created.
    pub fn unsubscribe_all(&self) {
        let ids: Vec<u64> = self.subscriptions.lock().unwrap().drain(..).collect();
        for id in ids {
            let _ = self.bus.unsubscribe(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn publisher_prefixes_topics() {
        let bus = Arc::new(MessageBus::new(BusConfig::default()));
        bus.start().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits2 = Arc::clone(&hits);
        bus.subscribe(
            "orders.#",
            Arc::new(move |_| {
                hits2.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }),
            None,
            0,
        )
        .unwrap();

        let publisher = Publisher::new(Arc::clone(&bus), "orders");
        publisher.publish("placed", Container::new()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(100));
        assert_eq!(hits.load(Ordering::Relaxed), 1);
        bus.stop().unwrap();
    }

    #[test]
    fn unsubscribe_all_removes_every_tracked_subscription() {
        let bus = Arc::new(MessageBus::new(BusConfig::default()));
        bus.start().unwrap();
        let subscriber = Subscriber::new(Arc::clone(&bus), "");
        subscriber.on("a.*", Arc::new(|_| Ok(()))).unwrap();
        subscriber.on("b.*", Arc::new(|_| Ok(()))).unwrap();
        assert_eq!(bus.statistics().subscriber_count, 2);

        subscriber.unsubscribe_all();
        assert_eq!(bus.statistics().subscriber_count, 0);
        bus.stop().unwrap();
    }
}
