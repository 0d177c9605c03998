//! Topic router: wildcard subscription matching and dispatch onto the
//! shared executor.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{ConduitError, Result};
use crate::executor::ThreadPoolExecutor;
use crate::message::{Message, Priority};

/// A single pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*` — matches exactly one segment.
    Star,
    /// `#` — matches zero or more trailing segments.
    Hash,
}

fn compile(pattern: &str) -> Vec<Segment> {
    pattern
        .split('.')
        .map(|s| match s {
            "*" => Segment::Star,
            "#" => Segment::Hash,
            other => Segment::Literal(other.to_string()),
        })
        .collect()
}

/// Returns true if `topic` matches `pattern` under the `.`/`*`/`#` grammar.
pub fn matches(topic: &str, pattern: &str) -> bool {
    let topic_segs: Vec<&str> = topic.split('.').collect();
    let pattern_segs = compile(pattern);
    matches_segs(&topic_segs, &pattern_segs)
}

fn matches_segs(topic: &[&str], pattern: &[Segment]) -> bool {
    match pattern.first() {
        None => topic.is_empty(),
        Some(Segment::Hash) => {
            // `#` matches zero or more segments: try consuming 0..=all
            // remaining topic segments and see if the rest of the pattern
            // matches what's left.
            for take in 0..=topic.len() {
                if matches_segs(&topic[take..], &pattern[1..]) {
                    return true;
                }
            }
            false
        }
        Some(Segment::Star) => {
            if topic.is_empty() {
                false
            } else {
                matches_segs(&topic[1..], &pattern[1..])
            }
        }
        Some(Segment::Literal(lit)) => {
            if let Some((&first, rest)) = topic.split_first() {
                first == lit && matches_segs(rest, &pattern[1..])
            } else {
                false
            }
        }
    }
}

/// Callback invoked for a matched message.
pub type SubscriptionCallback = Arc<dyn Fn(&Message) -> anyhow::Result<()> + Send + Sync>;
/// Optional predicate gating delivery beyond pattern matching.
pub type SubscriptionFilter = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

pub struct Subscription {
    pub id: u64,
    pub pattern: String,
    pub priority: i32,
    callback: SubscriptionCallback,
    filter: Option<SubscriptionFilter>,
}

/// Indexes subscriptions by pattern and dispatches matching messages onto
/// an executor.
pub struct TopicRouter {
    subscriptions: DashMap<u64, Subscription>,
    next_id: AtomicU64,
}

impl Default for TopicRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicRouter {
    pub fn new() -> Self {
        TopicRouter {
            subscriptions: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe(
        &self,
        pattern: impl Into<String>,
        callback: SubscriptionCallback,
        filter: Option<SubscriptionFilter>,
        priority: i32,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        self.subscriptions.insert(
            id,
            Subscription {
                id,
                pattern: pattern.into(),
                priority,
                callback,
                filter,
            },
        );
        id
    }

    /// Idempotent: unsubscribing an unknown id returns `subscription_not_found`.
    pub fn unsubscribe(&self, sub_id: u64) -> Result<()> {
        self.subscriptions
            .remove(&sub_id)
            .map(|_| ())
            .ok_or_else(ConduitError::subscription_not_found)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn matched_callbacks(&self, msg: &Message) -> Result<Vec<SubscriptionCallback>> {
        let mut matched: Vec<(i32, SubscriptionCallback)> = self
            .subscriptions
            .iter()
            .filter(|entry| matches(msg.topic(), &entry.pattern))
            .filter(|entry| entry.filter.as_ref().map_or(true, |f| f(msg)))
            .map(|entry| (entry.priority, Arc::clone(&entry.callback)))
            .collect();

        if matched.is_empty() {
            return Err(ConduitError::no_subscribers());
        }

        matched.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(matched.into_iter().map(|(_, cb)| cb).collect())
    }

    /// Dispatches `msg` to every subscription whose pattern matches and
    /// whose filter (if any) accepts it, in `priority desc` order, by
    /// submitting each callback invocation to `executor`. Returns the
    /// number of callbacks submitted, or `no_subscribers` if none matched.
    pub fn route(&self, msg: &Message, executor: &ThreadPoolExecutor) -> Result<usize> {
        let callbacks = self.matched_callbacks(msg)?;

        let mut submitted = 0;
        for callback in callbacks {
            let msg = msg.clone();
            let result = executor.submit(Priority::Normal, move || (callback)(&msg));
            if result.is_ok() {
                submitted += 1;
            }
            // Callback errors / submit errors are reported via the job
            // handle elsewhere (§4.F: logged, do not stop delivery to
            // other subscribers).
        }
        Ok(submitted)
    }

    /// Invokes every matching callback directly on the caller's thread, in
    /// `priority desc` order, and waits for each to return before moving to
    /// the next. Used by `publish_sync` when the bus is configured for
    /// synchronous delivery (§4.G). A callback error is logged and does not
    /// stop delivery to the remaining subscribers. Returns the number of
    /// callbacks invoked, or `no_subscribers` if none matched.
    pub fn route_blocking(&self, msg: &Message) -> Result<usize> {
        let callbacks = self.matched_callbacks(msg)?;

        let mut invoked = 0;
        for callback in callbacks {
            if let Err(err) = (callback)(msg) {
                tracing::warn!(topic = msg.topic(), error = %err, "subscriber callback failed");
            }
            invoked += 1;
        }
        Ok(invoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_exactly_one_segment() {
        assert!(matches("user.created", "user.*"));
        assert!(!matches("user.a.b", "user.*"));
    }

    #[test]
    fn hash_matches_zero_or_more_segments() {
        assert!(matches("order", "order.#"));
        assert!(matches("order.placed", "order.#"));
        assert!(matches("order.placed.x", "order.#"));
    }

    #[test]
    fn hash_alone_matches_everything() {
        assert!(matches("anything.at.all", "#"));
        assert!(matches("single", "#"));
    }

    #[test]
    fn identical_topic_and_pattern_always_matches() {
        assert!(matches("a.b.c", "a.b.c"));
    }

    #[test]
    fn literal_mismatch_does_not_match() {
        assert!(!matches("user.created", "user.deleted"));
    }

    #[test]
    fn other_metacharacters_are_literal() {
        assert!(matches("a+b.c", "a+b.c"));
        assert!(!matches("axb.c", "a+b.c"));
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let router = TopicRouter::new();
        let id = router.subscribe("a.*", Arc::new(|_| Ok(())), None, 5);
        assert!(router.unsubscribe(id).is_ok());
        assert!(router.unsubscribe(id).is_err());
    }

    #[test]
    fn route_with_no_matches_returns_no_subscribers() {
        let router = TopicRouter::new();
        let executor = ThreadPoolExecutor::new(1);
        let msg = Message::new(
            "unmatched.topic",
            crate::message::MessageType::Event,
            crate::container::Container::new(),
        );
        assert!(router.route(&msg, &executor).is_err());
    }

    #[tokio::test]
    async fn route_submits_matching_callbacks_in_priority_order() {
        use std::sync::Mutex;
        let router = TopicRouter::new();
        let executor = ThreadPoolExecutor::new(1);
        let order: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));

        for (priority, value) in [(1, 1), (10, 2), (5, 3)] {
            let order = Arc::clone(&order);
            router.subscribe(
                "events.*",
                Arc::new(move |_| {
                    order.lock().unwrap().push(value);
                    Ok(())
                }),
                None,
                priority,
            );
        }

        let msg = Message::new(
            "events.created",
            crate::message::MessageType::Event,
            crate::container::Container::new(),
        );
        let submitted = router.route(&msg, &executor).unwrap();
        assert_eq!(submitted, 3);

        executor.shutdown(true).unwrap();
        assert_eq!(*order.lock().unwrap(), vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn filter_skips_non_matching_messages() {
        let router = TopicRouter::new();
        let executor = ThreadPoolExecutor::new(1);
        let hit = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let hit2 = Arc::clone(&hit);

        router.subscribe(
            "events.#",
            Arc::new(move |_| {
                hit2.store(true, AtomicOrdering::Relaxed);
                Ok(())
            }),
            Some(Arc::new(|m: &Message| m.priority() == Priority::High)),
            0,
        );

        let msg = Message::new(
            "events.created",
            crate::message::MessageType::Event,
            crate::container::Container::new(),
        )
        .with_priority(Priority::Low);

        assert!(router.route(&msg, &executor).is_err());
        executor.shutdown(true).unwrap();
        assert!(!hit.load(AtomicOrdering::Relaxed));
    }
}
