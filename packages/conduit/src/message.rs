//! Message metadata and the message envelope carried through bus and queue.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use crate::container::Container;

/// Total order over message/task priority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    Lowest = 0,
    Low = 1,
    Normal = 2,
    High = 3,
    Highest = 4,
    Critical = 5,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// Message classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Event,
    Command,
    Query,
    Response,
    Error,
    Notification,
}

/// Correlation identifier threading related work through the bus and task
/// client. Wraps a `Uuid`, carrying a nil-UUID `NONE` sentinel for
/// "uncorrelated" the way the teacher's own correlation id newtype does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub const NONE: CorrelationId = CorrelationId(Uuid::nil());

    pub fn new() -> Self {
        CorrelationId(Uuid::new_v4())
    }

    pub fn is_none(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(u: Uuid) -> Self {
        CorrelationId(u)
    }
}

/// Metadata attached to every message.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub id: String,
    pub topic: String,
    pub message_type: MessageType,
    pub priority: Priority,
    pub source: Option<String>,
    pub target: Option<String>,
    pub correlation_id: Option<CorrelationId>,
    pub trace_id: Option<Uuid>,
    pub ttl: Option<Duration>,
    pub headers: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Metadata {
    pub fn new(topic: impl Into<String>, message_type: MessageType) -> Self {
        Metadata {
            id: Uuid::new_v4().to_string(),
            topic: topic.into(),
            message_type,
            priority: Priority::default(),
            source: None,
            target: None,
            correlation_id: None,
            trace_id: None,
            ttl: None,
            headers: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.ttl {
            Some(ttl) => match chrono::Duration::from_std(ttl) {
                Ok(ttl) => Utc::now() - self.created_at >= ttl,
                Err(_) => false,
            },
            None => false,
        }
    }
}

/// A message: metadata plus a typed payload container.
#[derive(Debug, Clone)]
pub struct Message {
    pub metadata: Metadata,
    pub payload: Container,
}

impl Message {
    pub fn new(topic: impl Into<String>, message_type: MessageType, payload: Container) -> Self {
        Message {
            metadata: Metadata::new(topic, message_type),
            payload,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.metadata.priority = priority;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = Some(source.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.metadata.target = Some(target.into());
        self
    }

    pub fn with_correlation_id(mut self, cid: CorrelationId) -> Self {
        self.metadata.correlation_id = Some(cid);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.metadata.ttl = Some(ttl);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.headers.insert(key.into(), value.into());
        self
    }

    pub fn topic(&self) -> &str {
        &self.metadata.topic
    }

    pub fn priority(&self) -> Priority {
        self.metadata.priority
    }

    pub fn is_expired(&self) -> bool {
        self.metadata.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_total_order() {
        assert!(Priority::Critical > Priority::Highest);
        assert!(Priority::Lowest < Priority::Low);
    }

    #[test]
    fn message_not_expired_without_ttl() {
        let msg = Message::new("a.b", MessageType::Event, Container::new());
        assert!(!msg.is_expired());
    }

    #[test]
    fn message_expires_after_ttl() {
        let mut msg = Message::new("a.b", MessageType::Event, Container::new())
            .with_ttl(Duration::from_millis(0));
        msg.metadata.created_at = Utc::now() - chrono::Duration::seconds(5);
        assert!(msg.is_expired());
    }

    #[test]
    fn correlation_id_none_is_nil() {
        assert!(CorrelationId::NONE.is_none());
        assert!(!CorrelationId::new().is_none());
    }

    #[test]
    fn builder_chain_sets_fields() {
        let msg = Message::new("events.user.created", MessageType::Event, Container::new())
            .with_priority(Priority::High)
            .with_source("svc-a")
            .with_header("x-env", "prod");
        assert_eq!(msg.priority(), Priority::High);
        assert_eq!(msg.metadata.source.as_deref(), Some("svc-a"));
        assert_eq!(msg.metadata.headers.get("x-env").map(String::as_str), Some("prod"));
    }
}
