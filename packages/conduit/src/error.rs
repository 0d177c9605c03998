//! Error taxonomy for the messaging and task substrate.
//!
//! Every fallible public operation returns [`Result<T>`]. Internal plumbing
//! that crosses thread or future boundaries is free to carry `anyhow::Error`
//! (handler panics, effect failures) but must be categorized into a
//! [`ConduitError`] variant before it becomes visible to a caller — never
//! forward a raw `.to_string()` of an arbitrary internal error across that
//! boundary, since it may carry data the caller should not see. The
//! underlying cause is not discarded, though: it travels as a boxed
//! `#[source]` so `std::error::Error::source()` still exposes the causal
//! chain to anything that walks it explicitly, without ever surfacing in
//! `Display`/`to_string()`.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConduitError>;

type Cause = Option<Box<dyn std::error::Error + Send + Sync + 'static>>;

/// Numeric error code taxonomy, reserved range 200-299.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    InvalidMessage = 200,
    RoutingFailed = 201,
    SerializationError = 202,
    NetworkError = 203,
    QueueFull = 205,
    Timeout = 206,
    SubscriptionFailed = 209,
    PublicationFailed = 210,
    UnknownTopic = 211,
    NoSubscribers = 212,
    HandlerNotFound = 213,
    TaskNotFound = 214,
    BackendUnavailable = 215,
    NotRunning = 216,
    AlreadyRunning = 217,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Structured, pattern-matchable error carrying `{ code, message, source, timestamp }`.
#[derive(Debug, Error)]
pub enum ConduitError {
    #[error("invalid message: {message}")]
    InvalidMessage {
        message: String,
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("routing failed: {message}")]
    RoutingFailed {
        message: String,
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("serialization error: {message}")]
    SerializationError {
        message: String,
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("network error: {message}")]
    NetworkError {
        message: String,
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("queue full")]
    QueueFull {
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("queue empty")]
    QueueEmpty {
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("queue stopped")]
    QueueStopped {
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("timeout after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("subscription failed: {message}")]
    SubscriptionFailed {
        message: String,
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("subscription not found")]
    SubscriptionNotFound {
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("publication failed: {message}")]
    PublicationFailed {
        message: String,
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("unknown topic: {topic}")]
    UnknownTopic {
        topic: String,
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("no subscribers for topic")]
    NoSubscribers {
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("handler not found: {name}")]
    HandlerNotFound {
        name: String,
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("task not found: {task_id}")]
    TaskNotFound {
        task_id: String,
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("backend unavailable: {message}")]
    BackendUnavailable {
        message: String,
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("not running")]
    NotRunning {
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },

    #[error("already running")]
    AlreadyRunning {
        timestamp: DateTime<Utc>,
        #[source]
        source: Cause,
    },
}

impl ConduitError {
    /// The numeric error code for this variant, per the external taxonomy.
    pub fn code(&self) -> u16 {
        use ConduitError::*;
        match self {
            InvalidMessage { .. } => ErrorCode::InvalidMessage.as_u16(),
            RoutingFailed { .. } => ErrorCode::RoutingFailed.as_u16(),
            SerializationError { .. } => ErrorCode::SerializationError.as_u16(),
            NetworkError { .. } => ErrorCode::NetworkError.as_u16(),
            QueueFull { .. } => ErrorCode::QueueFull.as_u16(),
            QueueEmpty { .. } => ErrorCode::QueueFull.as_u16(),
            QueueStopped { .. } => ErrorCode::NotRunning.as_u16(),
            Timeout { .. } => ErrorCode::Timeout.as_u16(),
            SubscriptionFailed { .. } => ErrorCode::SubscriptionFailed.as_u16(),
            SubscriptionNotFound { .. } => ErrorCode::SubscriptionFailed.as_u16(),
            PublicationFailed { .. } => ErrorCode::PublicationFailed.as_u16(),
            UnknownTopic { .. } => ErrorCode::UnknownTopic.as_u16(),
            NoSubscribers { .. } => ErrorCode::NoSubscribers.as_u16(),
            HandlerNotFound { .. } => ErrorCode::HandlerNotFound.as_u16(),
            TaskNotFound { .. } => ErrorCode::TaskNotFound.as_u16(),
            BackendUnavailable { .. } => ErrorCode::BackendUnavailable.as_u16(),
            NotRunning { .. } => ErrorCode::NotRunning.as_u16(),
            AlreadyRunning { .. } => ErrorCode::AlreadyRunning.as_u16(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        use ConduitError::*;
        match self {
            InvalidMessage { timestamp, .. }
            | RoutingFailed { timestamp, .. }
            | SerializationError { timestamp, .. }
            | NetworkError { timestamp, .. }
            | QueueFull { timestamp, .. }
            | QueueEmpty { timestamp, .. }
            | QueueStopped { timestamp, .. }
            | Timeout { timestamp, .. }
            | SubscriptionFailed { timestamp, .. }
            | SubscriptionNotFound { timestamp, .. }
            | PublicationFailed { timestamp, .. }
            | UnknownTopic { timestamp, .. }
            | NoSubscribers { timestamp, .. }
            | HandlerNotFound { timestamp, .. }
            | TaskNotFound { timestamp, .. }
            | BackendUnavailable { timestamp, .. }
            | NotRunning { timestamp, .. }
            | AlreadyRunning { timestamp, .. } => *timestamp,
        }
    }

    pub fn queue_full() -> Self {
        ConduitError::QueueFull {
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn queue_empty() -> Self {
        ConduitError::QueueEmpty {
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn queue_stopped() -> Self {
        ConduitError::QueueStopped {
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn timeout(duration_ms: u64) -> Self {
        ConduitError::Timeout {
            duration_ms,
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn not_running() -> Self {
        ConduitError::NotRunning {
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn already_running() -> Self {
        ConduitError::AlreadyRunning {
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn no_subscribers() -> Self {
        ConduitError::NoSubscribers {
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn subscription_not_found() -> Self {
        ConduitError::SubscriptionNotFound {
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn task_not_found(task_id: impl Into<String>) -> Self {
        ConduitError::TaskNotFound {
            task_id: task_id.into(),
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn handler_not_found(name: impl Into<String>) -> Self {
        ConduitError::HandlerNotFound {
            name: name.into(),
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn unknown_topic(topic: impl Into<String>) -> Self {
        ConduitError::UnknownTopic {
            topic: topic.into(),
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn invalid_message(message: impl Into<String>) -> Self {
        ConduitError::InvalidMessage {
            message: message.into(),
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn serialization_error(message: impl Into<String>) -> Self {
        ConduitError::SerializationError {
            message: message.into(),
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        ConduitError::BackendUnavailable {
            message: message.into(),
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn routing_failed(message: impl Into<String>) -> Self {
        ConduitError::RoutingFailed {
            message: message.into(),
            timestamp: Utc::now(),
            source: None,
        }
    }

    /// Categorize an opaque internal error (e.g. a caught panic or an
    /// `anyhow::Error` from a handler) without leaking its raw message.
    /// Mirrors the sanitize-at-the-boundary discipline applied to command
    /// failures: never forward `err.to_string()` verbatim into the
    /// sanitized message. The original error is still chained in as
    /// `#[source]`, so `std::error::Error::source()` can walk back to it.
    pub fn from_internal(context: &str, err: anyhow::Error) -> Self {
        ConduitError::BackendUnavailable {
            message: format!("internal error during {context}"),
            timestamp: Utc::now(),
            source: Some(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_match_taxonomy() {
        assert_eq!(ConduitError::queue_full().code(), 205);
        assert_eq!(ConduitError::timeout(10).code(), 206);
        assert_eq!(ConduitError::not_running().code(), 216);
        assert_eq!(ConduitError::already_running().code(), 217);
        assert_eq!(ConduitError::no_subscribers().code(), 212);
        assert_eq!(ConduitError::task_not_found("t1").code(), 214);
        assert_eq!(ConduitError::handler_not_found("h").code(), 213);
        assert_eq!(ConduitError::unknown_topic("x").code(), 211);
        assert_eq!(ConduitError::invalid_message("bad").code(), 200);
    }

    #[test]
    fn timestamp_is_recorded() {
        let err = ConduitError::queue_full();
        assert!(err.timestamp() <= Utc::now());
    }

    #[test]
    fn from_internal_does_not_leak_raw_message() {
        let internal = anyhow::anyhow!("password=hunter2");
        let err = ConduitError::from_internal("handler execution", internal);
        assert!(!err.to_string().contains("hunter2"));
    }

    #[test]
    fn from_internal_chains_the_original_cause() {
        use std::error::Error as _;
        let internal = anyhow::anyhow!("password=hunter2");
        let err = ConduitError::from_internal("handler execution", internal);
        let source = err.source().expect("source should be chained");
        assert!(source.to_string().contains("hunter2"));
    }

    #[test]
    fn constructors_without_a_cause_have_no_source() {
        use std::error::Error as _;
        assert!(ConduitError::queue_full().source().is_none());
        assert!(ConduitError::invalid_message("bad").source().is_none());
    }
}
