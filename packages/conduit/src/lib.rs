//! # conduit
//!
//! An in-process messaging and distributed-task substrate: a topic-routed
//! message bus (pub/sub, request/reply, pipelines, event streaming) plus a
//! task subsystem (priority queue, worker pool, result backend, scheduler,
//! chains, chords).
//!
//! ## Messaging layer
//!
//! [`Message`] is metadata plus a typed [`Container`] payload. A
//! [`MessageBus`] routes published messages to subscribers matched by
//! [`TopicRouter`] glob patterns (`*` one segment, `#` the rest), queued
//! through a [`MessageQueue`] and dispatched across a [`ThreadPoolExecutor`].
//! The [`patterns`] module layers [`patterns::Publisher`]/[`patterns::Subscriber`]
//! facades, [`patterns::Requester`]/[`patterns::Responder`] request/reply,
//! [`patterns::Pipeline`] multi-stage transforms, and [`patterns::EventStream`]
//! replay buffers on top.
//!
//! ## Task layer
//!
//! [`Task`] is an executable work unit submitted through a [`TaskClient`],
//! landing on a [`TaskQueue`] (priority heap plus a delayed set for
//! scheduled `eta`s) and picked up by a [`WorkerPool`] running registered
//! [`TaskHandler`]s. Outcomes land in a [`ResultBackend`]
//! ([`InMemoryResultBackend`] ships by default). [`Scheduler`] fires
//! interval- or [`CronExpr`]-driven entries that stamp a fresh task from a
//! template on each tick. [`TaskClient::chain`] and [`TaskClient::chord`]
//! compose multiple tasks into sequential and fan-out/fan-in workflows.
//!
//! ## Example
//!
//! ```no_run
//! use conduit::{Container, MessageBus, BusConfig, MessageType, Message};
//! use std::sync::Arc;
//!
//! let bus = Arc::new(MessageBus::new(BusConfig::default()));
//! bus.start().unwrap();
//! bus.subscribe(
//!     "orders.*",
//!     Arc::new(|msg: &Message| {
//!         println!("received on {}", msg.topic());
//!         Ok(())
//!     }),
//!     None,
//!     0,
//! )
//! .unwrap();
//! bus.publish_async(Message::new("orders.placed", MessageType::Event, Container::new())).unwrap();
//! bus.stop().unwrap();
//! ```
//!
//! ## What this is not
//!
//! conduit is **not**:
//! - A durable, disk-backed message broker
//! - A distributed system — every component runs in one process
//! - A general actor framework

mod backend;
mod bus;
mod client;
mod container;
mod cron;
mod error;
mod executor;
mod message;
mod queue;
mod router;
mod scheduler;
mod task;
mod task_queue;
mod worker;

pub mod patterns;

pub use backend::{ErrorData, InMemoryResultBackend, ProgressData, ResultBackend};
pub use bus::{BusConfig, BusStatistics, MessageBus};
pub use client::{AsyncResult, TaskClient};
pub use container::{Container, Value};
pub use cron::CronExpr;
pub use error::{ConduitError, ErrorCode, Result};
pub use executor::{JobHandle, ThreadPoolExecutor};
pub use message::{CorrelationId, Message, MessageType, Metadata, Priority};
pub use queue::{MessageQueue, QueueConfig, QueueMode};
pub use router::{SubscriptionCallback, SubscriptionFilter, TopicRouter};
pub use scheduler::{ScheduleInfo, Scheduler, Trigger};
pub use task::{RetryBackoff, Task, TaskBuilder, TaskConfig, TaskContext, TaskState};
pub use task_queue::TaskQueue;
pub use worker::{FnHandler, TaskHandler, WorkerPool, WorkerPoolConfig, WorkerStats};
