//! Patterns layered on the message bus: publisher/subscriber façades,
//! request/reply, pipelines, and event streaming.

mod pipeline;
mod pubsub;
mod request;
mod stream;

pub use pipeline::{Pipeline, Stage};
pub use pubsub::{Publisher, Subscriber};
pub use request::{Responder, Requester};
pub use stream::EventStream;
