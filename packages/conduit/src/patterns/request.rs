//! Request/reply over two topics: not true RPC, grounded on the same
//! correlation-id-plus-timeout idiom used for awaiting related bus work.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::timeout;

use crate::bus::MessageBus;
use crate::container::Container;
use crate::error::{ConduitError, Result};
use crate::message::{CorrelationId, Message, MessageType};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Issues correlated requests on `topic.request` and awaits a reply on
/// `topic.reply.<corr_id>`.
pub struct Requester {
    bus: Arc<MessageBus>,
}

impl Requester {
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Requester { bus }
    }

    pub async fn request(&self, topic: &str, payload: Container) -> Result<Container> {
        self.request_with_timeout(topic, payload, DEFAULT_REQUEST_TIMEOUT)
            .await
    }

    pub async fn request_with_timeout(
        &self,
        topic: &str,
        payload: Container,
        request_timeout: Duration,
    ) -> Result<Container> {
        let cid = CorrelationId::new();
        let reply_topic = format!("{topic}.reply.{cid}");

        let (tx, rx) = oneshot::channel();
        let tx = std::sync::Mutex::new(Some(tx));
        let sub_id = self.bus.subscribe(
            reply_topic.clone(),
            Arc::new(move |msg| {
                if let Some(tx) = tx.lock().unwrap().take() {
                    let _ = tx.send(msg.payload.clone());
                }
                Ok(())
            }),
            None,
            0,
        )?;

        let request_topic = format!("{topic}.request");
        let msg = Message::new(request_topic, MessageType::Command, payload)
            .with_correlation_id(cid)
            .with_header("reply_to", reply_topic);
        self.bus.publish_async(msg)?;

        let result = timeout(request_timeout, rx).await;
        let _ = self.bus.unsubscribe(sub_id);

        match result {
            Ok(Ok(payload)) => Ok(payload),
            _ => Err(ConduitError::timeout(request_timeout.as_millis() as u64)),
        }
    }
}

/// Subscribes to `topic.request`, invokes a handler, and publishes the
/// reply addressed to the correlation id carried in the request.
pub struct Responder;

impl Responder {
    /// Registers `handler` on `topic.request`; `handler` returns the
    /// reply payload or an error (errors are logged, not re-published, per
    /// the bus's "callback errors never stop delivery" contract).
    pub fn bind<F>(bus: Arc<MessageBus>, topic: &str, handler: F) -> Result<u64>
    where
        F: Fn(&Container) -> anyhow::Result<Container> + Send + Sync + 'static,
    {
        let request_topic = format!("{topic}.request");
        let topic = topic.to_string();
        let bus_for_reply = Arc::clone(&bus);
        bus.subscribe(
            request_topic,
            Arc::new(move |msg| {
                let reply = handler(&msg.payload)?;
                let reply_to = msg
                    .metadata
                    .headers
                    .get("reply_to")
                    .cloned()
                    .unwrap_or_else(|| {
                        format!(
                            "{topic}.reply.{}",
                            msg.metadata.correlation_id.unwrap_or(CorrelationId::NONE)
                        )
                    });
                let reply_msg = Message::new(reply_to, MessageType::Response, reply);
                bus_for_reply.publish_async(reply_msg)?;
                Ok(())
            }),
            None,
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusConfig;

    #[tokio::test]
    async fn request_reply_round_trip() {
        let bus = Arc::new(MessageBus::new(BusConfig::default()));
        bus.start().unwrap();

        Responder::bind(Arc::clone(&bus), "math.add", |payload| {
            let a = payload.get_i64("a")?;
            let b = payload.get_i64("b")?;
            Ok(Container::new().with("sum", a + b))
        })
        .unwrap();

        let requester = Requester::new(Arc::clone(&bus));
        let payload = Container::new().with("a", 10i64).with("b", 25i64);
        let reply = requester
            .request_with_timeout("math.add", payload, Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(reply.get_i64("sum").unwrap(), 35);
        bus.stop().unwrap();
    }

    #[tokio::test]
    async fn request_with_no_responder_times_out() {
        let bus = Arc::new(MessageBus::new(BusConfig::default()));
        bus.start().unwrap();
        let requester = Requester::new(Arc::clone(&bus));
        let result = requester
            .request_with_timeout("math.nonexistent", Container::new(), Duration::from_millis(100))
            .await;
        assert!(result.is_err());
        bus.stop().unwrap();
    }
}
