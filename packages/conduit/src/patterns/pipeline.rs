//! Ordered processing stages applied serially to each message.

use std::sync::Arc;

use crate::error::Result;
use crate::message::Message;

/// A single pipeline stage: `fn(msg) -> Result<msg>`.
pub type Stage = Arc<dyn Fn(Message) -> Result<Message> + Send + Sync>;

/// Serial per-message pipeline. Parallel fan-out across distinct messages
/// is left to the caller (typically by submitting each through an
/// executor); this type only orders stages within one message's path.
pub struct Pipeline {
    stages: Vec<Stage>,
    on_error: Option<Arc<dyn Fn(&Message, &crate::error::ConduitError) + Send + Sync>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline {
            stages: Vec::new(),
            on_error: None,
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Message, &crate::error::ConduitError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    /// Runs every stage in order; a stage's error aborts processing for
    /// this message and is reported via the error callback (if set).
    pub fn process(&self, mut msg: Message) -> Result<Message> {
        for stage in &self.stages {
            match stage(msg.clone()) {
                Ok(next) => msg = next,
                Err(err) => {
                    if let Some(handler) = &self.on_error {
                        handler(&msg, &err);
                    }
                    return Err(err);
                }
            }
        }
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::message::MessageType;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn stages_run_in_order() {
        let pipeline = Pipeline::new()
            .with_stage(Arc::new(|mut msg: Message| {
                msg.payload.set("step1", true);
                Ok(msg)
            }))
            .with_stage(Arc::new(|mut msg: Message| {
                msg.payload.set("step2", true);
                Ok(msg)
            }));

        let msg = Message::new("p", MessageType::Command, Container::new());
        let result = pipeline.process(msg).unwrap();
        assert!(result.payload.get_bool("step1").unwrap());
        assert!(result.payload.get_bool("step2").unwrap());
    }

    #[test]
    fn stage_error_aborts_and_reports() {
        let reported = Arc::new(AtomicBool::new(false));
        let reported2 = Arc::clone(&reported);

        let pipeline = Pipeline::new()
            .with_stage(Arc::new(|_| {
                Err(crate::error::ConduitError::invalid_message("bad stage"))
            }))
            .with_stage(Arc::new(|mut msg: Message| {
                msg.payload.set("should_not_run", true);
                Ok(msg)
            }))
            .on_error(move |_, _| reported2.store(true, Ordering::Relaxed));

        let msg = Message::new("p", MessageType::Command, Container::new());
        assert!(pipeline.process(msg).is_err());
        assert!(reported.load(Ordering::Relaxed));
    }
}
