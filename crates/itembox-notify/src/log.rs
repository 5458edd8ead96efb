use async_trait::async_trait;
use itembox_core::ItemEvent;

use crate::{Envelope, Notifier, NotifyError};

/// Writes events to the log instead of a remote topic. Never fails.
pub struct LogNotifier {
    topic: String,
}

impl LogNotifier {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&self, event: &ItemEvent) -> Result<(), NotifyError> {
        let envelope = Envelope::new(&self.topic, event);
        let payload = serde_json::to_string(&envelope.message)
            .map_err(|e| NotifyError::Transport(format!("encode: {e}")))?;
        tracing::info!(
            topic = %envelope.topic,
            subject = %envelope.subject,
            item_id = %event.item.id,
            %payload,
            "published item event"
        );
        Ok(())
    }
}
