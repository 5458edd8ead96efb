use std::time::Duration;

use async_trait::async_trait;
use itembox_core::ItemEvent;
use reqwest::{Client, Url};

use crate::{Envelope, Notifier, NotifyError};

const PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Delivers events by POSTing a JSON [`Envelope`] to an HTTP endpoint.
pub struct WebhookNotifier {
    client: Client,
    endpoint: Url,
    topic: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: &str, topic: &str) -> Result<Self, NotifyError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| NotifyError::InvalidConfig(format!("endpoint '{endpoint}': {e}")))?;
        let client = Client::builder()
            .timeout(PUBLISH_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            topic: topic.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&self, event: &ItemEvent) -> Result<(), NotifyError> {
        let envelope = Envelope::new(&self.topic, event);
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&envelope)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            tracing::debug!(topic = %self.topic, item_id = %event.item.id, "event delivered");
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(NotifyError::Rejected(format!("status {status}: {body}")))
        }
    }
}
