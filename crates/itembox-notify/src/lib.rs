mod log;
mod webhook;

pub use log::LogNotifier;
pub use webhook::WebhookNotifier;

use std::sync::Arc;

use async_trait::async_trait;
use itembox_core::ItemEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("rejected by topic endpoint: {0}")]
    Rejected(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Publishes item events to a topic. Callers treat delivery as best effort.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn topic(&self) -> &str;

    async fn publish(&self, event: &ItemEvent) -> Result<(), NotifyError>;
}

/// Wire envelope for a published event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub topic: String,
    pub subject: String,
    pub message: ItemEvent,
}

impl Envelope {
    pub fn new(topic: &str, event: &ItemEvent) -> Self {
        Self {
            topic: topic.to_string(),
            subject: event.event_type.to_string(),
            message: event.clone(),
        }
    }
}

// -- Configuration --

pub const DEFAULT_TOPIC: &str = "item-events";

#[derive(Debug, Clone, Default)]
pub struct NotifyConfig {
    /// Topic identifier stamped on every envelope.
    pub topic: Option<String>,
    /// When set, envelopes are POSTed here as JSON. Otherwise they are only logged.
    pub endpoint_url: Option<String>,
}

impl NotifyConfig {
    pub fn from_env() -> Self {
        Self {
            topic: std::env::var("ITEMBOX_NOTIFY_TOPIC")
                .or_else(|_| std::env::var("NOTIFY_TOPIC"))
                .ok()
                .filter(|v| !v.is_empty()),
            endpoint_url: std::env::var("ITEMBOX_NOTIFY_URL")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }

    pub fn topic_name(&self) -> &str {
        self.topic.as_deref().unwrap_or(DEFAULT_TOPIC)
    }

    pub fn is_webhook(&self) -> bool {
        self.endpoint_url.is_some()
    }
}

// -- Factory --

pub fn create_notifier(config: &NotifyConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match &config.endpoint_url {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(url, config.topic_name())?)),
        None => Ok(Arc::new(LogNotifier::new(config.topic_name()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_defaults() {
        assert_eq!(NotifyConfig::default().topic_name(), DEFAULT_TOPIC);
        let config = NotifyConfig {
            topic: Some("deletes".into()),
            endpoint_url: None,
        };
        assert_eq!(config.topic_name(), "deletes");
        assert!(!config.is_webhook());
    }

    #[test]
    fn create_notifier_picks_backend() {
        let log = create_notifier(&NotifyConfig::default()).unwrap();
        assert_eq!(log.topic(), DEFAULT_TOPIC);

        let webhook = create_notifier(&NotifyConfig {
            topic: Some("t".into()),
            endpoint_url: Some("http://127.0.0.1:9/hook".into()),
        })
        .unwrap();
        assert_eq!(webhook.topic(), "t");

        let bad = create_notifier(&NotifyConfig {
            topic: None,
            endpoint_url: Some("not a url".into()),
        });
        assert!(matches!(bad, Err(NotifyError::InvalidConfig(_))));
    }

    #[test]
    fn from_env_reads_topic_and_url() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        for var in ["ITEMBOX_NOTIFY_TOPIC", "NOTIFY_TOPIC", "ITEMBOX_NOTIFY_URL"] {
            std::env::remove_var(var);
        }
        let config = NotifyConfig::from_env();
        assert!(config.topic.is_none());
        assert!(!config.is_webhook());

        std::env::set_var("NOTIFY_TOPIC", "fallback-topic");
        std::env::set_var("ITEMBOX_NOTIFY_URL", "http://hooks.local/items");
        let config = NotifyConfig::from_env();
        assert_eq!(config.topic_name(), "fallback-topic");
        assert!(config.is_webhook());

        for var in ["ITEMBOX_NOTIFY_TOPIC", "NOTIFY_TOPIC", "ITEMBOX_NOTIFY_URL"] {
            std::env::remove_var(var);
        }
    }
}
