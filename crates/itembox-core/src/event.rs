use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::item::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    ItemDeleted,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ItemDeleted => "ITEM_DELETED",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message published to the notification topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEvent {
    pub event_type: EventType,
    pub item: Item,
    pub timestamp: DateTime<Utc>,
}

impl ItemEvent {
    pub fn deleted(item: Item) -> Self {
        Self {
            event_type: EventType::ItemDeleted,
            item,
            timestamp: Utc::now().trunc_subsecs(3),
        }
    }
}
