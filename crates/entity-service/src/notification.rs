//! # Change Notifications
//!
//! Every successful write publishes exactly one [`ChangeNotification`] through a
//! [`NotificationDispatcher`]. Publishing is best effort and sits outside the
//! transaction boundary: the service logs a [`DispatchError`] and still reports
//! success for a committed write.
//!
//! [`BroadcastDispatcher`] fans notifications out to live subscribers over a
//! `tokio::sync::broadcast` channel. `send` never waits, so publishing is a
//! fire-and-forget enqueue. A subscriber that falls more than `capacity`
//! notifications behind loses the oldest ones.

use crate::error::DispatchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Created => "created",
            Operation::Updated => "updated",
            Operation::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// Event describing a committed write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub entity_type: String,
    pub operation: Operation,
    pub key: String,
    /// The model after the write; `None` for deletes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    pub occurred_at: DateTime<Utc>,
}

impl ChangeNotification {
    pub fn new(
        entity_type: impl Into<String>,
        operation: Operation,
        key: impl fmt::Display,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            operation,
            key: key.to_string(),
            payload,
            occurred_at: Utc::now(),
        }
    }
}

/// Publishes change events to interested listeners.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn publish(&self, notification: ChangeNotification) -> Result<(), DispatchError>;
}

/// Broadcast-channel dispatcher for in-process subscribers.
#[derive(Clone)]
pub struct BroadcastDispatcher {
    sender: broadcast::Sender<ChangeNotification>,
}

impl BroadcastDispatcher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl NotificationDispatcher for BroadcastDispatcher {
    async fn publish(&self, notification: ChangeNotification) -> Result<(), DispatchError> {
        self.sender
            .send(notification)
            .map(|_| ())
            .map_err(|_| DispatchError::NoSubscribers)
    }
}
