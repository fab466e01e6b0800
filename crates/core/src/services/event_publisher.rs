//! Event publisher service.
//!
//! Lets the lifecycle manager notify observers (dashboards, notifiers)
//! without depending on how they are delivered.

use async_trait::async_trait;
use aduan_common::{AppError, AppResult};
use aduan_db::entities::complaint::{ComplaintStatus, Priority};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Events emitted after a complaint changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ComplaintEvent {
    /// A student submitted a complaint.
    Created { id: String, student_id: String },
    /// An admin advanced the status.
    StatusChanged {
        id: String,
        student_id: String,
        from: ComplaintStatus,
        to: ComplaintStatus,
    },
    /// An admin changed the priority.
    PriorityChanged { id: String, priority: Priority },
    /// Title, description, category, attachment or notes changed.
    Updated { id: String },
    /// The complaint was removed.
    Deleted { id: String, student_id: String },
    /// The owning student left feedback.
    FeedbackAdded { id: String, feedback_id: String },
}

impl ComplaintEvent {
    /// The complaint this event is about.
    #[must_use]
    pub fn complaint_id(&self) -> &str {
        match self {
            Self::Created { id, .. }
            | Self::StatusChanged { id, .. }
            | Self::PriorityChanged { id, .. }
            | Self::Updated { id }
            | Self::Deleted { id, .. }
            | Self::FeedbackAdded { id, .. } => id,
        }
    }
}

/// Trait for publishing complaint events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event.
    async fn publish(&self, event: ComplaintEvent) -> AppResult<()>;
}

/// A no-op implementation of `EventPublisher` for testing or when nobody observes.
#[derive(Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: ComplaintEvent) -> AppResult<()> {
        Ok(())
    }
}

/// In-process fan-out over a tokio broadcast channel.
#[derive(Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<ComplaintEvent>,
}

impl BroadcastEventPublisher {
    /// Create a publisher buffering up to `capacity` events per lagging subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ComplaintEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, event: ComplaintEvent) -> AppResult<()> {
        // No subscribers is not an error.
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|e| AppError::Internal(format!("Failed to publish event: {e}")))
    }
}

/// Wrapper for boxed `EventPublisher` trait object.
pub type EventPublisherService = Arc<dyn EventPublisher>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let publisher = BroadcastEventPublisher::new(8);
        let mut rx = publisher.subscribe();

        publisher
            .publish(ComplaintEvent::Updated {
                id: "ADU1".to_string(),
            })
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.complaint_id(), "ADU1");
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_is_ok() {
        let publisher = BroadcastEventPublisher::default();
        let result = publisher
            .publish(ComplaintEvent::Deleted {
                id: "ADU1".to_string(),
                student_id: "s1".to_string(),
            })
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = ComplaintEvent::StatusChanged {
            id: "ADU1".to_string(),
            student_id: "s1".to_string(),
            from: ComplaintStatus::New,
            to: ComplaintStatus::Read,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "statusChanged");
        assert_eq!(json["to"], "dibaca");
    }
}
