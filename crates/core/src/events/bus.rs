use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::BlogEvent;

/// In-process event bus backed by `tokio::broadcast`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<BlogEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(
        &self,
        event: BlogEvent,
    ) -> Result<usize, broadcast::error::SendError<BlogEvent>> {
        self.sender.send(event)
    }

    /// Publish, treating "nobody is listening" as fine.
    pub fn notify(&self, event: BlogEvent) {
        if let Err(err) = self.publish(event) {
            tracing::trace!(event = ?err.0, "no subscribers for event");
        }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<BlogEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
