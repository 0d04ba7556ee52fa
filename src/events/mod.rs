use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{order::OrderStatus, skip_hire_order::SkipHireStatus};

/// Handle for publishing domain events to the background processor
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, waiting for channel capacity
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event and logs a warning on failure; the caller never sees the error.
    pub async fn publish(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "dropping domain event");
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    OrderCreated {
        order_id: Uuid,
        order_number: String,
    },
    OrderStatusChanged {
        order_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
    OrderCancelled(Uuid),
    SkipHireCreated {
        order_id: Uuid,
        order_number: String,
    },
    SkipHireStatusChanged {
        order_id: Uuid,
        old_status: SkipHireStatus,
        new_status: SkipHireStatus,
    },
    SkipHireCancelled(Uuid),
}

/// Envelope stamped when the processor picks an event up
#[derive(Debug, Clone, Serialize)]
pub struct ReceivedEvent {
    pub event: Event,
    pub received_at: DateTime<Utc>,
}

/// Creates a bounded channel and returns the sender handle plus receiver.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender::new(tx), rx)
}

pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        let received = ReceivedEvent {
            event,
            received_at: Utc::now(),
        };

        match &received.event {
            Event::OrderCreated {
                order_id,
                order_number,
            } => info!(%order_id, %order_number, "order created"),
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => info!(%order_id, ?old_status, ?new_status, "order status changed"),
            Event::OrderCancelled(order_id) => info!(%order_id, "order cancelled"),
            Event::SkipHireCreated {
                order_id,
                order_number,
            } => info!(%order_id, %order_number, "skip hire booked"),
            Event::SkipHireStatusChanged {
                order_id,
                old_status,
                new_status,
            } => info!(%order_id, ?old_status, ?new_status, "skip hire status changed"),
            Event::SkipHireCancelled(order_id) => info!(%order_id, "skip hire cancelled"),
        }

        if let Ok(payload) = serde_json::to_string(&received) {
            tracing::debug!(target: "marketplace_api::events", %payload);
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_delivers_to_receiver() {
        let (sender, mut rx) = channel(4);
        let id = Uuid::new_v4();

        sender.publish(Event::OrderCancelled(id)).await;

        assert_eq!(rx.recv().await, Some(Event::OrderCancelled(id)));
    }

    #[tokio::test]
    async fn publish_after_receiver_dropped_does_not_fail() {
        let (sender, rx) = channel(1);
        drop(rx);

        sender.publish(Event::SkipHireCancelled(Uuid::new_v4())).await;
        assert!(sender.send(Event::SkipHireCancelled(Uuid::new_v4())).await.is_err());
    }
}
