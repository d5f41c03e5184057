use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// Domain events emitted by the services.
///
/// Consumers (mail jobs, analytics, cache invalidation) live outside this
/// crate; the services only publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartCreated(Uuid),
    CartUpdated(Uuid),
    CartDiscountApplied { cart_id: Uuid, code: String },
    CartDiscountRemoved { cart_id: Uuid, code: String },

    // Order events
    OrderStatusChanged {
        order_id: i64,
        old_status: String,
        new_status: String,
    },
    OrderStockReduced(i64),

    // Stock events
    StockReduced {
        product_id: i64,
        variation_id: Option<i64>,
        remaining: i64,
    },
    LowStock {
        product_id: i64,
        remaining: i64,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with the receiving half of the channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when nobody listens.
    /// Event delivery is best-effort; domain operations never roll back
    /// because a consumer is missing.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_are_delivered_in_order() {
        let (sender, mut rx) = EventSender::channel(8);
        let cart_id = Uuid::new_v4();

        sender.send_or_log(Event::CartCreated(cart_id)).await;
        sender
            .send_or_log(Event::CartDiscountApplied {
                cart_id,
                code: "SUMMER10".into(),
            })
            .await;

        assert!(matches!(rx.recv().await, Some(Event::CartCreated(id)) if id == cart_id));
        assert!(matches!(
            rx.recv().await,
            Some(Event::CartDiscountApplied { code, .. }) if code == "SUMMER10"
        ));
    }

    #[tokio::test]
    async fn send_or_log_survives_closed_channel() {
        let (sender, rx) = EventSender::channel(1);
        drop(rx);
        sender.send_or_log(Event::OrderStockReduced(1)).await;
    }
}
