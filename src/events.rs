use crate::entities::cart_item::LineItemRef;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

/// Events emitted by the cart aggregate after a successful commit.
///
/// Delivery is fire-and-forget: a full or closed channel is logged and never
/// fails the originating request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CartCreated {
        cart_id: Uuid,
        owner_id: Uuid,
    },
    CartItemAdded {
        cart_id: Uuid,
        item: LineItemRef,
    },
    CartItemQuantityChanged {
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    },
    CartItemRemoved {
        cart_id: Uuid,
        item_id: Uuid,
    },
    CartDeleted {
        cart_id: Uuid,
        owner_id: Uuid,
    },
    CartCleared {
        owner_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of propagating delivery failures
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            error!("Event delivery failed: {}", e);
        }
    }
}

/// Consumes events off the channel. Downstream integrations (recommendation
/// feeds, abandoned-cart mailers) subscribe here; the default consumer just
/// records the stream.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::CartCreated { cart_id, owner_id } => {
                info!(%cart_id, %owner_id, "cart created");
            }
            Event::CartItemAdded { cart_id, item } => {
                info!(%cart_id, %item, "cart item added");
            }
            Event::CartItemQuantityChanged {
                cart_id,
                item_id,
                quantity,
            } => {
                info!(%cart_id, %item_id, quantity, "cart item quantity changed");
            }
            Event::CartItemRemoved { cart_id, item_id } => {
                info!(%cart_id, %item_id, "cart item removed");
            }
            Event::CartDeleted { cart_id, owner_id } => {
                info!(%cart_id, %owner_id, "cart deleted");
            }
            Event::CartCleared { owner_id } => {
                info!(%owner_id, "cart cleared");
            }
        }
    }

    info!("Event channel closed; stopping event processing loop");
}
