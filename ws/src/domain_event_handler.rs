use crate::message::{Event as WsEvent, Message as WsMessage};
use crate::Manager;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Handles domain events by converting them to WebSocket messages and
/// broadcasting them to the sessions watching the affected tender.
///
/// Delivery is best-effort and happens in the background: the bid is already
/// persisted and the HTTP response does not wait for it. Failures are logged and
/// never propagated.
pub struct WsDomainEventHandler {
    ws_manager: Arc<Manager>,
}

impl WsDomainEventHandler {
    pub fn new(ws_manager: Arc<Manager>) -> Self {
        Self { ws_manager }
    }
}

#[async_trait]
impl EventHandler for WsDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::BidCreated { tender_id, bid } => {
                debug!("Handling {} event for tender {tender_id}", event.name());

                let message = WsMessage {
                    event: WsEvent::NewBid { bid: bid.clone() },
                    topic: tender_id.to_string(),
                };

                match self.ws_manager.dispatch_message(message).await {
                    Ok(Some(_delivery)) => {
                        debug!("Queued new bid notification for tender {tender_id}")
                    }
                    Ok(None) => trace!("Nobody is watching tender {tender_id}"),
                    Err(e) => error!("Failed to broadcast new bid for tender {tender_id}: {e}"),
                }
            }
        }
    }
}
