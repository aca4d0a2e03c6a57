use config::Config;
use domain::Store;
use events::EventPublisher;
use log::info;
use std::sync::Arc;
use ws::domain_event_handler::WsDomainEventHandler;

pub mod config;
pub mod logging;

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub ws_manager: Arc<ws::Manager>,
    pub event_publisher: Arc<EventPublisher>,
}

impl AppState {
    /// Build the process-wide state: one store, one WebSocket coordinator, and a
    /// publisher that forwards domain events to that coordinator.
    pub fn new(app_config: Config) -> Self {
        let ws_manager = Arc::new(ws::Manager::with_write_timeout(
            app_config.ws_write_timeout(),
        ));
        info!(
            "WebSocket write timeout: {:?}",
            ws_manager.write_timeout()
        );

        let event_publisher = EventPublisher::new()
            .with_handler(Arc::new(WsDomainEventHandler::new(ws_manager.clone())));

        Self {
            config: app_config,
            store: Arc::new(Store::new()),
            ws_manager,
            event_publisher: Arc::new(event_publisher),
        }
    }

    pub fn store_ref(&self) -> &Store {
        self.store.as_ref()
    }
}
