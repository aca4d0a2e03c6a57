use axum::http::{header, HeaderValue, Method};
use log::*;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use error::{Error, Result};
pub use service::AppState;

mod controller;
mod error;
mod params;
pub mod router;
mod ws;

/// Bind the configured interface/port and serve the API until the process exits.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let listen_addr = format!(
        "{}:{}",
        app_state.config.interface(),
        app_state.config.port
    );

    let allowed_origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();
    info!("CORS allowed origins: {allowed_origins:?}");

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(AllowOrigin::list(allowed_origins));

    let listener = TcpListener::bind(&listen_addr).await?;
    info!(
        "Server starting... listening for connections on http://{listen_addr} ({} environment)",
        app_state.config.runtime_env()
    );

    axum::serve(listener, router::define_routes(app_state).layer(cors_layer)).await
}

#[cfg(test)]
pub(crate) fn test_app_state() -> AppState {
    use clap::Parser;

    AppState::new(
        service::config::Config::try_parse_from(["tender_platform_rs"])
            .expect("default config parses"),
    )
}
