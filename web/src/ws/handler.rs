use crate::params::ws::ConnectParams;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use log::*;
use serde_json::json;
use service::AppState;
use std::sync::Arc;
use ws::{Manager, Session, TopicId, WebSocketTransport};

/// Upgrade to a WebSocket that receives a `new_bid` message for every bid placed on `tender_id`.
#[utoipa::path(
    get,
    path = "/ws",
    params(ConnectParams),
    responses(
        (status = 101, description = "Switching to the WebSocket protocol"),
        (status = 400, description = "tender_id query parameter is missing or empty")
    )
)]
pub(crate) async fn ws_handler(
    State(app_state): State<AppState>,
    Query(params): Query<ConnectParams>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let Some(tender_id) = params.topic().map(str::to_owned) else {
        warn!("Rejecting WebSocket connection without a tender_id");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "BAD REQUEST", "reason": "tender_id is required" })),
        )
            .into_response();
    };

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return rejection.into_response(),
    };

    debug!("Upgrading WebSocket connection for tender {tender_id}");

    let manager = app_state.ws_manager.clone();
    upgrade.on_upgrade(move |socket| handle_socket(socket, manager, tender_id))
}

/// Owns one connection from registration to unregistration.
///
/// Inbound frames are read only to notice the client leaving. The loop also ends
/// when the manager evicts the session, so the read half is released together
/// with the write half.
async fn handle_socket(socket: WebSocket, manager: Arc<Manager>, tender_id: TopicId) {
    let (sink, mut stream) = socket.split();
    let session = Arc::new(Session::new(tender_id, WebSocketTransport::new(sink)));

    manager.register(session.clone()).await;

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Close(_))) | None => {
                    debug!("Session {} disconnected", session.id());
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("Session {} read error: {e}", session.id());
                    break;
                }
            },
            _ = session.closed() => {
                debug!("Session {} was closed by the server", session.id());
                break;
            }
        }
    }

    manager.unregister(&session).await;
}
