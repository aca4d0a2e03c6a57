use crate::{controller::health_check_controller, params, ws, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::controller::{bid_controller, tender_controller};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Tender Platform API"
        ),
        paths(
            bid_controller::create,
            bid_controller::index,
            health_check_controller::health_check,
            tender_controller::create,
            tender_controller::delete,
            tender_controller::read,
            tender_controller::update_status,
            ws::handler::ws_handler,
        ),
        components(
            schemas(
                domain::bid::Bid,
                domain::bid::BidStatus,
                domain::bid::NewBid,
                domain::tender::NewTender,
                domain::tender::Tender,
                domain::tender::TenderStatus,
                params::tender::UpdateStatusParams,
            )
        ),
        tags(
            (name = "tender_platform", description = "Tendering Marketplace API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(bid_routes(app_state.clone()))
        .merge(health_routes(app_state.clone()))
        .merge(tender_routes(app_state.clone()))
        .merge(ws_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn bid_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/contractors/bids", post(bid_controller::create))
        .route(
            "/api/clients/bids/tender/{id}",
            get(bid_controller::index),
        )
        .with_state(app_state)
}

fn health_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_controller::health_check))
        .with_state(app_state)
}

fn tender_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/clients/tenders", post(tender_controller::create))
        .route("/api/clients/tenders/{id}", get(tender_controller::read))
        .route(
            "/api/clients/tenders/{id}",
            delete(tender_controller::delete),
        )
        .route(
            "/api/clients/tenders/{id}/status",
            put(tender_controller::update_status),
        )
        .with_state(app_state)
}

fn ws_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws::handler::ws_handler))
        .with_state(app_state)
}
