use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::{AppState, Error};
use domain::bid::{self as BidApi, BidFilter, NewBid};
use domain::Id;
use log::*;

/// POST submit a new Bid on an open Tender
#[utoipa::path(
    post,
    path = "/api/contractors/bids",
    request_body = domain::bid::NewBid,
    responses(
        (status = 201, description = "Successfully Created a New Bid", body = domain::bid::Bid),
        (status = 404, description = "Tender not found"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(bid_params): Json<NewBid>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a New Bid from: {bid_params:?}");

    let bid = BidApi::create(
        app_state.store_ref(),
        app_state.event_publisher.as_ref(),
        bid_params,
    )
    .await?;

    debug!("New Bid: {bid:?}");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), bid)),
    ))
}

/// GET all Bids placed on a Tender, oldest first
#[utoipa::path(
    get,
    path = "/api/clients/bids/tender/{id}",
    params(
        ("id" = Uuid, Path, description = "Tender id whose bids to retrieve"),
        BidFilter
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Bids for a Tender", body = [domain::bid::Bid]),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Path(tender_id): Path<Id>,
    Query(filter): Query<BidFilter>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Bids for Tender {tender_id} with filter: {filter:?}");

    let bids = BidApi::find_by_tender(app_state.store_ref(), tender_id, &filter).await?;

    debug!("Found {} Bids for Tender {tender_id}", bids.len());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), bids)))
}
