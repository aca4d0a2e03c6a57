use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::controller::ApiResponse;
use crate::params::tender::UpdateStatusParams;
use crate::{AppState, Error};
use domain::tender::{self as TenderApi, NewTender};
use domain::Id;
use log::*;

/// POST create a new Tender
#[utoipa::path(
    post,
    path = "/api/clients/tenders",
    request_body = domain::tender::NewTender,
    responses(
        (status = 201, description = "Successfully Created a New Tender", body = domain::tender::Tender),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(tender_params): Json<NewTender>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a New Tender from: {tender_params:?}");

    let tender = TenderApi::create(app_state.store_ref(), tender_params).await?;

    debug!("New Tender: {tender:?}");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), tender)),
    ))
}

/// GET a particular Tender specified by its id.
#[utoipa::path(
    get,
    path = "/api/clients/tenders/{id}",
    params(
        ("id" = Uuid, Path, description = "Tender id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a specific Tender by its id", body = domain::tender::Tender),
        (status = 404, description = "Tender not found"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Tender by id: {id}");

    let tender = TenderApi::find_by_id(app_state.store_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), tender)))
}

#[utoipa::path(
    put,
    path = "/api/clients/tenders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Id of tender to update"),
    ),
    request_body = UpdateStatusParams,
    responses(
        (status = 200, description = "Successfully Updated Tender Status", body = domain::tender::Tender),
        (status = 404, description = "Tender not found"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateStatusParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Tender Status with id: {id}");

    let tender = TenderApi::update_status(app_state.store_ref(), id, params.status).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), tender)))
}

/// DELETE a Tender and its Bids specified by the Tender's id.
#[utoipa::path(
    delete,
    path = "/api/clients/tenders/{id}",
    params(
        ("id" = Uuid, Path, description = "Tender id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted a certain Tender by its id", body = serde_json::Value),
        (status = 404, description = "Tender not found"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn delete(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Tender by id: {id}");

    TenderApi::delete(app_state.store_ref(), id).await?;
    Ok(Json(json!({"id": id})))
}

#[cfg(test)]
mod tests {
    use crate::router::define_routes;
    use crate::test_app_state;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn tender_body() -> Value {
        json!({
            "client_id": "5c0b8f63-1c1e-4a39-9a6a-2b5f0c9d8e11",
            "title": "Road resurfacing",
            "description": "Resurface 2km of the ring road",
            "budget": 250000.0,
            "deadline": Utc::now() + Duration::days(14),
        })
    }

    #[tokio::test]
    async fn test_create_then_read_tender() {
        let app = define_routes(test_app_state());

        let (status, created) = send(
            &app,
            json_request(Method::POST, "/api/clients/tenders", tender_body()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status_code"], 201);
        assert_eq!(created["data"]["status"], "OPEN");

        let id = created["data"]["id"].as_str().unwrap().to_owned();
        let (status, read) = send(
            &app,
            Request::builder()
                .uri(format!("/api/clients/tenders/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read["data"], created["data"]);
    }

    #[tokio::test]
    async fn test_create_tender_with_non_positive_budget_is_unprocessable() {
        let app = define_routes(test_app_state());
        let mut body = tender_body();
        body["budget"] = json!(0.0);

        let (status, _) = send(
            &app,
            json_request(Method::POST, "/api/clients/tenders", body),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_read_unknown_tender_is_not_found() {
        let app = define_routes(test_app_state());

        let (status, body) = send(
            &app,
            Request::builder()
                .uri("/api/clients/tenders/0b6f1d1c-3f8e-4d55-a1f4-0f2c7a4f9e01")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT FOUND");
    }

    #[tokio::test]
    async fn test_update_tender_status() {
        let app = define_routes(test_app_state());
        let (_, created) = send(
            &app,
            json_request(Method::POST, "/api/clients/tenders", tender_body()),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_owned();

        let (status, updated) = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/api/clients/tenders/{id}/status"),
                json!({ "status": "CLOSED" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["status"], "CLOSED");
    }

    #[tokio::test]
    async fn test_delete_tender_then_read_is_not_found() {
        let app = define_routes(test_app_state());
        let (_, created) = send(
            &app,
            json_request(Method::POST, "/api/clients/tenders", tender_body()),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_owned();

        let (status, deleted) = send(
            &app,
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/clients/tenders/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["id"], id.as_str());

        let (status, _) = send(
            &app,
            Request::builder()
                .uri(format!("/api/clients/tenders/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_unknown_tender_is_not_found() {
        let app = define_routes(test_app_state());

        let (status, body) = send(
            &app,
            Request::builder()
                .method(Method::DELETE)
                .uri("/api/clients/tenders/0b6f1d1c-3f8e-4d55-a1f4-0f2c7a4f9e01")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT FOUND");
    }
}
