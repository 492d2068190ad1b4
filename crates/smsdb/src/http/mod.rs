//! # HTTP Server
//!
//! One endpoint group per collection, all served by the same four handlers:
//!
//! | Method | Path | Operation | Success |
//! |--------|------|-----------|---------|
//! | `POST` | `/{route}` | create | 201 + record |
//! | `GET` | `/{route}/{key}` | read | 200 + record |
//! | `PUT` | `/{route}/{key}` | update | 200 + record |
//! | `DELETE` | `/{route}/{key}` | delete | 200 + `{"message": "<Entity> deleted"}` |
//!
//! `{route}` is any route segment or collection name the API resolves
//! (`ussd-services`, `campaigns`, ...). Keys containing `#` or `*`, like USSD
//! codes, must be percent-encoded by the client.
//!
//! Storage calls are synchronous, so every handler hands its API call to the
//! blocking pool. Errors become JSON bodies `{error, message, violations}`
//! with the status from [`error::status_for`].

mod error;

use error::ApiError;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use smsdbapp::api::{EntityKind, SmsdbApi};
use smsdbapp::store::DocumentStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub type SharedApi = Arc<SmsdbApi<Box<dyn DocumentStore>>>;

#[derive(Clone)]
pub struct AppState {
    api: SharedApi,
}

impl AppState {
    pub fn new(api: SharedApi) -> Self {
        Self { api }
    }
}

pub fn router(api: SharedApi) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/{entity}", post(create_record))
        .route("/{entity}/", post(create_record))
        .route(
            "/{entity}/{key}",
            get(read_record).put(update_record).delete(delete_record),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(AppState::new(api))
}

pub async fn serve(api: SharedApi, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "smsdb listening");
    axum::serve(listener, router(api))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

async fn healthz() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

fn resolve(entity: &str) -> Result<EntityKind, ApiError> {
    entity.parse::<EntityKind>().map_err(ApiError::from)
}

/// Run an API call on the blocking pool.
async fn blocking<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&SmsdbApi<Box<dyn DocumentStore>>) -> smsdbapp::error::Result<T> + Send + 'static,
{
    let api = state.api.clone();
    tokio::task::spawn_blocking(move || op(&api))
        .await
        .map_err(|e| ApiError::internal(format!("storage worker failed: {}", e)))?
        .map_err(ApiError::from)
}

pub async fn create_record(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let kind = resolve(&entity)?;
    let Json(payload) = body?;
    let created = blocking(&state, move |api| api.create(kind, payload)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn read_record(
    State(state): State<AppState>,
    Path((entity, key)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve(&entity)?;
    let record = blocking(&state, move |api| api.read(kind, &key)).await?;
    Ok(Json(record))
}

pub async fn update_record(
    State(state): State<AppState>,
    Path((entity, key)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve(&entity)?;
    let Json(payload) = body?;
    let updated = blocking(&state, move |api| api.update(kind, &key, payload)).await?;
    Ok(Json(updated))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path((entity, key)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve(&entity)?;
    let confirmation = blocking(&state, move |api| api.delete(kind, &key)).await?;
    Ok(Json(json!({ "message": confirmation.message })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;
    use smsdbapp::store::MemBackend;

    fn state() -> AppState {
        let store: Box<dyn DocumentStore> = Box::new(MemBackend::new());
        AppState::new(Arc::new(SmsdbApi::new(store).unwrap()))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn ussd(cd: &str) -> Value {
        json!({
            "cd": cd,
            "ds": "Balance check",
            "menu_options": ["Check balance"],
            "session_timeout": 60
        })
    }

    async fn create(state: &AppState, entity: &str, payload: Value) -> Response {
        create_record(
            State(state.clone()),
            Path(entity.to_string()),
            Ok(Json(payload)),
        )
        .await
        .into_response()
    }

    #[tokio::test]
    async fn health_endpoint_ok() {
        let Json(body) = healthz().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn create_returns_201_with_storage_id() {
        let state = state();
        let response = create(&state, "ussd-services", ussd("*123*1#")).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["cd"], "*123*1#");
        assert!(body["storage_id"].as_str().is_some_and(|s| !s.is_empty()));
    }

    #[tokio::test]
    async fn duplicate_create_is_409() {
        let state = state();
        create(&state, "ussd-services", ussd("*123*1#")).await;
        let response = create(&state, "ussd-services", ussd("*123*1#")).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["error"], "conflict");
    }

    #[tokio::test]
    async fn invalid_payload_is_422_with_violations() {
        let state = state();
        let response = create(
            &state,
            "otp",
            json!({"user_id": "u-1", "cd": "12345", "expiry_dt": "2025-03-01T09:05:00Z"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "validation");
        assert_eq!(body["violations"][0]["field"], "cd");
    }

    #[tokio::test]
    async fn every_bad_field_is_listed() {
        let state = state();
        let response = create(
            &state,
            "ussd-services",
            json!({"cd": "123#", "menu_options": [], "session_timeout": "sixty"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        let mut fields: Vec<&str> = body["violations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["field"].as_str().unwrap())
            .collect();
        fields.sort();
        assert_eq!(fields, vec!["cd", "ds", "menu_options", "session_timeout"]);
    }

    #[tokio::test]
    async fn read_update_delete_cycle() {
        let state = state();
        create(&state, "ussd-services", ussd("*123#")).await;

        let response = read_record(
            State(state.clone()),
            Path(("ussd-services".to_string(), "*123#".to_string())),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let mut changed = ussd("*123#");
        changed["session_timeout"] = json!(120);
        let response = update_record(
            State(state.clone()),
            Path(("ussd-services".to_string(), "*123#".to_string())),
            Ok(Json(changed)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["session_timeout"], 120);

        let response = delete_record(
            State(state.clone()),
            Path(("ussd-services".to_string(), "*123#".to_string())),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"message": "USSD Service deleted"})
        );

        let response = read_record(
            State(state.clone()),
            Path(("ussd-services".to_string(), "*123#".to_string())),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_entity_is_404() {
        let state = state();
        let response = create(&state, "coupons", json!({})).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "unknown_entity");
    }

    #[tokio::test]
    async fn unsupported_operation_is_405() {
        let state = state();
        let response = read_record(
            State(state.clone()),
            Path(("payment".to_string(), "pay-1".to_string())),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn payment_amount_rules() {
        let state = state();
        let mut payment = json!({
            "id": "pay-1",
            "user_id": "u-1",
            "amount": -5.00,
            "currency": "USD",
            "status": "completed"
        });
        let response = create(&state, "payment", payment.clone()).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        payment["amount"] = json!(5.00);
        let response = create(&state, "payment", payment).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
