//! HTTP handlers for the session and roster endpoints

use crate::api::error::{json_body, ApiError};
use crate::error::TableMatcherError;
use crate::service::{HealthCheck, HealthStatus, TableMatcherService};
use crate::types::{deserialize_player_id, MatchResult, Player, PlayerId, SessionSnapshot};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

type AppState = State<Arc<TableMatcherService>>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartSessionRequest {
    pub table_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AddPlayerRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TogglePlayerRequest {
    #[serde(deserialize_with = "deserialize_player_id")]
    pub id: PlayerId,
}

/// Service information
pub async fn root(State(service): AppState) -> impl IntoResponse {
    Json(json!({
        "service": service.name(),
        "version": crate::VERSION,
        "endpoints": [
            "/api/session",
            "/api/session/start",
            "/api/session/end",
            "/api/session/record",
            "/api/players",
            "/api/players/toggle",
            "/health",
            "/metrics"
        ]
    }))
}

pub async fn get_session(State(service): AppState) -> Json<SessionSnapshot> {
    Json(service.session_state().await)
}

/// Start a session. The body is optional; without `tableCount` the configured
/// default is used.
pub async fn start_session(
    State(service): AppState,
    body: Bytes,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let request: StartSessionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StartSessionRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| TableMatcherError::InvalidRequest {
            reason: e.to_string(),
        })?
    };

    Ok(Json(service.start_session(request.table_count).await?))
}

pub async fn end_session(State(service): AppState) -> Json<Value> {
    service.end_session().await;
    Json(json!({ "message": "Session ended" }))
}

pub async fn record_result(
    State(service): AppState,
    payload: Result<Json<MatchResult>, JsonRejection>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let result = json_body(payload)?;
    Ok(Json(service.record_result(result).await?))
}

pub async fn list_players(State(service): AppState) -> Result<Json<Vec<Player>>, ApiError> {
    Ok(Json(service.list_players().await?))
}

pub async fn add_player(
    State(service): AppState,
    payload: Result<Json<AddPlayerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    let request = json_body(payload)?;
    let player = service.add_player(&request.name).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

pub async fn delete_player(
    State(service): AppState,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<Value>, ApiError> {
    service.delete_player(&player_id).await?;
    Ok(Json(json!({ "message": "Player deleted" })))
}

pub async fn toggle_player(
    State(service): AppState,
    payload: Result<Json<TogglePlayerRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(payload)?;
    let player = service.toggle_player(&request.id).await?;
    Ok(Json(json!({
        "message": format!(
            "{} is now {}",
            player.name,
            if player.active { "active" } else { "inactive" }
        )
    })))
}

pub async fn health(State(service): AppState) -> impl IntoResponse {
    debug!("Health check requested");

    let health = HealthCheck::check(&service).await;
    let status = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status,
        Json(json!({
            "status": health.status,
            "service": health.service,
            "version": health.version
        })),
    )
}

/// Prometheus text exposition
pub async fn metrics(State(service): AppState) -> Response {
    let metric_families = service.metrics().registry().gather();
    let encoder = TextEncoder::new();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            debug!("Serving {} metric families", metric_families.len());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, encoder.format_type().to_string())],
                buffer,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}
