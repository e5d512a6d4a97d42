//! HTTP API for the table matcher
//!
//! JSON endpoints for the session and roster, plus `/health` and the
//! Prometheus `/metrics` exposition, served with Axum.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::service::TableMatcherService;
use anyhow::{Context, Result};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Build the router over a shared service
pub fn router(service: Arc<TableMatcherService>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/session", get(handlers::get_session))
        .route("/api/session/start", post(handlers::start_session))
        .route("/api/session/end", post(handlers::end_session))
        .route("/api/session/record", post(handlers::record_result))
        .route(
            "/api/players",
            get(handlers::list_players).post(handlers::add_player),
        )
        .route("/api/players/toggle", post(handlers::toggle_player))
        .route("/api/players/{id}", delete(handlers::delete_player))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(service)
}

/// HTTP server with broadcast-driven graceful shutdown
pub struct ApiServer {
    addr: String,
    service: Arc<TableMatcherService>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ApiServer {
    pub fn new(addr: impl Into<String>, service: Arc<TableMatcherService>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            addr: addr.into(),
            service,
            shutdown_tx,
        }
    }

    /// Bind and serve until [`ApiServer::stop`] is called
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = self
            .addr
            .parse()
            .with_context(|| format!("Invalid HTTP address {}", self.addr))?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        info!("HTTP API listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        axum::serve(listener, router(self.service.clone()))
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("HTTP API shutdown signal received");
            })
            .await?;

        info!("HTTP API stopped");
        Ok(())
    }

    pub fn stop(&self) {
        info!("Stopping HTTP API...");
        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to HTTP API: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::metrics::MetricsCollector;
    use crate::rating::EloRatingEngine;
    use crate::roster::{InMemoryRosterStore, RosterStore};
    use crate::types::Player;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt; // for oneshot

    fn test_app(count: usize) -> (Router, Arc<InMemoryRosterStore>) {
        let players = (1..=count)
            .map(|i| Player::new(i.to_string(), format!("Player {}", i), 1000))
            .collect();
        let roster = Arc::new(InMemoryRosterStore::with_players(players));
        let service = TableMatcherService::new(
            "table-matcher",
            SessionConfig::default(),
            roster.clone(),
            Arc::new(EloRatingEngine::default()),
            Arc::new(MetricsCollector::new().expect("Failed to create collector")),
        );
        (router(Arc::new(service)), roster)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_session_inactive_by_default() {
        let (app, _) = test_app(2);

        let response = app.oneshot(get("/api/session")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["isActive"], false);
        assert_eq!(body["activeMatches"], json!([]));
        assert_eq!(body["waitingPlayers"], json!([]));
    }

    #[tokio::test]
    async fn test_start_and_record_flow() {
        let (app, roster) = test_app(4);

        let response = app
            .clone()
            .oneshot(post_json("/api/session/start", json!({ "tableCount": 1 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["activeMatches"][0]["id"], "match-1-2");
        assert_eq!(body["activeMatches"][0]["player1"]["name"], "Player 1");
        assert_eq!(body["waitingPlayers"].as_array().unwrap().len(), 2);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/session/record",
                json!({ "winnerId": "2", "loserId": "1", "winnerScore": 2, "loserScore": 0 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["activeMatches"][0]["id"], "match-2-3");

        let stored = roster.find_by_id("2").unwrap().unwrap();
        assert_eq!(stored.rating, 1024);
        assert_eq!(stored.wins, 1);
    }

    #[tokio::test]
    async fn test_start_without_body_uses_default() {
        let (app, _) = test_app(2);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/session/start")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["tableCapacity"], 1);
    }

    #[tokio::test]
    async fn test_start_with_too_few_players() {
        let (app, _) = test_app(1);

        let response = app
            .oneshot(post_json("/api/session/start", json!({ "tableCount": 1 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("at least 2"));
    }

    #[tokio::test]
    async fn test_record_unknown_player() {
        let (app, _) = test_app(2);

        let response = app
            .oneshot(post_json(
                "/api/session/record",
                json!({ "winnerId": "1", "loserId": "99", "winnerScore": 2, "loserScore": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_player_endpoints() {
        let (app, _) = test_app(2);

        let response = app
            .clone()
            .oneshot(post_json("/api/players", json!({ "name": "Dana" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["id"], "3");
        assert_eq!(body["elo"], 1000);
        assert_eq!(body["is_playing"], true);

        let response = app
            .clone()
            .oneshot(post_json("/api/players/toggle", json!({ "id": "3" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Dana is now inactive");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/players/3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/api/players")).await.unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_seated_player_conflicts() {
        let (app, _) = test_app(2);

        app.clone()
            .oneshot(post_json("/api/session/start", json!({ "tableCount": 1 })))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json("/api/players/toggle", json!({ "id": "1" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_health_and_metrics() {
        let (app, _) = test_app(2);

        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "table-matcher");

        let response = app.oneshot(get("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));
    }

    #[tokio::test]
    async fn test_numeric_ids_accepted() {
        let (app, roster) = test_app(4);

        app.clone()
            .oneshot(post_json("/api/session/start", json!({ "tableCount": 1 })))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/session/record",
                json!({ "winnerId": 2, "loserId": 1, "winnerScore": 2, "loserScore": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(roster.find_by_id("2").unwrap().unwrap().wins, 1);

        // Player 4 is still waiting, so it can be toggled off
        let response = app
            .oneshot(post_json("/api/players/toggle", json!({ "id": 4 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!roster.find_by_id("4").unwrap().unwrap().active);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (app, _) = test_app(2);

        let response = app
            .clone()
            .oneshot(post_json("/api/session/record", json!({ "winnerId": "1" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/players")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"name\":"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());

        let response = app
            .oneshot(post_json("/api/players/toggle", json!({ "id": true })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_404_handling() {
        let (app, _) = test_app(0);

        let response = app.oneshot(get("/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
