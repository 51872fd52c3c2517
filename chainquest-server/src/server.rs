//! Axum server setup and router configuration.

use crate::api;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, header, request::Parts},
    routing::get,
};
use chainquest_core::config::ServerConfig;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.server.clone());
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api::router())
        .nest("/webhooks", api::webhooks::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS checked against the live `allowed_origins`, so SIGHUP changes apply
/// without rebuilding the router.
fn cors_layer(server: Arc<RwLock<ServerConfig>>) -> CorsLayer {
    let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
        let Ok(config) = server.try_read() else {
            return false;
        };
        config.allowed_origins.is_empty()
            || config
                .allowed_origins
                .iter()
                .any(|allowed| allowed.as_bytes() == origin.as_bytes())
    });
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[derive(Serialize)]
struct KwalaHealth {
    configured: bool,
    workspace: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    kwala: KwalaHealth,
}

/// Liveness plus whether the workflow API is usable.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let kwala = state.config.kwala().await;
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        kwala: KwalaHealth {
            configured: kwala.credentials().is_some(),
            workspace: kwala.workspace_id.clone(),
        },
    })
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{body_json, get};
    use crate::state::test_support::test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_kwala_state() {
        let app = build_router(test_state(vec![]).await);
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["kwala"]["configured"], false);
    }

    #[tokio::test]
    async fn test_api_and_webhooks_are_mounted() {
        let app = build_router(test_state(vec![]).await);
        let types = app
            .clone()
            .oneshot(get("/api/tournaments/types"))
            .await
            .unwrap();
        assert_eq!(types.status(), StatusCode::OK);

        let unsigned = Request::builder()
            .method("POST")
            .uri("/webhooks/evolution")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(unsigned).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cors_follows_allowed_origins() {
        let state = test_state(vec![]).await;
        state.config.server.write().await.allowed_origins =
            vec!["https://game.example".to_string()];
        let app = build_router(state);

        let request = |origin: &str| {
            Request::builder()
                .uri("/health")
                .header("origin", origin)
                .body(Body::empty())
                .unwrap()
        };
        let allowed = app
            .clone()
            .oneshot(request("https://game.example"))
            .await
            .unwrap();
        assert_eq!(
            allowed.headers().get("access-control-allow-origin").unwrap(),
            "https://game.example"
        );
        let denied = app.oneshot(request("https://evil.example")).await.unwrap();
        assert!(denied.headers().get("access-control-allow-origin").is_none());
    }
}
