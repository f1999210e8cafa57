use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::{AppState, SharedState, api_router};
use crate::git::GitActivity;
use crate::workspace::Workspace;

/// Configuration for the board server.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workspace_dir: PathBuf,
}

/// Build the application router.
///
/// CORS is permissive unconditionally: the rendering layer is served
/// from elsewhere and every response must allow cross-origin access.
pub fn build_router(state: SharedState) -> Router {
    api_router().layer(CorsLayer::permissive()).with_state(state)
}

/// Start the board server and block until shutdown.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState {
        workspace: Arc::new(Workspace::new(&config.workspace_dir)),
        git: GitActivity::new(&config.workspace_dir),
    });

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    info!(
        addr = %local_addr,
        workspace = %config.workspace_dir.display(),
        "taskdeck serving"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_router(dir: &TempDir) -> Router {
        let state = Arc::new(AppState {
            workspace: Arc::new(Workspace::new(dir.path())),
            git: GitActivity::new(dir.path()),
        });
        build_router(state)
    }

    #[tokio::test]
    async fn health_via_full_router() {
        let dir = TempDir::new().unwrap();
        let app = test_router(&dir);
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn responses_allow_cross_origin() {
        let dir = TempDir::new().unwrap();
        let app = test_router(&dir);
        let req = Request::builder()
            .uri("/api/projects")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[tokio::test]
    async fn fresh_workspace_lists_no_projects() {
        let dir = TempDir::new().unwrap();
        let app = test_router(&dir);
        let req = Request::builder()
            .uri("/api/projects")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["projects"], serde_json::json!([]));
        assert_eq!(body["archived"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let dir = TempDir::new().unwrap();
        let app = test_router(&dir);
        let req = Request::builder()
            .uri("/api/nope")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
