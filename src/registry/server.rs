use crate::config::Config;
use crate::error::{HookgateError, Result};
use crate::github::client::GitHubClient;
use crate::registry::service::{RegistrationOutcome, Registry};
use crate::registry::store::RegistryStore;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

pub const REPO_ROUTE: &str = "/api/repo";

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub owner: String,
    pub name: String,
}

pub fn build_router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route(REPO_ROUTE, get(list_repos).post(register_repo))
        .with_state(registry)
}

async fn list_repos(State(registry): State<Arc<Registry>>) -> Response {
    Json(registry.store().list().await).into_response()
}

async fn register_repo(
    State(registry): State<Arc<Registry>>,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid input", "details": rejection.body_text()})),
            )
                .into_response();
        }
    };

    match registry.register(&req.owner, &req.name).await {
        RegistrationOutcome::Created(record) => (StatusCode::CREATED, Json(record)).into_response(),
        RegistrationOutcome::Conflict => (
            StatusCode::CONFLICT,
            Json(json!({"error": "Repository already exists in the registry"})),
        )
            .into_response(),
        RegistrationOutcome::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Repository does not exist on GitHub"})),
        )
            .into_response(),
        RegistrationOutcome::Invalid(message) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid input", "details": message})),
        )
            .into_response(),
        RegistrationOutcome::InternalError(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "An error occurred while processing the request"})),
        )
            .into_response(),
    }
}

pub async fn serve(config: &Config) -> Result<()> {
    let client = GitHubClient::new(config.github_token())?;
    let store = RegistryStore::open(&config.store_path)?;
    let registry = Arc::new(Registry::new(Arc::new(client), store));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(
        addr = %config.listen_addr,
        store = %config.store_path.display(),
        "registry listening"
    );

    axum::serve(listener, build_router(registry))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .map_err(HookgateError::Io)
}
