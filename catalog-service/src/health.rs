//! Health check handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{products::Product, repository::EntityStore, state::AppState};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Readiness check response with dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,

    /// Service name
    pub service: String,

    /// Dependency statuses
    pub dependencies: HashMap<String, DependencyStatus>,
}

/// Individual dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyStatus {
    /// Dependency is healthy
    pub healthy: bool,

    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Liveness probe: 200 whenever the process is serving
pub async fn health<S>(State(state): State<AppState<S>>) -> impl IntoResponse
where
    S: EntityStore<Product>,
{
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: state.config().service.name.clone(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    };

    (StatusCode::OK, Json(response))
}

/// Readiness probe
///
/// Pings the database when one is configured; 503 if it does not answer.
pub async fn readiness<S>(State(state): State<AppState<S>>) -> impl IntoResponse
where
    S: EntityStore<Product>,
{
    #[cfg_attr(not(feature = "postgres"), allow(unused_mut))]
    let mut dependencies = HashMap::new();
    #[cfg_attr(not(feature = "postgres"), allow(unused_mut))]
    let mut all_ready = true;

    #[cfg(feature = "postgres")]
    if let Some(pool) = state.db() {
        let status = match sqlx::query("SELECT 1").execute(&pool).await {
            Ok(_) => DependencyStatus {
                healthy: true,
                message: Some("Connected".to_string()),
            },
            Err(e) => {
                tracing::error!("Database health check failed: {}", e);
                all_ready = false;
                DependencyStatus {
                    healthy: false,
                    message: Some(format!("Connection failed: {}", e)),
                }
            }
        };
        dependencies.insert("database".to_string(), status);
    }

    let response = ReadinessResponse {
        ready: all_ready,
        service: state.config().service.name.clone(),
        dependencies,
    };

    let status = if all_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, repository::MemoryStore};
    use axum::body::to_bytes;

    fn state() -> AppState<MemoryStore<Product>> {
        AppState::new(Config::default(), MemoryStore::new())
    }

    #[tokio::test]
    async fn test_health() {
        let response = health(State(state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status, "healthy");
        assert_eq!(body.service, "catalog-service");
    }

    #[tokio::test]
    async fn test_ready_without_database() {
        let response = readiness(State(state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ReadinessResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.ready);
        assert!(body.dependencies.is_empty());
    }
}
