use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chain::ProviderChain;
use crate::error::FlightError;
use crate::model::SearchResponse;
use crate::query::SearchRequest;

#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<ProviderChain>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<FlightError> for ApiError {
    fn from(err: FlightError) -> Self {
        if err.is_validation() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Internal(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Internal(details) => {
                tracing::error!(%details, "search request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error",
                        "details": details,
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// POST /api/flights
async fn search_flights(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state.chain.resolve(request).await?;
    Ok(Json(response))
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "providers": state.chain.enabled_providers(),
    }))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/api/flights", post(search_flights))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(chain: ProviderChain, addr: SocketAddr) -> Result<(), FlightError> {
    let enabled = chain.enabled_providers().join(", ");
    let app = router(AppState {
        chain: Arc::new(chain),
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| FlightError::Internal(format!("failed to bind {addr}: {e}")))?;
    tracing::info!(%addr, providers = %enabled, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(|e| FlightError::Internal(e.to_string()))
}
