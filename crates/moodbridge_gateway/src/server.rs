use crate::types::{
    ErrorBody, RecommendationQuery, RecommendationsResponse, RecordsResponse, TypeQuery,
};
use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use moodbridge_core::config::RecommendConfig;
use moodbridge_core::{normalize, ContentType, Error};
use moodbridge_selector::Assembler;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state for the gateway server.
#[derive(Clone)]
struct AppState {
    assembler: Arc<Assembler>,
    /// Substituted when a request leaves out `from` / `to`.
    default_source: String,
    default_target: String,
    per_type_limit: usize,
}

/// JSON-over-HTTP surface for the assembler.
///
/// - `GET /health`: liveness
/// - `GET /recommendations`: every requested type for a transition
/// - `GET /recommendations/{type}`: a single type
pub struct GatewayServer {
    state: AppState,
    host: String,
    port: u16,
}

impl GatewayServer {
    pub fn new(assembler: Arc<Assembler>, recommend: &RecommendConfig, host: &str, port: u16) -> Self {
        Self {
            state: AppState {
                assembler,
                default_source: recommend.default_source.clone(),
                default_target: recommend.default_target.clone(),
                per_type_limit: recommend.per_type_limit,
            },
            host: host.to_string(),
            port,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/recommendations", get(recommendations))
            .route("/recommendations/:content_type", get(recommendations_by_type))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.addr();
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Gateway failed to bind {}", addr))?;
        tracing::info!("Gateway listening on {}", addr);
        axum::serve(listener, app)
            .await
            .context("Gateway server error")
    }
}

// ============================================================================
// Errors
// ============================================================================

struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::MissingEmotion { .. } | Error::InvalidLimit(_) => StatusCode::BAD_REQUEST,
        Error::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::ProviderTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        Error::ProviderUnavailable { .. } => StatusCode::BAD_GATEWAY,
        Error::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", anyhow::Error::from(self.0));
            let body = ErrorBody {
                error: status
                    .canonical_reason()
                    .unwrap_or("server error")
                    .to_string(),
            };
            return (status, Json(body)).into_response();
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Route handlers
// ============================================================================

async fn health() -> &'static str {
    "ok"
}

fn or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

/// GET /recommendations?from=&to=&type=&limit=
async fn recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let types: Option<Vec<ContentType>> = query
        .type_list()
        .map(|list| list.iter().map(|t| ContentType::new(t)).collect());
    let source = or_default(query.from, &state.default_source);
    let target = or_default(query.to, &state.default_target);
    let limit = query.limit.unwrap_or(state.per_type_limit);

    let pair = normalize(&source, &target)?;
    let results = state
        .assembler
        .recommendations_for_transition(&source, &target, types.as_deref(), limit)
        .await?;

    let empty = results.values().all(Vec::is_empty);
    Ok(Json(RecommendationsResponse {
        source_emotion: pair.source.to_string(),
        target_emotion: pair.target.to_string(),
        transition: pair.key.to_string(),
        results,
        empty,
    }))
}

/// GET /recommendations/{type}?from=&to=&limit=
async fn recommendations_by_type(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
    Query(query): Query<TypeQuery>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let source = or_default(query.from, &state.default_source);
    let target = or_default(query.to, &state.default_target);
    let limit = query.limit.unwrap_or(state.per_type_limit);

    let records = state
        .assembler
        .recommendations_by_type(&ContentType::new(&content_type), &source, &target, limit)
        .await?;
    Ok(Json(RecordsResponse { records }))
}
