//! HTTP API for the ledger
//!
//! `GET /` returns the whole chain and `POST /` appends a value. The remaining
//! endpoints expose single blocks, a chain audit, health and request stats.

use axum::{
    extract::{Path, Request, State},
    http::{self, header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::error;

use crate::blockchain::{audit_chain, Block};
use crate::error::ChainError;
use crate::ledger::Ledger;
use crate::node::NodeState;

/// State shared by every handler.
#[derive(Clone)]
pub struct ApiNode {
    pub ledger: Ledger,
    // Optional lifecycle state owned by the node, used for health checks and logging
    pub state: Option<Arc<RwLock<NodeState>>>,
    api_stats: Arc<RwLock<ApiStats>>,
}

/// API statistics and monitoring
#[derive(Debug, Default)]
struct ApiStats {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    blocks_appended: u64,
    blocks_rejected: u64,
    start_time: Option<Instant>,
}

impl ApiStats {
    fn new() -> Self {
        ApiStats {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    fn record_request(&mut self, success: bool) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
    }
}

impl ApiNode {
    pub fn new(ledger: Ledger, state: Option<Arc<RwLock<NodeState>>>) -> Self {
        Self {
            ledger,
            state,
            api_stats: Arc::new(RwLock::new(ApiStats::new())),
        }
    }

    pub async fn get_stats(&self) -> ApiStatsResponse {
        let stats = self.api_stats.read().await;
        let uptime = stats.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0);

        ApiStatsResponse {
            total_requests: stats.total_requests,
            successful_requests: stats.successful_requests,
            failed_requests: stats.failed_requests,
            blocks_appended: stats.blocks_appended,
            blocks_rejected: stats.blocks_rejected,
            uptime_seconds: uptime,
            chain_height: self.ledger.height().await as u64,
        }
    }

    async fn record_outcome(&self, accepted: bool) {
        let mut stats = self.api_stats.write().await;
        if accepted {
            stats.blocks_appended += 1;
        } else {
            stats.blocks_rejected += 1;
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be decoded; carries the raw body.
    MalformedBody(String),
    /// The ledger refused the block.
    Rejected(ChainError),
    NotFound(String),
    /// Block construction failed; carries the raw body.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MalformedBody(raw) => (StatusCode::BAD_REQUEST, raw).into_response(),
            ApiError::Internal(raw) => (StatusCode::INTERNAL_SERVER_ERROR, raw).into_response(),
            ApiError::Rejected(e) => respond_with_json(
                StatusCode::CONFLICT,
                &ErrorResponse {
                    error: e.to_string(),
                },
            ),
            ApiError::NotFound(msg) => {
                respond_with_json(StatusCode::NOT_FOUND, &ErrorResponse { error: msg })
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of `POST /`.
///
/// The payload key is `Value` or the legacy `BPM`, matched ASCII
/// case-insensitively. A missing key, a `null` field or a `null` body all
/// decode as 0. Any other body shape, or a non-integer value, is malformed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WriteBlockRequest {
    pub value: i64,
}

impl<'de> Deserialize<'de> for WriteBlockRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let fields = Option::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?;
        let mut request = WriteBlockRequest::default();
        for (key, field) in fields.iter().flatten() {
            if !key.eq_ignore_ascii_case("value") && !key.eq_ignore_ascii_case("bpm") {
                continue;
            }
            if field.is_null() {
                continue;
            }
            request.value = field
                .as_i64()
                .ok_or_else(|| D::Error::custom(format!("{} must be an integer, got {}", key, field)))?;
        }
        Ok(request)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiStatsResponse {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub blocks_appended: u64,
    pub blocks_rejected: u64,
    pub uptime_seconds: u64,
    pub chain_height: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub ok: bool,
    pub height: u64,
    pub errors: Vec<String>,
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Pretty-printed JSON response with the given status.
fn respond_with_json<T: Serialize>(status: StatusCode, payload: &T) -> Response {
    match serde_json::to_string_pretty(payload) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "HTTP 500: Internal Server Error",
            )
                .into_response()
        }
    }
}

/// Map a ledger error from an append to the API error the caller sees.
/// Construction failures are internal; everything else is a rejection.
fn append_error(err: ChainError, raw_body: String) -> ApiError {
    match err {
        ChainError::IndexOverflow => ApiError::Internal(raw_body),
        other => ApiError::Rejected(other),
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Request statistics middleware
async fn stats_middleware(State(node): State<Arc<ApiNode>>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let success = response.status().is_success();
    let mut stats = node.api_stats.write().await;
    stats.record_request(success);

    response
}

/// Detailed request logging middleware. Logs method, path, status, duration
/// and current `NodeState` (when available).
async fn logging_middleware(
    State(node): State<Arc<ApiNode>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    let node_state = if let Some(s) = &node.state {
        format!("{:?}", *s.read().await)
    } else {
        "unknown".to_string()
    };

    tracing::info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        node_state = %node_state,
        "api.request"
    );

    response
}

// ============================================================================
// Router
// ============================================================================

/// Build the API router with all endpoints.
pub fn build_api_router(node: Arc<ApiNode>, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/", get(get_blockchain).post(write_block))
        .route("/block", post(submit_block))
        .route("/block/:index", get(get_block_by_index))
        .route("/validate", get(validate_chain))
        .route("/health", get(health_check))
        .route("/stats", get(get_api_stats))
        // logging before stats so we always record timing and node-state
        .layer(middleware::from_fn_with_state(node.clone(), logging_middleware))
        .layer(middleware::from_fn_with_state(
            node.clone(),
            stats_middleware,
        ))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .with_state(node)
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn get_blockchain(State(node): State<Arc<ApiNode>>) -> Response {
    let blocks = node.ledger.snapshot().await;
    respond_with_json(StatusCode::OK, &blocks)
}

async fn write_block(State(node): State<Arc<ApiNode>>, body: String) -> Result<Response, ApiError> {
    let request: WriteBlockRequest =
        serde_json::from_str(&body).map_err(|_| ApiError::MalformedBody(body.clone()))?;

    match node.ledger.append_value(request.value).await {
        Ok(block) => {
            node.record_outcome(true).await;
            Ok(respond_with_json(StatusCode::CREATED, &block))
        }
        Err(e) => {
            node.record_outcome(false).await;
            Err(append_error(e, body))
        }
    }
}

async fn submit_block(
    State(node): State<Arc<ApiNode>>,
    body: String,
) -> Result<Response, ApiError> {
    let block: Block =
        serde_json::from_str(&body).map_err(|_| ApiError::MalformedBody(body.clone()))?;

    match node.ledger.submit_block(block).await {
        Ok(block) => {
            node.record_outcome(true).await;
            Ok(respond_with_json(StatusCode::CREATED, &block))
        }
        Err(e) => {
            node.record_outcome(false).await;
            Err(ApiError::Rejected(e))
        }
    }
}

async fn get_block_by_index(
    State(node): State<Arc<ApiNode>>,
    Path(index): Path<u64>,
) -> Result<Response, ApiError> {
    node.ledger
        .get_block(index)
        .await
        .map(|block| respond_with_json(StatusCode::OK, &block))
        .ok_or_else(|| ApiError::NotFound(format!("Block at index {} not found", index)))
}

async fn validate_chain(State(node): State<Arc<ApiNode>>) -> Response {
    let blocks = node.ledger.snapshot().await;
    let errors = audit_chain(&blocks);
    respond_with_json(
        StatusCode::OK,
        &ValidateResponse {
            ok: errors.is_empty(),
            height: blocks.len() as u64,
            errors,
        },
    )
}

async fn health_check(State(node): State<Arc<ApiNode>>) -> Response {
    let height = node.ledger.height().await;
    let timestamp = chrono::Utc::now().to_rfc3339();

    // Without a lifecycle state the API is assumed healthy
    let Some(s) = &node.state else {
        return respond_with_json(
            StatusCode::OK,
            &serde_json::json!({
                "status": "healthy",
                "height": height,
                "timestamp": timestamp
            }),
        );
    };

    let state = *s.read().await;
    let (status, label) = match state {
        NodeState::Ready => (StatusCode::OK, "healthy"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };
    respond_with_json(
        status,
        &serde_json::json!({
            "status": label,
            "node_state": format!("{:?}", state),
            "height": height,
            "timestamp": timestamp
        }),
    )
}

async fn get_api_stats(State(node): State<Arc<ApiNode>>) -> Response {
    let stats = node.get_stats().await;
    respond_with_json(StatusCode::OK, &stats)
}
