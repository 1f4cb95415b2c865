//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::components::Primitive;
use crate::core::runtime::{ComponentStatus, EngineHub};
use crate::error::EngineError;
use crate::metrics::Metrics;
use crate::models::{AnalysisResult, MarketBias, MarketRegime, TradeSignal};
use crate::signals::scoring::confidence_label;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub hub: Arc<EngineHub>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "awce-confidence-engine"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

fn engine_status(e: &EngineError) -> StatusCode {
    match e {
        EngineError::UnknownPrimitive(_)
        | EngineError::ComponentNotRegistered(_)
        | EngineError::UnknownSymbol(_) => StatusCode::NOT_FOUND,
        EngineError::NotInitialized | EngineError::NoWeightedComponents => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        EngineError::InvalidThresholds { .. } | EngineError::InvalidWeight { .. } => {
            StatusCode::BAD_REQUEST
        }
    }
}

fn analysis_error(e: &EngineError, symbol: &str) -> StatusCode {
    match e {
        EngineError::UnknownSymbol(_) => warn!(symbol = %symbol, "Analysis requested for untracked symbol"),
        _ => error!(error = %e, symbol = %symbol, "Failed to analyze symbol"),
    }
    engine_status(e)
}

#[derive(Debug, Deserialize)]
struct AnalysisQuery {
    refresh: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SignalQuery {
    min_confidence: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignalResponse {
    pub symbol: String,
    pub signal: TradeSignal,
    pub confidence: f64,
    pub label: String,
    pub bias: MarketBias,
    pub valid: bool,
}

#[derive(Debug, Deserialize)]
struct ScoresRequest {
    scores: HashMap<String, f64>,
    regime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvailabilityRequest {
    available: bool,
}

/// Full analysis for a symbol
async fn get_analysis(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<AnalysisQuery>,
) -> Result<Json<AnalysisResult>, StatusCode> {
    let (result, _) = state
        .hub
        .analyze(&symbol, params.refresh.unwrap_or(false))
        .map_err(|e| analysis_error(&e, &symbol))?;
    Ok(Json(result))
}

/// Signal and its validity against `min_confidence`
async fn get_signal(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<SignalQuery>,
) -> Result<Json<SignalResponse>, StatusCode> {
    let min_confidence = params
        .min_confidence
        .unwrap_or(state.hub.config().min_confidence_for_display);
    let (result, _) = state
        .hub
        .analyze(&symbol, false)
        .map_err(|e| analysis_error(&e, &symbol))?;

    Ok(Json(SignalResponse {
        valid: result.is_signal_valid(min_confidence),
        label: confidence_label(result.total_confidence).to_string(),
        confidence: result.total_confidence,
        signal: result.signal,
        bias: result.bias,
        symbol,
    }))
}

async fn invalidate_cache(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> StatusCode {
    match state.hub.invalidate(&symbol) {
        Ok(_) => StatusCode::NO_CONTENT,
        Err(e) => {
            warn!(error = %e, symbol = %symbol, "Cache invalidation rejected");
            engine_status(&e)
        }
    }
}

/// Accept raw primitive scores pushed by external analyzers
async fn publish_scores(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Json(request): Json<ScoresRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let mut scores = Vec::with_capacity(request.scores.len());
    for (name, value) in &request.scores {
        let primitive: Primitive = name.parse().map_err(|e: EngineError| {
            warn!(symbol = %symbol, name = %name, "Rejected score for unknown primitive");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
        })?;
        scores.push((primitive, *value));
    }
    let regime = match request.regime.as_deref() {
        Some(raw) => Some(raw.parse::<MarketRegime>().map_err(|e| {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e })))
        })?),
        None => None,
    };

    let accepted = scores.len();
    state.hub.publish_scores(&symbol, scores, regime).map_err(|e| {
        warn!(error = %e, symbol = %symbol, "Rejected scores");
        (engine_status(&e), Json(json!({ "error": e.to_string() })))
    })?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "symbol": symbol, "accepted": accepted })),
    ))
}

async fn list_components(State(state): State<AppState>) -> Json<Vec<ComponentStatus>> {
    Json(state.hub.components())
}

async fn set_availability(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Json<Value>, StatusCode> {
    state
        .hub
        .set_availability(&name, request.available)
        .map_err(|e| {
            warn!(error = %e, component = %name, "Availability change rejected");
            engine_status(&e)
        })?;
    Ok(Json(json!({ "name": name, "available": request.available })))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/analysis/{symbol}", get(get_analysis))
        .route("/api/analysis/{symbol}/signal", get(get_signal))
        .route("/api/analysis/{symbol}/cache", delete(invalidate_cache))
        .route("/api/scores/{symbol}", post(publish_scores))
        .route("/api/components", get(list_components))
        .route("/api/components/{name}/availability", put(set_availability))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    port: u16,
    hub: Arc<EngineHub>,
    metrics: Arc<Metrics>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics,
        start_time: Arc::new(Instant::now()),
        hub,
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
