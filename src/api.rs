//! REST API server for the arcade
//!
//! Hosts game sessions for the browser, the currency converter, the
//! dashboards and the desktop game launcher.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::currency::{CurrencyConverter, CURRENCIES};
use crate::dashboard;
use crate::error::ArcadeError;
use crate::games::HuntConfig;
use crate::launcher::{GameLauncher, LaunchRequest, LaunchResponse};
use crate::sessions::{GameCommand, SessionStore};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub amount: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateHuntRequest {
    pub seed: Option<u64>,
    pub profile: Option<String>,
    #[serde(default)]
    pub config: Option<HuntConfig>,
}

#[derive(Debug, Deserialize)]
pub struct CreateChoreRequest {
    pub profile: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiReply = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiReply {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

fn fail(err: ArcadeError) -> ApiReply {
    let status = status_for(&err);
    if status.is_server_error() {
        warn!(error = %err, "Request failed");
    }
    (status, Json(ApiResponse::error(err.to_string())))
}

/// HTTP status for an error surfaced by a handler.
pub fn status_for(err: &ArcadeError) -> StatusCode {
    match err {
        ArcadeError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        ArcadeError::InvalidTransition { .. }
        | ArcadeError::InvalidConfig(_)
        | ArcadeError::InvalidOption(_)
        | ArcadeError::UnknownShopItem(_)
        | ArcadeError::UnknownKey(_)
        | ArcadeError::InvalidAmount(_)
        | ArcadeError::UnsupportedCurrency(_)
        | ArcadeError::UnknownGame(_)
        | ArcadeError::ProgressError(_)
        | ArcadeError::UuidError(_) => StatusCode::BAD_REQUEST,
        ArcadeError::RateUnavailable { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub sessions: Arc<SessionStore>,
    pub converter: Arc<CurrencyConverter>,
    pub launcher: Arc<GameLauncher>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Game Launcher
/// =============================

async fn launch_game(
    State(state): State<ApiState>,
    body: std::result::Result<Json<LaunchRequest>, JsonRejection>,
) -> (StatusCode, Json<LaunchResponse>) {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(LaunchResponse {
                    success: false,
                    message: format!("Invalid request: {}", rejection.body_text()),
                }),
            )
        }
    };
    info!(game = %req.game, "Received launch request");

    match state.launcher.launch(&req.game).await {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => {
            let status = match e {
                ArcadeError::UnknownGame(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(LaunchResponse {
                    success: false,
                    message: e.to_string(),
                }),
            )
        }
    }
}

/// =============================
/// Currency Endpoints
/// =============================

async fn convert(State(state): State<ApiState>, Query(q): Query<ConvertQuery>) -> ApiReply {
    let amount = q.amount.unwrap_or_default();
    match state.converter.convert(&q.from, &q.to, &amount).await {
        Ok(conversion) => ok(conversion),
        Err(e) => fail(e),
    }
}

async fn currencies() -> ApiReply {
    ok(CURRENCIES)
}

/// =============================
/// Dashboards
/// =============================

async fn budget_dashboard() -> ApiReply {
    ok(dashboard::budget_summary(dashboard::BUDGET_CATEGORIES))
}

async fn expense_dashboard() -> ApiReply {
    ok(dashboard::expense_summary(
        dashboard::TRANSACTIONS,
        dashboard::SPENDING_PATTERNS,
        dashboard::IRREGULAR_INCOME,
    ))
}

async fn health_dashboard() -> ApiReply {
    ok(dashboard::health_report(dashboard::HEALTH_METRICS))
}

/// =============================
/// Game Sessions
/// =============================

async fn create_treasure_hunt(
    State(state): State<ApiState>,
    body: Option<Json<CreateHuntRequest>>,
) -> ApiReply {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let config = req.config.unwrap_or_default();

    match state
        .sessions
        .create_treasure_hunt(config, req.seed, req.profile)
        .await
    {
        Ok((id, view)) => ok(serde_json::json!({ "session_id": id, "view": view })),
        Err(e) => fail(e),
    }
}

async fn create_chore_adventure(
    State(state): State<ApiState>,
    Json(req): Json<CreateChoreRequest>,
) -> ApiReply {
    match state.sessions.create_chore_adventure(&req.profile).await {
        Ok((id, view)) => ok(serde_json::json!({ "session_id": id, "view": view })),
        Err(e) => fail(e),
    }
}

async fn get_game(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiReply {
    match state.sessions.view(id).await {
        Ok(view) => ok(view),
        Err(e) => fail(e),
    }
}

async fn game_command(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    body: std::result::Result<Json<GameCommand>, JsonRejection>,
) -> ApiReply {
    let command = match body {
        Ok(Json(command)) => command,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!(
                    "Invalid command: {}",
                    rejection.body_text()
                ))),
            )
        }
    };

    match state.sessions.apply(id, command).await {
        Ok(reply) => ok(reply),
        Err(e) => fail(e),
    }
}

async fn end_game(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiReply {
    match state.sessions.remove(id).await {
        Ok(()) => ok(serde_json::json!({ "session_id": id })),
        Err(e) => fail(e),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/launch-game", post(launch_game))
        .route("/api/convert", get(convert))
        .route("/api/currencies", get(currencies))
        .route("/api/dashboard/budget", get(budget_dashboard))
        .route("/api/dashboard/expenses", get(expense_dashboard))
        .route("/api/dashboard/health", get(health_dashboard))
        .route("/api/games/treasure-hunt", post(create_treasure_hunt))
        .route("/api/games/chore-adventure", post(create_chore_adventure))
        .route("/api/games/:id", get(get_game).delete(end_game))
        .route("/api/games/:id/commands", post(game_command))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
