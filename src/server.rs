//! The HTTP surface.
//!
//! Every handler is a straight line: validate input, await one external
//! call, render. The one side effect — the leaderboard insert after a valid
//! score — runs as a detached task whose failure is only observable in the
//! operator log, never in the caller's response.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, Method, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};

use crate::advice::{Advisor, validate_prompt};
use crate::auth::{IdentityProvider, Session, SessionTokens};
use crate::consts::LEADERBOARD_SIZE;
use crate::error::AppError;
use crate::events::{Event, EventBus};
use crate::factory::{self, MACHINES, RunConfig, ScoreResult};
use crate::leaderboard::{Leaderboard, NewEntry, format_machine_config};

/// Everything a handler needs, passed explicitly — no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<dyn Advisor>,
    pub leaderboard: Arc<dyn Leaderboard>,
    pub identity: Arc<dyn IdentityProvider>,
    pub events: Arc<EventBus>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/advice", post(advice))
        .route("/api/machines", get(machines))
        .route("/api/factory/score", post(score))
        .route("/api/leaderboard", get(leaderboard_top))
        .route("/api/session", get(session))
        .route("/api/auth/signin", post(signin))
        .route("/api/auth/callback", post(auth_callback))
        .route("/api/auth/signout", post(signout))
        .layer(cors)
        .with_state(state)
}

/// The bearer token from an Authorization header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn resolve_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Session>, AppError> {
    match bearer_token(headers) {
        Some(token) => state.identity.current_session(token).await,
        None => Ok(None),
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Deserialize)]
struct AdviceRequest {
    #[serde(default)]
    prompt: String,
}

#[derive(Serialize)]
struct AdviceResponse {
    response: String,
}

async fn advice(
    State(state): State<AppState>,
    Json(req): Json<AdviceRequest>,
) -> Result<Json<AdviceResponse>, AppError> {
    let prompt = validate_prompt(&req.prompt)?;
    let response = state.advisor.advise(prompt).await?;
    Ok(Json(AdviceResponse { response }))
}

#[derive(Serialize)]
struct MachineInfo {
    id: &'static str,
    name: &'static str,
    protein: u64,
    electricity: u64,
    /// Grams of protein per kW.
    efficiency: f64,
}

async fn machines() -> Json<Vec<MachineInfo>> {
    let table = MACHINES
        .iter()
        .map(|m| MachineInfo {
            id: m.id,
            name: m.name,
            protein: m.protein,
            electricity: m.electricity,
            efficiency: m.efficiency(),
        })
        .collect();
    Json(table)
}

#[derive(Deserialize)]
struct ScoreRequest {
    /// Raw run counts, coerced server-side: negatives and non-numeric
    /// values become 0.
    #[serde(default)]
    runs: BTreeMap<String, Value>,
}

async fn score(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<ScoreResult>, AppError> {
    // Only attributable attempts reach the leaderboard.
    let Some(session) = resolve_session(&state, &headers).await? else {
        return Err(AppError::validation(
            "You need to be logged in to submit a score",
        ));
    };

    let config = RunConfig::coerce(&req.runs);
    let result = factory::score(&config);

    if result.valid {
        let entry = NewEntry {
            protein: result.protein,
            energy: result.energy,
            user_id: Some(session.user_id),
            user_name: session.display_name,
            machine_config: config.to_json(),
        };
        let leaderboard = Arc::clone(&state.leaderboard);
        // Fire-and-forget: the caller's result does not wait on the store,
        // and an insert failure is logged rather than surfaced.
        tokio::spawn(async move {
            if let Err(e) = leaderboard.insert(entry).await {
                tracing::error!("leaderboard insert failed: {e}");
            }
        });
    }

    Ok(Json(result))
}

#[derive(Serialize)]
struct LeaderboardRow {
    protein: u64,
    energy: u64,
    user_name: String,
    /// Display-ready configuration, e.g. `A:5, C:2`.
    config: String,
    created_at: Option<String>,
}

#[derive(Serialize)]
struct LeaderboardResponse {
    entries: Vec<LeaderboardRow>,
}

async fn leaderboard_top(
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let entries = state
        .leaderboard
        .top(LEADERBOARD_SIZE)
        .await?
        .into_iter()
        .map(|entry| LeaderboardRow {
            protein: entry.protein,
            energy: entry.energy,
            user_name: entry.user_name,
            config: format_machine_config(&entry.machine_config),
            created_at: entry.created_at,
        })
        .collect();

    Ok(Json(LeaderboardResponse { entries }))
}

#[derive(Serialize)]
struct SessionResponse {
    user: Option<Session>,
}

async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, AppError> {
    let user = resolve_session(&state, &headers).await?;
    Ok(Json(SessionResponse { user }))
}

fn default_provider() -> String {
    "google".to_string()
}

#[derive(Deserialize)]
struct SignInRequest {
    #[serde(default = "default_provider")]
    provider: String,
    redirect_to: String,
}

#[derive(Serialize)]
struct SignInResponse {
    /// Authorize URL for the user to visit.
    url: String,
    /// PKCE verifier the caller must present back at the callback.
    verifier: String,
}

async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Json<SignInResponse> {
    let (url, verifier) = state.identity.sign_in_url(&req.provider, &req.redirect_to);
    Json(SignInResponse { url, verifier })
}

#[derive(Deserialize)]
struct CallbackRequest {
    code: String,
    verifier: String,
}

async fn auth_callback(
    State(state): State<AppState>,
    Json(req): Json<CallbackRequest>,
) -> Result<Json<SessionTokens>, AppError> {
    let tokens = state.identity.exchange_code(&req.code, &req.verifier).await?;
    let session = state.identity.current_session(&tokens.access_token).await?;
    state.events.emit(Event::SessionChanged { session });
    Ok(Json(tokens))
}

#[derive(Serialize)]
struct SignOutResponse {
    signed_out: bool,
}

async fn signout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SignOutResponse>, AppError> {
    let Some(token) = bearer_token(&headers) else {
        return Err(AppError::validation("Missing bearer token"));
    };

    state.identity.sign_out(token).await?;
    state.events.emit(Event::SessionChanged { session: None });
    Ok(Json(SignOutResponse { signed_out: true }))
}
