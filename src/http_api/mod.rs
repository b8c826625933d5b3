use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    AllocationPlan, PersistenceError, PlanningSession, PricingError, Quote, RateConfig, ScopeInfo,
    SimulationRequest, SprintLogEntry, TaskCatalog, TaskModifiers, render_proposal_markdown,
    simulate, simulation_menu, write_log_csv,
};

type SharedSession = Arc<Mutex<PlanningSession>>;

/// Live sessions a server holds before `POST /sessions` is refused.
pub const MAX_SESSIONS: usize = 1024;

/// Shared router state. Every session owns its own lock; the catalog is read-only.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<TaskCatalog>,
    sessions: Arc<RwLock<HashMap<u64, SharedSession>>>,
    next_id: Arc<AtomicU64>,
    max_sessions: usize,
}

impl AppState {
    pub fn new(catalog: TaskCatalog) -> Self {
        Self::with_max_sessions(catalog, MAX_SESSIONS)
    }

    pub fn with_max_sessions(catalog: TaskCatalog, max_sessions: usize) -> Self {
        Self {
            catalog: Arc::new(catalog),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            max_sessions,
        }
    }

    fn create_session(&self, session: PlanningSession) -> Result<u64, ApiError> {
        let mut sessions = self.sessions.write();
        if sessions.len() >= self.max_sessions {
            return Err(ApiError::unavailable(format!(
                "session limit of {} reached; delete an existing session first",
                self.max_sessions
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        sessions.insert(id, Arc::new(Mutex::new(session)));
        Ok(id)
    }

    fn remove_session(&self, id: u64) -> Result<SharedSession, ApiError> {
        self.sessions
            .write()
            .remove(&id)
            .ok_or_else(|| ApiError::not_found(format!("session {id} not found")))
    }

    fn session(&self, id: u64) -> Result<SharedSession, ApiError> {
        self.sessions
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("session {id} not found")))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Unavailable(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn unavailable(message: impl Into<String>) -> Self {
        ApiError::Unavailable(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<PricingError> for ApiError {
    fn from(value: PricingError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        ApiError::internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Unavailable(message) => {
                (StatusCode::SERVICE_UNAVAILABLE, "session_limit", message)
            }
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct CreateSessionPayload {
    #[serde(default)]
    scope: Option<ScopeInfo>,
    #[serde(default)]
    rates: Option<RateConfig>,
}

#[derive(Debug, Serialize)]
struct SessionCreated {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct QuotePayload {
    task: String,
    #[serde(default)]
    modifiers: TaskModifiers,
}

#[derive(Debug, Deserialize)]
struct SimulatePayload {
    #[serde(default)]
    total_units: Option<f64>,
    #[serde(default)]
    periods: Option<u32>,
    #[serde(default)]
    theme: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/catalog", get(get_catalog))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/rates", get(get_rates).put(update_rates))
        .route("/sessions/:id/scope", get(get_scope).put(update_scope))
        .route("/sessions/:id/quote", post(quote_task))
        .route("/sessions/:id/log", get(get_log).post(append_log))
        .route("/sessions/:id/log/:position", delete(remove_log_entry))
        .route("/sessions/:id/simulate", post(simulate_session))
        .route("/sessions/:id/export/csv", get(export_csv))
        .route("/sessions/:id/export/markdown", get(export_markdown))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, catalog: TaskCatalog) -> std::io::Result<()> {
    let app = router(AppState::new(catalog));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "unit-pricing HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_catalog(State(state): State<AppState>) -> Json<TaskCatalog> {
    Json(state.catalog.as_ref().clone())
}

async fn create_session(
    State(state): State<AppState>,
    payload: Option<Json<CreateSessionPayload>>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let rates = payload.rates.unwrap_or_default();
    rates.validate()?;
    let scope = payload.scope.unwrap_or_default();
    scope.validate()?;
    let id = state.create_session(PlanningSession::new(scope, rates))?;
    info!(session = id, "created planning session");
    Ok((StatusCode::CREATED, Json(SessionCreated { id })))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PlanningSession>, ApiError> {
    let session = state.session(id)?;
    let snapshot = session.lock().clone();
    Ok(Json(snapshot))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state.remove_session(id)?;
    info!(session = id, "deleted planning session");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_rates(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<RateConfig>, ApiError> {
    let session = state.session(id)?;
    let rates = session.lock().rates.clone();
    Ok(Json(rates))
}

async fn update_rates(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(rates): Json<RateConfig>,
) -> Result<Json<RateConfig>, ApiError> {
    rates.validate()?;
    let session = state.session(id)?;
    session.lock().rates = rates.clone();
    Ok(Json(rates))
}

async fn get_scope(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ScopeInfo>, ApiError> {
    let session = state.session(id)?;
    let scope = session.lock().scope.clone();
    Ok(Json(scope))
}

async fn update_scope(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(scope): Json<ScopeInfo>,
) -> Result<Json<ScopeInfo>, ApiError> {
    scope.validate()?;
    let session = state.session(id)?;
    session.lock().scope = scope.clone();
    Ok(Json(scope))
}

async fn quote_task(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<QuotePayload>,
) -> Result<Json<Quote>, ApiError> {
    let session = state.session(id)?;
    let quote = {
        let guard = session.lock();
        guard.quote(&state.catalog, &payload.task, &payload.modifiers)?
    };
    Ok(Json(quote))
}

async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<SprintLogEntry>>, ApiError> {
    let session = state.session(id)?;
    let entries = session.lock().log.entries().to_vec();
    Ok(Json(entries))
}

/// Quotes the task against the session rates and commits it to the log.
async fn append_log(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<QuotePayload>,
) -> Result<(StatusCode, Json<SprintLogEntry>), ApiError> {
    let session = state.session(id)?;
    let entry = {
        let mut guard = session.lock();
        let quote = guard.quote(&state.catalog, &payload.task, &payload.modifiers)?;
        guard.add_to_log(&quote).clone()
    };
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn remove_log_entry(
    State(state): State<AppState>,
    Path((id, position)): Path<(u64, usize)>,
) -> Result<Json<SprintLogEntry>, ApiError> {
    let session = state.session(id)?;
    let removed = {
        let mut guard = session.lock();
        if position >= guard.log.len() {
            return Err(ApiError::not_found(format!(
                "log position {position} not found"
            )));
        }
        guard.remove_from_log(position)?
    };
    Ok(Json(removed))
}

async fn simulate_session(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Option<Json<SimulatePayload>>,
) -> Result<Json<AllocationPlan>, ApiError> {
    let session = state.session(id)?;
    let (rates, scope) = {
        let guard = session.lock();
        (guard.rates.clone(), guard.scope.clone())
    };
    let overrides = payload.map(|Json(p)| p);
    let total_units = overrides
        .as_ref()
        .and_then(|p| p.total_units)
        .or(scope.total_units)
        .ok_or_else(|| ApiError::invalid("total_units is required when the scope has no budget"))?;
    let periods = overrides
        .as_ref()
        .and_then(|p| p.periods)
        .unwrap_or(scope.periods);
    let theme = overrides.and_then(|p| p.theme).or(scope.theme);

    let mut request = SimulationRequest::new(total_units, periods);
    request.theme = theme;
    let menu = simulation_menu(&state.catalog, &rates)?;
    let plan = simulate(&menu, &request)?;
    Ok(Json(plan))
}

async fn export_csv(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, ApiError> {
    let session = state.session(id)?;
    let log = session.lock().log.clone();
    let mut buffer = Vec::new();
    write_log_csv(&log, &mut buffer)?;
    let body = String::from_utf8(buffer).map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body).into_response())
}

async fn export_markdown(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, ApiError> {
    let session = state.session(id)?;
    let markdown = {
        let guard = session.lock();
        render_proposal_markdown(&guard)
    };
    Ok(([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], markdown).into_response())
}
