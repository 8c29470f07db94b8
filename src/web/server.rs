use axum::body::Bytes;
use axum::http::header;
use axum::{
    extract::{DefaultBodyLimit, Path as UrlPath, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::assignment::coverage::CoverageReport;
use crate::assignment::materialize::plan_assignments;
use crate::assignment::reconcile::reconcile;
use crate::assignment::store::{RoomStore, StoreError, Workspace};
use crate::cli::ServeArgs;
use crate::core::participant::Roster;
use crate::core::room::{Room, RoomError};
use crate::core::types::RoomId;
use crate::export::selections_to_string;
use crate::parsing::edits::parse_edits_value;

/// Security configuration constants to prevent `DoS` attacks
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024; // 2MB
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MAX_CONCURRENT_REQUESTS: usize = 100;

/// Shared application state
pub struct AppState {
    pub store: RoomStore,

    /// Where committed changes are saved; `None` keeps them in memory only
    pub workspace_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(workspace: Workspace, workspace_path: Option<PathBuf>) -> Self {
        Self {
            store: RoomStore::new(workspace),
            workspace_path,
        }
    }

    fn persist(&self, workspace: &Workspace) -> Result<(), StoreError> {
        match &self.workspace_path {
            Some(path) => workspace.save_to_file(path),
            None => Ok(()),
        }
    }

    /// Apply `f` as one store transaction and save the result.
    ///
    /// Runs on tokio's blocking pool: the store lock is synchronous and the
    /// save is a file write, so neither may stall an async worker.
    async fn commit<T, F>(self: &Arc<Self>, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Workspace) -> Result<T, ApiError> + Send + 'static,
    {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            state.store.transaction(|ws| {
                let value = f(ws)?;
                state.persist(ws)?;
                Ok::<_, ApiError>(value)
            })
        })
        .await
        .map_err(ApiError::Task)?
    }
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None, // Never expose internal details to prevent information disclosure
    }
}

/// Failures a handler can report
#[derive(Debug)]
enum ApiError {
    Store(StoreError),
    Room(RoomError),
    Export(csv::Error),
    Task(tokio::task::JoinError),
    BadRequest {
        error_type: &'static str,
        message: String,
    },
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<RoomError> for ApiError {
    fn from(e: RoomError) -> Self {
        Self::Room(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Store(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                create_safe_error_response(
                    "storage_error",
                    "The workspace could not be updated. No changes were applied.",
                    Some(&e.to_string()),
                ),
            ),
            Self::Export(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                create_safe_error_response(
                    "export_failed",
                    "Selections could not be exported.",
                    Some(&e.to_string()),
                ),
            ),
            Self::Task(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                create_safe_error_response(
                    "internal_error",
                    "The request could not be completed. No changes were applied.",
                    Some(&e.to_string()),
                ),
            ),
            Self::Room(e @ RoomError::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                create_safe_error_response("room_not_found", &e.to_string(), None),
            ),
            Self::Room(e @ RoomError::Finalized(_)) => (
                StatusCode::CONFLICT,
                create_safe_error_response("room_finalized", &e.to_string(), None),
            ),
            Self::BadRequest {
                error_type,
                message,
            } => (
                StatusCode::BAD_REQUEST,
                create_safe_error_response(error_type, &message, None),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the workspace cannot be loaded, the tokio runtime
/// cannot be created, or the server fails to start.
pub fn run(args: ServeArgs, workspace_path: &Path) -> anyhow::Result<()> {
    let workspace = Workspace::load_or_default(workspace_path)?;
    tracing::info!(
        "Serving workspace {} ({} participants, {} rooms)",
        workspace_path.display(),
        workspace.roster.len(),
        workspace.layout.len()
    );

    let state = Arc::new(AppState::new(workspace, Some(workspace_path.to_path_buf())));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args, state).await })
}

/// Create the application router with all routes and middleware configured.
///
/// Rate limiting is added by the server itself, since it keys on the peer
/// address of a real connection.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/participants", get(participants_handler))
        .route("/api/selections", get(selections_handler))
        .route("/api/selections/export", get(export_handler))
        .route("/api/rooms", get(rooms_handler))
        .route("/api/rooms/arrange", post(arrange_handler))
        .route("/api/rooms/{id}", delete(delete_room_handler))
        .route("/api/rooms/{id}/finalize", post(finalize_handler))
        .route("/api/rooms/{id}/unfinalize", post(unfinalize_handler))
        .route("/api/assignments/generate", post(generate_handler))
        .route("/api/assignments/validate", get(validate_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("cache-control"),
                    HeaderValue::from_static("no-store"),
                ))
                // Request timeout to prevent slow client attacks
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(REQUEST_TIMEOUT_SECS),
                ))
                // Limit concurrent requests to prevent DOS
                .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
}

async fn run_server(args: ServeArgs, state: Arc<AppState>) -> anyhow::Result<()> {
    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?;

    let app = create_router(state).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    });

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting room-solver API at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}/api/rooms"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn participants_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body = state.store.read(|ws| {
        serde_json::json!({
            "count": ws.roster.len(),
            "participants": ws.roster.iter().collect::<Vec<_>>(),
        })
    })?;
    Ok(Json(body))
}

/// Active verified selections, one per participant
async fn selections_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body = state.store.read(|ws| {
        let active = ws.active_selections();
        serde_json::json!({
            "count": active.len(),
            "submissions": ws.selections.len(),
            "selections": active,
        })
    })?;
    Ok(Json(body))
}

#[derive(Deserialize)]
struct ExportParams {
    format: Option<String>,
}

async fn export_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let (delimiter, content_type, extension) = match params.format.as_deref() {
        None | Some("csv") => (b',', "text/csv; charset=utf-8", "csv"),
        Some("tsv") => (b'\t', "text/tab-separated-values; charset=utf-8", "tsv"),
        Some(other) => {
            return Err(ApiError::BadRequest {
                error_type: "invalid_format",
                message: format!("Unsupported export format '{other}'. Use csv or tsv."),
            })
        }
    };

    let body = state
        .store
        .read(|ws| selections_to_string(ws, delimiter))?
        .map_err(ApiError::Export)?;

    let disposition = format!("attachment; filename=\"selections.{extension}\"");
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Room as shown to clients, with member display names resolved
#[derive(Serialize)]
struct RoomView {
    id: RoomId,
    name: String,
    finalized: bool,
    members: Vec<MemberView>,
}

#[derive(Serialize)]
struct MemberView {
    id: String,
    name: String,
}

impl RoomView {
    fn new(room: &Room, roster: &Roster) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            finalized: room.finalized,
            members: room
                .members
                .iter()
                .map(|m| MemberView {
                    id: m.to_string(),
                    name: roster.display_name(m),
                })
                .collect(),
        }
    }
}

fn room_views(ws: &Workspace) -> Vec<RoomView> {
    ws.layout
        .rooms
        .iter()
        .map(|r| RoomView::new(r, &ws.roster))
        .collect()
}

async fn rooms_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body = state.store.read(|ws| {
        serde_json::json!({
            "count": ws.layout.len(),
            "rooms": room_views(ws),
        })
    })?;
    Ok(Json(body))
}

#[derive(Deserialize)]
struct GenerateParams {
    #[serde(default)]
    dry_run: bool,
}

/// Run the engine and replace every non-finalized room with the result
async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let plan = if params.dry_run {
        state.store.read(plan_assignments)?
    } else {
        state
            .commit(|ws| {
                let plan = plan_assignments(ws);
                ws.layout = plan.layout.clone();
                Ok(plan)
            })
            .await?
    };

    let rooms = state.store.read(|ws| {
        plan.layout
            .rooms
            .iter()
            .map(|r| RoomView::new(r, &ws.roster))
            .collect::<Vec<_>>()
    })?;

    Ok(Json(serde_json::json!({
        "dry_run": params.dry_run,
        "rooms": rooms,
        "summary": {
            "room_count": plan.summary.room_count,
            "full_rooms": plan.summary.full_rooms,
            "partial_rooms": plan.summary.partial_rooms,
            "mutual_triads": plan.summary.mutual_triads,
            "first_choice_rate": plan.summary.first_choice_rate(),
            "unmatched": plan.summary.unmatched,
        },
        "locked": plan.locked,
        "unplaceable": plan.unplaceable,
    })))
}

async fn validate_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CoverageReport>, ApiError> {
    Ok(Json(state.store.read(Workspace::coverage)?))
}

/// Apply a batch of manual room edits
async fn arrange_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| ApiError::BadRequest {
            error_type: "invalid_json",
            message: "Request body is not valid JSON".to_string(),
        })?;

    let edits = parse_edits_value(value).map_err(|e| ApiError::BadRequest {
        error_type: "invalid_edits",
        message: e.to_string(),
    })?;

    let (report, rooms) = state
        .commit(move |ws| {
            let result = reconcile(&ws.layout, &edits, &ws.roster);
            ws.layout = result.layout;
            Ok((result.report, room_views(ws)))
        })
        .await?;

    Ok(Json(serde_json::json!({
        "report": report,
        "rooms": rooms,
    })))
}

async fn finalize_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<RoomView>, ApiError> {
    set_finalized(&state, RoomId::new(id), true).await
}

async fn unfinalize_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<RoomView>, ApiError> {
    set_finalized(&state, RoomId::new(id), false).await
}

async fn set_finalized(
    state: &Arc<AppState>,
    id: RoomId,
    finalized: bool,
) -> Result<Json<RoomView>, ApiError> {
    let view = state
        .commit(move |ws| {
            ws.layout.set_finalized(&id, finalized)?;
            let room = ws.layout.get(&id).ok_or_else(|| RoomError::NotFound(id.clone()))?;
            Ok(RoomView::new(room, &ws.roster))
        })
        .await?;
    Ok(Json(view))
}

async fn delete_room_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = RoomId::new(id);
    let room = state
        .commit(move |ws| Ok(ws.layout.delete_room(&id)?))
        .await?;

    Ok(Json(serde_json::json!({
        "deleted": room.id,
        "name": room.name,
        "unassigned": room.members,
    })))
}
