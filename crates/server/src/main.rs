// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use paddock_api::{
    ApiError, AuditTimelineRequest, AuditTimelineResponse, AuthenticatedActor,
    AuthorizationService, AvailabilityRequest, AvailabilityResponse, BulkAssignRequest,
    BulkAssignResponse, CreateItemRequest, InMemoryStore, ItemResponse, SeedData,
    SetAvailabilityRequest, SetAvailabilityResponse, TransitionRequest, TransitionResponse,
    audit_timeline, build_store, bulk_assign, create_item, get_availability, get_item,
    set_availability, submit_transition,
};
use paddock_audit::Cause;
use paddock_domain::{VenueHours, parse_time};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Paddock Server - HTTP server for the Paddock scheduler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Venue opening time (HH:MM), the start of `always` availability
    #[arg(long, default_value = "08:00")]
    opening: String,

    /// Venue closing time (HH:MM), the end of `always` availability
    #[arg(long, default_value = "20:00")]
    closing: String,

    /// JSON file with providers, resources, reservations, roster and items to load at startup
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Application state shared across handlers.
///
/// The store is held behind an async mutex; each request holds the lock
/// for exactly one API call.
#[derive(Clone)]
struct AppState {
    /// Items, providers, reservations, roster and audit log.
    backend: Arc<Mutex<InMemoryStore>>,
    /// The venue working window.
    venue: VenueHours,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Machine-readable error category.
    kind: String,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error category.
    kind: &'static str,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            kind: self.kind.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let (status, kind): (StatusCode, &'static str) = match &err {
            ApiError::AuthenticationFailed { .. } => {
                (StatusCode::UNAUTHORIZED, "authentication_failed")
            }
            ApiError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "unauthorized"),
            ApiError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "invalid_input"),
            ApiError::ResourceNotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        Self {
            status,
            kind,
            message: err.to_string(),
        }
    }
}

/// Reads the caller identity from the `x-actor-id` and `x-actor-role` headers.
fn authenticate(headers: &HeaderMap) -> Result<AuthenticatedActor, HttpError> {
    let actor_id: &str = header_value(headers, "x-actor-id").unwrap_or_default();
    let role: &str = header_value(headers, "x-actor-role").unwrap_or_default();
    AuthorizationService::authenticate(actor_id, role)
        .map_err(|e| HttpError::from(ApiError::from(e)))
}

/// Reads the request cause from `x-cause-id` and `x-cause-description`.
fn request_cause(headers: &HeaderMap) -> Cause {
    Cause::new(
        header_value(headers, "x-cause-id")
            .unwrap_or("http")
            .to_string(),
        header_value(headers, "x-cause-description")
            .unwrap_or("HTTP request")
            .to_string(),
    )
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Handler for GET `/availability` endpoint.
async fn handle_get_availability(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Query(query): Query<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&headers)?;
    info!(
        actor_id = %actor.id,
        provider_id = %query.provider_id,
        date_from = %query.date_from,
        date_to = %query.date_to,
        "Handling get_availability request"
    );

    let backend = app_state.backend.lock().await;
    let response: AvailabilityResponse =
        get_availability(&*backend, &query, &app_state.venue, OffsetDateTime::now_utc())?;
    drop(backend);

    Ok(Json(response))
}

/// Handler for POST `/items` endpoint.
async fn handle_create_item(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateItemRequest>,
) -> Result<Json<ItemResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&headers)?;
    info!(actor_id = %actor.id, kind = %req.kind, "Handling create_item request");

    let mut backend = app_state.backend.lock().await;
    let response: ItemResponse = create_item(
        &mut *backend,
        &req,
        &actor,
        request_cause(&headers),
        OffsetDateTime::now_utc(),
    )?;
    drop(backend);

    Ok(Json(response))
}

/// Handler for GET `/items/{item_id}` endpoint.
async fn handle_get_item(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    UrlPath(item_id): UrlPath<i64>,
) -> Result<Json<ItemResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&headers)?;
    info!(actor_id = %actor.id, item_id, "Handling get_item request");

    let backend = app_state.backend.lock().await;
    let response: ItemResponse = get_item(&*backend, item_id)?;
    drop(backend);

    Ok(Json(response))
}

/// Handler for POST `/items/{item_id}/transitions` endpoint.
async fn handle_submit_transition(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    UrlPath(item_id): UrlPath<i64>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<TransitionResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&headers)?;
    info!(actor_id = %actor.id, item_id, "Handling submit_transition request");

    let mut backend = app_state.backend.lock().await;
    let response: TransitionResponse = submit_transition(
        &mut *backend,
        item_id,
        &req,
        &actor,
        request_cause(&headers),
        &app_state.venue,
        OffsetDateTime::now_utc(),
    )?;
    drop(backend);

    Ok(Json(response))
}

/// Handler for POST `/items/bulk_assign` endpoint.
async fn handle_bulk_assign(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<BulkAssignRequest>,
) -> Result<Json<BulkAssignResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&headers)?;
    info!(
        actor_id = %actor.id,
        items = req.item_ids.len(),
        assignee = %req.assignee,
        "Handling bulk_assign request"
    );

    let mut backend = app_state.backend.lock().await;
    let response: BulkAssignResponse = bulk_assign(
        &mut *backend,
        &req,
        &actor,
        request_cause(&headers),
        OffsetDateTime::now_utc(),
    )?;
    drop(backend);

    Ok(Json(response))
}

/// Handler for PUT `/providers/{provider_id}/availability` endpoint.
async fn handle_set_availability(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    UrlPath(provider_id): UrlPath<String>,
    Json(req): Json<SetAvailabilityRequest>,
) -> Result<Json<SetAvailabilityResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&headers)?;
    info!(actor_id = %actor.id, provider_id = %provider_id, "Handling set_availability request");

    let mut backend = app_state.backend.lock().await;
    let response: SetAvailabilityResponse =
        set_availability(&mut *backend, &provider_id, &req, &actor)?;
    drop(backend);

    Ok(Json(response))
}

/// Handler for GET `/audit/timeline` endpoint.
async fn handle_get_audit_timeline(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Query(query): Query<AuditTimelineRequest>,
) -> Result<Json<AuditTimelineResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&headers)?;
    info!(actor_id = %actor.id, item_id = query.item_id, "Handling get_audit_timeline request");

    let backend = app_state.backend.lock().await;
    let response: AuditTimelineResponse = audit_timeline(&*backend, query.item_id, &actor)?;
    drop(backend);

    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/availability", get(handle_get_availability))
        .route("/items", post(handle_create_item))
        .route("/items/bulk_assign", post(handle_bulk_assign))
        .route("/items/{item_id}", get(handle_get_item))
        .route("/items/{item_id}/transitions", post(handle_submit_transition))
        .route(
            "/providers/{provider_id}/availability",
            put(handle_set_availability),
        )
        .route("/audit/timeline", get(handle_get_audit_timeline))
        .with_state(app_state)
}

/// Loads the seed file, if any, into a fresh store.
fn load_store(seed: Option<&Path>) -> Result<InMemoryStore, Box<dyn std::error::Error>> {
    let Some(path) = seed else {
        info!("Starting with an empty store");
        return Ok(InMemoryStore::new());
    };

    info!("Loading seed data from: {}", path.display());
    let contents: String = std::fs::read_to_string(path)?;
    let seed: SeedData = serde_json::from_str(&contents)?;
    Ok(build_store(&seed, OffsetDateTime::now_utc())?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    info!("Initializing Paddock Server");

    let venue: VenueHours = VenueHours::new(parse_time(&args.opening)?, parse_time(&args.closing)?)?;
    info!(window = %venue.window, "Venue hours");

    let app_state: AppState = AppState {
        backend: Arc::new(Mutex::new(load_store(args.seed.as_deref())?)),
        venue,
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
