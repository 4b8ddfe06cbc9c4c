use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use futures_util::StreamExt;
use log::{LevelFilter, Log, Metadata, Record};
use serde::Serialize;
use serde_json::{json, Value};
use std::{
    env,
    fs::OpenOptions,
    io::Write,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tokio::signal;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
};

use deskforge_server::commands;
use deskforge_server::services::{
    validate, BuildError, BuildRequest, DraftStore, EventSink, GithubBuildService, LOG_EVENT,
};

// ============================================================================
// Event System
// ============================================================================

#[derive(Clone, Serialize)]
struct ServerEvent {
    event: String,
    payload: Value,
}

#[derive(Clone)]
struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: &str, payload: Value) {
        let _ = self.sender.send(ServerEvent {
            event: event.to_string(),
            payload,
        });
    }
}

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
struct AppState {
    draft_store: Arc<DraftStore>,
    build_service: Arc<GithubBuildService>,
    event_bus: EventBus,
}

// ============================================================================
// Logging
// ============================================================================

struct ServerLogger {
    file: Mutex<std::fs::File>,
    event_bus: EventBus,
    level: LevelFilter,
}

impl ServerLogger {
    fn new(log_dir: &Path, event_bus: EventBus) -> Result<Self, Box<dyn std::error::Error>> {
        let log_path = log_dir.join("deskforge-server.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        Ok(Self {
            file: Mutex::new(file),
            event_bus,
            level: LevelFilter::Info,
        })
    }
}

impl Log for ServerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Local::now();
        let message = format!("{}", record.args());
        let line = format!(
            "[{}][{}][{}] {message}",
            timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.target(),
            record.level()
        );

        if let Ok(mut file) = self.file.try_lock() {
            let _ = writeln!(file, "{line}");
        }

        self.event_bus.emit(
            LOG_EVENT,
            json!({
                "level": record.level().to_string(),
                "target": record.target(),
                "message": message,
            }),
        );
    }

    fn flush(&self) {}
}

// ============================================================================
// CORS Configuration
// ============================================================================

fn build_cors_layer() -> CorsLayer {
    let cors_origins = env::var("DESKFORGE_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:*,http://127.0.0.1:*".to_string());

    let allowed_origins: Vec<String> = cors_origins
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            let origin_str = match origin.to_str() {
                Ok(s) => s,
                Err(_) => return false,
            };

            allowed_origins.iter().any(|allowed| {
                if allowed.ends_with(":*") {
                    // Wildcard port matching for local dev servers
                    let prefix = allowed.trim_end_matches(":*");
                    origin_str.starts_with(prefix) && origin_str[prefix.len()..].starts_with(':')
                } else {
                    origin_str == allowed
                }
            })
        }))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// ============================================================================
// Configuration Endpoints
// ============================================================================

/// GET /health
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// GET /api/config - The stored draft, or the all-default configuration
async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(commands::current_draft(&state.draft_store))
}

/// POST /api/config - Validate a candidate; persist and return it on success
async fn save_config(State(state): State<AppState>, Json(candidate): Json<Value>) -> Response {
    match commands::submit_draft(&state.draft_store, &candidate) {
        Ok(config) => Json(config).into_response(),
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": errors })),
        )
            .into_response(),
    }
}

/// POST /api/config/validate - Validate only, never persists
async fn validate_config(Json(candidate): Json<Value>) -> Response {
    match validate(&candidate) {
        Ok(config) => Json(json!({ "valid": true, "config": config })).into_response(),
        Err(errors) => Json(json!({ "valid": false, "errors": errors })).into_response(),
    }
}

/// DELETE /api/config - Drop the stored draft
async fn clear_config(State(state): State<AppState>) -> Response {
    match commands::clear_draft(&state.draft_store) {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) => {
            log::error!("Failed to clear draft: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": e })),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Export Endpoints
// ============================================================================

/// GET /api/export/config - Download the config.json artifact
async fn export_config(State(state): State<AppState>) -> Response {
    match commands::export_config_json(&state.draft_store) {
        Ok(document) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"config.json\"",
                ),
            ],
            document,
        )
            .into_response(),
        Err(e) => {
            log::warn!("config.json export refused: {e}");
            (StatusCode::CONFLICT, Json(json!({ "error": e }))).into_response()
        }
    }
}

/// GET /api/export/env - Download the .env artifact
async fn export_env(State(state): State<AppState>) -> Response {
    match commands::export_env_file(&state.draft_store) {
        Ok(document) => (
            [
                (header::CONTENT_TYPE, "text/plain"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\".env.example\"",
                ),
            ],
            document,
        )
            .into_response(),
        Err(e) => {
            log::warn!(".env export refused: {e}");
            (StatusCode::CONFLICT, Json(json!({ "error": e }))).into_response()
        }
    }
}

// ============================================================================
// Build Endpoints
// ============================================================================

/// POST /api/build - Start the remote build sequence for the stored draft
async fn trigger_build(State(state): State<AppState>, Json(request): Json<BuildRequest>) -> Response {
    let config = match state.draft_store.load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": "No validated configuration has been saved yet" })),
            )
                .into_response()
        }
        Err(e) => {
            log::error!("Failed to load draft: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e })),
            )
                .into_response();
        }
    };

    let sink: Arc<dyn EventSink> = Arc::new(state.event_bus.clone());
    match state.build_service.trigger(request, config, sink).await {
        Ok(()) => (StatusCode::ACCEPTED, Json(json!({ "ok": true }))).into_response(),
        Err(e @ BuildError::AlreadyRunning) => {
            (StatusCode::CONFLICT, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e @ BuildError::IncompleteRequest) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// GET /api/build/status
async fn build_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.build_service.status().await)
}

/// POST /api/build/cancel - Stop polling; the remote run is left alone
async fn cancel_build(State(state): State<AppState>) -> impl IntoResponse {
    state.build_service.cancel();
    Json(json!({ "ok": true }))
}

// ============================================================================
// Event Stream
// ============================================================================

/// GET /ws - Build status and log events as they happen
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let receiver = state.event_bus.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, receiver))
}

async fn handle_socket(mut socket: WebSocket, receiver: broadcast::Receiver<ServerEvent>) {
    let mut events = BroadcastStream::new(receiver);

    loop {
        tokio::select! {
            event = events.next() => {
                match event {
                    Some(Ok(event)) => {
                        let text = match serde_json::to_string(&event) {
                            Ok(text) => text,
                            Err(_) => continue,
                        };
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    // Events dropped while the client was slow; keep going
                    Some(Err(_)) => continue,
                    None => break,
                }
            }
            message = socket.recv() => {
                match message {
                    Some(Ok(_)) => continue,
                    _ => break,
                }
            }
        }
    }
}

// ============================================================================
// Server Lifecycle
// ============================================================================

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    log::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment
    let data_dir = env::var("DESKFORGE_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let log_dir = env::var("DESKFORGE_LOG_DIR").unwrap_or_else(|_| format!("{data_dir}/logs"));
    let ui_dir = env::var("DESKFORGE_UI_DIR").unwrap_or_else(|_| "dist".to_string());
    let host = env::var("DESKFORGE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("DESKFORGE_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8020);

    let app_data_dir = PathBuf::from(&data_dir);
    let log_dir_path = PathBuf::from(&log_dir);
    std::fs::create_dir_all(&app_data_dir)?;
    std::fs::create_dir_all(&log_dir_path)?;

    let event_bus = EventBus::new();
    let logger = ServerLogger::new(&log_dir_path, event_bus.clone())?;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(LevelFilter::Info);

    let state = AppState {
        draft_store: Arc::new(DraftStore::new(app_data_dir)),
        build_service: Arc::new(GithubBuildService::new()),
        event_bus,
    };

    let mut app = Router::new()
        .route("/health", get(health))
        .route(
            "/api/config",
            get(get_config).post(save_config).delete(clear_config),
        )
        .route("/api/config/validate", post(validate_config))
        .route("/api/export/config", get(export_config))
        .route("/api/export/env", get(export_env))
        .route("/api/build", post(trigger_build))
        .route("/api/build/status", get(build_status))
        .route("/api/build/cancel", post(cancel_build))
        .route("/ws", get(ws_handler))
        .layer(build_cors_layer())
        .with_state(state);

    // Serve the wizard frontend when a build of it is present
    let ui_path = PathBuf::from(&ui_dir);
    if ui_path.exists() {
        let index = ui_path.join("index.html");
        app = app.fallback_service(ServeDir::new(&ui_path).fallback(ServeFile::new(index)));
        log::info!("Serving wizard UI from {ui_path:?}");
    } else {
        log::warn!("UI directory {ui_path:?} not found; serving API only");
    }

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    log::info!("DeskForge server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}
