//! HTTP API server.
//!
//! Exposes the email store, the index run, and retrieval-augmented queries
//! as a JSON HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/emails` | List all emails, newest first |
//! | `POST`   | `/emails` | Create an email |
//! | `GET`    | `/emails/count` | Count stored emails |
//! | `GET`    | `/emails/{id}` | Fetch one email |
//! | `PUT`    | `/emails/{id}` | Replace an email's body |
//! | `DELETE` | `/emails/{id}` | Delete an email |
//! | `POST`   | `/index/run` | Chunk and upsert the whole store |
//! | `POST`   | `/query` | Answer a question from the indexed corpus |
//! | `GET`    | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses share one shape:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "content must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `config_missing` (400),
//! `upstream_error` (502), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::answer::{self, QueryParams};
use crate::completion;
use crate::config::Config;
use crate::db;
use crate::index_cmd::{self, IndexRunSummary};
use crate::models::{AugmentedAnswer, EmailDocument};
use crate::store;
use crate::vector;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    pool: SqlitePool,
}

/// Starts the HTTP server.
///
/// Binds to the address configured in `[server].bind` and serves until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let pool = db::connect(config).await?;

    let state = AppState {
        config: Arc::new(config.clone()),
        pool,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/emails", get(handle_list_emails).post(handle_create_email))
        .route("/emails/count", get(handle_count_emails))
        .route(
            "/emails/{id}",
            get(handle_get_email)
                .put(handle_update_email)
                .delete(handle_delete_email),
        )
        .route("/index/run", post(handle_index_run))
        .route("/query", post(handle_query))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("Server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Constructs a 404 Not Found error.
fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

/// Constructs a 400 error for a disabled provider or missing credentials.
fn config_missing(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "config_missing".to_string(),
        message: message.into(),
    }
}

/// Constructs a 502 error for vector index or completion provider failures.
fn upstream_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_GATEWAY,
        code: "upstream_error".to_string(),
        message: message.into(),
    }
}

/// Constructs a 500 internal error.
fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Maps pipeline errors to the most appropriate HTTP status code, keyed on
/// the error messages produced within this crate.
fn classify_error(err: anyhow::Error) -> AppError {
    let msg = err.to_string();

    if msg.contains("not found") {
        not_found(msg)
    } else if msg.contains("disabled") || msg.contains("environment variable not set") {
        config_missing(msg)
    } else if msg.contains("must not") || msg.contains("must be") || msg.contains("Unknown") {
        bad_request(msg)
    } else if msg.contains("Pinecone") || msg.contains("OpenAI") {
        upstream_error(msg)
    } else {
        internal(msg)
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ /emails ============

async fn handle_list_emails(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmailDocument>>, AppError> {
    let emails = store::list_all(&state.pool).await.map_err(classify_error)?;
    Ok(Json(emails))
}

/// Request body for `POST /emails` and `PUT /emails/{id}`.
#[derive(Deserialize)]
struct EmailBody {
    content: String,
}

async fn handle_create_email(
    State(state): State<AppState>,
    Json(body): Json<EmailBody>,
) -> Result<(StatusCode, Json<EmailDocument>), AppError> {
    let email = store::create(&state.pool, &body.content)
        .await
        .map_err(classify_error)?;
    Ok((StatusCode::CREATED, Json(email)))
}

/// JSON response body for `GET /emails/count`.
#[derive(Serialize)]
struct CountResponse {
    count: i64,
}

async fn handle_count_emails(
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, AppError> {
    let count = store::count(&state.pool).await.map_err(classify_error)?;
    Ok(Json(CountResponse { count }))
}

async fn handle_get_email(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EmailDocument>, AppError> {
    let email = store::get(&state.pool, id).await.map_err(classify_error)?;
    Ok(Json(email))
}

async fn handle_update_email(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<EmailBody>,
) -> Result<Json<EmailDocument>, AppError> {
    let email = store::update(&state.pool, id, &body.content)
        .await
        .map_err(classify_error)?;
    Ok(Json(email))
}

async fn handle_delete_email(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    store::delete(&state.pool, id).await.map_err(classify_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ POST /index/run ============

/// Request body for `POST /index/run`.
#[derive(Deserialize, Default)]
struct IndexRunBody {
    #[serde(default)]
    dry_run: bool,
}

async fn handle_index_run(
    State(state): State<AppState>,
    body: Option<Json<IndexRunBody>>,
) -> Result<Json<IndexRunSummary>, AppError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let summary = index_cmd::run_index(&state.config, body.dry_run)
        .await
        .map_err(classify_error)?;
    Ok(Json(summary))
}

// ============ POST /query ============

/// Request body for `POST /query`. Unset fields fall back to the configured
/// retrieval defaults.
#[derive(Deserialize)]
struct QueryBody {
    question: String,
    top_k: Option<usize>,
    score_threshold: Option<f64>,
    max_passages: Option<usize>,
    #[serde(default)]
    include_prompt: bool,
}

async fn handle_query(
    State(state): State<AppState>,
    Json(body): Json<QueryBody>,
) -> Result<Json<AugmentedAnswer>, AppError> {
    let index = vector::create_index(&state.config.index).map_err(classify_error)?;
    let provider = completion::create_provider(&state.config.completion).map_err(classify_error)?;

    let params = QueryParams::from_config(
        body.question,
        &state.config.retrieval,
        body.top_k,
        body.score_threshold,
        body.max_passages,
        body.include_prompt,
    );

    let result = answer::answer_query(
        index.as_ref(),
        provider.as_ref(),
        &state.config.index.namespace,
        &params,
    )
    .await
    .map_err(classify_error)?;

    Ok(Json(result))
}
