//! Business-card contact extraction server.
//!
//! Thin HTTP wrapper around the extraction pipeline: one multipart upload
//! route, one health probe. All the interesting contracts live in the
//! pipeline modules.

mod config;
mod error;
mod extractor;
mod mistral;
mod ocr;
mod prompt;
mod schema;
mod storage;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use config::AppConfig;
use error::ExtractError;
use extractor::Extractor;
use mistral::MistralClient;
use ocr::tesseract::TesseractEngine;
use schema::ContactRecord;
use std::sync::Arc;
use storage::ContactStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    extractor: Arc<Extractor>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contact_extractor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing credential aborts startup here, before the socket binds.
    let config = AppConfig::from_env()?;
    info!(model = %config.model, parse_mode = ?config.parse_mode, "configuration loaded");

    let store = Arc::new(ContactStore::new(config.csv_path.clone()));
    store.ensure_exists()?;
    info!(path = %store.path().display(), "contact table ready");

    let ocr = Arc::new(TesseractEngine::new(&config));
    let llm = MistralClient::new(&config)?;
    let extractor = Arc::new(Extractor::new(ocr, llm, store, config.parse_mode));

    let state = AppState { extractor };

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/extract", post(extract_card))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB; cards are photos
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Run server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Success body: raw OCR text plus the structured record, so the caller can
/// display both.
#[derive(serde::Serialize)]
struct ExtractResponse {
    ocr_text: String,
    structured_data: ContactRecord,
}

/// Error body: which stage failed and why.
#[derive(serde::Serialize)]
struct ErrorBody {
    stage: &'static str,
    message: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

/// Upload a business-card image and extract its contact record.
async fn extract_card(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let mut filename = String::new();
    let mut file_data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().unwrap_or("card").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("failed to read file: {}", e)))?;
            file_data = Some(bytes.to_vec());
            break;
        }
    }

    // A request with no file field is malformed; an empty or corrupt upload
    // is the pipeline's decode stage's call.
    let file_data = file_data.ok_or_else(|| bad_request("no file field in upload".to_string()))?;

    info!("received file: {} ({} bytes)", filename, file_data.len());

    let outcome = state
        .extractor
        .run(&file_data)
        .await
        .map_err(error_response)?;

    Ok(Json(ExtractResponse {
        ocr_text: outcome.ocr_text,
        structured_data: outcome.contact,
    }))
}

// ============================================================================
// Error mapping
// ============================================================================

fn bad_request(message: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            stage: "request",
            message,
        }),
    )
}

fn error_response(err: ExtractError) -> ApiError {
    error!(stage = err.stage(), "extraction failed: {}", err);
    (
        status_for(&err),
        Json(ErrorBody {
            stage: err.stage(),
            message: err.to_string(),
        }),
    )
}

/// Client-caused failures get 4xx; this service's own faults get 500; broken
/// upstreams (including replies we cannot make sense of) get 502.
fn status_for(err: &ExtractError) -> StatusCode {
    match err {
        ExtractError::Decode(_) => StatusCode::BAD_REQUEST,
        ExtractError::OcrEmpty => StatusCode::UNPROCESSABLE_ENTITY,
        ExtractError::OcrEngine(_) | ExtractError::Storage(_) | ExtractError::AuthConfig { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ExtractError::Transport(_)
        | ExtractError::Upstream(_)
        | ExtractError::SchemaParse(_)
        | ExtractError::SchemaValidation(_) => StatusCode::BAD_GATEWAY,
    }
}
