//! docscan REST API

use crate::error::ApiError;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Query, State},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use core_pipeline::{prepare_upload, ExtractionId};
use llm_bridge::Extractor;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Page served at `/` when the frontend has not been built
const PLACEHOLDER_INDEX: &str = include_str!("../static/index.html");

pub struct AppState {
    pub extractor: Arc<Extractor>,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route(
            "/extract",
            post(extract).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/download_json", get(download_json))
        .route("/clear_cache", post(clear_cache))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let path = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Html(page),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Serving placeholder index");
            Html(PLACEHOLDER_INDEX.to_string())
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// Rendered HTML of the extracted text
    pub result: String,
    /// Id to fetch this result's JSON with
    pub request_id: ExtractionId,
}

struct Upload {
    /// `None` when the part carries no `filename` parameter at all
    filename: Option<String>,
    data: Vec<u8>,
}

async fn extract(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    // A request that is not multipart at all carries no image either
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::validation("No image provided"));
    };

    let mut upload = None;
    let mut prompt = String::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let filename = field.file_name().map(str::to_string);
                let data = field.bytes().await?.to_vec();
                upload = Some(Upload { filename, data });
            }
            Some("prompt") => prompt = field.text().await?,
            _ => {}
        }
    }

    // A part without a filename is a plain form value, not a file
    let Some(Upload {
        filename: Some(filename),
        data,
    }) = upload
    else {
        return Err(ApiError::validation("No image provided"));
    };
    if filename.is_empty() {
        return Err(ApiError::validation("No image selected"));
    }
    tracing::info!(
        filename = %filename,
        bytes = data.len(),
        has_prompt = !prompt.trim().is_empty(),
        "Received image"
    );

    let image = tokio::task::spawn_blocking(move || prepare_upload(&data))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)?;

    let result = state
        .extractor
        .extract(&image, Some(prompt.as_str()))
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(ExtractResponse {
        result: result.html,
        request_id: result.id,
    }))
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    id: Option<String>,
}

async fn download_json(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let store = state.extractor.store();

    let record = match query.id.as_deref().filter(|id| !id.is_empty()) {
        Some(raw) => {
            let id: ExtractionId = raw
                .parse()
                .map_err(|_| ApiError::validation("Invalid result id"))?;
            Some(
                store
                    .get(&id)
                    .ok_or_else(|| ApiError::NotFound("Result not found".to_string()))?,
            )
        }
        None => store.latest().map(|(_, record)| record),
    };

    Ok(match record {
        Some(record) => Json(record).into_response(),
        None => Json(json!({})).into_response(),
    })
}

async fn clear_cache(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .extractor
        .clear_cache()
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(json!({ "message": "Cache cleared successfully" })))
}
