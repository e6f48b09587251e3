//! HTTP surface for the document search assistant.
//!
//! - `POST /search` – Rank stored documents against `{ "query": "..." }` and return up to five
//!   `{ score, file, content, summary }` objects, best first.
//! - `POST /upload` – Store the multipart `file` field in the document directory.
//! - `GET /metrics` – Search, scoring, and upload counters since start.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools.
//!
//! Client errors are reported as `{ "error": "..." }` with status 400.

use crate::metrics::MetricsSnapshot;
use crate::ranking::RankedResult;
use crate::search::{SearchApi, SearchError, UploadError};
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router. `max_upload_bytes` bounds request bodies.
pub fn create_router<S>(service: Arc<S>, max_upload_bytes: usize) -> Router
where
    S: SearchApi + 'static,
{
    Router::new()
        .route("/search", post(search_documents::<S>))
        .route("/upload", post(upload_file::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

/// Request body for `POST /search`.
#[derive(Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: Option<String>,
}

/// One entry of the `POST /search` response array.
#[derive(Serialize)]
struct SearchResultBody {
    score: u8,
    file: String,
    content: String,
    summary: String,
}

impl From<RankedResult> for SearchResultBody {
    fn from(result: RankedResult) -> Self {
        Self {
            score: result.score,
            file: result.file,
            content: result.content,
            summary: result.summary,
        }
    }
}

/// Rank stored documents against the query and attach summaries to the best five.
async fn search_documents<S>(
    State(service): State<Arc<S>>,
    request: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<SearchResultBody>>, ApiError>
where
    S: SearchApi,
{
    let Json(request) = request.map_err(|rejection| {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;
    let query = request.query.unwrap_or_default();
    let results = service.search(&query).await?;
    Ok(Json(results.into_iter().map(SearchResultBody::from).collect()))
}

/// Success response for `POST /upload`.
#[derive(Serialize)]
struct UploadResponse {
    message: &'static str,
    file: String,
}

/// Store the first multipart field named `file` that carries a filename.
///
/// Fields without a filename are form values, not files, and are ignored.
async fn upload_file<S>(
    State(service): State<Arc<S>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError>
where
    S: SearchApi,
{
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::bad_request("No file part"));
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| ApiError::new(error.status(), error.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if file_name.is_empty() {
            return Err(ApiError::bad_request("No selected file"));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|error| ApiError::new(error.status(), error.body_text()))?;
        let stored = service.upload(&file_name, &bytes).await?;
        tracing::info!(file = %stored, bytes = bytes.len(), "Upload completed");
        return Ok(Json(UploadResponse {
            message: "File uploaded successfully",
            file: stored,
        }));
    }

    Err(ApiError::bad_request("No file part"))
}

/// Return the activity counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: SearchApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "search",
                method: "POST",
                path: "/search",
                description: "Rank uploaded documents by LLM-judged relevance to the query and return up to five results with query-specific summaries.",
                request_example: Some(json!({ "query": "contract termination terms" })),
            },
            CommandDescriptor {
                name: "upload",
                method: "POST",
                path: "/upload",
                description: "Store a PDF, DOCX, or PPTX file sent as the multipart field `file`; an existing file with the same name is replaced.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return search, scoring, summary, and upload counters since start.",
                request_example: None,
            },
        ],
    })
}

/// Error rendered as `{ "error": message }`.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "Request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(error: SearchError) -> Self {
        match error {
            SearchError::EmptyQuery => Self::bad_request(error.to_string()),
            SearchError::Store(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(error: UploadError) -> Self {
        match error {
            UploadError::EmptyFileName => Self::bad_request(error.to_string()),
            UploadError::Store(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
        }
    }
}
