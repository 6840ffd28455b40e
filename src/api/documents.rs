use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;

use crate::corpus::CorpusStats;
use crate::error::IngestError;
use crate::models::{FilesResponse, MessageResponse, UploadResponse};
use crate::parser::parser_for;
use crate::state::AppState;

const NO_TEXT_MESSAGE: &str = "Failed to read document content";

/// POST /upload - Ingest one multipart `file` field into the corpus
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(base_name)
            .filter(|n| !n.is_empty())
            .ok_or((StatusCode::BAD_REQUEST, "Uploaded file has no name".to_string()))?;
        let bytes = field.bytes().await.map_err(|e| (e.status(), e.body_text()))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        upload.ok_or((StatusCode::BAD_REQUEST, "Missing multipart field 'file'".to_string()))?;

    let parser = parser_for(&filename).ok_or((
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        "Only PDF, text and Markdown documents are supported".to_string(),
    ))?;

    // PDF extraction is CPU-bound
    let parsed = tokio::task::spawn_blocking(move || parser.parse(&bytes))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Parse task failed: {e}"),
            )
        })?;
    let pages = match parsed {
        Ok(pages) => pages,
        Err(e) => {
            tracing::warn!("Could not parse {filename}: {e}");
            return Ok(Json(UploadResponse::Error {
                message: NO_TEXT_MESSAGE.to_string(),
            }));
        }
    };

    match state.corpus.ingest_pages(&filename, &pages).await {
        Ok(report) => {
            tracing::info!("Upload {filename}: {} chunks", report.chunks);
            Ok(Json(UploadResponse::Success { filename }))
        }
        Err(IngestError::NoExtractableText { .. }) => {
            tracing::warn!("Upload {filename}: no extractable text");
            Ok(Json(UploadResponse::Error {
                message: NO_TEXT_MESSAGE.to_string(),
            }))
        }
        Err(e) => {
            tracing::error!("Upload {filename} failed: {e}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// GET /files - Distinct uploaded filenames
pub async fn list_files(State(state): State<AppState>) -> Json<FilesResponse> {
    Json(FilesResponse {
        files: state.corpus.list_documents().into_iter().collect(),
    })
}

/// DELETE /files - Wipe the whole corpus from memory and disk
pub async fn delete_files(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    state.corpus.clear_all().map_err(|e| {
        tracing::error!("Clear failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to clear data".to_string(),
        )
    })?;
    Ok(Json(MessageResponse {
        message: "All documents cleared successfully".to_string(),
    }))
}

/// GET /api/stats - Corpus sizes and the out-of-range skip counter
pub async fn stats(State(state): State<AppState>) -> Json<CorpusStats> {
    Json(state.corpus.stats())
}

/// Strip any client-supplied directory components.
fn base_name(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
