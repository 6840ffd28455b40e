use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::answer;
use crate::models::{ChatRequest, ChatResponse};
use crate::state::AppState;

const MAX_QUESTION_LEN: usize = 2000;

/// POST /chat - Answer a question from the uploaded documents
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let question = req.question.trim();
    if question.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Question is required".to_string()));
    }
    let question = truncate_to_char_boundary(question, MAX_QUESTION_LEN);

    let answer = answer::answer(
        &state.corpus,
        state.generator.as_ref(),
        &question,
        state.config.top_k,
    )
    .await
    .map_err(|e| {
        tracing::error!("Chat error: {e:#}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "AI generation failed".to_string(),
        )
    })?;

    Ok(Json(ChatResponse { answer }))
}

fn truncate_to_char_boundary(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    s.char_indices()
        .take_while(|(i, _)| *i < max_len)
        .map(|(_, c)| c)
        .collect()
}
