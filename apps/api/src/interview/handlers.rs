//! Axum route handlers for the diagnosis interview flow.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::engine::{
    analyze_cv, fetch_diagnosis, skip_question, start_diagnosis, submit_answer, CvAnalysis,
    TurnOutcome, DEFAULT_TOTAL_QUESTIONS,
};
use crate::models::progression::DiagnosisRow;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CvAnalysisResponse {
    pub cv_analysis: CvAnalysis,
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub user_id: Uuid,
    pub language: String,
    pub cv_analysis: CvAnalysis,
    pub total_questions: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub diagnosis_id: Uuid,
    pub question: String,
    pub question_number: i32,
    pub total_questions: i32,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub diagnosis_id: Uuid,
    /// The question the client believes it is answering; the turn guard.
    pub question_number: i32,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct SkipRequest {
    pub diagnosis_id: Uuid,
    pub question_number: i32,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interview/cv
///
/// Multipart upload: a `file` part (PDF) or a `text` part, plus an optional
/// `language` part (default "en"). Returns the structured CV analysis.
pub async fn handle_analyze_cv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CvAnalysisResponse>, AppError> {
    let mut cv_text: Option<String> = None;
    let mut language = "en".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                let text = pdf_extract::extract_text_from_mem(&bytes)
                    .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?;
                cv_text = Some(text);
            }
            "text" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read text: {e}")))?;
                cv_text = Some(text);
            }
            "language" => {
                language = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read language: {e}")))?;
            }
            _ => {}
        }
    }

    let cv_text = cv_text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("CV content is required".to_string()))?;

    let cv_analysis = analyze_cv(state.chat.as_ref(), &cv_text, &language).await?;
    Ok(Json(CvAnalysisResponse { cv_analysis }))
}

/// POST /api/v1/interview/start
pub async fn handle_start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<StartResponse>, AppError> {
    if request.language.trim().is_empty() {
        return Err(AppError::Validation("language cannot be empty".to_string()));
    }
    let total_questions = request.total_questions.unwrap_or(DEFAULT_TOTAL_QUESTIONS);
    if !(1..=50).contains(&total_questions) {
        return Err(AppError::Validation(
            "total_questions must be between 1 and 50".to_string(),
        ));
    }

    let started = start_diagnosis(
        &state.db,
        state.chat.as_ref(),
        request.user_id,
        &request.language,
        &request.cv_analysis,
        total_questions,
    )
    .await?;

    Ok(Json(StartResponse {
        diagnosis_id: started.diagnosis.id,
        question: started.question,
        question_number: 1,
        total_questions,
    }))
}

/// POST /api/v1/interview/answer
pub async fn handle_answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<TurnOutcome>, AppError> {
    if request.answer.trim().is_empty() {
        return Err(AppError::Validation("answer cannot be empty".to_string()));
    }

    let outcome = submit_answer(
        &state.db,
        state.chat.as_ref(),
        request.diagnosis_id,
        request.question_number,
        &request.answer,
    )
    .await?;

    Ok(Json(outcome))
}

/// POST /api/v1/interview/skip
///
/// Substitutes the canned "I don't know" answer in the diagnosis language.
pub async fn handle_skip(
    State(state): State<AppState>,
    Json(request): Json<SkipRequest>,
) -> Result<Json<TurnOutcome>, AppError> {
    let outcome = skip_question(
        &state.db,
        state.chat.as_ref(),
        request.diagnosis_id,
        request.question_number,
    )
    .await?;

    Ok(Json(outcome))
}

/// GET /api/v1/interview/:id
///
/// Full diagnosis state, used by clients to resync after a lost response.
pub async fn handle_get_diagnosis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DiagnosisRow>, AppError> {
    Ok(Json(fetch_diagnosis(&state.db, id).await?))
}
