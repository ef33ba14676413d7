//! Axum route handlers for issued documents, the academy catalog, and the
//! mentor endpoint. All of these sit behind the gating policy.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::documents::generator::{
    find_by_reference, generate_performance_profile, generate_recommendation, latest_document,
    mentor_answer,
};
use crate::errors::AppError;
use crate::gating::{self, handlers::load_profile, Area};
use crate::models::document::{DocumentKind, IssuedDocumentRow};
use crate::models::tool::ToolRow;
use crate::models::user::UserRole;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GenerateDocumentRequest {
    pub user_id: Uuid,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MentorRequest {
    pub user_id: Uuid,
    pub question: String,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MentorResponse {
    pub answer: String,
}

/// POST /api/v1/user/performance-profile
///
/// Issues the next version. Gated on the scorecard flag.
pub async fn handle_generate_performance_profile(
    State(state): State<AppState>,
    Json(request): Json<GenerateDocumentRequest>,
) -> Result<Json<IssuedDocumentRow>, AppError> {
    let profile = load_profile(&state.db, request.user_id).await?;
    gating::require_unlocked(&profile, Area::PerformanceProfile)?;

    let language = request.language.unwrap_or_else(|| "en".to_string());
    let row = generate_performance_profile(
        &state.db,
        state.chat.as_ref(),
        request.user_id,
        &language,
    )
    .await?;
    Ok(Json(row))
}

/// GET /api/v1/user/performance-profile?user_id=
pub async fn handle_get_performance_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<IssuedDocumentRow>, AppError> {
    latest_document(&state.db, params.user_id, DocumentKind::PerformanceProfile)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No performance profile issued yet".to_string()))
}

/// POST /api/v1/user/recommendation
pub async fn handle_generate_recommendation(
    State(state): State<AppState>,
    Json(request): Json<GenerateDocumentRequest>,
) -> Result<Json<IssuedDocumentRow>, AppError> {
    let profile = load_profile(&state.db, request.user_id).await?;
    gating::require_unlocked(&profile, Area::Recommendation)?;

    let language = request.language.unwrap_or_else(|| "en".to_string());
    let row = generate_recommendation(&state.db, state.chat.as_ref(), request.user_id, &language)
        .await?;
    Ok(Json(row))
}

/// GET /api/v1/user/recommendation?user_id=
pub async fn handle_get_recommendation(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<IssuedDocumentRow>, AppError> {
    latest_document(&state.db, params.user_id, DocumentKind::Recommendation)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No recommendation issued yet".to_string()))
}

/// GET /api/v1/documents/:reference_id
///
/// Public verification lookup for an issued document.
pub async fn handle_verify_document(
    State(state): State<AppState>,
    Path(reference_id): Path<String>,
) -> Result<Json<IssuedDocumentRow>, AppError> {
    Ok(Json(find_by_reference(&state.db, &reference_id).await?))
}

/// GET /api/v1/user/academy?user_id=
///
/// Tool catalog filtered by visibility: members see public tools, premium
/// and admin see everything.
pub async fn handle_academy(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ToolRow>>, AppError> {
    let profile = load_profile(&state.db, params.user_id).await?;
    gating::require_unlocked(&profile, Area::Academy)?;

    let tools = if profile.role == UserRole::Member {
        sqlx::query_as::<_, ToolRow>(
            "SELECT * FROM tools WHERE visibility = 'public' ORDER BY name ASC",
        )
        .fetch_all(&state.db)
        .await?
    } else {
        sqlx::query_as::<_, ToolRow>("SELECT * FROM tools ORDER BY name ASC")
            .fetch_all(&state.db)
            .await?
    };

    Ok(Json(tools))
}

/// POST /api/v1/user/mentor
pub async fn handle_mentor(
    State(state): State<AppState>,
    Json(request): Json<MentorRequest>,
) -> Result<Json<MentorResponse>, AppError> {
    if request.question.trim().is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }

    let profile = load_profile(&state.db, request.user_id).await?;
    gating::require_unlocked(&profile, Area::Mentor)?;

    let language = request.language.unwrap_or_else(|| "en".to_string());
    let answer = mentor_answer(
        &state.db,
        state.chat.as_ref(),
        request.user_id,
        &request.question,
        &language,
    )
    .await?;

    Ok(Json(MentorResponse { answer }))
}
