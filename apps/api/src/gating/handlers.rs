use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::gating::{evaluate_all, Access};
use crate::models::user::{ProgressProfile, UserRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub profile: ProgressProfile,
    pub areas: Vec<Access>,
}

/// Loads the gating-relevant profile for a user: the user row plus whether a
/// diagnosis exists (the diagnosis-started gate).
pub async fn load_profile(pool: &PgPool, user_id: Uuid) -> Result<ProgressProfile, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    let diagnosis_started: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM diagnoses WHERE user_id = $1)")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(ProgressProfile::from_row(&user, diagnosis_started, Utc::now()))
}

/// GET /api/v1/user/readiness
///
/// The single source of truth the client refreshes its sidebar from.
pub async fn handle_readiness(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ReadinessResponse>, AppError> {
    let profile = load_profile(&state.db, params.user_id).await?;
    let areas = evaluate_all(&profile);
    Ok(Json(ReadinessResponse { profile, areas }))
}
