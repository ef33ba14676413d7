use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::leads::validate_email;
use crate::models::session::BriefingSessionRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub user_email: String,
    pub topic: String,
    pub scheduled_at: DateTime<Utc>,
    pub meeting_url: Option<String>,
}

/// GET /api/v1/admin/sessions
pub async fn handle_list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<BriefingSessionRow>>, AppError> {
    let sessions = sqlx::query_as::<_, BriefingSessionRow>(
        "SELECT * FROM briefing_sessions ORDER BY scheduled_at ASC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(sessions))
}

/// POST /api/v1/admin/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<BriefingSessionRow>, AppError> {
    validate_email(&request.user_email)?;
    if request.topic.trim().is_empty() {
        return Err(AppError::Validation("topic is required".to_string()));
    }

    let session = sqlx::query_as::<_, BriefingSessionRow>(
        r#"
        INSERT INTO briefing_sessions (id, user_email, topic, scheduled_at, meeting_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(request.user_email.trim())
    .bind(request.topic.trim())
    .bind(request.scheduled_at)
    .bind(request.meeting_url)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(session))
}

/// DELETE /api/v1/admin/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM briefing_sessions WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
