use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::leads::{require_field, validate_email};
use crate::models::user::{UserRole, UserRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub full_name: String,
    pub role: Option<UserRole>,
    pub plan: Option<String>,
    pub trial_expires_at: Option<DateTime<Utc>>,
}

/// Partial update: absent fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    pub plan: Option<String>,
    pub is_diagnosis_complete: Option<bool>,
    pub has_sci: Option<bool>,
    pub has_completed_simulation: Option<bool>,
    pub has_scorecard: Option<bool>,
    /// "none", "requested", "active" or "cancelled". Setting "active" is the
    /// payment-confirmation action.
    pub mandate_status: Option<String>,
    pub trial_expires_at: Option<DateTime<Utc>>,
}

const MANDATE_STATUSES: &[&str] = &["none", "requested", "active", "cancelled"];

/// GET /api/v1/admin/users
pub async fn handle_list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserRow>>, AppError> {
    let users = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(users))
}

/// POST /api/v1/admin/users
pub async fn handle_register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<Json<UserRow>, AppError> {
    validate_email(&request.email)?;
    require_field("full_name", &request.full_name)?;

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, email, full_name, role, plan, trial_expires_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(request.email.trim())
    .bind(request.full_name.trim())
    .bind(request.role.unwrap_or(UserRole::Member).as_str())
    .bind(request.plan.unwrap_or_else(|| "trial".to_string()))
    .bind(request.trial_expires_at)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(user))
}

/// PATCH /api/v1/admin/users/:id
pub async fn handle_update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserRow>, AppError> {
    if let Some(status) = &request.mandate_status {
        if !MANDATE_STATUSES.contains(&status.as_str()) {
            return Err(AppError::Validation(format!(
                "Unknown mandate_status '{status}'"
            )));
        }
    }

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users SET
            full_name = COALESCE($1, full_name),
            role = COALESCE($2, role),
            plan = COALESCE($3, plan),
            is_diagnosis_complete = COALESCE($4, is_diagnosis_complete),
            has_sci = COALESCE($5, has_sci),
            has_completed_simulation = COALESCE($6, has_completed_simulation),
            has_scorecard = COALESCE($7, has_scorecard),
            mandate_status = COALESCE($8, mandate_status),
            trial_expires_at = COALESCE($9, trial_expires_at),
            updated_at = now()
        WHERE id = $10
        RETURNING *
        "#,
    )
    .bind(request.full_name)
    .bind(request.role.map(|r| r.as_str()))
    .bind(request.plan)
    .bind(request.is_diagnosis_complete)
    .bind(request.has_sci)
    .bind(request.has_completed_simulation)
    .bind(request.has_scorecard)
    .bind(request.mandate_status)
    .bind(request.trial_expires_at)
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    Ok(Json(user))
}

/// DELETE /api/v1/admin/users/:id
///
/// Admin cancel. The only hard delete in the user lifecycle.
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
