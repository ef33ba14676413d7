use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::lead::{LeadKind, LeadRow, LeadStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeadListQuery {
    pub kind: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLeadRequest {
    pub status: String,
}

/// GET /api/v1/admin/leads?kind=&status=
///
/// Newest first; both filters optional.
pub async fn handle_list_leads(
    State(state): State<AppState>,
    Query(params): Query<LeadListQuery>,
) -> Result<Json<Vec<LeadRow>>, AppError> {
    let kind = match &params.kind {
        Some(k) => Some(
            LeadKind::parse(k)
                .ok_or_else(|| AppError::Validation(format!("Unknown lead kind '{k}'")))?,
        ),
        None => None,
    };
    let status = match &params.status {
        Some(s) => Some(
            LeadStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("Unknown lead status '{s}'")))?,
        ),
        None => None,
    };

    let leads = sqlx::query_as::<_, LeadRow>(
        r#"
        SELECT * FROM leads
        WHERE ($1::text IS NULL OR kind = $1)
          AND ($2::text IS NULL OR status = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(kind.map(|k| k.as_str()))
    .bind(status.map(|s| s.as_str()))
    .fetch_all(&state.db)
    .await?;

    Ok(Json(leads))
}

/// PATCH /api/v1/admin/leads/:id
///
/// Status transition. The value must be a known status; the progression
/// itself is advisory and not enforced.
pub async fn handle_update_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateLeadRequest>,
) -> Result<Json<LeadRow>, AppError> {
    let status = LeadStatus::parse(&request.status).ok_or_else(|| {
        AppError::Validation(format!("Unknown lead status '{}'", request.status))
    })?;

    let lead = sqlx::query_as::<_, LeadRow>(
        "UPDATE leads SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(status.as_str())
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Lead {id} not found")))?;

    Ok(Json(lead))
}

/// DELETE /api/v1/admin/leads/:id
pub async fn handle_delete_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM leads WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Lead {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
