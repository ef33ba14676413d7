use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::tool::{ToolRow, Visibility};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateToolRequest {
    pub name: String,
    pub description: String,
    pub url: String,
    pub visibility: Visibility,
}

#[derive(Debug, Deserialize)]
pub struct UpdateToolRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub visibility: Option<Visibility>,
}

/// GET /api/v1/admin/tools
pub async fn handle_list_tools(
    State(state): State<AppState>,
) -> Result<Json<Vec<ToolRow>>, AppError> {
    let tools = sqlx::query_as::<_, ToolRow>("SELECT * FROM tools ORDER BY name ASC")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(tools))
}

/// POST /api/v1/admin/tools
pub async fn handle_create_tool(
    State(state): State<AppState>,
    Json(request): Json<CreateToolRequest>,
) -> Result<Json<ToolRow>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if request.url.trim().is_empty() {
        return Err(AppError::Validation("url is required".to_string()));
    }

    let tool = sqlx::query_as::<_, ToolRow>(
        r#"
        INSERT INTO tools (id, name, description, url, visibility)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(request.name.trim())
    .bind(request.description)
    .bind(request.url.trim())
    .bind(request.visibility.as_str())
    .fetch_one(&state.db)
    .await?;

    Ok(Json(tool))
}

/// PATCH /api/v1/admin/tools/:id
pub async fn handle_update_tool(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateToolRequest>,
) -> Result<Json<ToolRow>, AppError> {
    let tool = sqlx::query_as::<_, ToolRow>(
        r#"
        UPDATE tools SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            url = COALESCE($3, url),
            visibility = COALESCE($4, visibility)
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(request.name)
    .bind(request.description)
    .bind(request.url)
    .bind(request.visibility.map(|v| v.as_str()))
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Tool {id} not found")))?;

    Ok(Json(tool))
}

/// DELETE /api/v1/admin/tools/:id
pub async fn handle_delete_tool(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM tools WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Tool {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
