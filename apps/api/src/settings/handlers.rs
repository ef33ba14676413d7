use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::settings::{self, SettingRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpsertSettingRequest {
    pub key: String,
    pub value: String,
}

/// GET /api/v1/admin/config
pub async fn handle_list_config(
    State(state): State<AppState>,
) -> Result<Json<Vec<SettingRow>>, AppError> {
    Ok(Json(settings::list(&state.db).await?))
}

/// PUT /api/v1/admin/config
///
/// Upserts one key. Provider/key changes take effect on the next AI call.
pub async fn handle_upsert_config(
    State(state): State<AppState>,
    Json(request): Json<UpsertSettingRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if request.key.trim().is_empty() {
        return Err(AppError::Validation("key cannot be empty".to_string()));
    }
    settings::set(&state.db, &request.key, &request.value).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
