//! Axum route handlers for the role-simulation flow.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::gating::{self, Area};
use crate::models::progression::SimulationRow;
use crate::simulation::engine::{
    fetch_simulation, start_simulation, submit_response, RoundOutcome, Scenario,
    DEFAULT_TOTAL_ROUNDS,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartSimulationRequest {
    pub user_id: Uuid,
    pub language: String,
    pub target_role: String,
    pub total_rounds: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct StartSimulationResponse {
    pub simulation_id: Uuid,
    pub scenario: Scenario,
    pub round_number: i32,
    pub total_rounds: i32,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub simulation_id: Uuid,
    /// The round the client believes it is playing; the turn guard.
    pub round_number: i32,
    pub message: String,
}

/// POST /api/v1/simulation/start
///
/// Gated: requires a complete diagnosis and the SCI flag.
pub async fn handle_start_simulation(
    State(state): State<AppState>,
    Json(request): Json<StartSimulationRequest>,
) -> Result<Json<StartSimulationResponse>, AppError> {
    if request.target_role.trim().is_empty() {
        return Err(AppError::Validation("target_role cannot be empty".to_string()));
    }
    let total_rounds = request.total_rounds.unwrap_or(DEFAULT_TOTAL_ROUNDS);
    if !(1..=20).contains(&total_rounds) {
        return Err(AppError::Validation(
            "total_rounds must be between 1 and 20".to_string(),
        ));
    }

    let profile = gating::handlers::load_profile(&state.db, request.user_id).await?;
    gating::require_unlocked(&profile, Area::Simulation)?;

    let started = start_simulation(
        &state.db,
        state.chat.as_ref(),
        request.user_id,
        &request.language,
        &request.target_role,
        total_rounds,
    )
    .await?;

    Ok(Json(StartSimulationResponse {
        simulation_id: started.simulation.id,
        scenario: started.scenario,
        round_number: 1,
        total_rounds,
    }))
}

/// POST /api/v1/simulation/respond
pub async fn handle_respond(
    State(state): State<AppState>,
    Json(request): Json<RespondRequest>,
) -> Result<Json<RoundOutcome>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let outcome = submit_response(
        &state.db,
        state.chat.as_ref(),
        request.simulation_id,
        request.round_number,
        &request.message,
    )
    .await?;

    Ok(Json(outcome))
}

/// GET /api/v1/simulation/:id
pub async fn handle_get_simulation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SimulationRow>, AppError> {
    Ok(Json(fetch_simulation(&state.db, id).await?))
}
