//! The role-simulation loop: an AI-generated scenario, a fixed number of
//! in-character rounds, then an out-of-character debrief. Shares the turn
//! guard and loop decision with the interview engine; completing a
//! simulation sets `has_completed_simulation` on the user.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::engine::{next_action, verify_turn, NextAction};
use crate::llm_client::{complete_json, ChatCompletion, ChatMessage};
use crate::models::progression::{SimulationRow, Turn, STATUS_COMPLETE, STATUS_IN_PROGRESS};
use crate::simulation::prompts::{
    COUNTERPART_SYSTEM_TEMPLATE, DEBRIEF_PROMPT, REPLY_PROMPT, SCENARIO_PROMPT_TEMPLATE,
    SCENARIO_SYSTEM,
};

pub const DEFAULT_TOTAL_ROUNDS: i32 = 8;

pub const ROLE_COUNTERPART: &str = "counterpart";
pub const ROLE_PARTICIPANT: &str = "participant";

/// The generated scenario framing the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub title: String,
    pub setting: String,
    pub counterpart: String,
    pub objective: String,
    pub opening_line: String,
}

#[derive(Debug, Deserialize)]
pub struct CounterpartReply {
    pub reply: String,
}

/// Schema for the debrief payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debrief {
    pub overall_score: f64,
    pub summary: String,
    pub what_went_well: Vec<String>,
    pub to_improve: Vec<String>,
    pub verdict: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundOutcome {
    Reply {
        reply: String,
        round_number: i32,
        total_rounds: i32,
    },
    Debrief {
        debrief: Debrief,
        total_rounds: i32,
    },
}

pub struct StartedSimulation {
    pub simulation: SimulationRow,
    pub scenario: Scenario,
}

/// Generates a scenario and creates the simulation with the counterpart's
/// opening line as the first turn.
pub async fn start_simulation(
    pool: &PgPool,
    chat: &dyn ChatCompletion,
    user_id: Uuid,
    language: &str,
    target_role: &str,
    total_rounds: i32,
) -> Result<StartedSimulation, AppError> {
    let prompt = SCENARIO_PROMPT_TEMPLATE
        .replace("{language}", language)
        .replace("{target_role}", target_role);
    let messages = [ChatMessage::system(SCENARIO_SYSTEM), ChatMessage::user(prompt)];
    let scenario = complete_json::<Scenario>(chat, &messages)
        .await
        .map_err(|e| AppError::Llm(format!("Scenario generation failed: {e}")))?;

    let scenario_value =
        serde_json::to_value(&scenario).map_err(|e| AppError::Internal(e.into()))?;
    let history = vec![Turn::new(ROLE_COUNTERPART, scenario.opening_line.clone())];
    let history_value = serde_json::to_value(&history).map_err(|e| AppError::Internal(e.into()))?;

    let simulation = sqlx::query_as::<_, SimulationRow>(
        r#"
        INSERT INTO simulations
            (id, user_id, language, scenario, history, rounds_played, total_rounds, status)
        VALUES ($1, $2, $3, $4, $5, 0, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(language)
    .bind(&scenario_value)
    .bind(&history_value)
    .bind(total_rounds)
    .bind(STATUS_IN_PROGRESS)
    .fetch_one(pool)
    .await?;

    info!("Started simulation {} for user {user_id}", simulation.id);

    Ok(StartedSimulation {
        simulation,
        scenario,
    })
}

/// Records the participant's message and advances the simulation by exactly
/// one round. Same write-guard discipline as the interview engine.
pub async fn submit_response(
    pool: &PgPool,
    chat: &dyn ChatCompletion,
    simulation_id: Uuid,
    round_number: i32,
    message: &str,
) -> Result<RoundOutcome, AppError> {
    let simulation = fetch_simulation(pool, simulation_id).await?;

    if simulation.is_complete() {
        return Err(AppError::Conflict(format!(
            "Simulation {simulation_id} is already complete"
        )));
    }
    verify_turn(simulation.rounds_played + 1, round_number)?;

    let mut turns = simulation
        .turns()
        .map_err(|e| AppError::Internal(e.into()))?;
    turns.push(Turn::new(ROLE_PARTICIPANT, message));

    let played = simulation.rounds_played + 1;

    match next_action(played, simulation.total_rounds) {
        NextAction::AskNext => {
            let mut messages = counterpart_messages(&simulation, &turns);
            messages.push(ChatMessage::user(
                REPLY_PROMPT
                    .replace("{round_number}", &(played + 1).to_string())
                    .replace("{total_rounds}", &simulation.total_rounds.to_string()),
            ));
            let reply = complete_json::<CounterpartReply>(chat, &messages)
                .await
                .map_err(|e| AppError::Llm(format!("Counterpart reply failed: {e}")))?;

            turns.push(Turn::new(ROLE_COUNTERPART, reply.reply.clone()));
            persist_rounds(pool, &simulation, &turns, played, None).await?;

            Ok(RoundOutcome::Reply {
                reply: reply.reply,
                round_number: played + 1,
                total_rounds: simulation.total_rounds,
            })
        }
        NextAction::Evaluate => {
            let mut messages = counterpart_messages(&simulation, &turns);
            messages.push(ChatMessage::user(DEBRIEF_PROMPT));
            let debrief = complete_json::<Debrief>(chat, &messages)
                .await
                .map_err(|e| AppError::Llm(format!("Debrief failed: {e}")))?;

            let debrief_value =
                serde_json::to_value(&debrief).map_err(|e| AppError::Internal(e.into()))?;
            persist_rounds(pool, &simulation, &turns, played, Some(&debrief_value)).await?;

            sqlx::query(
                "UPDATE users SET has_completed_simulation = TRUE, updated_at = now() WHERE id = $1",
            )
            .bind(simulation.user_id)
            .execute(pool)
            .await?;

            info!(
                "Simulation {} complete for user {} after {} rounds",
                simulation.id, simulation.user_id, played
            );

            Ok(RoundOutcome::Debrief {
                debrief,
                total_rounds: simulation.total_rounds,
            })
        }
    }
}

pub async fn fetch_simulation(pool: &PgPool, id: Uuid) -> Result<SimulationRow, AppError> {
    sqlx::query_as::<_, SimulationRow>("SELECT * FROM simulations WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Simulation {id} not found")))
}

/// Maps the transcript onto chat roles: the counterpart is the assistant.
fn counterpart_messages(simulation: &SimulationRow, turns: &[Turn]) -> Vec<ChatMessage> {
    let system = COUNTERPART_SYSTEM_TEMPLATE
        .replace("{language}", &simulation.language)
        .replace("{total_rounds}", &simulation.total_rounds.to_string())
        .replace("{scenario}", &simulation.scenario.to_string());

    let mut messages = vec![ChatMessage::system(system)];
    for turn in turns {
        if turn.role == ROLE_COUNTERPART {
            messages.push(ChatMessage::assistant(turn.content.clone()));
        } else {
            messages.push(ChatMessage::user(turn.content.clone()));
        }
    }
    messages
}

async fn persist_rounds(
    pool: &PgPool,
    simulation: &SimulationRow,
    turns: &[Turn],
    played: i32,
    debrief: Option<&serde_json::Value>,
) -> Result<(), AppError> {
    let history_value = serde_json::to_value(turns).map_err(|e| AppError::Internal(e.into()))?;
    let status = if debrief.is_some() {
        STATUS_COMPLETE
    } else {
        STATUS_IN_PROGRESS
    };

    let result = sqlx::query(
        r#"
        UPDATE simulations
        SET history = $1, rounds_played = $2, status = $3,
            debrief = COALESCE($4, debrief), updated_at = now()
        WHERE id = $5 AND rounds_played = $6 AND status = $7
        "#,
    )
    .bind(&history_value)
    .bind(played)
    .bind(status)
    .bind(debrief)
    .bind(simulation.id)
    .bind(simulation.rounds_played)
    .bind(STATUS_IN_PROGRESS)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(
            "Simulation advanced concurrently; refetch state and retry".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scenario_schema_deserializes() {
        let payload = json!({
            "title": "Pushback on a re-org",
            "setting": "Quarterly planning.",
            "counterpart": "a skeptical VP of Engineering",
            "objective": "Get sign-off on the new team split",
            "opening_line": "I've read your proposal. I'm not convinced."
        });
        let scenario: Scenario = serde_json::from_value(payload).unwrap();
        assert_eq!(scenario.counterpart, "a skeptical VP of Engineering");
    }

    #[test]
    fn test_debrief_schema_rejects_missing_fields() {
        let payload = json!({"summary": "fine"});
        assert!(serde_json::from_value::<Debrief>(payload).is_err());
    }

    #[test]
    fn test_round_outcome_serializes_with_kind_tag() {
        let outcome = RoundOutcome::Reply {
            reply: "Go on.".to_string(),
            round_number: 2,
            total_rounds: 8,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["kind"], "reply");
        assert_eq!(value["round_number"], 2);
    }
}
