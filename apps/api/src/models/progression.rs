//! Rows for the two turn-based flows: the CV diagnosis interview and the
//! role simulation. Both persist their transcript as a JSONB array of turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETE: &str = "complete";

/// One transcript entry. `role` is "interviewer", "candidate", "coach" or
/// "participant" depending on the flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    pub content: String,
}

impl Turn {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Turn {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// A CV diagnosis: the analysis, the running interview transcript, and the
/// final evaluation once `questions_asked` reaches `total_questions`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DiagnosisRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub language: String,
    pub cv_analysis: Value,
    pub history: Value,
    pub questions_asked: i32,
    pub total_questions: i32,
    pub status: String,
    pub evaluation: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiagnosisRow {
    pub fn turns(&self) -> Result<Vec<Turn>, serde_json::Error> {
        serde_json::from_value(self.history.clone())
    }

    pub fn is_complete(&self) -> bool {
        self.status == STATUS_COMPLETE
    }
}

/// A role simulation: an AI-generated scenario, a fixed number of rounds,
/// and a debrief at the end.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SimulationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub language: String,
    pub scenario: Value,
    pub history: Value,
    pub rounds_played: i32,
    pub total_rounds: i32,
    pub status: String,
    pub debrief: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SimulationRow {
    pub fn turns(&self) -> Result<Vec<Turn>, serde_json::Error> {
        serde_json::from_value(self.history.clone())
    }

    pub fn is_complete(&self) -> bool {
        self.status == STATUS_COMPLETE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turns_deserialize_from_history_value() {
        let row = DiagnosisRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            language: "en".to_string(),
            cv_analysis: json!({}),
            history: json!([
                {"role": "interviewer", "content": "Tell me about your last role."},
                {"role": "candidate", "content": "I led a platform team."}
            ]),
            questions_asked: 1,
            total_questions: 15,
            status: STATUS_IN_PROGRESS.to_string(),
            evaluation: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let turns = row.turns().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, "interviewer");
        assert_eq!(turns[1].content, "I led a platform team.");
    }

    #[test]
    fn test_malformed_history_is_an_error_not_a_panic() {
        let row = DiagnosisRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            language: "en".to_string(),
            cv_analysis: json!({}),
            history: json!({"not": "an array"}),
            questions_asked: 0,
            total_questions: 15,
            status: STATUS_IN_PROGRESS.to_string(),
            evaluation: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(row.turns().is_err());
    }
}
