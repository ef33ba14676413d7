//! The diagnosis progression engine: a fixed-length question/answer loop
//! between the candidate and the AI interviewer, ending in a final
//! evaluation.
//!
//! Ordering invariant: the LLM is always called BEFORE anything is written,
//! so a malformed AI response surfaces as an error with the transcript
//! untouched. Writes are guarded on the current `questions_asked` value, so
//! a duplicate or stale submit gets a 409 instead of double processing and
//! the evaluation branch persists exactly once.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::prompts::{
    skip_message, CV_ANALYSIS_PROMPT_TEMPLATE, CV_ANALYSIS_SYSTEM, EVALUATION_PROMPT,
    INTERVIEWER_SYSTEM_TEMPLATE, NEXT_QUESTION_PROMPT,
};
use crate::llm_client::{complete_json, ChatCompletion, ChatMessage};
use crate::models::progression::{DiagnosisRow, Turn, STATUS_COMPLETE, STATUS_IN_PROGRESS};

pub const DEFAULT_TOTAL_QUESTIONS: i32 = 15;

pub const ROLE_INTERVIEWER: &str = "interviewer";
pub const ROLE_CANDIDATE: &str = "candidate";

/// Structured CV analysis, the input to the interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvAnalysis {
    pub summary: String,
    pub seniority: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub suggested_roles: Vec<String>,
}

/// Schema for the interviewer's next-question response.
#[derive(Debug, Deserialize)]
pub struct NextQuestion {
    pub question: String,
}

/// Schema for the final evaluation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub overall_score: f64,
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub recommendation: String,
}

/// What the engine did with a submitted answer.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnOutcome {
    Question {
        question: String,
        question_number: i32,
        total_questions: i32,
    },
    Evaluation {
        evaluation: Evaluation,
        total_questions: i32,
    },
}

/// Decision taken after recording the Nth answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    AskNext,
    Evaluate,
}

/// After recording answer `answered` of `total`: ask another question while
/// under the budget, evaluate exactly at it.
pub fn next_action(answered: i32, total: i32) -> NextAction {
    if answered < total {
        NextAction::AskNext
    } else {
        NextAction::Evaluate
    }
}

/// The turn-sequence guard. Clients submit the question number they are
/// answering; a mismatch means a duplicate submit or a stale client and is
/// rejected before any LLM call or write.
pub fn verify_turn(expected: i32, provided: i32) -> Result<(), AppError> {
    if provided != expected {
        return Err(AppError::Conflict(format!(
            "Expected answer to question {expected}, got {provided}"
        )));
    }
    Ok(())
}

/// Runs the CV analysis. Stateless: the result is handed back to the client
/// and resubmitted with `start`.
pub async fn analyze_cv(
    chat: &dyn ChatCompletion,
    cv_text: &str,
    language: &str,
) -> Result<CvAnalysis, AppError> {
    let prompt = CV_ANALYSIS_PROMPT_TEMPLATE
        .replace("{language}", language)
        .replace("{cv_text}", cv_text);
    let messages = [
        ChatMessage::system(CV_ANALYSIS_SYSTEM),
        ChatMessage::user(prompt),
    ];
    complete_json::<CvAnalysis>(chat, &messages)
        .await
        .map_err(|e| AppError::Llm(format!("CV analysis failed: {e}")))
}

pub struct StartedDiagnosis {
    pub diagnosis: DiagnosisRow,
    pub question: String,
}

/// Creates a diagnosis and asks the interviewer for question 1.
pub async fn start_diagnosis(
    pool: &PgPool,
    chat: &dyn ChatCompletion,
    user_id: Uuid,
    language: &str,
    cv_analysis: &CvAnalysis,
    total_questions: i32,
) -> Result<StartedDiagnosis, AppError> {
    let analysis_value =
        serde_json::to_value(cv_analysis).map_err(|e| AppError::Internal(e.into()))?;

    let first = ask_question(chat, language, &analysis_value, &[], 1, total_questions).await?;
    let history = vec![Turn::new(ROLE_INTERVIEWER, first.question.clone())];
    let history_value =
        serde_json::to_value(&history).map_err(|e| AppError::Internal(e.into()))?;

    let diagnosis = sqlx::query_as::<_, DiagnosisRow>(
        r#"
        INSERT INTO diagnoses
            (id, user_id, language, cv_analysis, history, questions_asked, total_questions, status)
        VALUES ($1, $2, $3, $4, $5, 0, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(language)
    .bind(&analysis_value)
    .bind(&history_value)
    .bind(total_questions)
    .bind(STATUS_IN_PROGRESS)
    .fetch_one(pool)
    .await?;

    info!("Started diagnosis {} for user {user_id}", diagnosis.id);

    Ok(StartedDiagnosis {
        diagnosis,
        question: first.question,
    })
}

/// Records an answer (or the canned skip message) and advances the loop by
/// exactly one question.
pub async fn submit_answer(
    pool: &PgPool,
    chat: &dyn ChatCompletion,
    diagnosis_id: Uuid,
    question_number: i32,
    answer: &str,
) -> Result<TurnOutcome, AppError> {
    let diagnosis = fetch_diagnosis(pool, diagnosis_id).await?;

    if diagnosis.is_complete() {
        return Err(AppError::Conflict(format!(
            "Diagnosis {diagnosis_id} is already complete"
        )));
    }
    verify_turn(diagnosis.questions_asked + 1, question_number)?;

    let mut turns = diagnosis
        .turns()
        .map_err(|e| AppError::Internal(e.into()))?;
    turns.push(Turn::new(ROLE_CANDIDATE, answer));

    let answered = diagnosis.questions_asked + 1;

    match next_action(answered, diagnosis.total_questions) {
        NextAction::AskNext => {
            let next = ask_question(
                chat,
                &diagnosis.language,
                &diagnosis.cv_analysis,
                &turns,
                answered + 1,
                diagnosis.total_questions,
            )
            .await?;
            turns.push(Turn::new(ROLE_INTERVIEWER, next.question.clone()));
            persist_turns(pool, &diagnosis, &turns, answered, None).await?;

            Ok(TurnOutcome::Question {
                question: next.question,
                question_number: answered + 1,
                total_questions: diagnosis.total_questions,
            })
        }
        NextAction::Evaluate => {
            let evaluation = run_evaluation(chat, &diagnosis, &turns).await?;
            let evaluation_value =
                serde_json::to_value(&evaluation).map_err(|e| AppError::Internal(e.into()))?;
            persist_turns(pool, &diagnosis, &turns, answered, Some(&evaluation_value)).await?;

            sqlx::query("UPDATE users SET is_diagnosis_complete = TRUE, updated_at = now() WHERE id = $1")
                .bind(diagnosis.user_id)
                .execute(pool)
                .await?;

            info!(
                "Diagnosis {} complete for user {} after {} questions",
                diagnosis.id, diagnosis.user_id, answered
            );

            Ok(TurnOutcome::Evaluation {
                evaluation,
                total_questions: diagnosis.total_questions,
            })
        }
    }
}

/// Skips the current question: substitutes the canned "I don't know" in the
/// diagnosis language and proceeds exactly like an answer.
pub async fn skip_question(
    pool: &PgPool,
    chat: &dyn ChatCompletion,
    diagnosis_id: Uuid,
    question_number: i32,
) -> Result<TurnOutcome, AppError> {
    let language = sqlx::query_scalar::<_, String>("SELECT language FROM diagnoses WHERE id = $1")
        .bind(diagnosis_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Diagnosis {diagnosis_id} not found")))?;

    submit_answer(
        pool,
        chat,
        diagnosis_id,
        question_number,
        skip_message(&language),
    )
    .await
}

pub async fn fetch_diagnosis(pool: &PgPool, id: Uuid) -> Result<DiagnosisRow, AppError> {
    sqlx::query_as::<_, DiagnosisRow>("SELECT * FROM diagnoses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Diagnosis {id} not found")))
}

async fn ask_question(
    chat: &dyn ChatCompletion,
    language: &str,
    cv_analysis: &serde_json::Value,
    turns: &[Turn],
    question_number: i32,
    total_questions: i32,
) -> Result<NextQuestion, AppError> {
    let mut messages = interviewer_messages(language, cv_analysis, turns, total_questions);
    messages.push(ChatMessage::user(
        NEXT_QUESTION_PROMPT
            .replace("{question_number}", &question_number.to_string())
            .replace("{total_questions}", &total_questions.to_string()),
    ));
    complete_json::<NextQuestion>(chat, &messages)
        .await
        .map_err(|e| AppError::Llm(format!("Next question failed: {e}")))
}

async fn run_evaluation(
    chat: &dyn ChatCompletion,
    diagnosis: &DiagnosisRow,
    turns: &[Turn],
) -> Result<Evaluation, AppError> {
    let mut messages = interviewer_messages(
        &diagnosis.language,
        &diagnosis.cv_analysis,
        turns,
        diagnosis.total_questions,
    );
    messages.push(ChatMessage::user(EVALUATION_PROMPT));
    complete_json::<Evaluation>(chat, &messages)
        .await
        .map_err(|e| AppError::Llm(format!("Evaluation failed: {e}")))
}

/// Maps the persisted transcript onto chat roles: the interviewer is the
/// assistant, the candidate is the user.
pub fn interviewer_messages(
    language: &str,
    cv_analysis: &serde_json::Value,
    turns: &[Turn],
    total_questions: i32,
) -> Vec<ChatMessage> {
    let system = INTERVIEWER_SYSTEM_TEMPLATE
        .replace("{language}", language)
        .replace("{total_questions}", &total_questions.to_string())
        .replace("{cv_analysis}", &cv_analysis.to_string());

    let mut messages = vec![ChatMessage::system(system)];
    for turn in turns {
        if turn.role == ROLE_INTERVIEWER {
            messages.push(ChatMessage::assistant(turn.content.clone()));
        } else {
            messages.push(ChatMessage::user(turn.content.clone()));
        }
    }
    messages
}

/// Guarded write: only succeeds if `questions_asked` is still the value we
/// read, so concurrent duplicate submits cannot both land.
async fn persist_turns(
    pool: &PgPool,
    diagnosis: &DiagnosisRow,
    turns: &[Turn],
    answered: i32,
    evaluation: Option<&serde_json::Value>,
) -> Result<(), AppError> {
    let history_value = serde_json::to_value(turns).map_err(|e| AppError::Internal(e.into()))?;
    let status = if evaluation.is_some() {
        STATUS_COMPLETE
    } else {
        STATUS_IN_PROGRESS
    };

    let result = sqlx::query(
        r#"
        UPDATE diagnoses
        SET history = $1, questions_asked = $2, status = $3,
            evaluation = COALESCE($4, evaluation), updated_at = now()
        WHERE id = $5 AND questions_asked = $6 AND status = $7
        "#,
    )
    .bind(&history_value)
    .bind(answered)
    .bind(status)
    .bind(evaluation)
    .bind(diagnosis.id)
    .bind(diagnosis.questions_asked)
    .bind(STATUS_IN_PROGRESS)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(
            "Diagnosis advanced concurrently; refetch state and retry".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_next_action_under_budget_asks_next() {
        assert_eq!(next_action(1, 15), NextAction::AskNext);
        assert_eq!(next_action(14, 15), NextAction::AskNext);
    }

    #[test]
    fn test_next_action_at_budget_evaluates() {
        assert_eq!(next_action(15, 15), NextAction::Evaluate);
    }

    #[test]
    fn test_verify_turn_accepts_expected() {
        assert!(verify_turn(3, 3).is_ok());
    }

    #[test]
    fn test_verify_turn_rejects_duplicate_submit() {
        // Client re-submits question 3 after it was already recorded.
        let err = verify_turn(4, 3).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_verify_turn_rejects_skipped_ahead() {
        assert!(verify_turn(3, 7).is_err());
    }

    #[test]
    fn test_interviewer_messages_map_roles() {
        let turns = vec![
            Turn::new(ROLE_INTERVIEWER, "Q1?"),
            Turn::new(ROLE_CANDIDATE, "A1."),
            Turn::new(ROLE_INTERVIEWER, "Q2?"),
        ];
        let messages = interviewer_messages("en", &json!({"summary": "x"}), &turns, 15);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("15 questions"));
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[2].role, "user");
        assert_eq!(messages[3].role, "assistant");
    }

    #[test]
    fn test_evaluation_schema_deserializes() {
        let payload = json!({
            "overall_score": 7.5,
            "summary": "Solid performance.",
            "strengths": ["Clear communication"],
            "improvement_areas": ["System design depth"],
            "recommendation": "Practice architecture interviews."
        });
        let eval: Evaluation = serde_json::from_value(payload).unwrap();
        assert!((eval.overall_score - 7.5).abs() < f64::EPSILON);
        assert_eq!(eval.strengths.len(), 1);
    }

    #[test]
    fn test_cv_analysis_schema_rejects_missing_fields() {
        let payload = json!({"summary": "only a summary"});
        assert!(serde_json::from_value::<CvAnalysis>(payload).is_err());
    }

    /// One scripted LLM turn: the fake returns canned JSON, letting the
    /// message-building and parse path run without a network call.
    struct ScriptedChat(&'static str);

    #[async_trait::async_trait]
    impl ChatCompletion for ScriptedChat {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, crate::llm_client::LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_analyze_cv_with_scripted_chat() {
        let chat = ScriptedChat(
            r#"{"summary":"Backend engineer.","seniority":"senior",
               "strengths":["Rust"],"gaps":["Leadership"],"suggested_roles":["Staff engineer"]}"#,
        );
        let analysis = analyze_cv(&chat, "cv text", "en").await.unwrap();
        assert_eq!(analysis.seniority, "senior");
        assert_eq!(analysis.suggested_roles, vec!["Staff engineer"]);
    }

    #[tokio::test]
    async fn test_analyze_cv_malformed_json_is_llm_error() {
        let chat = ScriptedChat("I cannot produce JSON today.");
        let err = analyze_cv(&chat, "cv text", "en").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
