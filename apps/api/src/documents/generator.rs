//! Issued-document generation: performance profiles and recommendation
//! letters, built from the user's aggregated record.
//!
//! Issued documents are immutable: regeneration INSERTs the next version
//! under a fresh reference id, never UPDATEs an issued row.

use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::documents::prompts::{
    DOCUMENT_SYSTEM, MENTOR_PROMPT_TEMPLATE, PERFORMANCE_PROFILE_PROMPT_TEMPLATE,
    RECOMMENDATION_PROMPT_TEMPLATE,
};
use crate::errors::AppError;
use crate::llm_client::{complete_json, ChatCompletion, ChatMessage};
use crate::models::document::{DocumentKind, IssuedDocumentRow};
use crate::models::user::UserRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competency {
    pub name: String,
    pub score: f64,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceProfileDoc {
    pub headline: String,
    pub summary: String,
    pub competencies: Vec<Competency>,
    pub development_priorities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationDoc {
    pub opening: String,
    pub body_paragraphs: Vec<String>,
    pub closing: String,
}

#[derive(Debug, Deserialize)]
pub struct MentorAnswer {
    pub answer: String,
}

/// Human-readable verification id, e.g. "WP-9F3A21B4".
pub fn new_reference_id() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("WP-{}", &id[..8])
}

/// Aggregates everything the document prompts are allowed to see: the user
/// row, the latest diagnosis evaluation, and the latest simulation debrief.
pub async fn aggregate_user_record(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<serde_json::Value, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    let evaluation: Option<serde_json::Value> = sqlx::query_scalar(
        r#"
        SELECT evaluation FROM diagnoses
        WHERE user_id = $1 AND status = 'complete'
        ORDER BY updated_at DESC LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .flatten();

    let debrief: Option<serde_json::Value> = sqlx::query_scalar(
        r#"
        SELECT debrief FROM simulations
        WHERE user_id = $1 AND status = 'complete'
        ORDER BY updated_at DESC LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .flatten();

    Ok(json!({
        "full_name": user.full_name,
        "plan": user.plan,
        "diagnosis_evaluation": evaluation,
        "simulation_debrief": debrief,
    }))
}

/// Inserts the next version of a document for the user. Append-only.
pub async fn issue_document(
    pool: &PgPool,
    user_id: Uuid,
    kind: DocumentKind,
    content: &serde_json::Value,
) -> Result<IssuedDocumentRow, AppError> {
    let current_max: Option<i32> = sqlx::query_scalar(
        "SELECT MAX(version) FROM issued_documents WHERE user_id = $1 AND kind = $2",
    )
    .bind(user_id)
    .bind(kind.as_str())
    .fetch_one(pool)
    .await?;
    let version = current_max.unwrap_or(0) + 1;
    let reference_id = new_reference_id();

    let row = sqlx::query_as::<_, IssuedDocumentRow>(
        r#"
        INSERT INTO issued_documents (id, reference_id, user_id, kind, version, content)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&reference_id)
    .bind(user_id)
    .bind(kind.as_str())
    .bind(version)
    .bind(content)
    .fetch_one(pool)
    .await?;

    info!(
        "Issued {} {} v{} for user {}",
        kind.as_str(),
        reference_id,
        version,
        user_id
    );
    Ok(row)
}

/// Latest issued version for a user, if any.
pub async fn latest_document(
    pool: &PgPool,
    user_id: Uuid,
    kind: DocumentKind,
) -> Result<Option<IssuedDocumentRow>, AppError> {
    Ok(sqlx::query_as::<_, IssuedDocumentRow>(
        r#"
        SELECT * FROM issued_documents
        WHERE user_id = $1 AND kind = $2
        ORDER BY version DESC LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(kind.as_str())
    .fetch_optional(pool)
    .await?)
}

/// Public verification lookup by reference id.
pub async fn find_by_reference(
    pool: &PgPool,
    reference_id: &str,
) -> Result<IssuedDocumentRow, AppError> {
    sqlx::query_as::<_, IssuedDocumentRow>(
        "SELECT * FROM issued_documents WHERE reference_id = $1",
    )
    .bind(reference_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Document {reference_id} not found")))
}

/// Generates and issues a performance profile as the next version.
pub async fn generate_performance_profile(
    pool: &PgPool,
    chat: &dyn ChatCompletion,
    user_id: Uuid,
    language: &str,
) -> Result<IssuedDocumentRow, AppError> {
    let record = aggregate_user_record(pool, user_id).await?;
    let prompt = PERFORMANCE_PROFILE_PROMPT_TEMPLATE
        .replace("{language}", language)
        .replace("{user_record}", &record.to_string());
    let messages = [ChatMessage::system(DOCUMENT_SYSTEM), ChatMessage::user(prompt)];

    let doc = complete_json::<PerformanceProfileDoc>(chat, &messages)
        .await
        .map_err(|e| AppError::Llm(format!("Performance profile generation failed: {e}")))?;
    let content = serde_json::to_value(&doc).map_err(|e| AppError::Internal(e.into()))?;

    issue_document(pool, user_id, DocumentKind::PerformanceProfile, &content).await
}

/// Generates and issues a recommendation letter as the next version.
pub async fn generate_recommendation(
    pool: &PgPool,
    chat: &dyn ChatCompletion,
    user_id: Uuid,
    language: &str,
) -> Result<IssuedDocumentRow, AppError> {
    let record = aggregate_user_record(pool, user_id).await?;
    let prompt = RECOMMENDATION_PROMPT_TEMPLATE
        .replace("{language}", language)
        .replace("{user_record}", &record.to_string());
    let messages = [ChatMessage::system(DOCUMENT_SYSTEM), ChatMessage::user(prompt)];

    let doc = complete_json::<RecommendationDoc>(chat, &messages)
        .await
        .map_err(|e| AppError::Llm(format!("Recommendation generation failed: {e}")))?;
    let content = serde_json::to_value(&doc).map_err(|e| AppError::Internal(e.into()))?;

    issue_document(pool, user_id, DocumentKind::Recommendation, &content).await
}

/// One-shot mentor Q&A grounded in the user record. Stateless.
pub async fn mentor_answer(
    pool: &PgPool,
    chat: &dyn ChatCompletion,
    user_id: Uuid,
    question: &str,
    language: &str,
) -> Result<String, AppError> {
    let record = aggregate_user_record(pool, user_id).await?;
    let prompt = MENTOR_PROMPT_TEMPLATE
        .replace("{language}", language)
        .replace("{user_record}", &record.to_string())
        .replace("{question}", question);
    let messages = [ChatMessage::system(DOCUMENT_SYSTEM), ChatMessage::user(prompt)];

    let answer = complete_json::<MentorAnswer>(chat, &messages)
        .await
        .map_err(|e| AppError::Llm(format!("Mentor answer failed: {e}")))?;
    Ok(answer.answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_id_format() {
        let id = new_reference_id();
        assert!(id.starts_with("WP-"));
        assert_eq!(id.len(), 11);
        assert!(id[3..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_reference_ids_are_unique() {
        let a = new_reference_id();
        let b = new_reference_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_performance_profile_schema_deserializes() {
        let payload = serde_json::json!({
            "headline": "Senior backend engineer ready for staff scope",
            "summary": "Strong showing.",
            "competencies": [
                {"name": "Communication", "score": 7.5, "comment": "Clear answers in Q4."}
            ],
            "development_priorities": ["System design depth"]
        });
        let doc: PerformanceProfileDoc = serde_json::from_value(payload).unwrap();
        assert_eq!(doc.competencies.len(), 1);
        assert!((doc.competencies[0].score - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recommendation_schema_rejects_missing_fields() {
        let payload = serde_json::json!({"opening": "Dear hiring manager,"});
        assert!(serde_json::from_value::<RecommendationDoc>(payload).is_err());
    }
}
