use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::leads::{require_field, validate_email};
use crate::models::lead::{LeadKind, LeadRow, LeadStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConsultingInquiryRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RecruitmentApplicationRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub linkedin_url: Option<String>,
    pub cv_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MandateRequestRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub plan: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeadCreatedResponse {
    pub id: Uuid,
    pub status: LeadStatus,
}

async fn insert_lead(
    pool: &PgPool,
    kind: LeadKind,
    full_name: &str,
    email: &str,
    phone: Option<&str>,
    details: serde_json::Value,
) -> Result<LeadRow, AppError> {
    let lead = sqlx::query_as::<_, LeadRow>(
        r#"
        INSERT INTO leads (id, kind, full_name, email, phone, details, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(kind.as_str())
    .bind(full_name.trim())
    .bind(email.trim())
    .bind(phone)
    .bind(details)
    .bind(LeadStatus::Pending.as_str())
    .fetch_one(pool)
    .await?;
    Ok(lead)
}

/// POST /api/v1/consulting-inquiry
pub async fn handle_consulting_inquiry(
    State(state): State<AppState>,
    Json(request): Json<ConsultingInquiryRequest>,
) -> Result<Json<LeadCreatedResponse>, AppError> {
    require_field("full_name", &request.full_name)?;
    validate_email(&request.email)?;
    require_field("company", &request.company)?;
    require_field("message", &request.message)?;

    let lead = insert_lead(
        &state.db,
        LeadKind::ConsultingInquiry,
        &request.full_name,
        &request.email,
        request.phone.as_deref(),
        json!({ "company": request.company, "message": request.message }),
    )
    .await?;

    Ok(Json(LeadCreatedResponse {
        id: lead.id,
        status: LeadStatus::Pending,
    }))
}

/// POST /api/v1/recruitment
pub async fn handle_recruitment_application(
    State(state): State<AppState>,
    Json(request): Json<RecruitmentApplicationRequest>,
) -> Result<Json<LeadCreatedResponse>, AppError> {
    require_field("full_name", &request.full_name)?;
    validate_email(&request.email)?;
    require_field("position", &request.position)?;

    let lead = insert_lead(
        &state.db,
        LeadKind::RecruitmentApplication,
        &request.full_name,
        &request.email,
        request.phone.as_deref(),
        json!({
            "position": request.position,
            "linkedin_url": request.linkedin_url,
            "cv_summary": request.cv_summary,
        }),
    )
    .await?;

    Ok(Json(LeadCreatedResponse {
        id: lead.id,
        status: LeadStatus::Pending,
    }))
}

/// POST /api/v1/mandate-request
pub async fn handle_mandate_request(
    State(state): State<AppState>,
    Json(request): Json<MandateRequestRequest>,
) -> Result<Json<LeadCreatedResponse>, AppError> {
    require_field("full_name", &request.full_name)?;
    validate_email(&request.email)?;
    require_field("plan", &request.plan)?;

    let lead = insert_lead(
        &state.db,
        LeadKind::MandateRequest,
        &request.full_name,
        &request.email,
        request.phone.as_deref(),
        json!({ "plan": request.plan, "notes": request.notes }),
    )
    .await?;

    Ok(Json(LeadCreatedResponse {
        id: lead.id,
        status: LeadStatus::Pending,
    }))
}
