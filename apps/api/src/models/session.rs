use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A scheduled briefing session, tied to a user by email. Created and
/// deleted by admins only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BriefingSessionRow {
    pub id: Uuid,
    pub user_email: String,
    pub topic: String,
    pub scheduled_at: DateTime<Utc>,
    pub meeting_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
