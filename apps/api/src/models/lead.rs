#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A public-form lead: consulting inquiry, recruitment application or
/// mandate request. One table, discriminated by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub kind: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Free-shape payload: company/position for inquiries, role/CV summary
    /// for applications, plan/billing details for mandate requests.
    pub details: Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    ConsultingInquiry,
    RecruitmentApplication,
    MandateRequest,
}

impl LeadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadKind::ConsultingInquiry => "consulting_inquiry",
            LeadKind::RecruitmentApplication => "recruitment_application",
            LeadKind::MandateRequest => "mandate_request",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "consulting_inquiry" => Some(LeadKind::ConsultingInquiry),
            "recruitment_application" => Some(LeadKind::RecruitmentApplication),
            "mandate_request" => Some(LeadKind::MandateRequest),
            _ => None,
        }
    }
}

/// Lead lifecycle: `pending` → `contacted`/`reviewed`/`interviewing` →
/// `completed`/`accepted`/`rejected`. The progression is advisory; admin
/// PATCHes may set any known status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Pending,
    Contacted,
    Reviewed,
    Interviewing,
    Completed,
    Accepted,
    Rejected,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Pending => "pending",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Reviewed => "reviewed",
            LeadStatus::Interviewing => "interviewing",
            LeadStatus::Completed => "completed",
            LeadStatus::Accepted => "accepted",
            LeadStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(LeadStatus::Pending),
            "contacted" => Some(LeadStatus::Contacted),
            "reviewed" => Some(LeadStatus::Reviewed),
            "interviewing" => Some(LeadStatus::Interviewing),
            "completed" => Some(LeadStatus::Completed),
            "accepted" => Some(LeadStatus::Accepted),
            "rejected" => Some(LeadStatus::Rejected),
            _ => None,
        }
    }

    /// Terminal statuses end the lead lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LeadStatus::Completed | LeadStatus::Accepted | LeadStatus::Rejected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            LeadStatus::Pending,
            LeadStatus::Contacted,
            LeadStatus::Reviewed,
            LeadStatus::Interviewing,
            LeadStatus::Completed,
            LeadStatus::Accepted,
            LeadStatus::Rejected,
        ] {
            assert_eq!(LeadStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!(LeadStatus::parse("archived"), None);
        assert_eq!(LeadStatus::parse("Pending"), None); // case-sensitive
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(LeadStatus::Completed.is_terminal());
        assert!(LeadStatus::Accepted.is_terminal());
        assert!(LeadStatus::Rejected.is_terminal());
        assert!(!LeadStatus::Pending.is_terminal());
        assert!(!LeadStatus::Interviewing.is_terminal());
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            LeadKind::ConsultingInquiry,
            LeadKind::RecruitmentApplication,
            LeadKind::MandateRequest,
        ] {
            assert_eq!(LeadKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_kind_serde_matches_as_str() {
        let json = serde_json::to_string(&LeadKind::MandateRequest).unwrap();
        assert_eq!(json, r#""mandate_request""#);
    }
}
