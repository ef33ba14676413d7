use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A platform user. Progress flags are mutated by flow-completion events
/// (diagnosis, simulation) and by admin actions; rows are deleted only via
/// admin cancel.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    /// "member", "premium" or "admin".
    pub role: String,
    pub plan: String,
    pub is_diagnosis_complete: bool,
    pub has_sci: bool,
    pub has_completed_simulation: bool,
    pub has_scorecard: bool,
    /// "none", "requested", "active" or "cancelled".
    pub mandate_status: String,
    pub trial_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Member,
    Premium,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Premium => "premium",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(UserRole::Member),
            "premium" => Some(UserRole::Premium),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// The gating-relevant view of a user, consumed by `gating::evaluate`.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressProfile {
    pub role: UserRole,
    pub diagnosis_started: bool,
    pub is_diagnosis_complete: bool,
    pub has_sci: bool,
    pub has_completed_simulation: bool,
    pub has_scorecard: bool,
    pub trial_expired: bool,
}

impl ProgressProfile {
    /// Builds the profile from a user row plus the diagnosis-started lookup.
    pub fn from_row(user: &UserRow, diagnosis_started: bool, now: DateTime<Utc>) -> Self {
        ProgressProfile {
            role: UserRole::parse(&user.role).unwrap_or(UserRole::Member),
            diagnosis_started,
            is_diagnosis_complete: user.is_diagnosis_complete,
            has_sci: user.has_sci,
            has_completed_simulation: user.has_completed_simulation,
            has_scorecard: user.has_scorecard,
            trial_expired: user.trial_expires_at.map(|t| t < now).unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Member, UserRole::Premium, UserRole::Admin] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_parse_unknown_is_none() {
        assert_eq!(UserRole::parse("superuser"), None);
    }

    #[test]
    fn test_role_serde_snake_case() {
        let role: UserRole = serde_json::from_str(r#""premium""#).unwrap();
        assert_eq!(role, UserRole::Premium);
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), r#""admin""#);
    }

    fn sample_user(trial_expires_at: Option<DateTime<Utc>>) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "a@b.test".to_string(),
            full_name: "A B".to_string(),
            role: "member".to_string(),
            plan: "trial".to_string(),
            is_diagnosis_complete: false,
            has_sci: false,
            has_completed_simulation: false,
            has_scorecard: false,
            mandate_status: "none".to_string(),
            trial_expires_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_trial_expired() {
        let now = Utc::now();
        let user = sample_user(Some(now - chrono::Duration::days(1)));
        let profile = ProgressProfile::from_row(&user, false, now);
        assert!(profile.trial_expired);
    }

    #[test]
    fn test_profile_no_trial_means_not_expired() {
        let now = Utc::now();
        let user = sample_user(None);
        let profile = ProgressProfile::from_row(&user, false, now);
        assert!(!profile.trial_expired);
    }

    #[test]
    fn test_profile_unknown_role_defaults_to_member() {
        let now = Utc::now();
        let mut user = sample_user(None);
        user.role = "mystery".to_string();
        let profile = ProgressProfile::from_row(&user, false, now);
        assert_eq!(profile.role, UserRole::Member);
    }
}
