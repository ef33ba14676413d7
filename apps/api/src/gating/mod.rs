//! Server-side access gating.
//!
//! The dashboard's progression is a hard-coded waterfall evaluated in one
//! place: always-open areas, then the diagnosis-started gate, the
//! diagnosis-complete gate, the strategic-intelligence gate, the
//! simulation-completed gate, the scorecard gate, and finally the
//! trial-expiry fallback. Admins bypass every gate. The readiness endpoint
//! reports the lock map and the gated user endpoints enforce it.

pub mod handlers;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::user::{ProgressProfile, UserRole};

/// Navigable areas of the user dashboard, in waterfall order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    Overview,
    Diagnosis,
    CareerReport,
    StrategicIntelligence,
    Simulation,
    Academy,
    Mentor,
    PerformanceProfile,
    Recommendation,
}

pub const ALL_AREAS: &[Area] = &[
    Area::Overview,
    Area::Diagnosis,
    Area::CareerReport,
    Area::StrategicIntelligence,
    Area::Simulation,
    Area::Academy,
    Area::Mentor,
    Area::PerformanceProfile,
    Area::Recommendation,
];

#[derive(Debug, Clone, Serialize)]
pub struct Access {
    pub area: Area,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl Access {
    fn open(area: Area) -> Self {
        Access {
            area,
            locked: false,
            reason: None,
        }
    }

    fn locked(area: Area, reason: &'static str) -> Self {
        Access {
            area,
            locked: true,
            reason: Some(reason),
        }
    }
}

/// Evaluates the waterfall for one area.
pub fn evaluate(profile: &ProgressProfile, area: Area) -> Access {
    if profile.role == UserRole::Admin {
        return Access::open(area);
    }

    // Always-open areas sit above every gate, including trial expiry.
    if matches!(area, Area::Overview | Area::Diagnosis) {
        return Access::open(area);
    }

    if profile.trial_expired && profile.role == UserRole::Member {
        return Access::locked(area, "trial_expired");
    }

    match area {
        Area::Overview | Area::Diagnosis => unreachable!("handled above"),
        Area::CareerReport => {
            if profile.diagnosis_started {
                Access::open(area)
            } else {
                Access::locked(area, "diagnosis_not_started")
            }
        }
        Area::StrategicIntelligence => {
            if profile.is_diagnosis_complete {
                Access::open(area)
            } else {
                Access::locked(area, "diagnosis_incomplete")
            }
        }
        Area::Simulation => {
            if profile.is_diagnosis_complete && profile.has_sci {
                Access::open(area)
            } else {
                Access::locked(area, "strategic_intelligence_required")
            }
        }
        Area::Academy | Area::Mentor => {
            if profile.has_completed_simulation {
                Access::open(area)
            } else {
                Access::locked(area, "simulation_not_completed")
            }
        }
        Area::PerformanceProfile | Area::Recommendation => {
            if profile.has_scorecard {
                Access::open(area)
            } else {
                Access::locked(area, "scorecard_required")
            }
        }
    }
}

/// Evaluates every area, for the readiness endpoint.
pub fn evaluate_all(profile: &ProgressProfile) -> Vec<Access> {
    ALL_AREAS.iter().map(|&a| evaluate(profile, a)).collect()
}

/// Enforcement used by gated endpoints: 403 with the gate reason when locked.
pub fn require_unlocked(profile: &ProgressProfile, area: Area) -> Result<(), AppError> {
    let access = evaluate(profile, area);
    if access.locked {
        return Err(AppError::Forbidden(format!(
            "{:?} is locked: {}",
            area,
            access.reason.unwrap_or("locked")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: UserRole) -> ProgressProfile {
        ProgressProfile {
            role,
            diagnosis_started: false,
            is_diagnosis_complete: false,
            has_sci: false,
            has_completed_simulation: false,
            has_scorecard: false,
            trial_expired: false,
        }
    }

    #[test]
    fn test_admin_unlocks_every_area() {
        let p = profile(UserRole::Admin);
        for access in evaluate_all(&p) {
            assert!(!access.locked, "{:?} should be open for admin", access.area);
        }
    }

    #[test]
    fn test_overview_and_diagnosis_always_open() {
        let mut p = profile(UserRole::Member);
        p.trial_expired = true;
        assert!(!evaluate(&p, Area::Overview).locked);
        assert!(!evaluate(&p, Area::Diagnosis).locked);
    }

    #[test]
    fn test_simulation_locked_without_sci_and_diagnosis() {
        // hasSCI == false and isDiagnosisComplete == false → simulation locked.
        let p = profile(UserRole::Member);
        let access = evaluate(&p, Area::Simulation);
        assert!(access.locked);
        assert_eq!(access.reason, Some("strategic_intelligence_required"));
    }

    #[test]
    fn test_simulation_needs_both_flags() {
        let mut p = profile(UserRole::Member);
        p.is_diagnosis_complete = true;
        assert!(evaluate(&p, Area::Simulation).locked);
        p.has_sci = true;
        assert!(!evaluate(&p, Area::Simulation).locked);
    }

    #[test]
    fn test_career_report_needs_started_diagnosis() {
        let mut p = profile(UserRole::Member);
        assert!(evaluate(&p, Area::CareerReport).locked);
        p.diagnosis_started = true;
        assert!(!evaluate(&p, Area::CareerReport).locked);
    }

    #[test]
    fn test_strategic_intelligence_needs_complete_diagnosis() {
        let mut p = profile(UserRole::Member);
        p.diagnosis_started = true;
        assert!(evaluate(&p, Area::StrategicIntelligence).locked);
        p.is_diagnosis_complete = true;
        assert!(!evaluate(&p, Area::StrategicIntelligence).locked);
    }

    #[test]
    fn test_academy_and_mentor_need_completed_simulation() {
        let mut p = profile(UserRole::Member);
        p.is_diagnosis_complete = true;
        p.has_sci = true;
        assert!(evaluate(&p, Area::Academy).locked);
        assert!(evaluate(&p, Area::Mentor).locked);
        p.has_completed_simulation = true;
        assert!(!evaluate(&p, Area::Academy).locked);
        assert!(!evaluate(&p, Area::Mentor).locked);
    }

    #[test]
    fn test_documents_need_scorecard() {
        let mut p = profile(UserRole::Member);
        p.has_completed_simulation = true;
        assert!(evaluate(&p, Area::PerformanceProfile).locked);
        assert!(evaluate(&p, Area::Recommendation).locked);
        p.has_scorecard = true;
        assert!(!evaluate(&p, Area::PerformanceProfile).locked);
        assert!(!evaluate(&p, Area::Recommendation).locked);
    }

    #[test]
    fn test_trial_expiry_locks_gated_areas_for_members() {
        let mut p = profile(UserRole::Member);
        p.diagnosis_started = true;
        p.is_diagnosis_complete = true;
        p.has_sci = true;
        p.trial_expired = true;
        let access = evaluate(&p, Area::Simulation);
        assert!(access.locked);
        assert_eq!(access.reason, Some("trial_expired"));
    }

    #[test]
    fn test_trial_expiry_does_not_lock_premium() {
        let mut p = profile(UserRole::Premium);
        p.diagnosis_started = true;
        p.is_diagnosis_complete = true;
        p.has_sci = true;
        p.trial_expired = true;
        assert!(!evaluate(&p, Area::Simulation).locked);
    }

    #[test]
    fn test_require_unlocked_maps_to_forbidden() {
        let p = profile(UserRole::Member);
        let err = require_unlocked(&p, Area::Mentor).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
