#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// An AI-issued document (performance profile or recommendation letter).
/// Immutable once issued: regeneration INSERTs the next version with a fresh
/// reference id, never UPDATEs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IssuedDocumentRow {
    pub id: Uuid,
    /// Human-readable verification id, e.g. "WP-9F3A21B4".
    pub reference_id: String,
    pub user_id: Uuid,
    /// "performance_profile" or "recommendation".
    pub kind: String,
    pub version: i32,
    pub content: Value,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PerformanceProfile,
    Recommendation,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::PerformanceProfile => "performance_profile",
            DocumentKind::Recommendation => "recommendation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "performance_profile" => Some(DocumentKind::PerformanceProfile),
            "recommendation" => Some(DocumentKind::Recommendation),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [DocumentKind::PerformanceProfile, DocumentKind::Recommendation] {
            assert_eq!(DocumentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(DocumentKind::parse("certificate"), None);
    }
}
