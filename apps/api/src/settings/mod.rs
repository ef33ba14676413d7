//! DB-backed key-value settings overriding environment defaults.
//!
//! Reads never fail a request: a missing key or a database error falls back
//! to the supplied default (logged).

pub mod handlers;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SettingRow {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Returns the stored value for `key`, or `None` if unset. A database error
/// is logged and treated as unset.
pub async fn get(pool: &PgPool, key: &str) -> Option<String> {
    let result: Result<Option<String>, sqlx::Error> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await;

    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("Settings read for '{key}' failed, using fallback: {e}");
            None
        }
    }
}

/// Returns the stored value for `key`, falling back to `default`.
pub async fn get_or(pool: &PgPool, key: &str, default: &str) -> String {
    resolve_value(get(pool, key).await, default)
}

/// DB value wins when present and non-empty; otherwise the caller's default
/// (typically an environment variable) applies.
pub fn resolve_value(db_value: Option<String>, default: &str) -> String {
    match db_value {
        Some(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

/// Upserts a setting.
pub async fn set(pool: &PgPool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES ($1, $2, now())
        ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns all settings, for the admin config page.
pub async fn list(pool: &PgPool) -> Result<Vec<SettingRow>, sqlx::Error> {
    sqlx::query_as::<_, SettingRow>("SELECT * FROM settings ORDER BY key ASC")
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_db_value() {
        assert_eq!(resolve_value(Some("db".to_string()), "env"), "db");
    }

    #[test]
    fn test_resolve_unset_key_returns_default() {
        assert_eq!(resolve_value(None, "env-default"), "env-default");
    }

    #[test]
    fn test_resolve_empty_db_value_returns_default() {
        assert_eq!(resolve_value(Some(String::new()), "env-default"), "env-default");
    }
}
