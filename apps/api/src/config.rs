use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Only `DATABASE_URL` is required; the AI provider values here are
/// env-level defaults that the DB-backed settings store overrides at
/// request time.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub ai_provider: String,
    pub deepseek_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub deepseek_base_url: String,
    pub openai_base_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            ai_provider: std::env::var("AI_PROVIDER").unwrap_or_else(|_| "deepseek".to_string()),
            deepseek_api_key: std::env::var("DEEPSEEK_API_KEY").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            deepseek_base_url: std::env::var("DEEPSEEK_BASE_URL")
                .unwrap_or_else(|_| "https://api.deepseek.com".to_string()),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
