/// LLM Client: the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the AI provider directly.
/// All LLM interactions MUST go through this module.
///
/// The active provider (DeepSeek-compatible or OpenAI-compatible) is resolved
/// per call from the DB-backed settings store, falling back to environment
/// defaults. Both speak the OpenAI `/chat/completions` wire format.
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::settings;

pub const DEEPSEEK_MODEL: &str = "deepseek-chat";
pub const OPENAI_MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider misconfigured: {0}")]
    Config(String),

    #[error("No JSON object found in model output")]
    Extract,

    #[error("Invalid format received from AI: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// The configured AI provider. The model id is fixed per provider so a
/// settings change cannot silently point "deepseek" at an OpenAI model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    DeepSeek,
    OpenAi,
}

impl Provider {
    pub fn model(&self) -> &'static str {
        match self {
            Provider::DeepSeek => DEEPSEEK_MODEL,
            Provider::OpenAi => OPENAI_MODEL,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deepseek" => Some(Provider::DeepSeek),
            "openai" => Some(Provider::OpenAi),
            _ => None,
        }
    }
}

/// Fully-resolved endpoint for one call.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub provider: Provider,
    pub base_url: String,
    pub api_key: String,
}

/// One message in a chat-completion request. Owned, because transcripts are
/// assembled dynamically from persisted history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Trait seam over the chat client so flow engines can be exercised with a
/// scripted fake in tests.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// The production client. Resolves the provider from settings on every call,
/// so an admin config change takes effect without a restart.
pub struct ChatClient {
    http: Client,
    pool: PgPool,
    defaults: Config,
}

impl ChatClient {
    pub fn new(pool: PgPool, defaults: Config) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            pool,
            defaults,
        }
    }

    /// Resolves provider, base URL and API key: settings row first, env
    /// default second. Missing key is a configuration error, not a panic.
    async fn resolve(&self) -> Result<ResolvedProvider, LlmError> {
        let cfg = &self.defaults;
        let name = settings::get_or(&self.pool, "ai_provider", &cfg.ai_provider).await;
        let provider = Provider::parse(&name)
            .ok_or_else(|| LlmError::Config(format!("Unknown AI provider '{name}'")))?;

        let (key_setting, url_setting, env_key, env_url) = match provider {
            Provider::DeepSeek => (
                "deepseek_api_key",
                "deepseek_base_url",
                cfg.deepseek_api_key.as_deref(),
                cfg.deepseek_base_url.as_str(),
            ),
            Provider::OpenAi => (
                "openai_api_key",
                "openai_base_url",
                cfg.openai_api_key.as_deref(),
                cfg.openai_base_url.as_str(),
            ),
        };

        let api_key = match settings::get(&self.pool, key_setting).await {
            Some(k) if !k.is_empty() => k,
            _ => env_key
                .map(String::from)
                .ok_or_else(|| LlmError::Config(format!("No API key configured for {name}")))?,
        };
        let base_url = settings::get_or(&self.pool, url_setting, env_url).await;

        Ok(ResolvedProvider {
            provider,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl ChatCompletion for ChatClient {
    /// Makes a chat-completion call, retrying 429 and 5xx responses with
    /// exponential backoff.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let resolved = self.resolve().await?;
        let url = format!("{}/v1/chat/completions", resolved.base_url.trim_end_matches('/'));
        let request_body = CompletionRequest {
            model: resolved.provider.model(),
            max_tokens: MAX_TOKENS,
            messages,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .http
                .post(&url)
                .bearer_auth(&resolved.api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorBody>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let completion: CompletionResponse = response.json().await?;

            if let Some(usage) = &completion.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return completion
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|c| !c.trim().is_empty())
                .ok_or(LlmError::EmptyContent);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Calls the LLM and schema-validates the response into `T`. The prompt must
/// instruct the model to return valid JSON; parsing failure is a typed error
/// and never leaves partial state behind.
pub async fn complete_json<T: DeserializeOwned>(
    chat: &dyn ChatCompletion,
    messages: &[ChatMessage],
) -> Result<T, LlmError> {
    let text = chat.complete(messages).await?;
    parse_json_payload(&text)
}

/// Extracts and deserializes the JSON object embedded in model output.
pub fn parse_json_payload<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let payload = extract_json_object(text)?;
    serde_json::from_str(payload).map_err(LlmError::Parse)
}

/// Locates the outermost JSON object in free-text model output: strips
/// markdown code fences, then takes the substring between the first `{` and
/// the last `}`. Chatty preambles and trailing prose are tolerated; the
/// extracted substring still has to pass schema validation.
pub fn extract_json_object(text: &str) -> Result<&str, LlmError> {
    let text = strip_json_fences(text);
    let start = text.find('{').ok_or(LlmError::Extract)?;
    let end = text.rfind('}').ok_or(LlmError::Extract)?;
    if end < start {
        return Err(LlmError::Extract);
    }
    Ok(&text[start..=end])
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        key: String,
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_tolerates_preamble_and_trailer() {
        let input = "Sure! Here is the JSON you asked for:\n{\"key\": \"value\"}\nLet me know.";
        assert_eq!(extract_json_object(input).unwrap(), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_takes_outermost_braces() {
        let input = "{\"outer\": {\"inner\": 1}} trailing";
        assert_eq!(extract_json_object(input).unwrap(), "{\"outer\": {\"inner\": 1}}");
    }

    #[test]
    fn test_extract_fails_without_object() {
        assert!(matches!(
            extract_json_object("no json here"),
            Err(LlmError::Extract)
        ));
    }

    #[test]
    fn test_extract_fails_on_reversed_braces() {
        assert!(matches!(extract_json_object("} {"), Err(LlmError::Extract)));
    }

    #[test]
    fn test_parse_payload_schema_validates() {
        let parsed: Sample = parse_json_payload("```json\n{\"key\": \"v\"}\n```").unwrap();
        assert_eq!(parsed, Sample { key: "v".to_string() });
    }

    #[test]
    fn test_parse_payload_rejects_wrong_shape() {
        // An object that extracts fine but fails schema validation.
        let result: Result<Sample, _> = parse_json_payload("{\"other\": 1}");
        assert!(matches!(result, Err(LlmError::Parse(_))));
    }

    #[test]
    fn test_provider_parse_and_model() {
        assert_eq!(Provider::parse("deepseek"), Some(Provider::DeepSeek));
        assert_eq!(Provider::parse("openai"), Some(Provider::OpenAi));
        assert_eq!(Provider::parse("anthropic"), None);
        assert_eq!(Provider::DeepSeek.model(), DEEPSEEK_MODEL);
        assert_eq!(Provider::OpenAi.model(), OPENAI_MODEL);
    }

    #[test]
    fn test_chat_message_constructors() {
        assert_eq!(ChatMessage::system("s").role, "system");
        assert_eq!(ChatMessage::user("u").role, "user");
        assert_eq!(ChatMessage::assistant("a").role, "assistant");
    }
}
