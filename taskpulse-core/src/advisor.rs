//! Suggestion boundary: turns an analytics snapshot into LLM-written advice.
//!
//! The analyzer never depends on this module. Callers hand it a snapshot and
//! an optional [`SuggestionClient`]; any failure collapses into
//! [`FALLBACK_SUGGESTION`].

use crate::config::{LlmConfig, LlmProvider};
use crate::format::{day_name, format_clock};
use crate::types::AnalyticsSnapshot;
use crate::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use std::time::Duration;

/// Returned whenever no suggestion could be produced.
pub const FALLBACK_SUGGESTION: &str = "Keep up your consistency with your daily tasks.";

const SYSTEM_PROMPT: &str =
    "You are a concise productivity coach. Answer with plain numbered suggestions only.";

/// Text completion interface for the suggestion collaborator.
pub trait SuggestionClient: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Create the default HTTP-backed suggestion client.
pub fn create_suggestion_client(llm: &LlmConfig) -> Result<Box<dyn SuggestionClient>> {
    Ok(Box::new(HttpSuggestionClient::new(llm)?))
}

/// Build the prompt asking for three short suggestions.
pub fn build_prompt(snapshot: &AnalyticsSnapshot) -> String {
    format!(
        "Based on the following productivity data for a user, give 3 practical and direct suggestions.\n\n\
         Best hour: {}h\n\
         Worst hour: {}h\n\
         Best day: {}\n\
         Worst day: {}\n\
         Productivity score: {:.2}/100\n\
         Completion rate: {:.2}%\n\
         Most common cancellation reason: {}\n\
         Reminder time: {}\n\n\
         Give 3 numbered suggestions, each at most 25 words. Be direct and practical.",
        snapshot.best_completion_hour,
        snapshot.worst_completion_hour,
        day_name(snapshot.best_day_of_week),
        day_name(snapshot.worst_day_of_week),
        snapshot.productivity_score,
        snapshot.avg_completion_rate,
        snapshot.most_common_cancellation_reason,
        format_clock(snapshot.optimal_reminder_time),
    )
}

/// Ask the client for suggestions about `snapshot`.
///
/// Never fails: a missing client, a transport error or an empty reply all
/// yield [`FALLBACK_SUGGESTION`].
pub fn suggest_optimization(
    client: Option<&dyn SuggestionClient>,
    snapshot: &AnalyticsSnapshot,
) -> String {
    let Some(client) = client else {
        tracing::debug!("No suggestion client configured");
        return FALLBACK_SUGGESTION.to_string();
    };

    match client.complete(&build_prompt(snapshot)) {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            tracing::warn!(user_id = snapshot.user_id, "Empty suggestion response");
            FALLBACK_SUGGESTION.to_string()
        }
        Err(e) => {
            tracing::warn!(user_id = snapshot.user_id, error = %e, "Suggestion request failed");
            FALLBACK_SUGGESTION.to_string()
        }
    }
}

/// Blocking HTTP client for Ollama, Claude and OpenAI completion endpoints.
pub struct HttpSuggestionClient {
    model: String,
    provider: LlmProvider,
    endpoint: String,
    api_key: Option<String>,
    runtime: tokio::runtime::Runtime,
    http: reqwest::Client,
}

impl HttpSuggestionClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| config.provider.default_endpoint().to_string());
        let api_key = config.api_key.clone().or_else(|| {
            config
                .provider
                .api_key_env()
                .and_then(|var| std::env::var(var).ok())
        });

        if config.provider.api_key_env().is_some() && api_key.is_none() {
            return Err(Error::Config(
                "llm.api_key (or provider env var) is required".to_string(),
            ));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Llm(format!("failed to build tokio runtime: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| Error::Llm(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            model: config.model.clone(),
            provider: config.provider,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            runtime,
            http,
        })
    }

    fn provider_name(&self) -> &'static str {
        match self.provider {
            LlmProvider::Ollama => "ollama",
            LlmProvider::Claude => "claude",
            LlmProvider::OpenAI => "openai",
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = self.api_key.as_deref().unwrap_or_default();
        match self.provider {
            LlmProvider::Ollama => {}
            LlmProvider::Claude => {
                headers.insert(
                    "x-api-key",
                    HeaderValue::from_str(key)
                        .map_err(|e| Error::Llm(format!("invalid claude api key header: {e}")))?,
                );
                headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
            }
            LlmProvider::OpenAI => {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {key}"))
                        .map_err(|e| Error::Llm(format!("invalid auth header: {e}")))?,
                );
            }
        }
        Ok(headers)
    }

    /// URL and JSON body for one completion request.
    fn request(&self, prompt: &str) -> (String, Value) {
        match self.provider {
            LlmProvider::Ollama => (
                format!("{}/api/generate", self.endpoint),
                json!({
                    "model": self.model,
                    "system": SYSTEM_PROMPT,
                    "prompt": prompt,
                    "stream": false,
                }),
            ),
            LlmProvider::Claude => (
                format!("{}/v1/messages", self.endpoint),
                json!({
                    "model": self.model,
                    "max_tokens": 400,
                    "system": SYSTEM_PROMPT,
                    "messages": [{ "role": "user", "content": prompt }],
                }),
            ),
            LlmProvider::OpenAI => (
                format!("{}/v1/chat/completions", self.endpoint),
                json!({
                    "model": self.model,
                    "messages": [
                        { "role": "system", "content": SYSTEM_PROMPT },
                        { "role": "user", "content": prompt }
                    ]
                }),
            ),
        }
    }
}

/// Pull the generated text out of a provider response body.
fn extract_text(provider: LlmProvider, body: &Value) -> Option<String> {
    let text = match provider {
        LlmProvider::Ollama => body.get("response"),
        LlmProvider::Claude => body.pointer("/content/0/text"),
        LlmProvider::OpenAI => body.pointer("/choices/0/message/content"),
    };
    text.and_then(Value::as_str).map(ToString::to_string)
}

impl SuggestionClient for HttpSuggestionClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let name = self.provider_name();
        let (url, payload) = self.request(prompt);
        let headers = self.headers()?;

        self.runtime.block_on(async {
            let resp = self
                .http
                .post(url)
                .headers(headers)
                .json(&payload)
                .send()
                .await
                .map_err(|e| Error::Llm(format!("{name} request failed: {e}")))?;
            let status = resp.status();
            let body = resp
                .text()
                .await
                .map_err(|e| Error::Llm(format!("{name} read body failed: {e}")))?;
            if !status.is_success() {
                return Err(Error::Llm(format!(
                    "{name} returned {}: {}",
                    status.as_u16(),
                    body
                )));
            }

            let json: Value = serde_json::from_str(&body)?;
            extract_text(self.provider, &json)
                .ok_or_else(|| Error::Llm(format!("{name} response missing generated text")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use std::sync::Mutex;

    struct FakeClient {
        reply: Result<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeClient {
        fn replying(reply: Result<String>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl SuggestionClient for FakeClient {
        fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(Error::Llm(e.to_string())),
            }
        }
    }

    fn snapshot() -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            user_id: 7,
            best_completion_hour: 9,
            worst_completion_hour: 16,
            best_day_of_week: 0,
            worst_day_of_week: 4,
            avg_completion_rate: 60.0,
            most_common_cancellation_reason: "too busy".to_string(),
            optimal_reminder_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            productivity_score: 60.29,
            analysis_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        }
    }

    #[test]
    fn test_prompt_mentions_snapshot_fields() {
        let prompt = build_prompt(&snapshot());
        assert!(prompt.contains("Best hour: 9h"));
        assert!(prompt.contains("Best day: Monday"));
        assert!(prompt.contains("Worst day: Friday"));
        assert!(prompt.contains("60.29/100"));
        assert!(prompt.contains("60.00%"));
        assert!(prompt.contains("too busy"));
        assert!(prompt.contains("at most 25 words"));
    }

    #[test]
    fn test_suggestion_is_trimmed_reply() {
        let client = FakeClient::replying(Ok("\n1. Plan at 9am.\n".to_string()));
        let text = suggest_optimization(Some(&client), &snapshot());
        assert_eq!(text, "1. Plan at 9am.");
        assert_eq!(client.prompts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failures_fall_back() {
        let failing = FakeClient::replying(Err(Error::Llm("timeout".to_string())));
        assert_eq!(
            suggest_optimization(Some(&failing), &snapshot()),
            FALLBACK_SUGGESTION
        );

        let empty = FakeClient::replying(Ok("   ".to_string()));
        assert_eq!(
            suggest_optimization(Some(&empty), &snapshot()),
            FALLBACK_SUGGESTION
        );

        assert_eq!(suggest_optimization(None, &snapshot()), FALLBACK_SUGGESTION);
    }

    #[test]
    fn test_extract_text_per_provider() {
        let ollama = json!({ "response": "a" });
        let claude = json!({ "content": [{ "type": "text", "text": "b" }] });
        let openai = json!({ "choices": [{ "message": { "content": "c" } }] });

        assert_eq!(extract_text(LlmProvider::Ollama, &ollama).as_deref(), Some("a"));
        assert_eq!(extract_text(LlmProvider::Claude, &claude).as_deref(), Some("b"));
        assert_eq!(extract_text(LlmProvider::OpenAI, &openai).as_deref(), Some("c"));
        assert_eq!(extract_text(LlmProvider::Claude, &ollama), None);
    }

    #[test]
    fn test_client_endpoint_resolution() {
        let config = LlmConfig {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            endpoint: None,
            api_key: Some("sk-test".to_string()),
            timeout_secs: 5,
        };
        let client = HttpSuggestionClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "https://api.openai.com");

        let ollama = LlmConfig {
            provider: LlmProvider::Ollama,
            model: "llama3.2".to_string(),
            endpoint: Some("http://127.0.0.1:11434/".to_string()),
            api_key: None,
            timeout_secs: 5,
        };
        let client = HttpSuggestionClient::new(&ollama).unwrap();
        assert_eq!(client.endpoint, "http://127.0.0.1:11434");
        let (url, _) = client.request("hi");
        assert_eq!(url, "http://127.0.0.1:11434/api/generate");
    }
}
