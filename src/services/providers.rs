// AI Provider Service
// Implements OpenAI chat completions and Gemini generateContent calls

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::ReportSource;

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";
const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";

const HTTP_TIMEOUT_SECS: u64 = 80;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("API key not configured")]
    MissingApiKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    /// Accepts "openai" / "gemini", case-insensitive, optionally with a ":model" suffix
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.split(':').next().unwrap_or("").trim().to_lowercase();
        match name.as_str() {
            "openai" | "gpt" => Some(Self::OpenAi),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => OPENAI_DEFAULT_MODEL,
            Self::Gemini => GEMINI_DEFAULT_MODEL,
        }
    }

    pub fn report_source(&self) -> ReportSource {
        match self {
            Self::OpenAi => ReportSource::OpenAi,
            Self::Gemini => ReportSource::Gemini,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: i32,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResult {
    pub content: String,
    pub latency_ms: i64,
    pub model: String,
}

pub struct ProviderClient {
    client: Client,
    openai_url: String,
    gemini_base_url: String,
}

impl Default for ProviderClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self::from_parts(client)
    }

    pub fn with_proxy(proxy_url: &str) -> Result<Self, ProviderError> {
        let proxy = reqwest::Proxy::all(proxy_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .proxy(proxy)
            .build()?;

        Ok(Self::from_parts(client))
    }

    fn from_parts(client: Client) -> Self {
        let openai_url =
            env::var("OPENAI_API_URL").unwrap_or_else(|_| OPENAI_DEFAULT_URL.to_string());
        let gemini_base_url =
            env::var("GEMINI_API_URL").unwrap_or_else(|_| GEMINI_DEFAULT_BASE_URL.to_string());

        Self {
            client,
            openai_url,
            gemini_base_url,
        }
    }

    /// Override endpoints, e.g. from `ProviderConfig::base_url`
    pub fn with_base_urls(mut self, openai: Option<&str>, gemini: Option<&str>) -> Self {
        if let Some(url) = openai.filter(|u| !u.trim().is_empty()) {
            self.openai_url = url.trim().to_string();
        }
        if let Some(url) = gemini.filter(|u| !u.trim().is_empty()) {
            self.gemini_base_url = url.trim().trim_end_matches('/').to_string();
        }
        self
    }

    pub fn openai_url(&self) -> &str {
        &self.openai_url
    }

    pub fn gemini_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.gemini_base_url, model)
    }

    /// Dispatch to the matching provider; an empty model selects the provider default
    pub async fn call(
        &self,
        kind: ProviderKind,
        model: &str,
        api_key: &str,
        system: &str,
        user: &str,
        max_tokens: i32,
    ) -> Result<ChatResult, ProviderError> {
        let model = if model.trim().is_empty() {
            kind.default_model()
        } else {
            model.trim()
        };
        match kind {
            ProviderKind::OpenAi => self.call_openai(model, api_key, system, user, max_tokens).await,
            ProviderKind::Gemini => self.call_gemini(model, api_key, system, user, max_tokens).await,
        }
    }

    pub async fn call_openai(
        &self,
        model: &str,
        api_key: &str,
        system: &str,
        user: &str,
        max_tokens: i32,
    ) -> Result<ChatResult, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens,
            temperature: 0.2,
            response_format: ResponseFormat {
                r#type: "json_object".to_string(),
            },
        };

        let start = Instant::now();

        let response = self
            .client
            .post(&self.openai_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("[PROVIDER] openai status={} latency_ms={}", status.as_u16(), latency_ms);
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let content = data
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::MissingContent)?;

        info!(
            "[PROVIDER] openai model={} latency_ms={} chars={}",
            model,
            latency_ms,
            content.len()
        );

        Ok(ChatResult {
            content,
            latency_ms,
            model: model.to_string(),
        })
    }

    pub async fn call_gemini(
        &self,
        model: &str,
        api_key: &str,
        system: &str,
        user: &str,
        max_tokens: i32,
    ) -> Result<ChatResult, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let request = serde_json::json!({
            "systemInstruction": {"parts": [{"text": system}]},
            "contents": [{"role": "user", "parts": [{"text": user}]}],
            "generationConfig": {
                "maxOutputTokens": max_tokens,
                "temperature": 0.2,
                "responseMimeType": "application/json"
            }
        });

        let start = Instant::now();

        let response = self
            .client
            .post(self.gemini_url(model))
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("[PROVIDER] gemini status={} latency_ms={}", status.as_u16(), latency_ms);
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let content = gemini_text(&data).ok_or(ProviderError::MissingContent)?;

        info!(
            "[PROVIDER] gemini model={} latency_ms={} chars={}",
            model,
            latency_ms,
            content.len()
        );

        Ok(ChatResult {
            content,
            latency_ms,
            model: model.to_string(),
        })
    }
}

/// Concatenated text parts of the first candidate:
/// `{"candidates":[{"content":{"parts":[{"text":"..."}]}}]}`
fn gemini_text(data: &Value) -> Option<String> {
    let parts = data["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_kind() {
        assert_eq!(ProviderKind::parse("openai"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("Gemini:gemini-1.5-pro"), Some(ProviderKind::Gemini));
        assert_eq!(ProviderKind::parse("deepseek"), None);
        assert_eq!(ProviderKind::Gemini.report_source(), ReportSource::Gemini);
    }

    #[test]
    fn test_provider_client_creation() {
        let client = ProviderClient::new().with_base_urls(None, Some("http://localhost:1234/v1/"));
        assert!(client.openai_url().starts_with("http"));
        assert_eq!(
            client.gemini_url("gemini-1.5-flash"),
            "http://localhost:1234/v1/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_gemini_text_extraction() {
        let data = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]
        });
        assert_eq!(gemini_text(&data).as_deref(), Some("{\"a\":1}"));
        assert_eq!(gemini_text(&serde_json::json!({"candidates": []})), None);
    }

    #[tokio::test]
    async fn test_blank_key_is_rejected_before_request() {
        let client = ProviderClient::new();
        let err = client
            .call(ProviderKind::OpenAi, "", "  ", "system", "user", 16)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
    }
}
