use crate::config::{AnalyzerConfig, ApiKey};
use crate::conversation::{ChatMessage, Role};
use crate::error::{AnalysisError, Result, UpstreamErrorKind};
use crate::llm::assistant::TextGenerator;
use crate::llm::types::*;
use reqwest::{Client, StatusCode};
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: ApiKey,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: ApiKey, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::upstream(UpstreamErrorKind::Other, e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Builds a client from whatever the host's secret store returned. A
    /// missing key fails here, before any request is made.
    pub fn from_secret(api_key: Option<String>, config: &AnalyzerConfig) -> Result<Self> {
        let key = ApiKey::require(api_key)?;
        Self::new(key, Duration::from_secs(config.request_timeout_secs))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn generate_content(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            model,
            self.api_key.expose()
        );

        let payload = build_request(messages);
        let res = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(classify_transport_error)?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            return Err(AnalysisError::upstream(
                classify_status(status),
                format!("Gemini API Error (status {}): {}", status, err_text),
            ));
        }

        let body: GenerateContentResponse = res.json().await.map_err(classify_transport_error)?;

        let candidate = body
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| {
                AnalysisError::upstream(UpstreamErrorKind::Other, "No candidates returned")
            })?;

        let text = candidate
            .content
            .map(|content| content.joined_text())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AnalysisError::upstream(
                UpstreamErrorKind::Other,
                format!(
                    "Model returned no text (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            ));
        }

        Ok(text)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        self.generate_content(model, messages).await
    }
}

/// System messages are merged into `systemInstruction`; the rest keep their
/// order as `user` / `model` contents.
pub(crate) fn build_request(messages: &[ChatMessage]) -> GenerateContentRequest {
    let system_text: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.text.as_str())
        .collect();

    let contents = messages
        .iter()
        .filter_map(|m| Content::gemini_role(m.role).map(|role| Content::text(Some(role), &m.text)))
        .collect();

    GenerateContentRequest {
        contents,
        system_instruction: (!system_text.is_empty())
            .then(|| Content::text(None, system_text.join("\n\n"))),
    }
}

pub(crate) fn classify_status(status: StatusCode) -> UpstreamErrorKind {
    match status {
        StatusCode::TOO_MANY_REQUESTS => UpstreamErrorKind::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => UpstreamErrorKind::Authentication,
        StatusCode::REQUEST_TIMEOUT => UpstreamErrorKind::Transient,
        s if s.is_server_error() => UpstreamErrorKind::Transient,
        _ => UpstreamErrorKind::Other,
    }
}

fn classify_transport_error(err: reqwest::Error) -> AnalysisError {
    let kind = if err.is_timeout() || err.is_connect() {
        UpstreamErrorKind::Transient
    } else if let Some(status) = err.status() {
        classify_status(status)
    } else {
        UpstreamErrorKind::Other
    };
    // Drop the URL: it carries the API key as a query parameter.
    AnalysisError::upstream(kind, err.without_url().to_string())
}
