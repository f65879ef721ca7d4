use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::warn;

use crate::domain::DomainError;

const COMPLETIONS_PATH: &str = "/chat/completions";

/// Prompts are answered deterministically.
const TEMPERATURE: f32 = 0.0;

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Transport for OpenAI-compatible `POST {base}/chat/completions` endpoints.
///
/// Shared by the OpenAI and Groq clients, which differ only in base URL,
/// default model and the provider name used in errors and logs.
pub(crate) struct ChatCompletions {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// Full endpoint URL (base + COMPLETIONS_PATH).
    url: String,
    provider: &'static str,
}

impl ChatCompletions {
    pub(crate) fn new(
        provider: &'static str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let base: String = base_url.into();
        let url = format!("{}{COMPLETIONS_PATH}", base.trim_end_matches('/'));
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            model: model.into(),
            url,
            provider,
        }
    }

    /// Send `prompt` as a single user message and return the first choice.
    pub(crate) async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        let provider = self.provider;
        let request = ApiRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            messages: vec![ApiMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::provider(format!("{provider}: request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DomainError::invalid_credential(format!(
                "{provider}: API key rejected ({status})"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{provider}: API returned {status}: {body}");
            return Err(DomainError::provider(format!("{provider}: API returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::provider(format!("{provider}: failed to read response: {e}")))?;

        parse_completion(&body).map_err(|e| DomainError::provider(format!("{provider}: {e}")))
    }
}

/// Extract `choices[0].message.content` from a response body.
pub(crate) fn parse_completion(body: &str) -> Result<String, String> {
    let response: ApiResponse =
        serde_json::from_str(body).map_err(|e| format!("failed to parse response: {e}"))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| "response contained no completion".to_string())
}
