//! Generation endpoint client.
//!
//! One POST per advice call, with the advice type's schema attached as a
//! response-shape constraint. Failures are classified into the
//! [`GenerateError`] taxonomy so the UI can distinguish "try again" from
//! "blocked" from "offline"; nothing here retries.

use crate::advice::schema::Schema;
use crate::advice::types::AdviceRequest;
use crate::error::GenerateError;
use crate::llm::GenerationBackend;
use crate::llm::http::build_endpoint_client;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

mod types;
use types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    response_schema_json,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;
const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Candidate finish reasons that mean the endpoint declined to answer rather
/// than failed to.
const REFUSAL_FINISH_REASONS: [&str; 3] = ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST"];

pub struct GeminiClient {
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f64,
    client: Client,
}

impl GeminiClient {
    /// Create a client for the hosted endpoint.
    ///
    /// Key resolution: explicit argument, then `GEMINI_API_KEY`, then
    /// `GOOGLE_API_KEY`. A missing key surfaces as `Auth` on the first call,
    /// not at construction.
    #[must_use]
    pub fn new(api_key: Option<&str>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, None)
    }

    /// Like [`GeminiClient::new`] but pointed at a custom base URL. Tests use
    /// this to aim at a local mock server.
    #[must_use]
    pub fn with_base_url(
        api_key: Option<&str>,
        model: impl Into<String>,
        base_url: Option<&str>,
    ) -> Self {
        let resolved_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(String::from)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok());

        Self {
            api_key: resolved_key,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.into(),
            temperature: 0.4,
            client: build_endpoint_client(),
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Rebuild the HTTP client with a different request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = crate::llm::http::build_endpoint_client_with_timeout(timeout_secs);
        self
    }

    fn api_key(&self) -> Result<&str, GenerateError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| GenerateError::Auth("API key not configured".into()))
    }

    fn request_url(&self, api_key: &str) -> String {
        let model = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };
        format!(
            "{}/v1beta/{model}:generateContent?key={api_key}",
            self.base_url
        )
    }

    fn build_request(&self, request: &AdviceRequest, schema: &Schema) -> GenerateContentRequest {
        let mut parts = vec![Part::text(request.user_text.clone())];
        if let Some(image) = &request.image {
            parts.push(Part::inline_data(
                image.mime_type.clone(),
                image.to_base64(),
            ));
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::text(request.system_instruction.clone())],
            }),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: "application/json",
                response_schema: response_schema_json(&schema.root),
            },
        }
    }

    async fn classify_failure(response: reqwest::Response) -> GenerateError {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        let message = response.text().await.unwrap_or_default();
        let message = truncate_message(&message);

        match status.as_u16() {
            401 | 403 => GenerateError::Auth(message),
            429 => GenerateError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            },
            code if status.is_server_error() => {
                GenerateError::Transport(format!("endpoint returned {code}: {message}"))
            }
            code => GenerateError::Endpoint {
                status: code,
                message,
            },
        }
    }

    fn extract_text(result: &GenerateContentResponse) -> Result<String, GenerateError> {
        if let Some(err) = &result.error {
            return Err(GenerateError::Endpoint {
                status: err.code.unwrap_or(0),
                message: truncate_message(&err.message),
            });
        }

        if let Some(feedback) = &result.prompt_feedback
            && let Some(reason) = &feedback.block_reason
        {
            return Err(GenerateError::ContentRefusal {
                reason: reason.clone(),
            });
        }

        let Some(candidate) = result.candidates.as_ref().and_then(|c| c.first()) else {
            return Err(GenerateError::Endpoint {
                status: 200,
                message: "no candidates in response".into(),
            });
        };

        if let Some(reason) = &candidate.finish_reason
            && REFUSAL_FINISH_REASONS.contains(&reason.as_str())
        {
            return Err(GenerateError::ContentRefusal {
                reason: reason.clone(),
            });
        }

        let mut out = String::new();
        if let Some(content) = &candidate.content {
            for part in &content.parts {
                if let Some(text) = &part.text {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(text);
                }
            }
        }

        if out.is_empty() {
            return Err(GenerateError::Endpoint {
                status: 200,
                message: "empty candidate text".into(),
            });
        }

        Ok(out)
    }

    async fn call_api(
        &self,
        request: &AdviceRequest,
        schema: &Schema,
    ) -> Result<String, GenerateError> {
        let api_key = self.api_key()?;
        let url = self.request_url(api_key);
        let wire_request = self.build_request(request, schema);

        let response = self
            .client
            .post(url)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        Self::extract_text(&result)
    }
}

fn truncate_message(message: &str) -> String {
    const MAX_CHARS: usize = 200;
    if message.chars().count() <= MAX_CHARS {
        message.to_string()
    } else {
        let truncated: String = message.chars().take(MAX_CHARS).collect();
        format!("{truncated}…")
    }
}

impl GenerationBackend for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate<'a>(
        &'a self,
        request: &'a AdviceRequest,
        schema: &'a Schema,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerateError>> + Send + 'a>> {
        Box::pin(async move { self.call_api(request, schema).await })
    }
}

#[cfg(test)]
mod tests;
