use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapters::ai::prompt::{build_prompt, parse_model_reply};
use crate::config::GEMINI_API_KEY_ENV;
use crate::config::types::AiConfig;
use crate::domain::field::PartialRecord;
use crate::error::{ImportError, Result};
use crate::ports::text_extractor::TextExtractor;

const PROVIDER: &str = "Gemini";
const TEMPERATURE: f32 = 0.1;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Google Gemini `generateContent` client used as the text-extraction tier.
pub struct GeminiExtractor {
    http: Client,
    config: AiConfig,
}

impl GeminiExtractor {
    pub fn new(config: AiConfig) -> std::result::Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(&e))?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            warn!(status = status.as_u16(), %message, "Model call rejected");
            return Err(ImportError::ModelError { message });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| ImportError::UnparsableResponse {
                reason: format!("unexpected response envelope: {e}"),
            })?;
        let reply: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        if reply.trim().is_empty() {
            return Err(ImportError::UnparsableResponse {
                reason: "model returned no text".into(),
            });
        }
        Ok(reply)
    }

    fn transport_error(&self, e: &reqwest::Error) -> ImportError {
        let message = if e.is_timeout() {
            format!("request timed out after {}s", self.config.request_timeout_secs)
        } else {
            e.to_string()
        };
        ImportError::ModelError { message }
    }
}

#[async_trait]
impl TextExtractor for GeminiExtractor {
    async fn extract_from_text(
        &self,
        text: &str,
        schema_description: &str,
    ) -> Result<PartialRecord> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ImportError::MissingCredential {
                provider: PROVIDER,
                env_var: GEMINI_API_KEY_ENV,
            })?;

        let prompt = build_prompt(text, schema_description, self.config.max_prompt_chars);
        debug!(model = %self.config.model, prompt_len = prompt.len(), "Calling model");
        let reply = self.generate(api_key, &prompt).await?;
        let record = parse_model_reply(&reply)?;
        debug!(fields = record.values.len(), "Model extraction finished");
        Ok(record)
    }
}
