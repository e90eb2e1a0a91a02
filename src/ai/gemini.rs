//! Gemini REST client
//!
//! Calls `models/{model}:generateContent` with either a text part alone or a
//! text part plus one inline base64 file part.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::Generator;
use crate::config::GeminiConfig;
use crate::{Error, Result};

/// Gemini API client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    api_base: String,
}

/// `generateContent` request body
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

/// Request part (text or inline file)
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

/// `generateContent` response body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
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
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        if config.api_key.expose_secret().is_empty() {
            return Err(Error::Config("Gemini API key required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Model this client generates with
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, parts: Vec<Part<'_>>) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Generation(format!("Gemini response read error: {e}")))?;

        if !status.is_success() {
            return Err(Error::Generation(format!(
                "Gemini API error: {status} - {}",
                api_error_message(&body)
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        let text = extract_text(parsed)?;

        tracing::debug!(model = %self.model, chars = text.len(), "Gemini generation complete");
        Ok(text)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        self.generate(vec![Part::Text { text: prompt }]).await
    }

    async fn generate_with_file(
        &self,
        prompt: &str,
        data_base64: &str,
        mime_type: &str,
    ) -> Result<String> {
        self.generate(vec![
            Part::Text { text: prompt },
            Part::Inline {
                inline_data: InlineData {
                    mime_type,
                    data: data_base64,
                },
            },
        ])
        .await
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(response: GenerateResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(Error::Generation(format!("prompt blocked: {reason}")));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(Error::Generation("no candidates returned".to_string()));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(Error::Generation(format!("empty response (finish reason: {reason})")));
    }

    Ok(text)
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}
