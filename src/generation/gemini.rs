//! Gemini-backed question/answer generator
//!
//! Talks to the `generateContent` REST endpoint with an API key and asks the
//! model for a single JSON object holding `question` and `answer`.

use crate::config::{GeneratorConfig, DEFAULT_GENERATOR_ENDPOINT};
use crate::generation::{GenerationError, QaGenerator, QaPair};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Timeout for a single generation request in seconds
const GENERATION_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
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
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        Some(text).filter(|t| !t.trim().is_empty())
    }
}

/// Generator backed by the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    /// Prepares a generator for `model` using `credential`
    ///
    /// An empty credential is reported as [`GenerationError::NotConfigured`]; the
    /// crawl then proceeds without generation.
    pub fn configure(credential: &str, model: &str) -> Result<Self, GenerationError> {
        Self::with_endpoint(credential, model, DEFAULT_GENERATOR_ENDPOINT)
    }

    /// Like [`GeminiGenerator::configure`] but against a custom base URL
    pub fn with_endpoint(
        credential: &str,
        model: &str,
        endpoint: &str,
    ) -> Result<Self, GenerationError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(GenerationError::NotConfigured(
                "no API key provided".to_string(),
            ));
        }

        let model = model.trim().trim_start_matches("models/");
        if model.is_empty() {
            return Err(GenerationError::NotConfigured(
                "no model identifier provided".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: credential.to_string(),
            model: model.to_string(),
        })
    }

    /// Builds a generator from configuration, preferring `api_key` over the file value
    pub fn from_config(
        config: &GeneratorConfig,
        api_key: Option<&str>,
    ) -> Result<Self, GenerationError> {
        let credential = api_key.or(config.api_key.as_deref()).unwrap_or("");
        Self::with_endpoint(credential, &config.model, &config.endpoint)
    }

    /// The model identifier requests are sent to
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait]
impl QaGenerator for GeminiGenerator {
    async fn generate(&self, text: &str, source_url: &str) -> Result<QaPair, GenerationError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(text, source_url) }]
            }]
        });

        let response = self
            .client
            .post(self.request_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        let model_text = parsed.text().ok_or_else(|| {
            GenerationError::MalformedResponse("response contained no text".to_string())
        })?;

        parse_qa_response(&model_text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Builds the instruction sent to the model for one page
pub fn build_prompt(text: &str, source_url: &str) -> String {
    format!(
        r#"Read the following text carefully. It was extracted from the webpage {source_url}

BEGIN TEXT CONTENT:
{text}
END TEXT CONTENT.

Based *only* on the information present in the TEXT CONTENT provided above, generate a relevant question about its main topic and provide a concise answer.
Your output MUST be a single, valid JSON object with exactly two keys: "question" and "answer".
Do not include any explanations, introductory text, or any characters outside of this single JSON object.

Example of the required JSON Output format:
{{
  "question": "What is the main theme of the provided text?",
  "answer": "The main theme is X, Y, and Z based on the text."
}}

JSON Output:
"#
    )
}

/// Extracts the question/answer pair from raw model output
///
/// The model may wrap the object in prose or code fences, so the slice from the
/// first `{` to the last `}` is parsed. Both keys must hold non-empty strings.
pub fn parse_qa_response(raw: &str) -> Result<QaPair, GenerationError> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let json_slice = match (start, end) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => {
            return Err(GenerationError::MalformedResponse(format!(
                "no JSON object in response: {}",
                raw
            )))
        }
    };

    let value: Value = serde_json::from_str(json_slice)
        .map_err(|e| GenerationError::MalformedResponse(format!("{}: {}", e, json_slice)))?;

    let field = |key: &str| -> Result<String, GenerationError> {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                GenerationError::MalformedResponse(format!(
                    "missing or empty '{}' in {}",
                    key, json_slice
                ))
            })
    };

    Ok(QaPair {
        question: field("question")?,
        answer: field("answer")?,
    })
}
