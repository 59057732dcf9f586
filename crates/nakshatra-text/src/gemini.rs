use crate::generator_trait::TextGenerator;
use async_trait::async_trait;
use nakshatra_core::TextGenerationError;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default, rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(default, rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Google Gemini `generateContent` over REST.
pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiGenerator {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl Default for GeminiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn first_text(response: GenerateContentResponse) -> Result<String, TextGenerationError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(TextGenerationError::RequestFailed(format!(
            "prompt blocked: {reason}"
        )));
    }
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(TextGenerationError::UnexpectedResponse(
            "response contained no text".to_string(),
        ));
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), TextGenerationError> {
        let api_key = config
            .get("api_key")
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                TextGenerationError::InitializationFailed(
                    "missing 'api_key' in gemini config".to_string(),
                )
            })?;
        self.api_key = Some(api_key.to_string());

        if let Some(model) = config.get("model").and_then(|v| v.as_str()) {
            self.model = model.to_string();
        }
        if let Some(base_url) = config.get("base_url").and_then(|v| v.as_str()) {
            self.base_url = base_url.to_string();
        }

        tracing::info!(model = %self.model, "gemini generator initialized");
        Ok(())
    }

    async fn generate(&self, prompt: &str) -> Result<String, TextGenerationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            TextGenerationError::RequestFailed("not initialized".to_string())
        })?;

        let body = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
        };
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TextGenerationError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(TextGenerationError::RequestFailed(format!(
                "{status}: {message}"
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| TextGenerationError::UnexpectedResponse(e.to_string()))?;
        let text = first_text(parsed)?;
        tracing::debug!(model = %self.model, chars = text.len(), "text generated");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(entries: &[(&str, &str)]) -> toml::Value {
        toml::Value::Table({
            let mut t = toml::map::Map::new();
            for (k, v) in entries {
                t.insert(k.to_string(), toml::Value::String(v.to_string()));
            }
            t
        })
    }

    #[test]
    fn test_gemini_name_and_default_model() {
        let generator = GeminiGenerator::new();
        assert_eq!(generator.name(), "gemini");
        assert_eq!(generator.model(), "gemini-1.5-flash-latest");
        assert_eq!(
            generator.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[tokio::test]
    async fn test_gemini_initialize_requires_api_key() {
        let mut generator = GeminiGenerator::new();
        match generator.initialize(config(&[])).await {
            Err(TextGenerationError::InitializationFailed(msg)) => assert!(msg.contains("api_key")),
            other => panic!("expected InitializationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_gemini_initialize_overrides_model() {
        let mut generator = GeminiGenerator::new();
        generator
            .initialize(config(&[("api_key", "k"), ("model", "gemini-2.0-flash")]))
            .await
            .unwrap();
        assert_eq!(generator.model(), "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn test_gemini_generate_before_initialize_fails() {
        let generator = GeminiGenerator::new();
        assert!(generator.generate("hi").await.is_err());
    }

    #[test]
    fn test_first_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Once, "},{"text":"in Ayodhya."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(first_text(response).unwrap(), "Once, in Ayodhya.");
    }

    #[test]
    fn test_first_text_blocked_prompt() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        match first_text(response) {
            Err(TextGenerationError::RequestFailed(msg)) => assert!(msg.contains("SAFETY")),
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_first_text_empty_candidates() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(
            first_text(response),
            Err(TextGenerationError::UnexpectedResponse(_))
        ));
    }
}
