//! Client for a model hosted behind a Gradio app (e.g. a Hugging Face Space).
//!
//! A call is two requests: `POST {api}/call/{endpoint}` queues the job and
//! returns an `event_id`, then `GET {api}/call/{endpoint}/{event_id}` streams
//! server-sent events until a `complete` or `error` event arrives.

use crate::payload::decode_output;
use crate::session_trait::{SpeechConnector, SpeechSession};
use async_trait::async_trait;
use nakshatra_core::{Credential, GenerationParams, NarrationResult, SpeechError};
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_SPACE: &str = "nari-labs/Dia-1.6B";
const DEFAULT_ENDPOINT: &str = "/generate_audio";
const DEFAULT_API_PREFIX: &str = "/gradio_api";

/// Map a Space id (`owner/name`) to its direct host.
pub fn space_host(space: &str) -> Result<String, SpeechError> {
    let (owner, name) = space.split_once('/').ok_or_else(|| {
        SpeechError::InitializationFailed(format!("space '{space}' is not in owner/name form"))
    })?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return Err(SpeechError::InitializationFailed(format!(
            "space '{space}' is not in owner/name form"
        )));
    }
    let subdomain: String = format!("{owner}-{name}")
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    Ok(format!("https://{subdomain}.hf.space"))
}

pub struct GradioConnector {
    client: reqwest::Client,
    base_url: Option<String>,
    endpoint: String,
    api_prefix: String,
}

impl GradioConnector {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn api_root(&self, base_url: &str) -> String {
        format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            self.api_prefix.trim_end_matches('/')
        )
    }
}

impl Default for GradioConnector {
    fn default() -> Self {
        Self::new()
    }
}

fn optional_string(config: &toml::Value, key: &str) -> Result<Option<String>, SpeechError> {
    match config.get(key) {
        None => Ok(None),
        Some(toml::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SpeechError::InitializationFailed(format!(
            "'{key}' must be a string"
        ))),
    }
}

#[async_trait]
impl SpeechConnector for GradioConnector {
    fn name(&self) -> &str {
        "gradio"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), SpeechError> {
        let base_url = match optional_string(&config, "url")? {
            Some(url) => url,
            None => {
                let space = optional_string(&config, "space")?
                    .unwrap_or_else(|| DEFAULT_SPACE.to_string());
                space_host(&space)?
            }
        };
        if let Some(endpoint) = optional_string(&config, "endpoint")? {
            self.endpoint = endpoint;
        }
        if let Some(prefix) = optional_string(&config, "api_prefix")? {
            self.api_prefix = prefix;
        }

        tracing::info!(
            base_url = %base_url,
            endpoint = %self.endpoint,
            "gradio connector initialized"
        );
        self.base_url = Some(base_url);
        Ok(())
    }

    async fn connect(&self, credential: &Credential) -> Result<Box<dyn SpeechSession>, SpeechError> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| SpeechError::ConnectionFailed("not initialized".to_string()))?;

        // The app config is public for open Spaces and gated for private
        // ones, so fetching it checks both reachability and the token.
        let response = self
            .client
            .get(format!("{}/config", base_url.trim_end_matches('/')))
            .bearer_auth(credential.expose())
            .send()
            .await
            .map_err(|e| SpeechError::ConnectionFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SpeechError::ConnectionFailed(format!(
                "{base_url} returned {}",
                response.status()
            )));
        }

        tracing::debug!(base_url = %base_url, "gradio session opened");
        Ok(Box::new(GradioSession {
            client: self.client.clone(),
            call_url: format!(
                "{}/call/{}",
                self.api_root(base_url),
                self.endpoint.trim_start_matches('/')
            ),
            credential: credential.clone(),
        }))
    }
}

struct GradioSession {
    client: reqwest::Client,
    call_url: String,
    credential: Credential,
}

#[derive(Debug, Deserialize)]
struct QueuedCall {
    event_id: String,
}

/// Positional inputs for the Dia `generate_audio` endpoint.
fn call_inputs(text: &str, params: &GenerationParams) -> Value {
    json!({
        "data": [
            text,
            Value::Null, // audio prompt
            "",          // audio prompt transcription
            params.max_new_tokens,
            params.cfg_scale,
            params.temperature,
            params.top_p,
            params.cfg_filter_top_k,
            params.speed_factor,
        ]
    })
}

/// Pull the payload out of a Gradio server-sent-event body.
pub fn parse_event_stream(body: &str) -> Result<Value, SpeechError> {
    let mut event = "";
    for line in body.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            event = name.trim();
        } else if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            match event {
                "complete" => {
                    return serde_json::from_str(data).map_err(|e| {
                        SpeechError::UnexpectedResponse(format!("complete event is not JSON: {e}"))
                    })
                }
                "error" => {
                    let detail = if data.is_empty() || data == "null" {
                        "upstream reported an error without details"
                    } else {
                        data
                    };
                    return Err(SpeechError::RequestFailed(detail.to_string()));
                }
                _ => {}
            }
        }
    }
    Err(SpeechError::UnexpectedResponse(
        "event stream ended without a result".to_string(),
    ))
}

#[async_trait]
impl SpeechSession for GradioSession {
    async fn generate(
        &self,
        text: &str,
        params: &GenerationParams,
    ) -> Result<NarrationResult, SpeechError> {
        let response = self
            .client
            .post(&self.call_url)
            .bearer_auth(self.credential.expose())
            .json(&call_inputs(text, params))
            .send()
            .await
            .map_err(|e| SpeechError::ConnectionFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::RequestFailed(format!("{status}: {body}")));
        }
        let queued: QueuedCall = response
            .json()
            .await
            .map_err(|e| SpeechError::UnexpectedResponse(format!("missing event_id: {e}")))?;

        tracing::debug!(event_id = %queued.event_id, "generation queued");

        let response = self
            .client
            .get(format!("{}/{}", self.call_url, queued.event_id))
            .bearer_auth(self.credential.expose())
            .send()
            .await
            .map_err(|e| SpeechError::ConnectionFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::RequestFailed(format!(
                "result stream returned {status}"
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| SpeechError::ConnectionFailed(e.to_string()))?;

        let data = parse_event_stream(&body)?;
        let first = data.get(0).ok_or_else(|| {
            SpeechError::UnexpectedResponse("result contained no outputs".to_string())
        })?;
        decode_output(first)
    }
}
