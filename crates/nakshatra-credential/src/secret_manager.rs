use crate::provider_trait::CredentialProvider;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use nakshatra_core::{Credential, CredentialError};
use reqwest::StatusCode;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://secretmanager.googleapis.com";
const DEFAULT_METADATA_URL: &str = "http://metadata.google.internal";
const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";
const DEFAULT_PROJECT_ID: &str = "nakshatra-narratives";
const DEFAULT_SECRET: &str = "HF_TOKEN";
const DEFAULT_VERSION: &str = "latest";

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Debug, Deserialize)]
struct SecretPayload {
    data: String,
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// Google Secret Manager over its REST API.
///
/// Reads `projects/{project}/secrets/{secret}/versions/{version}` on every
/// call. The OAuth access token for the store itself comes from
/// `access_token` when configured, otherwise from the instance metadata
/// server.
pub struct SecretManagerProvider {
    client: reqwest::Client,
    base_url: String,
    metadata_url: String,
    project_id: String,
    secret: String,
    version: String,
    access_token: Option<String>,
}

impl SecretManagerProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            secret: DEFAULT_SECRET.to_string(),
            version: DEFAULT_VERSION.to_string(),
            access_token: None,
        }
    }

    /// Fully qualified secret version name.
    pub fn resource_name(&self) -> String {
        format!(
            "projects/{}/secrets/{}/versions/{}",
            self.project_id, self.secret, self.version
        )
    }

    fn access_url(&self) -> String {
        format!(
            "{}/v1/{}:access",
            self.base_url.trim_end_matches('/'),
            self.resource_name()
        )
    }

    async fn store_access_token(&self) -> Result<String, CredentialError> {
        if let Some(token) = &self.access_token {
            return Ok(token.clone());
        }

        let url = format!(
            "{}{}",
            self.metadata_url.trim_end_matches('/'),
            METADATA_TOKEN_PATH
        );
        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| CredentialError::Unreachable(format!("metadata server: {e}")))?;

        if !response.status().is_success() {
            return Err(CredentialError::PermissionDenied(format!(
                "metadata server returned {}",
                response.status()
            )));
        }

        let token: MetadataToken = response.json().await.map_err(|e| {
            CredentialError::MalformedPayload(format!("metadata token response: {e}"))
        })?;
        Ok(token.access_token)
    }
}

impl Default for SecretManagerProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn optional_string(config: &toml::Value, key: &str) -> Result<Option<String>, CredentialError> {
    match config.get(key) {
        None => Ok(None),
        Some(toml::Value::String(s)) if !s.is_empty() => Ok(Some(s.clone())),
        Some(_) => Err(CredentialError::InitializationFailed(format!(
            "'{key}' must be a non-empty string"
        ))),
    }
}

fn map_status(status: StatusCode, name: &str, body: &str) -> CredentialError {
    match status {
        StatusCode::NOT_FOUND => CredentialError::NotFound(name.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CredentialError::PermissionDenied(format!("{name}: {status}"))
        }
        _ => CredentialError::Unreachable(format!("{status}: {body}")),
    }
}

#[async_trait]
impl CredentialProvider for SecretManagerProvider {
    fn name(&self) -> &str {
        "secret-manager"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), CredentialError> {
        if let Some(v) = optional_string(&config, "project_id")? {
            self.project_id = v;
        }
        if let Some(v) = optional_string(&config, "secret")? {
            self.secret = v;
        }
        if let Some(v) = optional_string(&config, "version")? {
            self.version = v;
        }
        if let Some(v) = optional_string(&config, "base_url")? {
            self.base_url = v;
        }
        if let Some(v) = optional_string(&config, "metadata_url")? {
            self.metadata_url = v;
        }
        self.access_token = optional_string(&config, "access_token")?;

        tracing::info!(
            secret = %self.resource_name(),
            static_access_token = self.access_token.is_some(),
            "secret manager provider initialized"
        );
        Ok(())
    }

    async fn resolve(&self) -> Result<Credential, CredentialError> {
        let name = self.resource_name();
        let access_token = self.store_access_token().await?;

        tracing::debug!(secret = %name, "accessing secret version");
        let response = self
            .client
            .get(self.access_url())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| CredentialError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &name, &body));
        }

        let version: AccessSecretVersionResponse = response
            .json()
            .await
            .map_err(|e| CredentialError::MalformedPayload(e.to_string()))?;
        let raw = STANDARD
            .decode(version.payload.data.trim())
            .map_err(|e| CredentialError::MalformedPayload(format!("payload is not base64: {e}")))?;
        let token = String::from_utf8(raw)
            .map_err(|_| CredentialError::MalformedPayload("payload is not UTF-8".to_string()))?;

        Ok(Credential::new(token))
    }
}
