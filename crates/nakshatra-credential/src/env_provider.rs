use crate::provider_trait::CredentialProvider;
use async_trait::async_trait;
use nakshatra_core::{Credential, CredentialError};

const DEFAULT_VARIABLE: &str = "HUGGING_FACE_TOKEN";

/// Reads the token from an environment variable at resolve time.
pub struct EnvCredentialProvider {
    variable: String,
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self {
            variable: DEFAULT_VARIABLE.to_string(),
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), CredentialError> {
        if let Some(value) = config.get("variable") {
            let variable = value.as_str().filter(|v| !v.is_empty()).ok_or_else(|| {
                CredentialError::InitializationFailed(
                    "'variable' must be a non-empty string".to_string(),
                )
            })?;
            self.variable = variable.to_string();
        }
        tracing::info!(variable = %self.variable, "env credential provider initialized");
        Ok(())
    }

    async fn resolve(&self) -> Result<Credential, CredentialError> {
        match std::env::var(&self.variable) {
            Ok(token) if !token.is_empty() => Ok(Credential::new(token)),
            Ok(_) => Err(CredentialError::NotFound(format!(
                "environment variable {} is empty",
                self.variable
            ))),
            Err(_) => Err(CredentialError::NotFound(format!(
                "environment variable {} is not set",
                self.variable
            ))),
        }
    }
}
