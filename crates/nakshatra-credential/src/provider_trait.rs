use async_trait::async_trait;
use nakshatra_core::{Credential, CredentialError};

/// Source of the bearer token presented to the speech endpoint.
///
/// Providers are created through [`CredentialRegistry`](crate::CredentialRegistry),
/// configured once with [`initialize`](Self::initialize), and then asked for a
/// fresh token on every request. Implementations must not cache tokens.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the provider's plugin name (e.g. `"secret-manager"`, `"env"`).
    fn name(&self) -> &str;
    /// One-time initialisation with provider-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), CredentialError>;
    /// Fetch the current token.
    async fn resolve(&self) -> Result<Credential, CredentialError>;
}
