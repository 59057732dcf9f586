use async_trait::async_trait;
use nakshatra_core::TextGenerationError;

/// A hosted text model that turns a prompt into prose.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the generator's plugin name (e.g. `"gemini"`).
    fn name(&self) -> &str;
    /// One-time initialisation with generator-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), TextGenerationError>;
    /// Generate plain text for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, TextGenerationError>;
}
