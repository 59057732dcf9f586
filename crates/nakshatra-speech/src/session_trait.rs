use async_trait::async_trait;
use nakshatra_core::{Credential, GenerationParams, NarrationResult, SpeechError};

/// Opens authenticated sessions against a remote speech model.
#[async_trait]
pub trait SpeechConnector: Send + Sync {
    /// Returns the engine's plugin name (e.g. `"gradio"`).
    fn name(&self) -> &str;
    /// One-time initialisation with engine-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), SpeechError>;
    /// Open a session authenticated with `credential`.
    async fn connect(&self, credential: &Credential) -> Result<Box<dyn SpeechSession>, SpeechError>;
}

/// One connected session. Lives for a single narration request.
#[async_trait]
pub trait SpeechSession: Send + Sync {
    /// Submit `text` with `params` and wait for the single result.
    async fn generate(
        &self,
        text: &str,
        params: &GenerationParams,
    ) -> Result<NarrationResult, SpeechError>;
}
