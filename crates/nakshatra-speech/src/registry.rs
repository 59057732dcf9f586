use crate::session_trait::SpeechConnector;
use nakshatra_core::SpeechError;
use std::collections::HashMap;

pub struct SpeechRegistry {
    factories: HashMap<String, fn() -> Box<dyn SpeechConnector>>,
}

impl SpeechRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("gradio", || Box::new(crate::gradio::GradioConnector::new()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn SpeechConnector>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn SpeechConnector>, SpeechError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| SpeechError::EngineNotFound(name.to_string()))
    }

    /// Create a connector and run its `initialize` with `config`.
    pub async fn build(
        &self,
        name: &str,
        config: toml::Value,
    ) -> Result<Box<dyn SpeechConnector>, SpeechError> {
        let mut connector = self.create(name)?;
        connector.initialize(config).await?;
        Ok(connector)
    }

    pub fn list_engines(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for SpeechRegistry {
    fn default() -> Self {
        Self::new()
    }
}
