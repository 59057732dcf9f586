use crate::generator_trait::TextGenerator;
use nakshatra_core::TextGenerationError;
use std::collections::HashMap;

pub struct TextRegistry {
    factories: HashMap<String, fn() -> Box<dyn TextGenerator>>,
}

impl TextRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("gemini", || Box::new(crate::gemini::GeminiGenerator::new()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn TextGenerator>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn TextGenerator>, TextGenerationError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| TextGenerationError::EngineNotFound(name.to_string()))
    }

    pub async fn build(
        &self,
        name: &str,
        config: toml::Value,
    ) -> Result<Box<dyn TextGenerator>, TextGenerationError> {
        let mut generator = self.create(name)?;
        generator.initialize(config).await?;
        Ok(generator)
    }

    pub fn list_engines(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for TextRegistry {
    fn default() -> Self {
        Self::new()
    }
}
