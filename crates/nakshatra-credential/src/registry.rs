use crate::provider_trait::CredentialProvider;
use std::collections::HashMap;
use nakshatra_core::CredentialError;

pub struct CredentialRegistry {
    factories: HashMap<String, fn() -> Box<dyn CredentialProvider>>,
}

impl CredentialRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("secret-manager", || {
            Box::new(crate::secret_manager::SecretManagerProvider::new())
        });
        registry.register("env", || Box::new(crate::env_provider::EnvCredentialProvider::new()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn CredentialProvider>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn CredentialProvider>, CredentialError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| CredentialError::ProviderNotFound(name.to_string()))
    }

    /// Create a provider and run its `initialize` with `config`.
    pub async fn build(
        &self,
        name: &str,
        config: toml::Value,
    ) -> Result<Box<dyn CredentialProvider>, CredentialError> {
        let mut provider = self.create(name)?;
        provider.initialize(config).await?;
        Ok(provider)
    }

    pub fn list_providers(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for CredentialRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_new_has_builtin_providers() {
        let registry = CredentialRegistry::new();
        assert!(registry.create("secret-manager").is_ok());
        assert!(registry.create("env").is_ok());
    }

    #[test]
    fn test_registry_create_returns_correct_name() {
        let registry = CredentialRegistry::new();
        assert_eq!(registry.create("env").unwrap().name(), "env");
        assert_eq!(
            registry.create("secret-manager").unwrap().name(),
            "secret-manager"
        );
    }

    #[test]
    fn test_registry_create_unknown_returns_error() {
        let registry = CredentialRegistry::new();
        match registry.create("vault") {
            Err(CredentialError::ProviderNotFound(name)) => assert_eq!(name, "vault"),
            _ => panic!("expected ProviderNotFound"),
        }
    }

    #[test]
    fn test_registry_register_custom_provider() {
        let mut registry = CredentialRegistry::new();
        registry.register("custom", || {
            Box::new(crate::env_provider::EnvCredentialProvider::new())
        });
        let provider = registry.create("custom").unwrap();
        // EnvCredentialProvider is used as the factory, so name is "env"
        assert_eq!(provider.name(), "env");
    }

    #[test]
    fn test_registry_list_providers() {
        let registry = CredentialRegistry::new();
        let mut names = registry.list_providers();
        names.sort();
        assert_eq!(names, vec!["env", "secret-manager"]);
    }

    #[tokio::test]
    async fn test_registry_build_initializes() {
        let registry = CredentialRegistry::new();
        let config = toml::Value::Table({
            let mut t = toml::map::Map::new();
            t.insert("variable".to_string(), toml::Value::Integer(1));
            t
        });
        assert!(matches!(
            registry.build("env", config).await,
            Err(CredentialError::InitializationFailed(_))
        ));
    }
}
