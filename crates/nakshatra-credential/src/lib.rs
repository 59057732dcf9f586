pub mod env_provider;
pub mod provider_trait;
pub mod registry;
pub mod secret_manager;

pub use env_provider::EnvCredentialProvider;
pub use provider_trait::CredentialProvider;
pub use registry::CredentialRegistry;
pub use secret_manager::SecretManagerProvider;
