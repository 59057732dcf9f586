use crate::error::ConfigError;
use crate::types::Delivery;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub narration: NarrationConfig,

    #[serde(default)]
    pub credential: CredentialConfig,

    #[serde(default)]
    pub speech: SpeechConfig,

    #[serde(default)]
    pub text: TextConfig,

    #[serde(default)]
    pub content: ContentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NarrationConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub delivery: Delivery,
}

impl NarrationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            delivery: Delivery::default(),
        }
    }
}

/// Secret store used to resolve the speech provider's token.
///
/// Keys besides `provider` are handed to the provider's `initialize`.
#[derive(Debug, Deserialize, Clone)]
pub struct CredentialConfig {
    #[serde(default = "default_credential_provider")]
    pub provider: String,

    #[serde(flatten)]
    pub extra: toml::Value,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            provider: default_credential_provider(),
            extra: empty_table(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpeechConfig {
    #[serde(default = "default_speech_engine")]
    pub engine: String,

    #[serde(flatten)]
    pub extra: toml::Value,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            engine: default_speech_engine(),
            extra: empty_table(),
        }
    }
}

/// The text engine backs lore, hero-pov and generate-text only. Narration
/// runs without it.
#[derive(Debug, Deserialize, Clone)]
pub struct TextConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_text_engine")]
    pub engine: String,

    #[serde(flatten)]
    pub extra: toml::Value,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: default_text_engine(),
            extra: empty_table(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ContentConfig {
    #[serde(default)]
    pub chapters_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_credential_provider() -> String {
    "secret-manager".to_string()
}

fn default_speech_engine() -> String {
    "gradio".to_string()
}

fn default_true() -> bool {
    true
}

fn default_text_engine() -> String {
    "gemini".to_string()
}

fn empty_table() -> toml::Value {
    toml::Value::Table(Default::default())
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern compiles"))
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in env_var_pattern().captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                errors.push(var_name.to_string());
            }
        }
    }

    if let Some(first_missing) = errors.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound(first_missing));
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string (for testing).
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.narration.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "narration.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
