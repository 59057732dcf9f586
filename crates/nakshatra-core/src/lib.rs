pub mod config;
pub mod error;
pub mod types;
pub mod wav;

pub use config::{AppConfig, CredentialConfig, SpeechConfig, TextConfig};
pub use error::{
    ConfigError, ContentError, CredentialError, NarrationError, SpeechError, TextGenerationError,
    WavError,
};
pub use types::{
    tag_single_speaker, Credential, Delivery, GenerationParams, NarrationOutput,
    NarrationRequest, NarrationResult, PcmFormat, SPEAKER_TAG,
};
pub use wav::WavInfo;
