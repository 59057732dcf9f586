use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential provider initialization failed: {0}")]
    InitializationFailed(String),

    #[error("secret store request failed: {0}")]
    Unreachable(String),

    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("permission denied for secret: {0}")]
    PermissionDenied(String),

    #[error("secret payload is malformed: {0}")]
    MalformedPayload(String),

    #[error("credential provider not found: {0}")]
    ProviderNotFound(String),
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech engine initialization failed: {0}")]
    InitializationFailed(String),

    #[error("failed to connect to speech endpoint: {0}")]
    ConnectionFailed(String),

    #[error("speech request rejected: {0}")]
    RequestFailed(String),

    #[error("unexpected response from speech endpoint: {0}")]
    UnexpectedResponse(String),

    #[error("speech engine not found: {0}")]
    EngineNotFound(String),
}

#[derive(Debug, Error)]
pub enum TextGenerationError {
    #[error("text generator initialization failed: {0}")]
    InitializationFailed(String),

    #[error("text generation request failed: {0}")]
    RequestFailed(String),

    #[error("unexpected response from text model: {0}")]
    UnexpectedResponse(String),

    #[error("text generator not found: {0}")]
    EngineNotFound(String),
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read chapter file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse chapter file: {0}")]
    Parse(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WavError {
    #[error("not a RIFF/WAVE file")]
    NotWave,

    #[error("WAV file ends inside the {0} chunk header")]
    Truncated(&'static str),

    #[error("WAV file has no {0} chunk")]
    MissingChunk(&'static str),

    #[error("unsupported WAV format tag {0}")]
    UnsupportedFormat(u16),
}

/// Request-level failure surfaced to callers of the narration flows.
///
/// Each variant carries the upstream message for diagnostics.
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("invalid argument: {0}")]
    InvalidInput(String),

    #[error("credential unavailable: {0}")]
    CredentialUnavailable(String),

    #[error("generation failed: {0}")]
    GenerationFailed(String),

    #[error("audio download failed: {0}")]
    DownloadFailed(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl From<CredentialError> for NarrationError {
    fn from(e: CredentialError) -> Self {
        NarrationError::CredentialUnavailable(e.to_string())
    }
}

impl From<SpeechError> for NarrationError {
    fn from(e: SpeechError) -> Self {
        NarrationError::GenerationFailed(e.to_string())
    }
}

impl From<TextGenerationError> for NarrationError {
    fn from(e: TextGenerationError) -> Self {
        NarrationError::GenerationFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_error_maps_to_unavailable() {
        let err: NarrationError = CredentialError::NotFound("HF_TOKEN".to_string()).into();
        match err {
            NarrationError::CredentialUnavailable(msg) => assert!(msg.contains("HF_TOKEN")),
            other => panic!("expected CredentialUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_speech_error_maps_to_generation_failed() {
        let err: NarrationError =
            SpeechError::UnexpectedResponse("no url field".to_string()).into();
        match err {
            NarrationError::GenerationFailed(msg) => assert!(msg.contains("no url field")),
            other => panic!("expected GenerationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_text_error_maps_to_generation_failed() {
        let err: NarrationError = TextGenerationError::RequestFailed("429".to_string()).into();
        assert!(matches!(err, NarrationError::GenerationFailed(_)));
    }
}
