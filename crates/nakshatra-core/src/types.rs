use crate::error::NarrationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker tag the speech model expects in front of a single-speaker line.
pub const SPEAKER_TAG: &str = "[S1]";

/// Bearer token for an upstream provider.
///
/// The value is only reachable through [`Credential::expose`]; `Debug` is
/// redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Text submitted by the browser for narration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationRequest {
    text: String,
}

impl NarrationRequest {
    /// Rejects missing and empty text. Any other string is passed through as-is.
    pub fn new(text: Option<&str>) -> Result<Self, NarrationError> {
        match text {
            Some(t) if !t.is_empty() => Ok(Self {
                text: t.to_string(),
            }),
            _ => Err(NarrationError::InvalidInput(
                "the request must include non-empty \"text_to_speak\"".to_string(),
            )),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text as submitted upstream, marked as a single-speaker utterance.
    pub fn tagged_text(&self) -> String {
        tag_single_speaker(&self.text)
    }
}

pub fn tag_single_speaker(text: &str) -> String {
    format!("{SPEAKER_TAG} {text}")
}

/// Layout of raw PCM bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub bit_depth: u16,
}

impl PcmFormat {
    /// Format assumed for raw samples returned by the speech endpoint.
    /// Nothing in the response confirms it.
    pub const UPSTREAM_RAW: PcmFormat = PcmFormat {
        channels: 1,
        sample_rate: 24_000,
        bit_depth: 16,
    };

    /// Saturates at `u16::MAX` for out-of-range formats.
    pub fn block_align(&self) -> u16 {
        self.channels.saturating_mul(self.bit_depth / 8)
    }

    /// Saturates at `u32::MAX` for out-of-range formats.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.saturating_mul(u32::from(self.block_align()))
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::UPSTREAM_RAW
    }
}

/// Result of one generation call, decoded at the upstream boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationResult {
    Url { url: String },
    Pcm { samples: Vec<u8>, format: PcmFormat },
}

/// Payload returned to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NarrationOutput {
    AudioUrl {
        #[serde(rename = "audioUrl")]
        audio_url: String,
    },
    Media {
        media: String,
    },
}

/// Fixed sampling parameters sent with every speech request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub cfg_scale: f64,
    pub temperature: f64,
    pub top_p: f64,
    pub cfg_filter_top_k: u32,
    pub speed_factor: f64,
}

impl GenerationParams {
    pub const NARRATION: GenerationParams = GenerationParams {
        max_new_tokens: 3072,
        cfg_scale: 3.0,
        temperature: 1.8,
        top_p: 0.95,
        cfg_filter_top_k: 45,
        speed_factor: 1.0,
    };
}

/// How a hosted audio URL is handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    /// Return the URL as-is.
    #[default]
    Url,
    /// Download the audio and embed it as a data URI.
    Inline,
}

impl std::str::FromStr for Delivery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(Delivery::Url),
            "inline" => Ok(Delivery::Inline),
            other => Err(format!("unknown delivery mode '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_missing_text() {
        assert!(matches!(
            NarrationRequest::new(None),
            Err(NarrationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_request_rejects_empty_text() {
        assert!(matches!(
            NarrationRequest::new(Some("")),
            Err(NarrationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_request_accepts_blank_text_verbatim() {
        let req = NarrationRequest::new(Some("   ")).unwrap();
        assert_eq!(req.text(), "   ");
        assert_eq!(req.tagged_text(), "[S1]    ");
    }

    #[test]
    fn test_tagged_text_prefixes_once() {
        let req = NarrationRequest::new(Some("Rama lifts the bow.")).unwrap();
        assert_eq!(req.tagged_text(), "[S1] Rama lifts the bow.");
        assert_eq!(req.tagged_text(), req.tagged_text());
        assert_eq!(req.text(), "Rama lifts the bow.");
    }

    #[test]
    fn test_double_tag_is_distinguishable() {
        let once = tag_single_speaker("Sita");
        let twice = tag_single_speaker(&once);
        assert_ne!(once, twice);
        assert_eq!(twice, "[S1] [S1] Sita");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = Credential::new("hf_supersecret");
        let printed = format!("{cred:?}");
        assert!(!printed.contains("supersecret"));
        assert_eq!(cred.expose(), "hf_supersecret");
    }

    #[test]
    fn test_pcm_format_defaults() {
        let fmt = PcmFormat::default();
        assert_eq!(fmt.channels, 1);
        assert_eq!(fmt.sample_rate, 24_000);
        assert_eq!(fmt.bit_depth, 16);
        assert_eq!(fmt.block_align(), 2);
        assert_eq!(fmt.byte_rate(), 48_000);
    }

    #[test]
    fn test_pcm_format_extreme_values_saturate() {
        let fmt = PcmFormat {
            channels: 8192,
            sample_rate: u32::MAX,
            bit_depth: 64,
        };
        assert_eq!(fmt.block_align(), u16::MAX);
        assert_eq!(fmt.byte_rate(), u32::MAX);
    }

    #[test]
    fn test_output_serializes_to_browser_shapes() {
        let url = NarrationOutput::AudioUrl {
            audio_url: "http://x/y.wav".to_string(),
        };
        let media = NarrationOutput::Media {
            media: "data:audio/wav;base64,AAAA".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&url).unwrap(),
            serde_json::json!({ "audioUrl": "http://x/y.wav" })
        );
        assert_eq!(
            serde_json::to_value(&media).unwrap(),
            serde_json::json!({ "media": "data:audio/wav;base64,AAAA" })
        );
    }

    #[test]
    fn test_delivery_from_str() {
        assert_eq!("url".parse::<Delivery>(), Ok(Delivery::Url));
        assert_eq!("inline".parse::<Delivery>(), Ok(Delivery::Inline));
        assert!("stream".parse::<Delivery>().is_err());
    }
}
