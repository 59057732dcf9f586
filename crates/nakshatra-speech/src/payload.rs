use nakshatra_core::{NarrationResult, PcmFormat, SpeechError};
use serde::Deserialize;

/// The two result shapes the speech endpoint is known to return.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UpstreamOutput {
    Hosted { url: String },
    Raw(Vec<u8>),
}

/// Decode one element of the endpoint's result array.
///
/// Raw bytes are tagged with [`PcmFormat::UPSTREAM_RAW`].
pub fn decode_output(value: &serde_json::Value) -> Result<NarrationResult, SpeechError> {
    let output = UpstreamOutput::deserialize(value).map_err(|_| {
        SpeechError::UnexpectedResponse(format!(
            "expected an object with a 'url' or an array of bytes, got {}",
            describe(value)
        ))
    })?;

    Ok(match output {
        UpstreamOutput::Hosted { url } => NarrationResult::Url { url },
        UpstreamOutput::Raw(samples) => NarrationResult::Pcm {
            samples,
            format: PcmFormat::UPSTREAM_RAW,
        },
    })
}

fn describe(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array that is not a byte buffer",
        serde_json::Value::Object(_) => "an object without a string 'url'",
    }
}
