//! Minimal RIFF/WAVE container for raw little-endian PCM.
//!
//! The writer emits the canonical 44-byte header (RIFF, a 16-byte `fmt `
//! chunk with format tag 1, and the `data` chunk header) followed by the
//! caller's bytes untouched. The reader walks the RIFF chunk list and only
//! looks at header fields, so partial frames and odd bit depths read back
//! exactly as written.

use crate::error::WavError;
use crate::types::PcmFormat;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const HEADER_LEN: usize = 44;

const WAVE_FORMAT_PCM: u16 = 1;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xfffe;
const FMT_CHUNK_LEN: u32 = 16;

pub const DATA_URI_PREFIX: &str = "data:audio/wav;base64,";

/// Wrap `pcm` in a WAV container.
///
/// The payload is not checked against the frame size; a trailing partial
/// frame is carried through as-is.
pub fn encode(pcm: &[u8], format: PcmFormat) -> Vec<u8> {
    let data_len = u32::try_from(pcm.len()).unwrap_or(u32::MAX);
    let riff_len = data_len.saturating_add(HEADER_LEN as u32 - 8);

    let mut out = Vec::with_capacity(HEADER_LEN + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_len.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    out.extend_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.sample_rate.to_le_bytes());
    out.extend_from_slice(&format.byte_rate().to_le_bytes());
    out.extend_from_slice(&format.block_align().to_le_bytes());
    out.extend_from_slice(&format.bit_depth.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);

    tracing::trace!(
        payload_bytes = pcm.len(),
        channels = format.channels,
        sample_rate = format.sample_rate,
        bit_depth = format.bit_depth,
        "encoded WAV container"
    );
    out
}

/// Base64 data URI for an already-encoded WAV file.
pub fn to_data_uri(wav: &[u8]) -> String {
    let mut uri = String::with_capacity(DATA_URI_PREFIX.len() + wav.len().div_ceil(3) * 4);
    uri.push_str(DATA_URI_PREFIX);
    STANDARD.encode_string(wav, &mut uri);
    uri
}

/// Encode raw PCM and return it as a data URI in one step.
pub fn pcm_to_data_uri(pcm: &[u8], format: PcmFormat) -> String {
    to_data_uri(&encode(pcm, format))
}

/// Header fields of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub format: PcmFormat,
    pub data_len: u32,
}

fn u16_le(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn u32_le(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

impl WavInfo {
    /// Parse the `fmt ` and `data` chunk headers.
    ///
    /// `data_len` is the length recorded in the header, whether or not that
    /// many bytes follow it.
    pub fn read(wav: &[u8]) -> Result<Self, WavError> {
        if wav.len() < 12 || &wav[0..4] != b"RIFF" || &wav[8..12] != b"WAVE" {
            return Err(WavError::NotWave);
        }

        let mut format = None;
        let mut offset = 12;
        while offset + 8 <= wav.len() {
            let id = &wav[offset..offset + 4];
            let len = u32_le(wav, offset + 4);
            let body = offset + 8;

            match id {
                b"fmt " => {
                    if len < 16 || body + 16 > wav.len() {
                        return Err(WavError::Truncated("fmt "));
                    }
                    let tag = u16_le(wav, body);
                    if tag != WAVE_FORMAT_PCM && tag != WAVE_FORMAT_EXTENSIBLE {
                        return Err(WavError::UnsupportedFormat(tag));
                    }
                    format = Some(PcmFormat {
                        channels: u16_le(wav, body + 2),
                        sample_rate: u32_le(wav, body + 4),
                        bit_depth: u16_le(wav, body + 14),
                    });
                }
                b"data" => {
                    let format = format.ok_or(WavError::MissingChunk("fmt "))?;
                    return Ok(Self {
                        format,
                        data_len: len,
                    });
                }
                _ => {}
            }

            // Chunks are word aligned.
            let padded = (len as usize).saturating_add(len as usize & 1);
            offset = body.saturating_add(padded);
        }

        Err(match format {
            Some(_) => WavError::MissingChunk("data"),
            None => WavError::MissingChunk("fmt "),
        })
    }

    pub fn duration_secs(&self) -> f64 {
        let byte_rate = self.format.byte_rate();
        if byte_rate == 0 {
            return 0.0;
        }
        f64::from(self.data_len) / f64::from(byte_rate)
    }
}
