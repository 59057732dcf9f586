use crate::fetch::AudioFetcher;
use nakshatra_core::wav;
use nakshatra_core::{
    Delivery, GenerationParams, NarrationError, NarrationOutput, NarrationRequest,
    NarrationResult, WavInfo,
};
use nakshatra_credential::CredentialProvider;
use nakshatra_speech::SpeechConnector;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Run `fut` to completion or fail with `GenerationFailed` once `budget` elapses.
pub(crate) async fn within_budget<T, F>(budget: Duration, fut: F) -> Result<T, NarrationError>
where
    F: Future<Output = Result<T, NarrationError>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(NarrationError::GenerationFailed(format!(
            "no result within {budget:?}"
        ))),
    }
}

/// Turns text into speech through the configured credential provider and
/// speech connector.
///
/// Every call resolves a fresh credential and opens its own session. Nothing
/// is shared between requests except the read-only handles held here.
#[derive(Clone)]
pub struct Narrator {
    credentials: Arc<dyn CredentialProvider>,
    speech: Arc<dyn SpeechConnector>,
    fetcher: Arc<dyn AudioFetcher>,
    timeout: Duration,
    delivery: Delivery,
}

impl Narrator {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        speech: Arc<dyn SpeechConnector>,
        fetcher: Arc<dyn AudioFetcher>,
    ) -> Self {
        Self {
            credentials,
            speech,
            fetcher,
            timeout: DEFAULT_TIMEOUT,
            delivery: Delivery::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    /// One upstream round trip: credential, session, generation.
    ///
    /// Not bounded by the timeout; the public entry points wrap it.
    pub async fn generate(
        &self,
        request: &NarrationRequest,
    ) -> Result<NarrationResult, NarrationError> {
        let credential = self.credentials.resolve().await.map_err(|e| {
            tracing::error!(provider = %self.credentials.name(), "credential resolution failed: {e}");
            NarrationError::from(e)
        })?;

        let session = self.speech.connect(&credential).await?;
        let result = session
            .generate(&request.tagged_text(), &GenerationParams::NARRATION)
            .await?;

        match &result {
            NarrationResult::Url { url } => {
                tracing::info!(engine = %self.speech.name(), url = %url, "narration generated")
            }
            NarrationResult::Pcm { samples, .. } => tracing::info!(
                engine = %self.speech.name(),
                bytes = samples.len(),
                "narration generated as raw samples"
            ),
        }
        Ok(result)
    }

    /// Narrate `text` using the configured delivery mode.
    pub async fn narrate(&self, text: Option<&str>) -> Result<NarrationOutput, NarrationError> {
        let request = NarrationRequest::new(text)?;
        tracing::info!(
            chars = request.text().len(),
            delivery = ?self.delivery,
            "narration requested"
        );
        within_budget(self.timeout, self.narrate_with(&request, self.delivery)).await
    }

    /// Voice a character's line. Always returns embedded audio.
    pub async fn narrate_character(
        &self,
        character_name: Option<&str>,
        dialogue: Option<&str>,
    ) -> Result<NarrationOutput, NarrationError> {
        let request = NarrationRequest::new(dialogue)?;
        tracing::info!(
            character = character_name.unwrap_or_default(),
            chars = request.text().len(),
            "character narration requested"
        );
        within_budget(self.timeout, self.narrate_with(&request, Delivery::Inline)).await
    }

    /// Complete WAV file for `text`, however the upstream delivered it.
    pub async fn render_wav(&self, text: Option<&str>) -> Result<Vec<u8>, NarrationError> {
        let request = NarrationRequest::new(text)?;
        within_budget(self.timeout, async {
            match self.generate(&request).await? {
                NarrationResult::Url { url } => self.fetcher.fetch(&url).await,
                NarrationResult::Pcm { samples, format } => Ok(wav::encode(&samples, format)),
            }
        })
        .await
    }

    async fn narrate_with(
        &self,
        request: &NarrationRequest,
        delivery: Delivery,
    ) -> Result<NarrationOutput, NarrationError> {
        let result = self.generate(request).await?;
        self.deliver(result, delivery).await
    }

    async fn deliver(
        &self,
        result: NarrationResult,
        delivery: Delivery,
    ) -> Result<NarrationOutput, NarrationError> {
        match (result, delivery) {
            (NarrationResult::Url { url }, Delivery::Url) => {
                Ok(NarrationOutput::AudioUrl { audio_url: url })
            }
            (NarrationResult::Url { url }, Delivery::Inline) => {
                let audio = self.fetcher.fetch(&url).await?;
                match WavInfo::read(&audio) {
                    Ok(info) => tracing::debug!(
                        channels = info.format.channels,
                        sample_rate = info.format.sample_rate,
                        bit_depth = info.format.bit_depth,
                        data_len = info.data_len,
                        duration_secs = info.duration_secs(),
                        "embedding fetched audio"
                    ),
                    Err(e) => tracing::warn!(url = %url, "fetched audio has no readable WAV header: {e}"),
                }
                Ok(NarrationOutput::Media {
                    media: wav::to_data_uri(&audio),
                })
            }
            (NarrationResult::Pcm { samples, format }, _) => Ok(NarrationOutput::Media {
                media: wav::pcm_to_data_uri(&samples, format),
            }),
        }
    }
}
