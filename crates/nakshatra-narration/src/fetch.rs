use async_trait::async_trait;
use nakshatra_core::NarrationError;

/// Downloads audio that the speech model left on its own host.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, NarrationError>;
}

/// Plain unauthenticated `GET`.
#[derive(Clone, Default)]
pub struct HttpAudioFetcher {
    client: reqwest::Client,
}

impl HttpAudioFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AudioFetcher for HttpAudioFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, NarrationError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NarrationError::DownloadFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(NarrationError::DownloadFailed(format!(
                "{url} returned {status}"
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NarrationError::DownloadFailed(e.to_string()))?;
        tracing::debug!(url = %url, bytes = bytes.len(), "audio downloaded");
        Ok(bytes.to_vec())
    }
}
