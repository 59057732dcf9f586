use async_trait::async_trait;
use nakshatra_core::{
    Credential, CredentialError, GenerationParams, NarrationError, NarrationResult, PcmFormat,
    SpeechError, TextGenerationError,
};
use nakshatra_credential::CredentialProvider;
use nakshatra_narration::{AudioFetcher, ChapterStore, Narrator, Storyteller};
use nakshatra_server::{build_router, AppState};
use nakshatra_speech::{SpeechConnector, SpeechSession};
use nakshatra_text::TextGenerator;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone, Copy)]
enum Upstream {
    Url,
    Pcm,
    Fails,
    NoCredential,
}

struct Provider(Upstream);

#[async_trait]
impl CredentialProvider for Provider {
    fn name(&self) -> &str {
        "test"
    }
    async fn initialize(&mut self, _config: toml::Value) -> Result<(), CredentialError> {
        Ok(())
    }
    async fn resolve(&self) -> Result<Credential, CredentialError> {
        match self.0 {
            Upstream::NoCredential => Err(CredentialError::NotFound("HF_TOKEN".to_string())),
            _ => Ok(Credential::new("hf_test")),
        }
    }
}

struct Connector(Upstream);

#[async_trait]
impl SpeechConnector for Connector {
    fn name(&self) -> &str {
        "test"
    }
    async fn initialize(&mut self, _config: toml::Value) -> Result<(), SpeechError> {
        Ok(())
    }
    async fn connect(&self, _credential: &Credential) -> Result<Box<dyn SpeechSession>, SpeechError> {
        Ok(Box::new(Session(self.0)))
    }
}

struct Session(Upstream);

#[async_trait]
impl SpeechSession for Session {
    async fn generate(
        &self,
        _text: &str,
        _params: &GenerationParams,
    ) -> Result<NarrationResult, SpeechError> {
        match self.0 {
            Upstream::Pcm => Ok(NarrationResult::Pcm {
                samples: vec![0, 0, 1, 0],
                format: PcmFormat::UPSTREAM_RAW,
            }),
            Upstream::Fails => Err(SpeechError::RequestFailed("CUDA out of memory".to_string())),
            _ => Ok(NarrationResult::Url {
                url: "http://audio.test/missing.wav".to_string(),
            }),
        }
    }
}

/// Every download 404s.
struct MissingAudio;

#[async_trait]
impl AudioFetcher for MissingAudio {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, NarrationError> {
        Err(NarrationError::DownloadFailed(format!("{url} returned 404 Not Found")))
    }
}

struct Echo;

#[async_trait]
impl TextGenerator for Echo {
    fn name(&self) -> &str {
        "echo"
    }
    async fn initialize(&mut self, _config: toml::Value) -> Result<(), TextGenerationError> {
        Ok(())
    }
    async fn generate(&self, prompt: &str) -> Result<String, TextGenerationError> {
        Ok(format!("echo({})", prompt.len()))
    }
}

fn chapters() -> Arc<ChapterStore> {
    Arc::new(
        ChapterStore::from_json_str(
            r#"[{"chapter": 1, "title": "Exile", "text_original": "They left at dawn.",
                 "perspectives": {"Sita": "I chose the forest."}}]"#,
        )
        .unwrap(),
    )
}

async fn spawn_app(upstream: Upstream) -> String {
    spawn_with(upstream, Storyteller::new(Arc::new(Echo), chapters())).await
}

async fn spawn_with(upstream: Upstream, storyteller: Storyteller) -> String {
    let state = AppState {
        narrator: Narrator::new(
            Arc::new(Provider(upstream)),
            Arc::new(Connector(upstream)),
            Arc::new(MissingAudio),
        ),
        storyteller,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.expect("server run");
    });
    format!("http://{addr}")
}

async fn post(base: &str, path: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_health() {
    let base = spawn_app(Upstream::Url).await;
    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_narration_returns_audio_url() {
    let base = spawn_app(Upstream::Url).await;
    let (status, body) = post(&base, "/api/narration", json!({ "text_to_speak": "Om" })).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "audioUrl": "http://audio.test/missing.wav" }));
}

#[tokio::test]
async fn test_narration_accepts_text_alias() {
    let base = spawn_app(Upstream::Pcm).await;
    let (status, body) = post(&base, "/api/narration", json!({ "text": "Om" })).await;
    assert_eq!(status, 200);
    assert!(body["media"]
        .as_str()
        .unwrap()
        .starts_with("data:audio/wav;base64,UklGR"));
}

#[tokio::test]
async fn test_narration_without_text_is_400() {
    let base = spawn_app(Upstream::Url).await;
    for payload in [json!({}), json!({ "text_to_speak": "" })] {
        let (status, body) = post(&base, "/api/narration", payload).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "invalid-argument");
    }
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let base = spawn_app(Upstream::Url).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/narration"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid-argument");
}

#[tokio::test]
async fn test_missing_credential_is_503() {
    let base = spawn_app(Upstream::NoCredential).await;
    let (status, body) = post(&base, "/api/narration", json!({ "text_to_speak": "Om" })).await;
    assert_eq!(status, 503);
    assert_eq!(body["error"], "unavailable");
    assert!(body["details"].as_str().unwrap().contains("HF_TOKEN"));
}

#[tokio::test]
async fn test_generation_failure_is_500() {
    let base = spawn_app(Upstream::Fails).await;
    let (status, body) = post(&base, "/api/narration", json!({ "text_to_speak": "Om" })).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "internal");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("CUDA out of memory"));
}

#[tokio::test]
async fn test_character_download_failure_is_502() {
    let base = spawn_app(Upstream::Url).await;
    let (status, body) = post(
        &base,
        "/api/narration/character",
        json!({ "characterName": "Sita", "dialogue": "Where is he?" }),
    )
    .await;
    assert_eq!(status, 502);
    assert_eq!(body["error"], "bad-gateway");
}

#[tokio::test]
async fn test_text_routes() {
    let base = spawn_app(Upstream::Url).await;

    let (status, body) = post(&base, "/api/lore", json!({ "characterName": "Sugriva" })).await;
    assert_eq!(status, 200);
    assert!(body.as_str().unwrap().starts_with("echo("));

    let (status, body) = post(
        &base,
        "/api/hero-pov",
        json!({ "chapterId": 1, "characterName": "Sita" }),
    )
    .await;
    assert_eq!(status, 200);
    assert!(body["narration"].as_str().unwrap().starts_with("echo("));

    let (status, body) = post(&base, "/api/generate-text", json!({ "prompt": "abc" })).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "generatedText": "echo(3)" }));
}

#[tokio::test]
async fn test_hero_pov_unknown_chapter_is_404() {
    let base = spawn_app(Upstream::Url).await;
    let (status, body) = post(
        &base,
        "/api/hero-pov",
        json!({ "chapterId": 42, "characterName": "Rama" }),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "not-found");
}

#[tokio::test]
async fn test_narration_works_without_text_engine() {
    let base = spawn_with(Upstream::Url, Storyteller::without_generator(chapters())).await;

    let (status, body) = post(&base, "/api/narration", json!({ "text_to_speak": "Om" })).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "audioUrl": "http://audio.test/missing.wav" }));

    for (path, payload) in [
        ("/api/lore", json!({ "characterName": "Sugriva" })),
        ("/api/hero-pov", json!({ "chapterId": 1, "characterName": "Sita" })),
        ("/api/generate-text", json!({ "prompt": "abc" })),
    ] {
        let (status, body) = post(&base, path, payload).await;
        assert_eq!(status, 503, "{path}");
        assert_eq!(body["error"], "unavailable");
    }
}

#[tokio::test]
async fn test_blank_narration_text_is_accepted() {
    let base = spawn_app(Upstream::Url).await;
    let (status, _) = post(&base, "/api/narration", json!({ "text_to_speak": "   " })).await;
    assert_eq!(status, 200);
}
