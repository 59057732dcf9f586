use crate::error::HttpError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use nakshatra_core::{NarrationError, NarrationOutput};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
pub struct NarrationBody {
    #[serde(alias = "text")]
    pub text_to_speak: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterNarrationBody {
    pub character_name: Option<String>,
    pub dialogue: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoreBody {
    pub character_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroPovBody {
    pub chapter_id: Option<u32>,
    pub character_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateTextBody {
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HeroPovResponse {
    pub narration: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTextResponse {
    pub generated_text: String,
}

/// Unwrap a JSON body, reporting malformed input in the service's own error shape.
fn body<T: DeserializeOwned>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    payload
        .map(|Json(b)| b)
        .map_err(|e| NarrationError::InvalidInput(e.body_text()).into())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn narration(
    State(state): State<AppState>,
    payload: Result<Json<NarrationBody>, JsonRejection>,
) -> Result<Json<NarrationOutput>, HttpError> {
    let req = body(payload)?;
    let output = state.narrator.narrate(req.text_to_speak.as_deref()).await?;
    Ok(Json(output))
}

pub async fn character_narration(
    State(state): State<AppState>,
    payload: Result<Json<CharacterNarrationBody>, JsonRejection>,
) -> Result<Json<NarrationOutput>, HttpError> {
    let req = body(payload)?;
    let output = state
        .narrator
        .narrate_character(req.character_name.as_deref(), req.dialogue.as_deref())
        .await?;
    Ok(Json(output))
}

pub async fn lore(
    State(state): State<AppState>,
    payload: Result<Json<LoreBody>, JsonRejection>,
) -> Result<Json<String>, HttpError> {
    let req = body(payload)?;
    let text = state.storyteller.lore(req.character_name.as_deref()).await?;
    Ok(Json(text))
}

pub async fn hero_pov(
    State(state): State<AppState>,
    payload: Result<Json<HeroPovBody>, JsonRejection>,
) -> Result<Json<HeroPovResponse>, HttpError> {
    let req = body(payload)?;
    let narration = state
        .storyteller
        .hero_pov(req.chapter_id, req.character_name.as_deref())
        .await?;
    Ok(Json(HeroPovResponse { narration }))
}

pub async fn generate_text(
    State(state): State<AppState>,
    payload: Result<Json<GenerateTextBody>, JsonRejection>,
) -> Result<Json<GenerateTextResponse>, HttpError> {
    let req = body(payload)?;
    let generated_text = state
        .storyteller
        .generate_text(req.prompt.as_deref())
        .await?;
    Ok(Json(GenerateTextResponse { generated_text }))
}
