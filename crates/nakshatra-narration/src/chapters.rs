//! Pre-processed chapters of the epic, each with the original text and
//! first-person retellings keyed by character.

use nakshatra_core::{ContentError, NarrationError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Character whose perspective is the original narration itself.
const PROTAGONIST: &str = "rama";

#[derive(Debug, Clone, Deserialize)]
pub struct Chapter {
    pub chapter: u32,
    pub title: String,
    pub text_original: String,
    #[serde(default)]
    pub perspectives: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct ChapterStore {
    chapters: Vec<Chapter>,
}

impl ChapterStore {
    pub fn new(chapters: Vec<Chapter>) -> Self {
        Self { chapters }
    }

    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), chapters = store.len(), "chapters loaded");
        Ok(store)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ContentError> {
        let chapters: Vec<Chapter> =
            serde_json::from_str(s).map_err(|e| ContentError::Parse(e.to_string()))?;
        Ok(Self { chapters })
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn chapter(&self, id: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.chapter == id)
    }

    /// Text of chapter `id` as told by `character`.
    pub fn perspective(&self, id: u32, character: &str) -> Result<&str, NarrationError> {
        let chapter = self
            .chapter(id)
            .ok_or_else(|| NarrationError::NotFound(format!("chapter {id}")))?;

        let text = if character.eq_ignore_ascii_case(PROTAGONIST) {
            Some(chapter.text_original.as_str())
        } else {
            chapter.perspectives.get(character).map(String::as_str)
        };

        text.filter(|t| !t.is_empty()).ok_or_else(|| {
            NarrationError::NotFound(format!("perspective for {character} in chapter {id}"))
        })
    }
}
