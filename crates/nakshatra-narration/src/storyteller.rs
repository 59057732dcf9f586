use crate::chapters::ChapterStore;
use crate::narrator::{within_budget, DEFAULT_TIMEOUT};
use nakshatra_core::NarrationError;
use nakshatra_text::TextGenerator;
use std::sync::Arc;
use std::time::Duration;

fn lore_prompt(character: &str) -> String {
    format!(
        "As a master storyteller, narrate the life of {character} from the Ramayana. \
         Dwell on the lesser-known stories of their life, before and during the epic, \
         and reveal details few people know. Tell it as a compelling story and keep \
         the narrative on {character} alone."
    )
}

fn enhancement_prompt(character: &str, text: &str) -> String {
    format!(
        "You are an expert storyteller enhancing a pre-written, first-person narration \
         of a Ramayana chapter told by {character}. Make it more immersive and \
         emotionally resonant.\n\
         Rules:\n\
         1. Keep the sequence of events. Add no new plot points.\n\
         2. Build on the existing text: smooth the phrasing, add sensory detail, and \
            deepen the inner monologue already implied.\n\
         3. Keep the voice true to {character}.\n\
         4. Return only the enhanced narration, with no preamble.\n\n\
         Text to enhance: \"{text}\""
    )
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, NarrationError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| NarrationError::InvalidInput(format!("\"{field}\" is required")))
}

/// Prose flows backed by a hosted text model.
///
/// Built without a generator, every flow that needs the model fails with
/// `CredentialUnavailable`; input checks and chapter lookups still run.
#[derive(Clone)]
pub struct Storyteller {
    generator: Option<Arc<dyn TextGenerator>>,
    chapters: Arc<ChapterStore>,
    timeout: Duration,
}

impl Storyteller {
    pub fn new(generator: Arc<dyn TextGenerator>, chapters: Arc<ChapterStore>) -> Self {
        Self {
            generator: Some(generator),
            chapters,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn without_generator(chapters: Arc<ChapterStore>) -> Self {
        Self {
            generator: None,
            chapters,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Backstory of a character.
    pub async fn lore(&self, character_name: Option<&str>) -> Result<String, NarrationError> {
        let character = required(character_name, "characterName")?;
        tracing::info!(character = %character, "lore requested");
        self.ask(&lore_prompt(character)).await
    }

    /// Chapter `chapter_id` retold by `character_name`.
    pub async fn hero_pov(
        &self,
        chapter_id: Option<u32>,
        character_name: Option<&str>,
    ) -> Result<String, NarrationError> {
        let chapter_id = chapter_id
            .ok_or_else(|| NarrationError::InvalidInput("\"chapterId\" is required".to_string()))?;
        let character = required(character_name, "characterName")?;
        let text = self.chapters.perspective(chapter_id, character)?;
        tracing::info!(chapter = chapter_id, character = %character, "hero perspective requested");
        self.ask(&enhancement_prompt(character, text)).await
    }

    /// Free-form prompt passthrough.
    pub async fn generate_text(&self, prompt: Option<&str>) -> Result<String, NarrationError> {
        let prompt = required(prompt, "prompt")?;
        self.ask(prompt).await
    }

    async fn ask(&self, prompt: &str) -> Result<String, NarrationError> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            NarrationError::CredentialUnavailable("no text engine is configured".to_string())
        })?;
        within_budget(self.timeout, async {
            generator.generate(prompt).await.map_err(|e| {
                tracing::error!(engine = %generator.name(), "text generation failed: {e}");
                NarrationError::from(e)
            })
        })
        .await
    }
}
