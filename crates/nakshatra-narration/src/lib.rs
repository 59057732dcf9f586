pub mod chapters;
pub mod fetch;
pub mod narrator;
pub mod storyteller;

pub use chapters::{Chapter, ChapterStore};
pub use fetch::{AudioFetcher, HttpAudioFetcher};
pub use narrator::{Narrator, DEFAULT_TIMEOUT};
pub use storyteller::Storyteller;
