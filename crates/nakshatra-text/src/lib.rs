pub mod gemini;
pub mod generator_trait;
pub mod registry;

pub use gemini::GeminiGenerator;
pub use generator_trait::TextGenerator;
pub use registry::TextRegistry;
