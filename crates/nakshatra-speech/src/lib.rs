pub mod gradio;
pub mod payload;
pub mod registry;
pub mod session_trait;

pub use gradio::GradioConnector;
pub use payload::decode_output;
pub use registry::SpeechRegistry;
pub use session_trait::{SpeechConnector, SpeechSession};
