mod gemini;
mod traits;
mod types;

pub use gemini::{DEFAULT_GEMINI_ENDPOINT, GeminiBackend};
pub use traits::ModelBackend;
pub use types::{BackendError, BackendReply, BackendRequest, ToolDeclaration};
