pub mod openai;
pub mod provider;
pub mod types;

pub use openai::{OpenAiProvider, DEFAULT_BASE_URL};
pub use provider::LlmProvider;
pub use types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Role, Usage};
