pub mod types;
pub mod traits;
pub mod streaming;
pub mod buffer_utils;
pub mod openai;
pub mod config;

pub use traits::{
    ChatClient,
    EmbeddingClient,
    ChatRequest, ChatResponse, ChatOptions,
    ChatStream, EventStream, UsageReceiver,
    TokenUsage,
};

pub use streaming::StreamEvent;
pub use buffer_utils::CircularLineBuffer;
pub use openai::OpenAIClient;
pub use config::{ClientFactory, OpenAIConfig};
pub use types::Message;
