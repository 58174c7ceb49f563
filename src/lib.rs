//! Multi-model terminal chatbot backed by the OpenRouter chat completions API.

pub mod cache;
pub mod catalog;
pub mod commands;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod error;
pub mod session;
pub mod ui;

pub use cache::{CacheKey, ReplyCache};
pub use catalog::{ModelCatalog, ModelEntry};
pub use completion::{
    ChatTransport, CompletionClient, HttpReply, OutboundRequest, ReqwestTransport,
    TransportFailure, OPENROUTER_CHAT_URL,
};
pub use config::{ApiKey, Config};
pub use conversation::{Conversation, Role, Turn};
pub use error::{CompletionError, ConfigError, SessionError};
pub use session::{ChatSession, RequestState};
