//! InsightHub: a terminal knowledge-base index with an assistant panel that
//! forwards questions, plus a summary of the index, to a hosted Gemini model.

pub mod app_state;
pub mod chat;
pub mod config;
pub mod constants;
pub mod events;
pub mod knowledge_base;
pub mod llm_interaction;
pub mod orchestrator;
pub mod tui;
pub mod ui;
pub mod ui_components;

pub use chat::{ChatMessage, ChatPanel, ChatRole, ChatState};
pub use config::{AssistantConfig, ConfigError, Settings};
pub use knowledge_base::{KnowledgeBase, KnowledgeBaseError};
pub use llm_interaction::{GeminiClient, GenerateError, GenerationRequest, GenerativeModel, SamplingParams};
pub use orchestrator::PromptOrchestrator;
