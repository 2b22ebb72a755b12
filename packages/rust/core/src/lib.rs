//! Prompt pipeline and task orchestration for ArticleChat.
//!
//! This crate provides:
//! - [`TextGenerator`] / [`GroqClient`]: one completion per prompt
//! - [`PromptPipeline`]: Interact, Classify, Summarize, Enhance
//! - [`ArticleAssistant`]: resolve a reference, then run a task
//! - [`classify_all`]: batch classification over the document store

pub mod assistant;
pub mod batch;
pub mod generation;
pub mod pipeline;
pub mod prompt;

pub use assistant::ArticleAssistant;
pub use batch::classify_all;
pub use generation::{GroqClient, TextGenerator};
pub use pipeline::PromptPipeline;
pub use prompt::{ERROR_CATEGORY, NO_SUMMARY, RESPONSE_HEADER, UNCATEGORIZED};
