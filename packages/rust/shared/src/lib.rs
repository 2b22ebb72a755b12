//! Shared types, error model, and configuration for ArticleChat.
//!
//! This crate is the foundation depended on by all other ArticleChat crates.
//! It provides:
//! - [`ArticleChatError`]: the unified error type
//! - Domain types ([`ArticleReference`], [`TaskRequest`], [`StoredArticle`], ...)
//! - Configuration ([`AppConfig`], config loading)
//! - The [`DocumentStore`] trait

pub mod config;
pub mod error;
pub mod store;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BROWSER_USER_AGENT, BatchConfig, FetchConfig, GroqConfig, StorageConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{ArticleChatError, ProviderError, Result};
pub use store::DocumentStore;
pub use types::{
    ArticleReference, ArticleSummary, Classification, ResolvedArticle, StoredArticle, TaskKind,
    TaskRequest, TaskResult, UNTITLED,
};
