//! Seam between the core and whatever document store holds the articles.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ArticleSummary, StoredArticle};

/// Read access to stored articles.
///
/// Implemented by `articlechat-storage` for libSQL; tests substitute an
/// in-memory fake.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Look up one article. `Ok(None)` means the id is unknown.
    async fn find_by_id(&self, id: &str) -> Result<Option<StoredArticle>>;

    /// Every article's id and title (missing titles become `"Untitled"`).
    async fn list_all(&self) -> Result<Vec<ArticleSummary>>;

    /// Every article including its content, in a stable order.
    async fn list_with_content(&self) -> Result<Vec<StoredArticle>>;
}
