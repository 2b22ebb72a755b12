//! Batch classification over every stored article.

use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use articlechat_shared::{Classification, DocumentStore, Result, StoredArticle};

use crate::pipeline::PromptPipeline;
use crate::prompt::ERROR_CATEGORY;

/// Classify every article in `store`.
///
/// Returns one [`Classification`] per stored article, in the store's order.
/// A failure on one article is logged and recorded as the `"Error"` category;
/// it never aborts the batch. Only a failure to list the articles is returned
/// as an error.
///
/// At most `concurrency` classifications are in flight (values below 1 are
/// treated as 1). Results are not written back; that is the caller's call.
#[instrument(skip_all, fields(concurrency = concurrency))]
pub async fn classify_all(
    pipeline: &PromptPipeline,
    store: &dyn DocumentStore,
    concurrency: usize,
) -> Result<Vec<Classification>> {
    let articles = store.list_with_content().await?;
    let total = articles.len();

    let results: Vec<Classification> = stream::iter(articles)
        .map(|article| classify_one(pipeline, article))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let failed = results
        .iter()
        .filter(|c| c.category == ERROR_CATEGORY)
        .count();
    info!(total, failed, "batch classification complete");

    Ok(results)
}

async fn classify_one(pipeline: &PromptPipeline, article: StoredArticle) -> Classification {
    let title = article.display_title().to_string();
    let excerpt = article.content.as_deref().unwrap_or_default();

    let category = match pipeline.classify(excerpt).await {
        Ok(result) => result.text,
        Err(e) => {
            warn!(id = %article.id, error = %e, "classification failed");
            ERROR_CATEGORY.to_string()
        }
    };

    Classification {
        id: article.id,
        title,
        category,
    }
}
