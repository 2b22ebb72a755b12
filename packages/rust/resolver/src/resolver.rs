//! Turns an [`ArticleReference`] into plain article text.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};
use url::Url;

use articlechat_shared::{
    ArticleChatError, ArticleReference, DocumentStore, ResolvedArticle, Result,
};

use crate::extract::{extract_paragraph_text, extract_title};
use crate::fetcher::PageFetcher;

/// Resolves inline text, URLs, and stored-document ids.
///
/// Holds no per-call state; clones share the same store and fetcher. The
/// store is only consulted for [`ArticleReference::StoredId`].
#[derive(Clone)]
pub struct ContentResolver {
    store: Option<Arc<dyn DocumentStore>>,
    fetcher: Arc<dyn PageFetcher>,
    fetch_timeout: Duration,
}

impl ContentResolver {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        fetcher: Arc<dyn PageFetcher>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            store: Some(store),
            fetcher,
            fetch_timeout,
        }
    }

    /// A resolver for inline text and URLs only. Stored ids fail with
    /// [`ArticleChatError::Storage`].
    pub fn without_store(fetcher: Arc<dyn PageFetcher>, fetch_timeout: Duration) -> Self {
        Self {
            store: None,
            fetcher,
            fetch_timeout,
        }
    }

    /// Resolve a reference to a [`ResolvedArticle`].
    ///
    /// A stored article whose content is missing resolves to an empty body
    /// rather than failing; the prompt pipeline decides what a blank excerpt
    /// means for each task.
    #[instrument(skip_all, fields(reference = %reference))]
    pub async fn resolve(&self, reference: &ArticleReference) -> Result<ResolvedArticle> {
        match reference {
            ArticleReference::InlineText(content) => resolve_inline(content),
            ArticleReference::RemoteUrl(url) => self.resolve_url(url).await,
            ArticleReference::StoredId(id) => self.resolve_stored(id).await,
        }
    }

    async fn resolve_url(&self, raw: &str) -> Result<ResolvedArticle> {
        let url = Url::parse(raw.trim())
            .map_err(|e| ArticleChatError::Fetch(format!("invalid URL '{raw}': {e}")))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ArticleChatError::Fetch(format!(
                "unsupported URL scheme '{}'",
                url.scheme()
            )));
        }

        let page = self.fetcher.get(&url, self.fetch_timeout).await?;

        if !page.is_success() {
            warn!(%url, status = page.status, "article fetch returned non-success status");
            return Err(ArticleChatError::Fetch(format!("{url}: HTTP {}", page.status)));
        }

        let body = extract_paragraph_text(&page.body);
        if body.is_empty() {
            return Err(ArticleChatError::Extraction {
                url: url.to_string(),
            });
        }

        let title = extract_title(&page.body);
        info!(%url, chars = body.chars().count(), "article extracted");

        Ok(ResolvedArticle { title, body })
    }

    async fn resolve_stored(&self, id: &str) -> Result<ResolvedArticle> {
        let store = self.store.as_ref().ok_or_else(|| {
            ArticleChatError::Storage(format!("no document store available to look up '{id}'"))
        })?;

        let article = store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ArticleChatError::not_found(id))?;

        let title = article.display_title().to_string();
        let body = article.content.unwrap_or_default();
        if body.trim().is_empty() {
            debug!(%id, "stored article has no content");
        }

        Ok(ResolvedArticle {
            title: Some(title),
            body,
        })
    }
}

fn resolve_inline(content: &str) -> Result<ResolvedArticle> {
    if content.trim().is_empty() {
        return Err(ArticleChatError::empty_content("article text is blank"));
    }
    Ok(ResolvedArticle {
        title: None,
        body: content.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::fetcher::HttpFetcher;
    use articlechat_shared::{ArticleSummary, StoredArticle};
    use async_trait::async_trait;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct MemoryStore {
        articles: HashMap<String, StoredArticle>,
    }

    impl MemoryStore {
        fn with(mut self, id: &str, title: Option<&str>, content: Option<&str>) -> Self {
            self.articles.insert(
                id.into(),
                StoredArticle {
                    id: id.into(),
                    title: title.map(String::from),
                    content: content.map(String::from),
                    url: None,
                    category: None,
                },
            );
            self
        }
    }

    #[async_trait]
    impl DocumentStore for MemoryStore {
        async fn find_by_id(&self, id: &str) -> Result<Option<StoredArticle>> {
            Ok(self.articles.get(id).cloned())
        }

        async fn list_all(&self) -> Result<Vec<ArticleSummary>> {
            Ok(Vec::new())
        }

        async fn list_with_content(&self) -> Result<Vec<StoredArticle>> {
            Ok(self.articles.values().cloned().collect())
        }
    }

    fn resolver(store: MemoryStore) -> ContentResolver {
        ContentResolver::new(
            Arc::new(store),
            Arc::new(HttpFetcher::new("TestBrowser/1.0").unwrap()),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn inline_text_passes_through() {
        let resolved = resolver(MemoryStore::default())
            .resolve(&ArticleReference::InlineText("Hello world".into()))
            .await
            .unwrap();
        assert_eq!(
            resolved,
            ResolvedArticle {
                title: None,
                body: "Hello world".into()
            }
        );
    }

    #[tokio::test]
    async fn blank_inline_text_is_empty_content() {
        let err = resolver(MemoryStore::default())
            .resolve(&ArticleReference::InlineText(" \n\t ".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleChatError::EmptyContent { .. }));
    }

    #[tokio::test]
    async fn stored_id_returns_content() {
        let store =
            MemoryStore::default().with("a1", Some("Council vote"), Some("The council voted."));
        let resolved = resolver(store)
            .resolve(&ArticleReference::StoredId("a1".into()))
            .await
            .unwrap();
        assert_eq!(resolved.title.as_deref(), Some("Council vote"));
        assert_eq!(resolved.body, "The council voted.");
    }

    #[tokio::test]
    async fn stored_id_missing_fields_use_fallbacks() {
        let store = MemoryStore::default().with("a2", None, None);
        let resolved = resolver(store)
            .resolve(&ArticleReference::StoredId("a2".into()))
            .await
            .unwrap();
        assert_eq!(resolved.title.as_deref(), Some("Untitled"));
        assert_eq!(resolved.body, "");
    }

    #[tokio::test]
    async fn unknown_stored_id_is_not_found() {
        let err = resolver(MemoryStore::default())
            .resolve(&ArticleReference::StoredId("ghost".into()))
            .await
            .unwrap_err();
        match err {
            ArticleChatError::NotFound { id } => assert_eq!(id, "ghost"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn url_is_fetched_and_extracted() {
        let server = MockServer::start().await;
        let page = r#"<html><body>
            <h1>Bridge reopens</h1>
            <p>The bridge reopened on Monday.</p>
            <p>Traffic is expected to ease.</p>
        </body></html>"#;
        Mock::given(method("GET"))
            .and(path("/news/bridge"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let url = format!("{}/news/bridge", server.uri());
        let resolved = resolver(MemoryStore::default())
            .resolve(&ArticleReference::RemoteUrl(url))
            .await
            .unwrap();

        assert_eq!(resolved.title.as_deref(), Some("Bridge reopens"));
        assert_eq!(
            resolved.body,
            "The bridge reopened on Monday. Traffic is expected to ease."
        );
    }

    #[tokio::test]
    async fn url_with_error_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<p>maintenance</p>"))
            .mount(&server)
            .await;

        let err = resolver(MemoryStore::default())
            .resolve(&ArticleReference::RemoteUrl(server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleChatError::Fetch(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn url_without_paragraphs_is_extraction_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><div>video only</div></body></html>"),
            )
            .mount(&server)
            .await;

        let err = resolver(MemoryStore::default())
            .resolve(&ArticleReference::RemoteUrl(server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleChatError::Extraction { .. }));
    }

    #[tokio::test]
    async fn malformed_url_is_fetch_error() {
        let err = resolver(MemoryStore::default())
            .resolve(&ArticleReference::RemoteUrl("not a url".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleChatError::Fetch(_)));

        let err = resolver(MemoryStore::default())
            .resolve(&ArticleReference::RemoteUrl("ftp://example.com/a".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleChatError::Fetch(_)));
    }

    #[tokio::test]
    async fn storeless_resolver_handles_text_and_urls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Rain expected.</p>"))
            .mount(&server)
            .await;

        let resolver = ContentResolver::without_store(
            Arc::new(HttpFetcher::new("TestBrowser/1.0").unwrap()),
            Duration::from_secs(5),
        );

        let inline = resolver
            .resolve(&ArticleReference::InlineText("Hello world".into()))
            .await
            .unwrap();
        assert_eq!(inline.body, "Hello world");

        let fetched = resolver
            .resolve(&ArticleReference::RemoteUrl(server.uri()))
            .await
            .unwrap();
        assert_eq!(fetched.body, "Rain expected.");

        let err = resolver
            .resolve(&ArticleReference::StoredId("a1".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleChatError::Storage(_)));
    }

    #[tokio::test]
    async fn each_resolution_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>again</p>"))
            .expect(2)
            .mount(&server)
            .await;

        let resolver = resolver(MemoryStore::default());
        let reference = ArticleReference::RemoteUrl(server.uri());
        resolver.resolve(&reference).await.unwrap();
        resolver.resolve(&reference).await.unwrap();
    }
}
