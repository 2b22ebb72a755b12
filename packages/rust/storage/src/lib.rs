//! libSQL storage layer for news articles.
//!
//! The [`Storage`] struct wraps a local libSQL database holding the article
//! collection and implements [`DocumentStore`] so the resolver and the batch
//! classifier can read from it.
//!
//! **Access rules:**
//! - read-write via [`Storage::open`]
//! - read-only via [`Storage::open_readonly`] (writes are rejected)

mod migrations;

use std::path::Path;

use articlechat_shared::{
    ArticleChatError, ArticleSummary, DocumentStore, Result, StoredArticle, UNTITLED,
};
use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database, params};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Columns selected for a full [`StoredArticle`] row, in `row_to_article` order.
const ARTICLE_COLUMNS: &str = "id, title, content, url, category";

/// Fields supplied when adding an article.
#[derive(Debug, Clone, Default)]
pub struct NewArticle {
    pub title: Option<String>,
    pub content: String,
    pub url: Option<String>,
}

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ArticleChatError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;

        let conn = db.connect().map_err(storage_err)?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open an existing database at `path` in read-only mode.
    ///
    /// Never creates the file; a missing database is a storage error.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ArticleChatError::Storage(format!(
                "database not found at {}",
                path.display()
            )));
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;

        let conn = db.connect().map_err(storage_err)?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        ArticleChatError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(ArticleChatError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Article operations
    // -----------------------------------------------------------------------

    /// Insert a new article. Returns the generated ID.
    #[instrument(skip_all, fields(title = article.title.as_deref().unwrap_or(UNTITLED)))]
    pub async fn insert_article(&self, article: &NewArticle) -> Result<String> {
        self.check_writable()?;
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO articles (id, title, content, url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.as_str(),
                    article.title.as_deref(),
                    article.content.as_str(),
                    article.url.as_deref(),
                    now.as_str(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(storage_err)?;
        debug!(%id, chars = article.content.chars().count(), "article stored");
        Ok(id)
    }

    /// Get an article by ID.
    pub async fn get_article(&self, id: &str) -> Result<Option<StoredArticle>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(storage_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_article(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    /// List all articles as `(id, title)` rows, oldest first.
    pub async fn list_articles(&self) -> Result<Vec<ArticleSummary>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, title FROM articles ORDER BY created_at, id",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            let title = row
                .get::<String>(1)
                .ok()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());
            results.push(ArticleSummary {
                id: row.get::<String>(0).map_err(storage_err)?,
                title,
            });
        }
        Ok(results)
    }

    /// List all articles with their content, oldest first.
    pub async fn list_articles_with_content(&self) -> Result<Vec<StoredArticle>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY created_at, id"),
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            results.push(row_to_article(&row)?);
        }
        Ok(results)
    }

    /// Record a category for an article. Returns `false` if the ID is unknown.
    pub async fn set_category(&self, id: &str, category: &str) -> Result<bool> {
        self.check_writable()?;
        let now = Utc::now().to_rfc3339();
        let affected = self
            .conn
            .execute(
                "UPDATE articles SET category = ?1, updated_at = ?2 WHERE id = ?3",
                params![category, now.as_str(), id],
            )
            .await
            .map_err(storage_err)?;
        Ok(affected > 0)
    }

    /// Delete an article by ID. Returns `false` if the ID is unknown.
    pub async fn delete_article(&self, id: &str) -> Result<bool> {
        self.check_writable()?;
        let affected = self
            .conn
            .execute("DELETE FROM articles WHERE id = ?1", params![id])
            .await
            .map_err(storage_err)?;
        Ok(affected > 0)
    }
}

#[async_trait]
impl DocumentStore for Storage {
    async fn find_by_id(&self, id: &str) -> Result<Option<StoredArticle>> {
        self.get_article(id).await
    }

    async fn list_all(&self) -> Result<Vec<ArticleSummary>> {
        self.list_articles().await
    }

    async fn list_with_content(&self) -> Result<Vec<StoredArticle>> {
        self.list_articles_with_content().await
    }
}

fn storage_err(e: libsql::Error) -> ArticleChatError {
    ArticleChatError::Storage(e.to_string())
}

/// Convert a database row to a [`StoredArticle`].
fn row_to_article(row: &libsql::Row) -> Result<StoredArticle> {
    Ok(StoredArticle {
        id: row.get::<String>(0).map_err(storage_err)?,
        title: row.get::<String>(1).ok(),
        content: row.get::<String>(2).ok(),
        url: row.get::<String>(3).ok(),
        category: row.get::<String>(4).ok(),
    })
}
