//! Core domain types for ArticleChat.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Title used when a stored article has none.
pub const UNTITLED: &str = "Untitled";

// ---------------------------------------------------------------------------
// ArticleReference / ResolvedArticle
// ---------------------------------------------------------------------------

/// How the caller points at an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ArticleReference {
    /// The article body itself.
    InlineText(String),
    /// A page to fetch and scrape.
    RemoteUrl(String),
    /// An identifier in the document store.
    StoredId(String),
}

impl fmt::Display for ArticleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InlineText(text) => write!(f, "inline text ({} chars)", text.chars().count()),
            Self::RemoteUrl(url) => write!(f, "url {url}"),
            Self::StoredId(id) => write!(f, "stored article {id}"),
        }
    }
}

/// Plain-text article produced by the content resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedArticle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Markup-free body text.
    pub body: String,
}

// ---------------------------------------------------------------------------
// TaskKind
// ---------------------------------------------------------------------------

/// The four things the prompt pipeline knows how to do with an excerpt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Interact,
    Classify,
    Summarize,
    Enhance,
}

impl TaskKind {
    /// All kinds, in declaration order.
    pub const ALL: [TaskKind; 4] = [
        TaskKind::Interact,
        TaskKind::Classify,
        TaskKind::Summarize,
        TaskKind::Enhance,
    ];

    /// Stable lowercase name, used in logs and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interact => "interact",
            Self::Classify => "classify",
            Self::Summarize => "summarize",
            Self::Enhance => "enhance",
        }
    }

    /// Maximum number of characters of the excerpt sent to the model.
    pub fn max_excerpt_chars(&self) -> usize {
        match self {
            Self::Interact => 1500,
            Self::Classify => 1000,
            Self::Summarize | Self::Enhance => 3000,
        }
    }

    /// Whether the task needs a user question.
    pub fn requires_question(&self) -> bool {
        matches!(self, Self::Interact)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown task kind '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// TaskRequest / TaskResult
// ---------------------------------------------------------------------------

/// A single unit of work for the prompt pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub kind: TaskKind,
    pub excerpt: String,
    /// Required iff `kind` is [`TaskKind::Interact`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

impl TaskRequest {
    pub fn new(kind: TaskKind, excerpt: impl Into<String>, question: Option<String>) -> Self {
        Self {
            kind,
            excerpt: excerpt.into(),
            question,
        }
    }

    pub fn interact(excerpt: impl Into<String>, question: impl Into<String>) -> Self {
        Self::new(TaskKind::Interact, excerpt, Some(question.into()))
    }

    pub fn classify(excerpt: impl Into<String>) -> Self {
        Self::new(TaskKind::Classify, excerpt, None)
    }

    pub fn summarize(excerpt: impl Into<String>) -> Self {
        Self::new(TaskKind::Summarize, excerpt, None)
    }

    pub fn enhance(excerpt: impl Into<String>) -> Self {
        Self::new(TaskKind::Enhance, excerpt, None)
    }
}

/// Normalized pipeline output. `text` is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub kind: TaskKind,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Stored articles
// ---------------------------------------------------------------------------

/// An article as held by the document store. Any field but `id` may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredArticle {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl StoredArticle {
    /// Title with the documented fallback applied.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(UNTITLED)
    }
}

/// Listing row: identifier and title only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
}

/// One row of a batch classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub id: String,
    pub title: String,
    pub category: String,
}
