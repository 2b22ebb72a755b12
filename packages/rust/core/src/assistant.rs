//! Resolve an article reference, then run a task on it.

use tracing::instrument;

use articlechat_resolver::ContentResolver;
use articlechat_shared::{ArticleReference, Result, TaskKind, TaskRequest, TaskResult};

use crate::pipeline::PromptPipeline;

/// Front door used by callers: content resolver followed by prompt pipeline.
#[derive(Clone)]
pub struct ArticleAssistant {
    resolver: ContentResolver,
    pipeline: PromptPipeline,
}

impl ArticleAssistant {
    pub fn new(resolver: ContentResolver, pipeline: PromptPipeline) -> Self {
        Self { resolver, pipeline }
    }

    pub fn pipeline(&self) -> &PromptPipeline {
        &self.pipeline
    }

    pub fn resolver(&self) -> &ContentResolver {
        &self.resolver
    }

    /// Resolve `reference` and run `kind` on its body.
    #[instrument(skip_all, fields(kind = %kind, reference = %reference))]
    pub async fn run(
        &self,
        reference: &ArticleReference,
        kind: TaskKind,
        question: Option<&str>,
    ) -> Result<TaskResult> {
        let article = self.resolver.resolve(reference).await?;
        let request = TaskRequest::new(kind, article.body, question.map(String::from));
        self.pipeline.run(&request).await
    }

    pub async fn ask(&self, reference: &ArticleReference, question: &str) -> Result<TaskResult> {
        self.run(reference, TaskKind::Interact, Some(question)).await
    }

    pub async fn classify(&self, reference: &ArticleReference) -> Result<TaskResult> {
        self.run(reference, TaskKind::Classify, None).await
    }

    pub async fn summarize(&self, reference: &ArticleReference) -> Result<TaskResult> {
        self.run(reference, TaskKind::Summarize, None).await
    }

    pub async fn enhance(&self, reference: &ArticleReference) -> Result<TaskResult> {
        self.run(reference, TaskKind::Enhance, None).await
    }
}
