//! Prompt pipeline: excerpt + task → one completion → normalized result.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument};

use articlechat_shared::{
    ArticleChatError, ProviderError, Result, TaskKind, TaskRequest, TaskResult,
};

use crate::generation::TextGenerator;
use crate::prompt::{self, NO_SUMMARY, UNCATEGORIZED};

/// Stateless prompt pipeline.
///
/// The generator is optional: a process without a provider credential still
/// builds a pipeline, and every call that would reach the provider fails with
/// [`ArticleChatError::GenerationUnavailable`].
#[derive(Clone)]
pub struct PromptPipeline {
    generator: Option<Arc<dyn TextGenerator>>,
    model_id: String,
}

impl PromptPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, model_id: impl Into<String>) -> Self {
        Self::with_optional(Some(generator), model_id)
    }

    /// A pipeline with no generator configured.
    pub fn unavailable(model_id: impl Into<String>) -> Self {
        Self::with_optional(None, model_id)
    }

    pub fn with_optional(
        generator: Option<Arc<dyn TextGenerator>>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            model_id: model_id.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.generator.is_some()
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Run one task.
    ///
    /// Checks happen in this order:
    /// 1. an Interact task without a non-blank question is an invalid request;
    /// 2. a blank excerpt short-circuits Classify and Summarize to their fixed
    ///    replies and fails Interact and Enhance with `EmptyContent`;
    /// 3. a missing generator fails with `GenerationUnavailable`.
    #[instrument(
        skip_all,
        fields(kind = %request.kind, excerpt_chars = request.excerpt.chars().count())
    )]
    pub async fn run(&self, request: &TaskRequest) -> Result<TaskResult> {
        let kind = request.kind;

        let question = match (kind.requires_question(), request.question.as_deref()) {
            (true, Some(q)) if !q.trim().is_empty() => q,
            (true, _) => {
                return Err(ArticleChatError::invalid_request(
                    "a question is required to interact with an article",
                ));
            }
            (false, _) => "",
        };

        if request.excerpt.trim().is_empty() {
            return match kind {
                TaskKind::Classify => {
                    debug!("blank excerpt, skipping classification call");
                    Ok(result(kind, UNCATEGORIZED))
                }
                TaskKind::Summarize => {
                    debug!("blank excerpt, skipping summarization call");
                    Ok(result(kind, NO_SUMMARY))
                }
                TaskKind::Interact | TaskKind::Enhance => Err(ArticleChatError::empty_content(
                    format!("cannot {kind} without article content"),
                )),
            };
        }

        let generator = self
            .generator
            .as_ref()
            .ok_or(ArticleChatError::GenerationUnavailable)?;

        let prompt = prompt::build_prompt(kind, &request.excerpt, question);
        let start = Instant::now();
        let completion = generator.complete(&prompt, &self.model_id).await?;

        if completion.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion.into());
        }

        let text = prompt::format_reply(kind, &completion);
        info!(
            model = %self.model_id,
            prompt_chars = prompt.chars().count(),
            reply_chars = text.chars().count(),
            latency_ms = start.elapsed().as_millis(),
            "task completed"
        );

        Ok(TaskResult { kind, text })
    }

    /// Answer `question` about `excerpt`.
    pub async fn interact(&self, excerpt: &str, question: &str) -> Result<TaskResult> {
        self.run(&TaskRequest::interact(excerpt, question)).await
    }

    pub async fn classify(&self, excerpt: &str) -> Result<TaskResult> {
        self.run(&TaskRequest::classify(excerpt)).await
    }

    pub async fn summarize(&self, excerpt: &str) -> Result<TaskResult> {
        self.run(&TaskRequest::summarize(excerpt)).await
    }

    pub async fn enhance(&self, excerpt: &str) -> Result<TaskResult> {
        self.run(&TaskRequest::enhance(excerpt)).await
    }
}

fn result(kind: TaskKind, text: &str) -> TaskResult {
    TaskResult {
        kind,
        text: text.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;
    use async_trait::async_trait;

    /// Generator double that records prompts and replays a canned reply.
    pub(crate) struct StubGenerator {
        reply: std::result::Result<String, String>,
        pub(crate) prompts: Mutex<Vec<(String, String)>>,
    }

    impl StubGenerator {
        pub(crate) fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub(crate) fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().unwrap().0.clone()
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn complete(
            &self,
            prompt: &str,
            model_id: &str,
        ) -> std::result::Result<String, ProviderError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), model_id.to_string()));
            self.reply.clone().map_err(|message| ProviderError::Api {
                status: 500,
                message,
            })
        }
    }

    fn pipeline(generator: Arc<StubGenerator>) -> PromptPipeline {
        PromptPipeline::new(generator, "llama3-70b-8192")
    }

    #[tokio::test]
    async fn summarize_returns_trimmed_completion() {
        let stub = StubGenerator::replying("  A greeting.\n");
        let result = pipeline(stub.clone()).summarize("Hello world").await.unwrap();
        assert_eq!(
            result,
            TaskResult {
                kind: TaskKind::Summarize,
                text: "A greeting.".into()
            }
        );
        assert_eq!(stub.calls(), 1);
        let (_, model) = stub.prompts.lock().unwrap()[0].clone();
        assert_eq!(model, "llama3-70b-8192");
    }

    #[tokio::test]
    async fn interact_prefixes_response_header() {
        let stub = StubGenerator::replying("Because of inflation.");
        let result = pipeline(stub.clone())
            .interact("Rates rose again this quarter.", "Why did rates rise?")
            .await
            .unwrap();
        assert_eq!(result.text, "### Response:\n\nBecause of inflation.");
        assert!(stub.last_prompt().ends_with("structured format: Why did rates rise?"));
        assert!(stub.last_prompt().contains("Rates rose again this quarter...."));
    }

    #[tokio::test]
    async fn interact_question_is_sent_verbatim() {
        let stub = StubGenerator::replying("ok");
        pipeline(stub.clone())
            .interact("Rates rose.", "  Why did rates rise?\n")
            .await
            .unwrap();
        assert!(
            stub.last_prompt()
                .ends_with("structured format:   Why did rates rise?\n")
        );
    }

    #[tokio::test]
    async fn interact_truncates_long_articles() {
        let stub = StubGenerator::replying("ok");
        let article = "word ".repeat(1000);
        pipeline(stub.clone()).interact(&article, "Summary?").await.unwrap();

        let prompt = stub.last_prompt();
        let excerpt_start = prompt.find("\n\n").unwrap() + 2;
        let excerpt_end = prompt.find("...\n\n").unwrap();
        assert_eq!(prompt[excerpt_start..excerpt_end].chars().count(), 1500);
    }

    #[tokio::test]
    async fn interact_requires_question() {
        let stub = StubGenerator::replying("ok");
        let err = pipeline(stub.clone())
            .run(&TaskRequest::new(TaskKind::Interact, "Some text", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleChatError::InvalidRequest { .. }));

        let err = pipeline(stub.clone()).interact("Some text", "   ").await.unwrap_err();
        assert!(matches!(err, ArticleChatError::InvalidRequest { .. }));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn blank_excerpt_short_circuits() {
        let stub = StubGenerator::replying("should not be used");
        let p = pipeline(stub.clone());

        assert_eq!(p.classify("  ").await.unwrap().text, "Uncategorized");
        assert_eq!(
            p.summarize("").await.unwrap().text,
            "No content available to summarize."
        );
        assert!(matches!(
            p.interact("\n", "What happened?").await.unwrap_err(),
            ArticleChatError::EmptyContent { .. }
        ));
        assert!(matches!(
            p.enhance("").await.unwrap_err(),
            ArticleChatError::EmptyContent { .. }
        ));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn short_circuits_work_without_generator() {
        let p = PromptPipeline::unavailable("llama3-70b-8192");
        assert!(!p.is_available());
        assert_eq!(p.classify("").await.unwrap().text, "Uncategorized");

        let err = p.classify("The striker scored twice.").await.unwrap_err();
        assert!(matches!(err, ArticleChatError::GenerationUnavailable));
    }

    #[tokio::test]
    async fn provider_failure_is_generation_error() {
        let stub = StubGenerator::failing("upstream timeout");
        let err = pipeline(stub).enhance("we done good").await.unwrap_err();
        match err {
            ArticleChatError::Generation(ProviderError::Api { message, .. }) => {
                assert_eq!(message, "upstream timeout");
            }
            other => panic!("expected Generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn whitespace_completion_is_rejected() {
        let stub = StubGenerator::replying(" \n ");
        let err = pipeline(stub).classify("Chips are up.").await.unwrap_err();
        assert!(matches!(
            err,
            ArticleChatError::Generation(ProviderError::EmptyCompletion)
        ));
    }

    #[tokio::test]
    async fn classify_sends_capped_excerpt() {
        let stub = StubGenerator::replying("Technology");
        let article = "é".repeat(5000);
        let result = pipeline(stub.clone()).classify(&article).await.unwrap();
        assert_eq!(result.text, "Technology");
        let sent = stub.last_prompt().chars().filter(|c| *c == 'é').count();
        assert_eq!(sent, 1000);
    }
}
