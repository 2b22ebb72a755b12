//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use articlechat_core::{ArticleAssistant, GroqClient, PromptPipeline, TextGenerator, classify_all};
use articlechat_resolver::{ContentResolver, HttpFetcher};
use articlechat_shared::{
    AppConfig, ArticleChatError, ArticleReference, TaskKind, TaskResult, init_config, load_config,
    resolve_api_key,
};
use articlechat_storage::{NewArticle, Storage};
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tracing::{info, warn};

/// Greeting printed by `articlechat info`.
const WELCOME: &str = "Welcome to the Article AI Chat API";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ArticleChat: ask questions about news articles.
#[derive(Parser)]
#[command(
    name = "articlechat",
    version,
    about = "Ask questions about, classify, summarize, and polish news articles.",
    long_about = None,
    arg_required_else_help = true,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print results as JSON instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Where the article comes from. Exactly one must be given.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub(crate) struct ArticleSource {
    /// Article text given inline.
    #[arg(long)]
    pub text: Option<String>,

    /// Read the article text from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Fetch the article from a web page.
    #[arg(long)]
    pub url: Option<String>,

    /// Use an article from the local store.
    #[arg(long)]
    pub id: Option<String>,
}

impl ArticleSource {
    fn into_reference(self) -> Result<ArticleReference> {
        if let Some(text) = self.text {
            return Ok(ArticleReference::InlineText(text));
        }
        if let Some(path) = self.file {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| eyre!("cannot read '{}': {e}", path.display()))?;
            return Ok(ArticleReference::InlineText(text));
        }
        if let Some(url) = self.url {
            return Ok(ArticleReference::RemoteUrl(url));
        }
        if let Some(id) = self.id {
            return Ok(ArticleReference::StoredId(id));
        }
        Err(eyre!("one of --text, --file, --url, or --id is required"))
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Ask a question about an article.
    Ask {
        /// The question to answer.
        #[arg(short, long)]
        question: String,

        #[command(flatten)]
        source: ArticleSource,
    },

    /// Classify an article into a category.
    Classify {
        #[command(flatten)]
        source: ArticleSource,
    },

    /// Summarize an article in 50 to 100 words.
    Summarize {
        #[command(flatten)]
        source: ArticleSource,
    },

    /// Rewrite an article's text to read more professionally.
    Enhance {
        #[command(flatten)]
        source: ArticleSource,
    },

    /// Manage the local article store.
    Articles {
        #[command(subcommand)]
        action: ArticlesAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print the welcome message and generator status.
    Info,
}

/// Article store subcommands.
#[derive(Subcommand)]
pub(crate) enum ArticlesAction {
    /// List stored articles.
    List,

    /// Show one stored article.
    Show {
        /// Article ID.
        id: String,
    },

    /// Add an article from text, a file, or a URL.
    Add {
        /// Title (defaults to the page heading for URLs).
        #[arg(long)]
        title: Option<String>,

        /// Article text given inline.
        #[arg(
            long,
            conflicts_with_all = ["file", "url"],
            required_unless_present_any = ["file", "url"]
        )]
        text: Option<String>,

        /// Read the article text from a file.
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// Fetch the article from a web page.
        #[arg(long)]
        url: Option<String>,
    },

    /// Delete a stored article.
    Delete {
        /// Article ID.
        id: String,
    },

    /// Classify every stored article.
    ClassifyAll {
        /// Save each category on its article (failed items are not saved).
        #[arg(long)]
        write_back: bool,

        /// Classifications in flight at once (overrides `[batch] concurrency`).
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "articlechat=info",
        1 => "articlechat=debug",
        _ => "articlechat=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so stdout stays clean for replies and --json.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Command::Ask { question, source } => {
            cmd_task(TaskKind::Interact, source, Some(question), json).await
        }
        Command::Classify { source } => cmd_task(TaskKind::Classify, source, None, json).await,
        Command::Summarize { source } => cmd_task(TaskKind::Summarize, source, None, json).await,
        Command::Enhance { source } => cmd_task(TaskKind::Enhance, source, None, json).await,
        Command::Articles { action } => match action {
            ArticlesAction::List => cmd_articles_list(json).await,
            ArticlesAction::Show { id } => cmd_articles_show(&id, json).await,
            ArticlesAction::Add {
                title,
                text,
                file,
                url,
            } => cmd_articles_add(title, text, file, url, json).await,
            ArticlesAction::Delete { id } => cmd_articles_delete(&id).await,
            ArticlesAction::ClassifyAll {
                write_back,
                concurrency,
            } => cmd_classify_all(write_back, concurrency, json).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
        Command::Info => cmd_info(json).await,
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// Build the prompt pipeline. A missing API key leaves it unavailable.
fn build_pipeline(config: &AppConfig) -> Result<PromptPipeline> {
    let generator: Option<Arc<dyn TextGenerator>> = match resolve_api_key(config) {
        Some(key) => Some(Arc::new(GroqClient::from_config(&config.groq, key)?)),
        None => {
            warn!(
                var = %config.groq.api_key_env,
                "no API key found, text generation is unavailable"
            );
            None
        }
    };
    Ok(PromptPipeline::with_optional(generator, &config.groq.model))
}

/// Open the article database for writing, creating it if needed.
async fn open_storage(config: &AppConfig) -> Result<Arc<Storage>> {
    let path = config.storage.resolved_db_path()?;
    Ok(Arc::new(Storage::open(&path).await?))
}

/// Open the article database read-only. `None` when it has never been created.
async fn open_storage_readonly(config: &AppConfig) -> Result<Option<Arc<Storage>>> {
    let path = config.storage.resolved_db_path()?;
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(Arc::new(Storage::open_readonly(&path).await?)))
}

/// Build the resolver for `reference`. The database is only opened for
/// stored ids.
async fn build_resolver(
    config: &AppConfig,
    reference: &ArticleReference,
) -> Result<ContentResolver> {
    let fetcher = Arc::new(HttpFetcher::from_config(&config.fetch)?);
    let timeout = config.fetch.timeout();

    let ArticleReference::StoredId(id) = reference else {
        return Ok(ContentResolver::without_store(fetcher, timeout));
    };
    match open_storage_readonly(config).await? {
        Some(storage) => Ok(ContentResolver::new(storage, fetcher, timeout)),
        None => Err(ArticleChatError::not_found(id).into()),
    }
}

async fn build_assistant(
    config: &AppConfig,
    reference: &ArticleReference,
) -> Result<ArticleAssistant> {
    Ok(ArticleAssistant::new(
        build_resolver(config, reference).await?,
        build_pipeline(config)?,
    ))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_task(
    kind: TaskKind,
    source: ArticleSource,
    question: Option<String>,
    json: bool,
) -> Result<()> {
    let config = load_config()?;
    let reference = source.into_reference()?;

    let assistant = build_assistant(&config, &reference).await?;

    info!(%kind, %reference, "running task");
    let result = assistant
        .run(&reference, kind, question.as_deref())
        .await?;

    print_reply(&result, json)
}

fn print_reply(result: &TaskResult, json: bool) -> Result<()> {
    if json {
        let body = serde_json::json!({ "reply": result.text });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{}", result.text);
    }
    Ok(())
}

async fn cmd_articles_list(json: bool) -> Result<()> {
    let config = load_config()?;
    let articles = match open_storage_readonly(&config).await? {
        Some(storage) => storage.list_articles().await?,
        None => Vec::new(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&articles)?);
        return Ok(());
    }

    if articles.is_empty() {
        println!("No articles stored.");
        return Ok(());
    }
    for article in &articles {
        println!("{}  {}", article.id, article.title);
    }
    Ok(())
}

async fn cmd_articles_show(id: &str, json: bool) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage_readonly(&config)
        .await?
        .ok_or_else(|| ArticleChatError::not_found(id))?;
    let article = storage
        .get_article(id)
        .await?
        .ok_or_else(|| ArticleChatError::not_found(id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&article)?);
        return Ok(());
    }

    println!("  ID:       {}", article.id);
    println!("  Title:    {}", article.display_title());
    if let Some(url) = &article.url {
        println!("  URL:      {url}");
    }
    if let Some(category) = &article.category {
        println!("  Category: {category}");
    }
    println!();
    println!("{}", article.content.as_deref().unwrap_or_default());
    Ok(())
}

async fn cmd_articles_add(
    title: Option<String>,
    text: Option<String>,
    file: Option<PathBuf>,
    url: Option<String>,
    json: bool,
) -> Result<()> {
    let config = load_config()?;

    let source = ArticleSource {
        text,
        file,
        url: url.clone(),
        id: None,
    };
    let reference = source.into_reference()?;
    let resolved = build_resolver(&config, &reference)
        .await?
        .resolve(&reference)
        .await?;

    let storage = open_storage(&config).await?;

    let article = NewArticle {
        title: title.or(resolved.title),
        content: resolved.body,
        url,
    };
    let id = storage.insert_article(&article).await?;
    info!(%id, "article stored");

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "id": id }))?);
    } else {
        println!("Stored article {id}");
    }
    Ok(())
}

async fn cmd_articles_delete(id: &str) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config).await?;
    if !storage.delete_article(id).await? {
        return Err(ArticleChatError::not_found(id).into());
    }
    println!("Deleted article {id}");
    Ok(())
}

async fn cmd_classify_all(write_back: bool, concurrency: Option<usize>, json: bool) -> Result<()> {
    let config = load_config()?;
    let storage = if write_back {
        Some(open_storage(&config).await?)
    } else {
        open_storage_readonly(&config).await?
    };
    let pipeline = build_pipeline(&config)?;
    let concurrency = concurrency.unwrap_or(config.batch.concurrency);

    let results = match &storage {
        Some(storage) => classify_all(&pipeline, storage.as_ref(), concurrency).await?,
        None => Vec::new(),
    };

    if let Some(storage) = storage.as_ref().filter(|_| write_back) {
        let mut saved = 0usize;
        for item in results
            .iter()
            .filter(|c| c.category != articlechat_core::ERROR_CATEGORY)
        {
            if storage.set_category(&item.id, &item.category).await? {
                saved += 1;
            }
        }
        info!(saved, "categories written back");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for item in &results {
        println!("{}  {}  [{}]", item.id, item.title, item.category);
    }
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

async fn cmd_info(json: bool) -> Result<()> {
    let config = load_config()?;
    let available = resolve_api_key(&config).is_some();

    if json {
        let body = serde_json::json!({
            "message": WELCOME,
            "model": config.groq.model,
            "generation_available": available,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{WELCOME}");
        println!("  Model:      {}", config.groq.model);
        println!(
            "  Generation: {}",
            if available { "available" } else { "unavailable (no API key)" }
        );
    }
    Ok(())
}
