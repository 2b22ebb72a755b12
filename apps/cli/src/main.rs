//! ArticleChat CLI: question answering over news articles.
//!
//! Resolves an article from inline text, a file, a URL, or the local store,
//! then asks the configured language model to answer, classify, summarize,
//! or polish it.

mod commands;

use std::process::ExitCode;

use articlechat_shared::ArticleChatError;
use clap::Parser;
use color_eyre::eyre::{Report, Result};

use commands::Cli;

/// Exit status for mistakes in the caller's input (bad id, blank article, ...).
const EXIT_CLIENT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    commands::init_tracing(&cli);

    match commands::run(cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(report) => match client_exit_status(&report) {
            Some(status) => {
                eprintln!("error: {report}");
                Ok(ExitCode::from(status))
            }
            None => Err(report),
        },
    }
}

/// Exit status for errors caused by the caller. Anything else is reported
/// by color-eyre and exits with 1.
fn client_exit_status(report: &Report) -> Option<u8> {
    report
        .downcast_ref::<ArticleChatError>()
        .filter(|e| e.is_client_error())
        .map(|_| EXIT_CLIENT_ERROR)
}
