// One-shot extraction: fetch, extract, summarize and translate a URL, print JSON.
// Nothing is written to either store.

use anyhow::Result;
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use blogsum::dictionary::TranslationDictionary;
use blogsum::extraction::Extractor;
use blogsum::fetcher::Fetcher;
use blogsum::pipeline::{Analyzer, BlogSummary};

#[derive(Parser, Debug)]
#[command(name = "summarize_url", about = "Preview the summary and translation of a blog post")]
struct Args {
    /// Blog post URL
    url: String,

    /// Optional config.toml for fetch/extraction/dictionary settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fetch timeout in seconds when no config is given
    #[arg(long, default_value_t = 10)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let analyzer = match &args.config {
        Some(path) => Analyzer::from_config(&Config::from_file(path).await?).await?,
        None => Analyzer::new(
            Fetcher::new(Duration::from_secs(args.timeout))?,
            Arc::new(Extractor::new(&Default::default())?),
            Arc::new(TranslationDictionary::bundled()?),
        ),
    };

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    match analyzer.analyze(&args.url, &cancel).await {
        Ok(record) => {
            let summary = BlogSummary::from(record);
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ {}", e.user_message());
            Err(e.into())
        }
    }
}
