use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use murmur_answers::{AnswerSearch, AnswerSearchClient};
use murmur_common::observability::{LogConfig, LogFormat, init_logging};
use murmur_config::{MurmurConfig, MurmurConfigLoader};
use murmur_social::ThreadScraper;
use std::path::PathBuf;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins over file)
    let mut loader = MurmurConfigLoader::new();
    loader = match &cli.config {
        Some(path) => loader.with_file(path),
        None => loader.with_optional_file("murmur.yaml"),
    };
    let cfg: MurmurConfig = loader.load().context("failed to load configuration")?;

    // 2) Logging: file sink always, stderr mirror for interactive use
    let log_path = init_logging(LogConfig {
        app_name: "murmur",
        log_dir: cfg.logging.dir.as_ref().map(PathBuf::from),
        emit_stderr: !cli.quiet,
        format: if cli.json_logs || cfg.logging.is_json() {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        default_filter: cfg.logging.level.clone(),
    })?;
    tracing::debug!(log_path = %log_path.display(), "murmur.start");

    run(cli.command, &cfg).await
}

async fn run(command: Command, cfg: &MurmurConfig) -> Result<()> {
    match command {
        Command::Ask { query } => {
            let client = AnswerSearchClient::new(&cfg.answers)?;
            println!("{}", client.search(&query).await);
        }
        Command::RedditQuotes {
            forum,
            topic,
            num_examples,
        } => {
            let client = AnswerSearchClient::new(&cfg.answers)?;
            println!("{}", client.search_reddit(&forum, &topic, num_examples).await);
        }
        Command::PainPoints { category, keywords } => {
            let client = AnswerSearchClient::new(&cfg.answers)?;
            println!("{}", client.find_pain_points(&category, &keywords).await);
        }
        Command::Search {
            forum,
            query,
            limit,
        } => {
            let scraper = ThreadScraper::new(&cfg.scraper)?;
            let posts = scraper.search_subreddit(&forum, &query, limit).await;
            println!("{}", serde_json::to_string_pretty(&posts)?);
        }
        Command::Hot { forum, limit } => {
            let scraper = ThreadScraper::new(&cfg.scraper)?;
            let posts = scraper.get_hot_posts(&forum, limit).await;
            println!("{}", serde_json::to_string_pretty(&posts)?);
        }
    }
    Ok(())
}
