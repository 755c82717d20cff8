use clap::{Parser, Subcommand};
use murmur_answers::DEFAULT_NUM_EXAMPLES;
use murmur_social::reddit::client::{DEFAULT_HOT_LIMIT, DEFAULT_SEARCH_LIMIT};
use std::path::PathBuf;

/// Collect opinion data from answer-synthesis search and Reddit.
#[derive(Debug, Parser)]
#[command(name = "murmur", version)]
pub struct Cli {
    /// YAML config file (defaults to ./murmur.yaml when present).
    #[arg(long, global = true, env = "MURMUR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Log to the file sink only.
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask the answer service a free-form question.
    Ask { query: String },
    /// Ask for verbatim quotes about a topic from one subreddit.
    RedditQuotes {
        forum: String,
        topic: String,
        #[arg(long, default_value_t = DEFAULT_NUM_EXAMPLES)]
        num_examples: u32,
    },
    /// Ask for pain-point quotes about a product category.
    PainPoints { category: String, keywords: String },
    /// Scrape subreddit search results with their top comments.
    Search {
        forum: String,
        query: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },
    /// Scrape the hot feed of a subreddit.
    Hot {
        forum: String,
        #[arg(long, default_value_t = DEFAULT_HOT_LIMIT)]
        limit: u32,
    },
}
