//! Managed-search acquisition path for Murmur.
//!
//! Prompts are sent to an answer-synthesis service (Perplexity's `sonar`
//! chat-completions endpoint) and the synthesized prose is returned as-is.
//! The [`traits::AnswerSearch`] trait carries the degrade-to-string policy and
//! the prompt-template helpers; [`perplexity::AnswerSearchClient`] is the HTTP
//! implementation.
//!
//! # Examples
//! ```no_run
//! use murmur_answers::{AnswerSearch, AnswerSearchClient};
//! use murmur_common::AnswersConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> murmur_common::Result<()> {
//! let client = AnswerSearchClient::new(&AnswersConfig::with_api_key("pplx-..."))?;
//! let quotes = client.search_reddit("python", "packaging", 5).await;
//! println!("{quotes}");
//! # Ok(())
//! # }
//! ```
pub mod perplexity;
pub mod prompts;
pub mod traits;

pub use perplexity::AnswerSearchClient;
pub use prompts::PromptTemplate;
pub use traits::AnswerSearch;

/// Quotes requested by [`AnswerSearch::search_reddit`] when the caller has no
/// preference.
pub const DEFAULT_NUM_EXAMPLES: u32 = 10;
