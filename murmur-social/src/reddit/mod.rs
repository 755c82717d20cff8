//! Reddit scraping surface.
//!
//! Submodules provide the scraper, comment-tree extraction helpers, and the
//! typed listing models. Reads go through the public `/r/{forum}/*.json`
//! endpoints with a desktop browser `User-Agent`; default HTTP client agents
//! are blocked by the platform.
pub mod client;
pub mod extract;
pub mod types;

pub use client::ThreadScraper;
pub use types::Post;
