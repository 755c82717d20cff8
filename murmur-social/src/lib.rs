//! Direct-scrape acquisition path for Murmur.
//!
//! Only Reddit is implemented: public `.json` listing endpoints are read
//! without authentication, one request at a time, with a fixed pause between
//! listing items.
pub mod pace;
pub mod reddit;

pub use pace::{Pacer, TokioPacer};
pub use reddit::{Post, ThreadScraper};
