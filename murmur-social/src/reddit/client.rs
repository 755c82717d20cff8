//! Scraper over Reddit's public JSON listings.
//!
//! Every operation issues its requests strictly one after another; nothing is
//! retried. The public methods degrade to an empty `Vec` on failure and log a
//! `reddit.*.error` event, while the `try_*` variants return the classified
//! error instead.
use super::extract::{comment_bodies, to_post};
use super::types::{Post, PostListing};
use crate::pace::{Pacer, TokioPacer};
use murmur_common::{MurmurError, Result, ScraperConfig};
use murmur_http::{HttpClient, RequestOpts};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
pub const DEFAULT_HOT_LIMIT: u32 = 25;
/// Largest page the listing endpoints serve.
pub const MAX_LISTING_LIMIT: u32 = 100;

#[derive(Clone)]
pub struct ThreadScraper {
    http: HttpClient,
    base_url: String,
    delay: Duration,
    comment_limit: usize,
    pacer: Arc<dyn Pacer>,
}

impl ThreadScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut http = HttpClient::new(&config.base_url)
            .and_then(|c| c.with_user_agent(&config.user_agent))
            .map_err(|e| MurmurError::Config(format!("reddit client init failed: {e}")))?;
        if let Some(secs) = config.timeout_secs {
            http = http.with_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            delay: Duration::from_millis(config.delay_ms),
            comment_limit: config.comment_limit,
            pacer: Arc::new(TokioPacer),
        })
    }

    /// Replace the pacer used between listing items.
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search `r/{forum}` for `query` over the past year, attaching the top
    /// comments of every hit. Returns an empty `Vec` when the search itself
    /// fails.
    pub async fn search_subreddit(&self, forum: &str, query: &str, limit: u32) -> Vec<Post> {
        match self.try_search_subreddit(forum, query, limit).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(target: "reddit", forum, query, kind = ?e.kind(), error = %e, "reddit.search.error");
                Vec::new()
            }
        }
    }

    pub async fn try_search_subreddit(
        &self,
        forum: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Post>> {
        let started = Instant::now();
        let limit = limit.min(MAX_LISTING_LIMIT).to_string();
        let listing: PostListing = self
            .http
            .get_json(
                &format!("r/{forum}/search.json"),
                RequestOpts {
                    query: vec![
                        ("q", query.into()),
                        ("restrict_sr", "on".into()),
                        ("sort", "relevance".into()),
                        ("limit", limit.into()),
                        ("t", "year".into()),
                    ],
                    ..Default::default()
                },
            )
            .await?;

        let mut items = Vec::with_capacity(listing.data.children.len());
        for child in listing.data.children {
            let id = child.data.id.clone().ok_or_else(|| {
                MurmurError::Malformed("search result without an id".to_string())
            })?;
            items.push((id, child.data));
        }

        let mut posts = Vec::with_capacity(items.len());
        for (id, data) in items {
            let comments = self.get_comments(forum, &id, self.comment_limit).await;
            posts.push(to_post(data, &self.base_url, Some(comments)));
            self.pacer.pause(self.delay).await;
        }

        tracing::info!(
            target: "reddit",
            forum,
            query,
            posts = posts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reddit.search.success"
        );
        Ok(posts)
    }

    /// Top-level comment bodies of one post; empty on any failure so the
    /// enclosing listing keeps going.
    async fn get_comments(&self, forum: &str, item_id: &str, limit: usize) -> Vec<String> {
        match self.try_get_comments(forum, item_id, limit).await {
            Ok(comments) => comments,
            Err(e) => {
                tracing::warn!(target: "reddit", forum, item_id, kind = ?e.kind(), error = %e, "reddit.comments.error");
                Vec::new()
            }
        }
    }

    async fn try_get_comments(&self, forum: &str, item_id: &str, limit: usize) -> Result<Vec<String>> {
        let thread: Value = self
            .http
            .get_json(
                &format!("r/{forum}/comments/{item_id}.json"),
                RequestOpts::default(),
            )
            .await?;
        let comments = comment_bodies(&thread, limit)?;
        tracing::debug!(target: "reddit", forum, item_id, comments = comments.len(), "reddit.comments.fetched");
        Ok(comments)
    }

    /// The current hot feed of `r/{forum}`, without comments.
    pub async fn get_hot_posts(&self, forum: &str, limit: u32) -> Vec<Post> {
        match self.try_get_hot_posts(forum, limit).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(target: "reddit", forum, kind = ?e.kind(), error = %e, "reddit.hot.error");
                Vec::new()
            }
        }
    }

    pub async fn try_get_hot_posts(&self, forum: &str, limit: u32) -> Result<Vec<Post>> {
        let listing: PostListing = self
            .http
            .get_json(
                &format!("r/{forum}/hot.json"),
                RequestOpts {
                    query: vec![("limit", limit.min(MAX_LISTING_LIMIT).to_string().into())],
                    ..Default::default()
                },
            )
            .await?;

        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .map(|child| to_post(child.data, &self.base_url, None))
            .collect();

        tracing::info!(target: "reddit", forum, posts = posts.len(), "reddit.hot.success");
        Ok(posts)
    }
}
