//! Shaping raw listing JSON into [`Post`] records and comment bodies.
use super::types::{Post, PostData};
use murmur_common::{MurmurError, Result};
use serde_json::Value;

/// Bodies the platform substitutes for deleted or moderated comments.
pub const REMOVAL_SENTINELS: [&str; 2] = ["[deleted]", "[removed]"];

const COMMENT_KIND: &str = "t1";

/// Whether a comment body carries user text.
pub fn is_meaningful_comment(body: &str) -> bool {
    !body.is_empty() && !REMOVAL_SENTINELS.contains(&body)
}

/// Top-level comment bodies from a `/comments/{id}.json` payload.
///
/// The payload is `[post_listing, comment_listing]`. The first `limit`
/// children of the comment listing are inspected in platform order; of those,
/// only `t1` entries with a meaningful body are kept. The limit applies
/// before filtering, so fewer than `limit` bodies may come back even when
/// the thread has more comments.
///
/// A payload without a second element, or whose second element has no
/// `data`, yields no comments.
pub fn comment_bodies(thread: &Value, limit: usize) -> Result<Vec<String>> {
    let Some(items) = thread.as_array() else {
        return Err(MurmurError::Malformed(
            "comment thread is not a JSON array".into(),
        ));
    };
    let Some(data) = items.get(1).and_then(|listing| listing.get("data")) else {
        return Ok(Vec::new());
    };
    let children = data
        .get("children")
        .and_then(Value::as_array)
        .ok_or_else(|| MurmurError::Malformed("comment listing has no children".into()))?;

    let bodies = children
        .iter()
        .take(limit)
        .filter(|child| child.get("kind").and_then(Value::as_str) == Some(COMMENT_KIND))
        .filter_map(|child| {
            child
                .get("data")
                .and_then(|d| d.get("body"))
                .and_then(Value::as_str)
        })
        .filter(|body| is_meaningful_comment(body))
        .map(str::to_string)
        .collect();
    Ok(bodies)
}

/// Build a [`Post`] from listing data. Missing fields fall back to empty
/// strings and a zero score; `url` is `base` + permalink.
pub fn to_post(data: PostData, base: &str, comments: Option<Vec<String>>) -> Post {
    let permalink = data.permalink.unwrap_or_default();
    Post {
        title: data.title.unwrap_or_default(),
        body: data.selftext.unwrap_or_default(),
        score: data.score.unwrap_or(0),
        comments,
        url: format!("{}{}", base.trim_end_matches('/'), permalink),
    }
}
