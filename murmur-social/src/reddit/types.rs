use serde::{Deserialize, Serialize};

/// A post assembled from a listing entry.
///
/// `comments` is `Some` for search results and `None` for the hot feed, in
/// which case the field is left out of serialized output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub body: String,
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    pub url: String,
}

/// `{"kind": "Listing", "data": {"children": [...]}}`
#[derive(Debug, Clone, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData<T> {
    pub children: Vec<Thing<T>>,
    #[serde(default)]
    pub after: Option<String>,
}

/// A tagged entry; `t3` for posts, `t1` for comments, `more` for stubs.
#[derive(Debug, Clone, Deserialize)]
pub struct Thing<T> {
    #[serde(default)]
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub permalink: Option<String>,
}

pub type PostListing = Listing<PostData>;
