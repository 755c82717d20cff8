//! Common types shared across Murmur crates.
//!
//! This crate holds the configuration values handed to the acquisition
//! components, the shared error taxonomy, and the observability helpers. It is
//! intentionally dependency-minimal so every crate in the workspace can pull it
//! in without transitive cost.
//!
//! # Overview
//!
//! - [`AnswersConfig`]: settings for the answer-synthesis client
//! - [`ScraperConfig`]: settings for the thread scraper
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`MurmurError`], [`FailureKind`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use murmur_common::{AnswersConfig, ScraperConfig};
//!
//! let answers = AnswersConfig::default();
//! assert_eq!(answers.model, "sonar");
//! assert!(answers.api_key.is_none());
//!
//! let scraper = ScraperConfig::default();
//! assert_eq!(scraper.delay_ms, 1000);
//! assert_eq!(scraper.comment_limit, 5);
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Environment variable carrying the answer-synthesis credential.
pub const CREDENTIAL_ENV: &str = "PERPLEXITY_API_KEY";

pub const DEFAULT_ANSWERS_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_ANSWERS_MODEL: &str = "sonar";
pub const DEFAULT_SYSTEM_PROMPT: &str = "Be precise and concise. Cite sources.";

pub const DEFAULT_REDDIT_BASE_URL: &str = "https://www.reddit.com";
/// Desktop browser UA; the platform rejects default HTTP client agents.
pub const DEFAULT_BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Configuration for the answer-synthesis client.
///
/// The credential is optional here so that a config can be loaded and
/// inspected without one; the client itself refuses to build without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswersConfig {
    #[serde(skip_serializing, deserialize_with = "lenient_secret")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub system_prompt: String,
    /// Request timeout; `None` leaves requests unbounded.
    pub timeout_secs: Option<u64>,
}

impl Default for AnswersConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_ANSWERS_BASE_URL.to_string(),
            model: DEFAULT_ANSWERS_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            timeout_secs: None,
        }
    }
}

impl AnswersConfig {
    /// Convenience constructor used by tests and embedders.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// The credential, if present and not blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Accept a credential written as a bare number (`api_key: 12345`).
fn lenient_secret<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Secret {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    Ok(Option::<Secret>::deserialize(deserializer)?.map(|s| match s {
        Secret::Text(t) => t,
        Secret::Unsigned(n) => n.to_string(),
        Secret::Signed(n) => n.to_string(),
        Secret::Float(n) => n.to_string(),
    }))
}

/// Configuration for the thread scraper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Pause after every listing item, in milliseconds.
    pub delay_ms: u64,
    /// Number of top-level comment entries inspected per post.
    pub comment_limit: usize,
    /// Request timeout; `None` leaves requests unbounded.
    pub timeout_secs: Option<u64>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REDDIT_BASE_URL.to_string(),
            user_agent: DEFAULT_BROWSER_USER_AGENT.to_string(),
            delay_ms: 1000,
            comment_limit: 5,
            timeout_secs: None,
        }
    }
}

/// Runtime failure classes that degrade a call instead of aborting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Connection, DNS, TLS or body-read failure.
    Transport,
    /// The server answered with a non-2xx status.
    Status,
    /// The body could not be decoded or lacked an expected field.
    Malformed,
}

/// Error types used across the Murmur workspace.
#[derive(thiserror::Error, Debug)]
pub enum MurmurError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required credential was not supplied.
    #[error("{0} not found")]
    MissingCredential(String),

    #[error("network error: {0}")]
    Transport(String),

    #[error("server returned error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl MurmurError {
    /// Classify a runtime failure. Configuration errors have no kind: they
    /// are fatal and never degraded.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            MurmurError::Transport(_) => Some(FailureKind::Transport),
            MurmurError::Status { .. } => Some(FailureKind::Status),
            MurmurError::Malformed(_) => Some(FailureKind::Malformed),
            MurmurError::Config(_) | MurmurError::MissingCredential(_) => None,
        }
    }

    /// Render the `Error: <description>` marker consumed by string callers.
    pub fn to_marker(&self) -> String {
        format!("Error: {self}")
    }
}

/// Convenient alias for results that use [`MurmurError`].
pub type Result<T> = std::result::Result<T, MurmurError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credential_is_treated_as_missing() {
        let cfg = AnswersConfig::with_api_key("   ");
        assert!(cfg.credential().is_none());

        let cfg = AnswersConfig::with_api_key(" pplx-123 ");
        assert_eq!(cfg.credential(), Some("pplx-123"));
    }

    #[test]
    fn config_errors_have_no_kind() {
        assert_eq!(MurmurError::Config("x".into()).kind(), None);
        assert_eq!(
            MurmurError::MissingCredential(CREDENTIAL_ENV.into()).kind(),
            None
        );
        assert_eq!(
            MurmurError::Status {
                status: 500,
                message: "boom".into()
            }
            .kind(),
            Some(FailureKind::Status)
        );
    }

    #[test]
    fn marker_is_prefixed() {
        let err = MurmurError::Transport("connection refused".into());
        assert_eq!(err.to_marker(), "Error: network error: connection refused");
    }

    #[test]
    fn numeric_api_key_deserializes_as_text() {
        let cfg: AnswersConfig = serde_json::from_str(r#"{"api_key": 12345}"#).unwrap();
        assert_eq!(cfg.credential(), Some("12345"));

        let cfg: AnswersConfig = serde_json::from_str(r#"{"api_key": "pplx-1"}"#).unwrap();
        assert_eq!(cfg.credential(), Some("pplx-1"));

        let cfg: AnswersConfig = serde_json::from_str(r#"{"api_key": null}"#).unwrap();
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn api_key_is_never_serialized() {
        let cfg = AnswersConfig::with_api_key("secret");
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("api_key"));
    }
}
