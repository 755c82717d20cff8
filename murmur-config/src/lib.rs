//! Loader for Murmur configuration with YAML + environment overlays.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults ([`AnswersConfig::default`], [`ScraperConfig::default`])
//! 2. YAML files / inline snippets, in the order they were attached
//! 3. `MURMUR__SECTION__KEY` environment variables
//!
//! String values may reference `${VAR}`; references are expanded recursively
//! after merging. When no credential is configured (or its placeholder did not
//! resolve), the loader falls back to the `PERPLEXITY_API_KEY` variable. This is
//! the only place in the workspace that reads the process environment for
//! component settings.
use config::{Config, ConfigError, Environment, File, FileFormat};
use murmur_common::{AnswersConfig, CREDENTIAL_ENV, ScraperConfig};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
/// Env override for the credential; read verbatim, never type-inferred.
const API_KEY_OVERRIDE_ENV: &str = "MURMUR__ANSWERS__API_KEY";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MurmurConfig {
    pub answers: AnswersConfig,
    pub scraper: ScraperConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// `text` or `json`.
    pub format: String,
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.trim().eq_ignore_ascii_case("json")
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Fill a missing credential from the dedicated environment variable.
fn resolve_credential(answers: &mut AnswersConfig) {
    let unresolved = answers
        .api_key
        .as_deref()
        .is_some_and(|k| k.contains("${"));
    if unresolved {
        answers.api_key = None;
    }
    if answers.credential().is_none() {
        answers.api_key = std::env::var(CREDENTIAL_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty());
    }
}

/// `try_parsing` turns an all-digit env value into a number, dropping leading
/// zeros. Put the credential back exactly as it was exported.
fn keep_raw_credential_override(v: &mut Value) {
    let Ok(raw) = std::env::var(API_KEY_OVERRIDE_ENV) else {
        return;
    };
    if let Some(root) = v.as_object_mut() {
        let answers = root
            .entry("answers")
            .or_insert_with(|| Value::Object(Default::default()));
        if let Some(answers) = answers.as_object_mut() {
            answers.insert("api_key".into(), Value::String(raw));
        }
    }
}

/// Builder hiding the `config` crate wiring.
pub struct MurmurConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for MurmurConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MurmurConfigLoader {
    /// Start with built-in defaults and `MURMUR__` env overrides.
    ///
    /// ```
    /// use murmur_config::MurmurConfigLoader;
    ///
    /// let config = MurmurConfigLoader::new()
    ///     .with_yaml_str("scraper:\n  delay_ms: 250\n")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.scraper.delay_ms, 250);
    /// assert_eq!(config.scraper.comment_limit, 5);
    /// assert_eq!(config.answers.model, "sonar");
    /// ```
    pub fn new() -> Self {
        let builder = Config::builder().add_source(
            Environment::with_prefix("MURMUR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
        Self { builder }
    }

    /// Attach a required YAML/TOML/JSON file; format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use murmur_config::MurmurConfigLoader;
    ///
    /// let config = MurmurConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// answers:
    ///   api_key: "pplx-inline"
    ///   model: "sonar-pro"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.answers.credential(), Some("pplx-inline"));
    /// assert_eq!(config.answers.model, "sonar-pro");
    /// ```
    pub fn load(self) -> Result<MurmurConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        keep_raw_credential_override(&mut v);
        expand_env_in_value(&mut v);

        let mut typed: MurmurConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        resolve_credential(&mut typed.answers);

        Ok(typed)
    }
}
