use murmur_common::CREDENTIAL_ENV;
use murmur_config::MurmurConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn file_values_and_env_overrides_merge() {
    let tmp = TempDir::new().unwrap();
    let file_yaml = r#"
answers:
  api_key: "${PERPLEXITY_API_KEY}"
  timeout_secs: 10
scraper:
  base_url: "https://old.reddit.com"
  delay_ms: 1500
logging:
  level: "debug"
  format: "json"
"#;
    let p = write_yaml(&tmp, "murmur.yaml", file_yaml);

    temp_env::with_vars(
        [
            (CREDENTIAL_ENV, Some("pplx-from-env")),
            ("MURMUR__SCRAPER__DELAY_MS", Some("0")),
        ],
        || {
            let config = MurmurConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");

            assert_eq!(config.answers.credential(), Some("pplx-from-env"));
            assert_eq!(config.answers.timeout_secs, Some(10));
            assert_eq!(config.scraper.timeout_secs, None);
            assert_eq!(config.answers.model, "sonar");
            assert_eq!(config.scraper.base_url, "https://old.reddit.com");
            assert_eq!(config.scraper.delay_ms, 0);
            assert_eq!(config.scraper.comment_limit, 5);
            assert_eq!(config.logging.level, "debug");
            assert!(config.logging.is_json());
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    temp_env::with_var_unset(CREDENTIAL_ENV, || {
        let config = MurmurConfigLoader::new()
            .with_optional_file(tmp.path().join("absent.yaml"))
            .load()
            .expect("defaults load");

        assert!(config.answers.credential().is_none());
        assert_eq!(config.scraper.base_url, "https://www.reddit.com");
        assert_eq!(config.scraper.delay_ms, 1000);
        assert!(!config.logging.is_json());
    });
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = MurmurConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn numeric_credential_override_stays_a_string() {
    temp_env::with_vars(
        [
            ("MURMUR__ANSWERS__API_KEY", Some("0012345")),
            (CREDENTIAL_ENV, None),
        ],
        || {
            let config = MurmurConfigLoader::new().load().expect("load config");
            assert_eq!(config.answers.credential(), Some("0012345"));
        },
    );
}

#[test]
#[serial]
fn numeric_credential_in_yaml_is_accepted() {
    temp_env::with_var_unset(CREDENTIAL_ENV, || {
        let config = MurmurConfigLoader::new()
            .with_yaml_str("answers:\n  api_key: 98765\n")
            .load()
            .expect("load config");
        assert_eq!(config.answers.credential(), Some("98765"));
    });
}
