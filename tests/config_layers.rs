use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serial_test::serial;
use uuid::Uuid;

use gazette::config::{CliArgs, LoadError, load};
use gazette::domain::types::ArticleStatus;

const ENV_TOTAL_TTL: &str = "GAZETTE__CACHE__TOTAL_TTL_MINUTES";
const ENV_LATEST_TTL: &str = "GAZETTE__CACHE__LATEST_TTL_MINUTES";

struct TempConfig(PathBuf);

impl TempConfig {
    fn write(contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!("gazette-{}.toml", Uuid::new_v4()));
        std::fs::write(&path, contents).expect("temp config should be written");
        Self(path)
    }

    fn path(&self) -> &str {
        self.0.to_str().expect("temp path should be utf-8")
    }
}

impl Drop for TempConfig {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn clear_env() {
    // SAFETY: every test touching the process environment runs under #[serial].
    unsafe {
        std::env::remove_var(ENV_TOTAL_TTL);
        std::env::remove_var(ENV_LATEST_TTL);
    }
}

#[test]
#[serial]
fn file_then_env_then_cli() {
    clear_env();
    let file = TempConfig::write(
        r#"
[cache]
capacity = 64
latest_ttl_minutes = 30
total_ttl_minutes = 90

[articles]
default_status = "approved"
"#,
    );
    // SAFETY: see clear_env.
    unsafe {
        std::env::set_var(ENV_TOTAL_TTL, "7");
        std::env::set_var(ENV_LATEST_TTL, "20");
    }

    let cli = CliArgs::parse_from([
        "gazette",
        "--config-file",
        file.path(),
        "serve",
        "--cache-latest-ttl-minutes",
        "2",
    ]);
    let result = load(&cli);
    clear_env();
    let settings = result.expect("layered settings should load");

    assert_eq!(settings.cache.capacity.get(), 64);
    assert_eq!(settings.cache.total_ttl, Duration::from_secs(7 * 60));
    assert_eq!(settings.cache.latest_ttl, Duration::from_secs(2 * 60));
    assert_eq!(settings.articles.default_status, ArticleStatus::Approved);
}

#[test]
#[serial]
fn invalid_file_values_surface_the_key() {
    clear_env();
    let file = TempConfig::write(
        r#"
[site]
base_url = "not a url"
"#,
    );

    let cli = CliArgs::parse_from(["gazette", "--config-file", file.path()]);
    let err = load(&cli).expect_err("invalid site url should fail");

    assert!(matches!(err, LoadError::Invalid { key: "site.base_url", .. }));
}

#[test]
#[serial]
fn missing_explicit_config_file_is_an_error() {
    clear_env();
    let cli = CliArgs::parse_from([
        "gazette",
        "--config-file",
        "/nonexistent/gazette-missing.toml",
    ]);

    assert!(matches!(load(&cli), Err(LoadError::Build(_))));
}
