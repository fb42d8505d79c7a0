//! Unit tests for configuration parsing and validation.

use std::io::Write;
use std::time::Duration;

use overlay_relay::config::GlobalConfig;

// ─── Defaults ─────────────────────────────────────────────────────────

#[test]
fn empty_config_uses_documented_defaults() {
    let config = GlobalConfig::from_toml_str("").expect("defaults");
    assert_eq!(config.http_port, 8787);
    assert_eq!(config.token.default_ttl_seconds, 6 * 60 * 60);
    assert_eq!(config.rate.per_minute, 20);
    assert_eq!(config.recency.keep, 24);
    assert_eq!(config.bus.log_keep, 200);
    assert_eq!(config.bus.replay, 2);
    assert_eq!(config.provider.attempts, 3);
    assert_eq!(config.provider.model, "gpt-4o-mini");
}

#[test]
fn duration_helpers_reflect_the_raw_seconds() {
    let config = GlobalConfig::from_toml_str("").expect("defaults");
    assert_eq!(config.recency_ttl(), Duration::from_secs(12 * 60 * 60));
    assert_eq!(config.log_ttl(), Duration::from_secs(24 * 60 * 60));
    assert_eq!(config.state_ttl(), Duration::from_secs(24 * 60 * 60));
    assert_eq!(config.keep_alive(), Duration::from_secs(15));
    assert_eq!(config.sweep_interval(), Duration::from_secs(60));
}

// ─── Overrides ────────────────────────────────────────────────────────

#[test]
fn toml_overrides_apply() {
    let config = GlobalConfig::from_toml_str(
        r#"
http_port = 9000
sweep_interval_seconds = 5

[rate]
per_minute = 3

[recency]
keep = 8
ttl_seconds = 60

[bus]
log_keep = 50
replay = 5
keep_alive_seconds = 2

[provider]
api_url = "http://127.0.0.1:1/v1/chat/completions"
model = "test-model"
timeout_seconds = 1
attempts = 2
"#,
    )
    .expect("parse");

    assert_eq!(config.http_port, 9000);
    assert_eq!(config.rate.per_minute, 3);
    assert_eq!(config.recency.keep, 8);
    assert_eq!(config.bus.log_keep, 50);
    assert_eq!(config.bus.replay, 5);
    assert_eq!(config.provider.model, "test-model");
    assert_eq!(config.provider.attempts, 2);
}

// ─── Validation ───────────────────────────────────────────────────────

#[test]
fn zero_rate_limit_is_rejected() {
    let result = GlobalConfig::from_toml_str("[rate]\nper_minute = 0\n");
    assert!(result.is_err());
}

#[test]
fn zero_recency_keep_is_rejected() {
    let result = GlobalConfig::from_toml_str("[recency]\nkeep = 0\n");
    assert!(result.is_err());
}

#[test]
fn replay_larger_than_log_is_rejected() {
    let result = GlobalConfig::from_toml_str("[bus]\nlog_keep = 5\nreplay = 10\n");
    assert!(result.is_err());
}

#[test]
fn zero_attempts_is_rejected() {
    let result = GlobalConfig::from_toml_str("[provider]\nattempts = 0\n");
    assert!(result.is_err());
}

#[test]
fn sub_minute_token_ttl_is_rejected() {
    let result = GlobalConfig::from_toml_str("[token]\ndefault_ttl_seconds = 30\n");
    assert!(result.is_err());
}

#[test]
fn invalid_toml_is_a_config_error() {
    assert!(GlobalConfig::from_toml_str("http_port = [").is_err());
}

// ─── File loading ─────────────────────────────────────────────────────

#[test]
fn load_from_path_reads_the_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "http_port = 9123").expect("write");

    let config = GlobalConfig::load_from_path(file.path()).expect("load");
    assert_eq!(config.http_port, 9123);
}

#[test]
fn missing_file_is_a_config_error() {
    assert!(GlobalConfig::load_from_path("/nonexistent/overlay-relay.toml").is_err());
}
