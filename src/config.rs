//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keyring service name for stored credentials.
const KEYRING_SERVICE: &str = "overlay-relay";

fn default_http_port() -> u16 {
    8787
}

fn default_sweep_interval_seconds() -> u64 {
    60
}

fn default_token_ttl_seconds() -> i64 {
    6 * 60 * 60
}

fn default_rate_per_minute() -> i64 {
    20
}

fn default_recency_keep() -> usize {
    24
}

fn default_recency_ttl_seconds() -> u64 {
    12 * 60 * 60
}

fn default_log_keep() -> usize {
    200
}

fn default_log_ttl_seconds() -> u64 {
    24 * 60 * 60
}

fn default_replay() -> usize {
    2
}

fn default_keep_alive_seconds() -> u64 {
    15
}

fn default_state_ttl_seconds() -> u64 {
    24 * 60 * 60
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_attempts() -> usize {
    3
}

/// Capability token issuing defaults.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TokenConfig {
    /// TTL applied when a token request does not specify one.
    #[serde(default = "default_token_ttl_seconds")]
    pub default_ttl_seconds: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

/// Per-channel rate limiting.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RateConfig {
    /// Requests allowed per channel per minute window.
    #[serde(default = "default_rate_per_minute")]
    pub per_minute: i64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            per_minute: default_rate_per_minute(),
        }
    }
}

/// Recency window sizing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RecencyConfig {
    /// Lines kept per channel for duplicate avoidance.
    #[serde(default = "default_recency_keep")]
    pub keep: usize,
    /// Buffer lifetime, refreshed on every record.
    #[serde(default = "default_recency_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            keep: default_recency_keep(),
            ttl_seconds: default_recency_ttl_seconds(),
        }
    }
}

/// Event bus log and subscription tuning.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct BusConfig {
    /// Events kept per channel log.
    #[serde(default = "default_log_keep")]
    pub log_keep: usize,
    /// Channel log lifetime, refreshed on every publish.
    #[serde(default = "default_log_ttl_seconds")]
    pub log_ttl_seconds: u64,
    /// Buffered events replayed when a subscription opens.
    #[serde(default = "default_replay")]
    pub replay: usize,
    /// Interval between SSE keep-alive comment frames.
    #[serde(default = "default_keep_alive_seconds")]
    pub keep_alive_seconds: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            log_keep: default_log_keep(),
            log_ttl_seconds: default_log_ttl_seconds(),
            replay: default_replay(),
            keep_alive_seconds: default_keep_alive_seconds(),
        }
    }
}

/// Overlay settings document tuning.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct StateConfig {
    /// Settings document lifetime, refreshed on every write.
    #[serde(default = "default_state_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_state_ttl_seconds(),
        }
    }
}

/// Text-generation provider connection settings.
///
/// The API key is loaded at runtime via OS keychain or environment
/// variable, never from the TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ProviderConfig {
    /// Chat-completions endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request timeout; a timeout counts as a provider failure.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Generation attempts per `next` call.
    #[serde(default = "default_attempts")]
    pub attempts: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            timeout_seconds: default_timeout_seconds(),
            attempts: default_attempts(),
        }
    }
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// HTTP port for the overlay API and SSE stream.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Interval between expired-key sweeps of the store.
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
    /// Token issuing defaults.
    #[serde(default)]
    pub token: TokenConfig,
    /// Rate limiting.
    #[serde(default)]
    pub rate: RateConfig,
    /// Recency window sizing.
    #[serde(default)]
    pub recency: RecencyConfig,
    /// Event bus tuning.
    #[serde(default)]
    pub bus: BusConfig,
    /// Overlay settings document tuning.
    #[serde(default)]
    pub state: StateConfig,
    /// Provider connection settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Token signing secret (populated at runtime).
    #[serde(skip)]
    pub signing_secret: String,
    /// Provider API key (populated at runtime; may stay empty).
    #[serde(skip)]
    pub provider_api_key: String,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load secrets from the OS keychain with env-var fallback.
    ///
    /// The signing secret is required; the provider API key is optional
    /// and an absent key merely disables live generation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no signing secret can be found.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.signing_secret =
            load_credential("signing_secret", "OVERLAY_SIGNING_SECRET").await?;
        self.provider_api_key =
            match load_credential("provider_api_key", "PROVIDER_API_KEY").await {
                Ok(key) => key,
                Err(_) => {
                    warn!("no provider api key configured; serving fallback lines only");
                    String::new()
                }
            };
        Ok(())
    }

    /// Recency buffer TTL as a [`Duration`].
    #[must_use]
    pub fn recency_ttl(&self) -> Duration {
        Duration::from_secs(self.recency.ttl_seconds)
    }

    /// Event log TTL as a [`Duration`].
    #[must_use]
    pub fn log_ttl(&self) -> Duration {
        Duration::from_secs(self.bus.log_ttl_seconds)
    }

    /// Settings document TTL as a [`Duration`].
    #[must_use]
    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state.ttl_seconds)
    }

    /// SSE keep-alive interval as a [`Duration`].
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.bus.keep_alive_seconds)
    }

    /// Store sweep interval as a [`Duration`].
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    fn validate(&self) -> Result<()> {
        if self.rate.per_minute <= 0 {
            return Err(AppError::Config("rate.per_minute must be positive".into()));
        }
        if self.recency.keep == 0 {
            return Err(AppError::Config("recency.keep must be positive".into()));
        }
        if self.bus.log_keep == 0 {
            return Err(AppError::Config("bus.log_keep must be positive".into()));
        }
        if self.bus.replay > self.bus.log_keep {
            return Err(AppError::Config(
                "bus.replay cannot exceed bus.log_keep".into(),
            ));
        }
        if self.provider.attempts == 0 {
            return Err(AppError::Config("provider.attempts must be positive".into()));
        }
        if self.token.default_ttl_seconds < 60 {
            return Err(AppError::Config(
                "token.default_ttl_seconds must be at least 60".into(),
            ));
        }
        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring does synchronous I/O; keep it off the async threads.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    env::var(env_key).map_err(|_| {
        AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))
    })
}
