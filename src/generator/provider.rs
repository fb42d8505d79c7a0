//! Text-generation provider client.
//!
//! The provider is a plain chat-completions HTTP API treated as a black
//! box: one request, one short completion, bounded by a client timeout.
//! Everything the rest of the crate needs is behind [`LineProvider`], so
//! tests substitute a fake without any network.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::config::ProviderConfig;
use crate::{AppError, Result};

/// Sampling temperature for overlay lines; variety matters more than
/// determinism here.
const TEMPERATURE: f64 = 0.9;
const TOP_P: f64 = 0.95;

/// A source of single candidate lines.
pub trait LineProvider: Send + Sync {
    /// Request one candidate line for the assembled prompt.
    ///
    /// Implementations return the cleaned first line of the completion;
    /// an empty string means the attempt produced nothing usable.
    fn one_line(&self, prompt: String) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Chat-completions client with bearer auth and a request timeout.
pub struct HttpProvider {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpProvider {
    /// Build a client from provider configuration and the loaded API key.
    ///
    /// An empty `api_key` is allowed at construction; calls then fail fast
    /// and the generator falls back to static lines.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|err| AppError::Config(format!("provider http client: {err}")))?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }

    async fn request_line(&self, prompt: String) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(AppError::Provider("api key not configured".into()));
        }

        let body = json!({
            "model": self.model,
            "temperature": TEMPERATURE,
            "top_p": TOP_P,
            "messages": [
                { "role": "system", "content": super::prompt::SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| AppError::Provider(format!("request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Provider(format!("provider status {status}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| AppError::Provider(format!("bad provider response: {err}")))?;

        let text = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .unwrap_or_default();
        Ok(first_clean_line(text))
    }
}

impl LineProvider for HttpProvider {
    fn one_line(&self, prompt: String) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        Box::pin(self.request_line(prompt))
    }
}

/// First non-empty completion line, stripped of leading list markers.
///
/// Models occasionally return a numbered list or a multi-line answer even
/// when told not to; the first usable line is kept.
#[must_use]
pub fn first_clean_line(text: &str) -> String {
    text.lines()
        .map(strip_list_marker)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
}

fn strip_list_marker(line: &str) -> String {
    line.trim_start()
        .trim_start_matches(|c: char| {
            c.is_ascii_digit() || matches!(c, '-' | '.' | ')' | ']' | '*')
        })
        .trim()
        .to_owned()
}
