#![forbid(unsafe_code)]

//! `overlay-relay-ctl` — local CLI companion for `overlay-relay`.
//!
//! Drives the server's HTTP API from the operator's terminal: issue
//! overlay tokens, push events onto a channel, and inspect channel state
//! without opening the dashboard.

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Debug, Parser)]
#[command(
    name = "overlay-relay-ctl",
    about = "Local CLI for the overlay-relay server",
    version,
    long_about = None
)]
struct Cli {
    /// Base URL of the running server.
    #[arg(long, default_value = "http://127.0.0.1:8787")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Issue a signed overlay token for a streamer name.
    Token {
        /// Streamer display name.
        name: String,
        /// Token TTL in seconds.
        #[arg(long)]
        ttl: Option<i64>,
    },

    /// Verify a token and print its claims.
    Verify {
        /// The overlay token.
        token: String,
    },

    /// Validate a token and show the channel's recent lines.
    Ping {
        /// The overlay token.
        token: String,
    },

    /// Request the next generated line for a channel.
    Next {
        /// The overlay token.
        token: String,
        /// Tone: funny, motivator, serious, chill, urban, edgy.
        #[arg(long)]
        mode: Option<String>,
        /// Kind: task, question, banter.
        #[arg(long)]
        task_type: Option<String>,
        /// Stream context: just_chatting, irl, other.
        #[arg(long)]
        stream_kind: Option<String>,
        /// Language: en, ru, es.
        #[arg(long)]
        lang: Option<String>,
    },

    /// Switch the audience selector and notify subscribers.
    Audience {
        /// The overlay token.
        token: String,
        /// Audience value, e.g. `all` or `subs`.
        audience: String,
    },

    /// Publish a free-form message event (payload is a JSON object).
    Message {
        /// The overlay token.
        token: String,
        /// JSON object payload, e.g. '{"confetti":true}'.
        payload: String,
    },

    /// Fetch the channel's overlay settings document.
    State {
        /// The overlay token.
        token: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let result = match run(&cli, &client).await {
        Ok(value) => value,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&result) {
        Ok(pretty) => println!("{pretty}"),
        Err(_) => println!("{result}"),
    }
}

async fn run(cli: &Cli, client: &reqwest::Client) -> Result<Value, String> {
    let base = cli.server.trim_end_matches('/');
    match &cli.command {
        Command::Token { name, ttl } => {
            let mut body = json!({ "name": name });
            if let Some(ttl) = ttl {
                body["ttlSec"] = json!(ttl);
            }
            post_json(client, &format!("{base}/api/token"), &body).await
        }
        Command::Verify { token } => {
            let url = format!("{base}/api/overlay/verify?t={token}");
            get_json(client, &url).await
        }
        Command::Ping { token } => {
            let body = json!({ "kind": "ping", "token": token });
            post_json(client, &format!("{base}/api/task"), &body).await
        }
        Command::Next {
            token,
            mode,
            task_type,
            stream_kind,
            lang,
        } => {
            let body = json!({
                "kind": "next",
                "token": token,
                "mode": mode,
                "taskType": task_type,
                "streamKind": stream_kind,
                "lang": lang,
            });
            post_json(client, &format!("{base}/api/task"), &body).await
        }
        Command::Audience { token, audience } => {
            let body = json!({ "token": token, "audience": audience });
            post_json(client, &format!("{base}/api/events/toggle"), &body).await
        }
        Command::Message { token, payload } => {
            let payload: Value = serde_json::from_str(payload)
                .map_err(|err| format!("payload must be a JSON object: {err}"))?;
            if !payload.is_object() {
                return Err("payload must be a JSON object".into());
            }
            let body = json!({ "token": token, "type": "message", "payload": payload });
            post_json(client, &format!("{base}/api/events"), &body).await
        }
        Command::State { token } => {
            let url = format!("{base}/api/state?token={token}");
            get_json(client, &url).await
        }
    }
}

async fn post_json(client: &reqwest::Client, url: &str, body: &Value) -> Result<Value, String> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|err| format!("request failed: {err}"))?;
    response
        .json()
        .await
        .map_err(|err| format!("bad response: {err}"))
}

async fn get_json(client: &reqwest::Client, url: &str) -> Result<Value, String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| format!("request failed: {err}"))?;
    response
        .json()
        .await
        .map_err(|err| format!("bad response: {err}"))
}
