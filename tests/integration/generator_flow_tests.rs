//! Integration tests for the task generation pipeline.
//!
//! Drives `TaskGenerator` directly against an in-memory store and a
//! scripted provider; the HTTP layer is covered separately.

use overlay_relay::bus::channel_for_token;
use overlay_relay::generator::fallback::FALLBACK_LINES;
use overlay_relay::generator::{GenerateOptions, Via};
use overlay_relay::models::event::OverlayEvent;
use overlay_relay::AppError;

use super::test_helpers::{build_state, test_config, ScriptedProvider};

fn issue_token(state: &overlay_relay::http::AppState) -> String {
    state.codec.issue("TestStreamer", 3600).expect("issue")
}

// ─── Generated path ───────────────────────────────────────────────────

#[tokio::test]
async fn generated_line_is_returned_recorded_and_published() {
    let provider = ScriptedProvider::with_lines(&[
        "Do a quick camera wave",
        "Name your favorite snack",
        "Tell chat one hot take",
    ]);
    let state = build_state(test_config(), provider);
    let token = issue_token(&state);
    let channel = channel_for_token(&token);

    // Subscribe before generating so the published event is observable.
    let mut subscription = state.bus.subscribe(&channel).await;

    let outcome = state
        .generator
        .next(&token, GenerateOptions::default())
        .await
        .expect("next");
    assert_eq!(outcome.via, Via::Generated);
    assert_eq!(outcome.line, "Do a quick camera wave");

    // The line is in the recency window now.
    let ping = state.generator.ping(&token).await.expect("ping");
    assert_eq!(ping.name, "TestStreamer");
    assert_eq!(ping.recent, vec!["Do a quick camera wave"]);

    // And it went out on the channel as a task event.
    let event = subscription.live.recv().await.expect("event");
    match event {
        OverlayEvent::Task { line, name, .. } => {
            assert_eq!(line, "Do a quick camera wave");
            assert_eq!(name.as_deref(), Some("TestStreamer"));
        }
        other => panic!("expected task event, got {other:?}"),
    }
}

#[tokio::test]
async fn second_call_avoids_repeating_the_recent_line() {
    let provider = ScriptedProvider::with_script(vec![
        // First call: one usable candidate.
        Ok("tell us your best joke".into()),
        Ok(String::new()),
        Ok(String::new()),
        // Second call: a repeat and a fresh option.
        Ok("tell us your best joke".into()),
        Ok("what's your favorite food".into()),
        Ok(String::new()),
    ]);
    let state = build_state(test_config(), provider);
    let token = issue_token(&state);

    let first = state
        .generator
        .next(&token, GenerateOptions::default())
        .await
        .expect("first");
    assert_eq!(first.line, "tell us your best joke");

    let second = state
        .generator
        .next(&token, GenerateOptions::default())
        .await
        .expect("second");
    assert_eq!(second.via, Via::Generated);
    assert_eq!(second.line, "what's your favorite food");
}

#[tokio::test]
async fn empty_completions_are_skipped_without_aborting() {
    let provider = ScriptedProvider::with_script(vec![
        Ok(String::new()),
        Ok(String::new()),
        Ok("A perfectly usable line".into()),
    ]);
    let state = build_state(test_config(), provider);
    let token = issue_token(&state);

    let outcome = state
        .generator
        .next(&token, GenerateOptions::default())
        .await
        .expect("next");
    assert_eq!(outcome.via, Via::Generated);
    assert_eq!(outcome.line, "A perfectly usable line");
}

// ─── Fallback path ────────────────────────────────────────────────────

#[tokio::test]
async fn provider_outage_degrades_to_fallback_content() {
    let provider = ScriptedProvider::always_failing();
    let state = build_state(test_config(), provider);
    let token = issue_token(&state);

    let outcome = state
        .generator
        .next(&token, GenerateOptions::default())
        .await
        .expect("next must not fail on provider outage");
    assert_eq!(outcome.via, Via::Fallback);
    assert!(!outcome.line.is_empty());
    assert!(FALLBACK_LINES.contains(&outcome.line.as_str()));
}

#[tokio::test]
async fn first_hard_failure_abandons_remaining_attempts() {
    let provider = ScriptedProvider::with_script(vec![
        Err("connection reset".into()),
        Ok("never requested".into()),
        Ok("never requested either".into()),
    ]);
    let state = build_state(test_config(), provider.clone());
    let token = issue_token(&state);

    let outcome = state
        .generator
        .next(&token, GenerateOptions::default())
        .await
        .expect("next");
    assert_eq!(outcome.via, Via::Fallback);
    // The two scripted successes after the failure were never consumed.
    assert_eq!(provider.remaining(), 2);
}

#[tokio::test]
async fn candidates_gathered_before_a_failure_still_count() {
    let provider = ScriptedProvider::with_script(vec![
        Ok("Show us the view from your window".into()),
        Err("timeout".into()),
        Ok("never requested".into()),
    ]);
    let state = build_state(test_config(), provider);
    let token = issue_token(&state);

    let outcome = state
        .generator
        .next(&token, GenerateOptions::default())
        .await
        .expect("next");
    assert_eq!(outcome.via, Via::Generated);
    assert_eq!(outcome.line, "Show us the view from your window");
}

// ─── Authorization and rate limiting ──────────────────────────────────

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let state = build_state(test_config(), ScriptedProvider::always_failing());
    let result = state
        .generator
        .next("not-a-token", GenerateOptions::default())
        .await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let state = build_state(test_config(), ScriptedProvider::always_failing());
    let expired = state
        .codec
        .issue_at("s", 60, 1_000_000)
        .expect("issue in the past");
    let result = state.generator.ping(&expired).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn exhausted_window_is_rate_limited() {
    let mut config = test_config();
    config.rate.per_minute = 2;
    let state = build_state(
        config,
        ScriptedProvider::with_lines(&[
            "Line one for the window",
            "Line two for the window",
            "Line three for the window",
        ]),
    );
    let token = issue_token(&state);

    for _ in 0..2 {
        state
            .generator
            .next(&token, GenerateOptions::default())
            .await
            .expect("within budget");
    }
    let result = state.generator.next(&token, GenerateOptions::default()).await;
    assert!(matches!(result, Err(AppError::RateLimited(_))));
}
