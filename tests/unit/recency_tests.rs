//! Unit tests for the recency window.

use std::sync::Arc;
use std::time::Duration;

use overlay_relay::recency::RecencyWindow;
use overlay_relay::store::MemoryStore;

const KEEP: usize = 24;

fn window() -> RecencyWindow {
    RecencyWindow::new(
        Arc::new(MemoryStore::new()),
        KEEP,
        Duration::from_secs(12 * 60 * 60),
    )
}

#[tokio::test]
async fn empty_channel_has_no_history() {
    let window = window();
    assert!(window.recent("overlay:none", 24).await.is_empty());
}

#[tokio::test]
async fn buffer_is_bounded_and_most_recent_first() {
    let window = window();
    for i in 0..30 {
        window.record("overlay:a", &format!("line-{i}")).await;
    }

    let recent = window.recent("overlay:a", KEEP).await;
    assert_eq!(recent.len(), KEEP);
    // The last 24 inserted, newest first: line-29 down to line-6.
    for (offset, line) in recent.iter().enumerate() {
        assert_eq!(line, &format!("line-{}", 29 - offset));
    }
}

#[tokio::test]
async fn limit_caps_the_returned_slice() {
    let window = window();
    for i in 0..10 {
        window.record("overlay:a", &format!("line-{i}")).await;
    }

    let recent = window.recent("overlay:a", 3).await;
    assert_eq!(recent, vec!["line-9", "line-8", "line-7"]);
}

#[tokio::test]
async fn channels_do_not_share_history() {
    let window = window();
    window.record("overlay:a", "only-in-a").await;

    assert!(window.recent("overlay:b", 24).await.is_empty());
    assert_eq!(window.recent("overlay:a", 24).await, vec!["only-in-a"]);
}

#[tokio::test]
async fn recorded_lines_keep_their_original_case() {
    let window = window();
    window.record("overlay:a", "Show Your Setup!").await;
    assert_eq!(window.recent("overlay:a", 1).await, vec!["Show Your Setup!"]);
}
