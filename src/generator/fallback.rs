//! Static fallback lines used when generation is unavailable or empty.

use rand::seq::SliceRandom;

/// Pre-written lines, safe for any stream. The overlay must always have
/// something to show, so this set is the floor the service never drops
/// below.
pub const FALLBACK_LINES: [&str; 10] = [
    "Chat, rate the streamer’s fit 1–10 — be honest.",
    "Tell us your most controversial food take in 10s.",
    "Pick one: sleep or grind — and why?",
    "Show your phone lockscreen for 3 seconds 😏",
    "Do a 7-word life advice, no more, no less.",
    "Chat, drop one dare (PG-13) for the next minute.",
    "Tell a tiny L you took this week.",
    "If you vanished for a day — what’s the move?",
    "Name one habit you’re trying to fix.",
    "Give your best two-line roast of yourself.",
];

/// The fallback set in random order.
#[must_use]
pub fn shuffled() -> Vec<String> {
    let mut lines: Vec<String> = FALLBACK_LINES.iter().map(|&l| l.to_owned()).collect();
    lines.shuffle(&mut rand::thread_rng());
    lines
}
