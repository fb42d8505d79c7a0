//! Unit tests for the capability token codec.
//!
//! Covers round-trip, expiry at a simulated clock, single-byte tamper
//! detection across payload and signature segments, and malformed input.

use overlay_relay::token::{TokenCodec, VerifyError};

const NOW: i64 = 1_700_000_000;

fn codec() -> TokenCodec {
    TokenCodec::new("unit-test-secret").expect("codec")
}

// ─── Round-trip ───────────────────────────────────────────────────────

#[test]
fn round_trip_returns_subject() {
    let codec = codec();
    let token = codec.issue_at("StreamerOne", 3600, NOW).expect("issue");
    let claims = codec.verify_at(&token, NOW).expect("verify");
    assert_eq!(claims.sub, "StreamerOne");
    assert_eq!(claims.iat, NOW);
    assert_eq!(claims.exp, NOW + 3600);
}

#[test]
fn round_trip_succeeds_any_time_before_expiry() {
    let codec = codec();
    let token = codec.issue_at("s", 3600, NOW).expect("issue");
    for offset in [0, 1, 1800, 3599, 3600] {
        assert!(
            codec.verify_at(&token, NOW + offset).is_ok(),
            "offset {offset} should still verify"
        );
    }
}

#[test]
fn subject_is_trimmed_on_issue() {
    let codec = codec();
    let token = codec.issue_at("  spaced  ", 3600, NOW).expect("issue");
    let claims = codec.verify_at(&token, NOW).expect("verify");
    assert_eq!(claims.sub, "spaced");
}

#[test]
fn ttl_is_clamped_to_minimum() {
    let codec = codec();
    let token = codec.issue_at("s", 5, NOW).expect("issue");
    let claims = codec.verify_at(&token, NOW).expect("verify");
    assert_eq!(claims.exp, NOW + 60);
}

// ─── Expiry ───────────────────────────────────────────────────────────

#[test]
fn expired_token_is_rejected() {
    let codec = codec();
    let token = codec.issue_at("s", 60, NOW).expect("issue");
    assert_eq!(codec.verify_at(&token, NOW + 61), Err(VerifyError::Expired));
}

#[test]
fn token_is_valid_at_exact_expiry_second() {
    let codec = codec();
    let token = codec.issue_at("s", 60, NOW).expect("issue");
    assert!(codec.verify_at(&token, NOW + 60).is_ok());
}

// ─── Tamper detection ─────────────────────────────────────────────────

/// Flip one character, picking a replacement that keeps the segment
/// structure intact (never a `.`).
fn flipped(token: &str, index: usize) -> String {
    let mut bytes = token.as_bytes().to_vec();
    bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
    String::from_utf8(bytes).expect("ascii token")
}

#[test]
fn any_single_byte_tamper_in_payload_or_signature_fails() {
    let codec = codec();
    let token = codec.issue_at("tamper-check", 3600, NOW).expect("issue");
    let first_dot = token.find('.').expect("dot");
    let second_dot = token[first_dot + 1..].find('.').expect("dot") + first_dot + 1;

    for index in (first_dot + 1)..token.len() {
        if index == second_dot {
            continue;
        }
        let tampered = flipped(&token, index);
        if tampered == token {
            continue;
        }
        assert_eq!(
            codec.verify_at(&tampered, NOW),
            Err(VerifyError::BadSignature),
            "byte {index} tamper must fail signature check"
        );
    }
}

#[test]
fn token_signed_with_other_secret_fails() {
    let other = TokenCodec::new("a-different-secret").expect("codec");
    let token = other.issue_at("s", 3600, NOW).expect("issue");
    assert_eq!(
        codec().verify_at(&token, NOW),
        Err(VerifyError::BadSignature)
    );
}

// ─── Malformed input ──────────────────────────────────────────────────

#[test]
fn wrong_part_count_is_malformed() {
    let codec = codec();
    for token in ["", "just-one-part", "two.parts", "a.b.c.d"] {
        assert_eq!(
            codec.verify_at(token, NOW),
            Err(VerifyError::Malformed),
            "{token:?} must be malformed"
        );
    }
}

#[test]
fn empty_segments_are_malformed() {
    let codec = codec();
    for token in ["..", "a..c", ".b.c", "a.b."] {
        assert_eq!(codec.verify_at(token, NOW), Err(VerifyError::Malformed));
    }
}

#[test]
fn empty_secret_is_rejected() {
    assert!(TokenCodec::new("").is_err());
}
