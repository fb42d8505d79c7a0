//! Unit tests for the overlay settings document.

use overlay_relay::models::options::{Mode, StreamKind};
use overlay_relay::models::state::{OverlayState, StatePatch};
use serde_json::{json, Value};

#[test]
fn patch_merges_over_existing_fields() {
    let current = OverlayState {
        mode: Some(Mode::Chill),
        seconds: Some(30),
        auto: Some(true),
        ..OverlayState::default()
    };
    let patch = StatePatch {
        mode: Some("funny".into()),
        voice: Some(true),
        ..StatePatch::default()
    };

    let merged = current.merged(&patch);
    assert_eq!(merged.mode, Some(Mode::Funny));
    assert_eq!(merged.seconds, Some(30));
    assert_eq!(merged.auto, Some(true));
    assert_eq!(merged.voice, Some(true));
}

#[test]
fn seconds_are_clamped_to_the_floor_and_cap() {
    let low = OverlayState::default().merged(&StatePatch {
        seconds: Some(1),
        ..StatePatch::default()
    });
    assert_eq!(low.seconds, Some(5));

    let high = OverlayState::default().merged(&StatePatch {
        seconds: Some(600),
        ..StatePatch::default()
    });
    assert_eq!(high.seconds, Some(60));
}

#[test]
fn loose_values_are_normalized_on_merge() {
    let merged = OverlayState::default().merged(&StatePatch {
        mode: Some("whatever".into()),
        stream_kind: Some("gaming".into()),
        ..StatePatch::default()
    });
    assert_eq!(merged.mode, Some(Mode::Motivator));
    assert_eq!(merged.stream_kind, Some(StreamKind::Other));
}

#[test]
fn unset_fields_are_omitted_from_the_wire() {
    let state = OverlayState {
        seconds: Some(15),
        ..OverlayState::default()
    };
    let value: Value = serde_json::to_value(state).expect("encode");
    assert_eq!(value, json!({ "seconds": 15 }));
}

#[test]
fn stored_document_round_trips() {
    let state = OverlayState {
        mode: Some(Mode::Edgy),
        seconds: Some(20),
        auto: Some(false),
        voice: Some(true),
        friend: Some(false),
        stream_kind: Some(StreamKind::Irl),
    };
    let encoded = serde_json::to_string(&state).expect("encode");
    let decoded: OverlayState = serde_json::from_str(&encoded).expect("decode");
    assert_eq!(decoded, state);
}

#[test]
fn camel_case_wire_names_are_used() {
    let state = OverlayState {
        stream_kind: Some(StreamKind::JustChatting),
        ..OverlayState::default()
    };
    let value: Value = serde_json::to_value(state).expect("encode");
    assert_eq!(value, json!({ "streamKind": "just_chatting" }));
}
