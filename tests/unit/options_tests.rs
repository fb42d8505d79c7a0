//! Unit tests for option normalization and canonical wire values.

use overlay_relay::models::options::{Lang, Mode, StreamKind, TaskType};

// ─── Mode ─────────────────────────────────────────────────────────────

#[test]
fn known_modes_parse() {
    assert_eq!(Mode::from_loose("funny"), Mode::Funny);
    assert_eq!(Mode::from_loose("serious"), Mode::Serious);
    assert_eq!(Mode::from_loose("chill"), Mode::Chill);
    assert_eq!(Mode::from_loose("urban"), Mode::Urban);
    assert_eq!(Mode::from_loose("edgy"), Mode::Edgy);
}

#[test]
fn unknown_mode_defaults_to_motivator() {
    assert_eq!(Mode::from_loose("sarcastic"), Mode::Motivator);
    assert_eq!(Mode::from_loose(""), Mode::Motivator);
}

#[test]
fn mode_parsing_is_case_insensitive() {
    assert_eq!(Mode::from_loose("FUNNY"), Mode::Funny);
}

// ─── TaskType ─────────────────────────────────────────────────────────

#[test]
fn legacy_task_type_aliases_fold_in() {
    assert_eq!(TaskType::from_loose("joke"), TaskType::Banter);
    assert_eq!(TaskType::from_loose("just_talk"), TaskType::Banter);
    assert_eq!(TaskType::from_loose("challenge"), TaskType::Task);
}

#[test]
fn unknown_task_type_defaults_to_task() {
    assert_eq!(TaskType::from_loose("speech"), TaskType::Task);
    assert_eq!(TaskType::from_loose(""), TaskType::Task);
}

// ─── StreamKind ───────────────────────────────────────────────────────

#[test]
fn legacy_stream_kind_aliases_fold_in() {
    assert_eq!(StreamKind::from_loose("just_chat"), StreamKind::JustChatting);
    assert_eq!(StreamKind::from_loose("gaming"), StreamKind::Other);
    assert_eq!(StreamKind::from_loose("music"), StreamKind::Other);
    assert_eq!(StreamKind::from_loose("cooking"), StreamKind::Other);
}

#[test]
fn unknown_stream_kind_folds_to_other() {
    assert_eq!(StreamKind::from_loose(""), StreamKind::Other);
    assert_eq!(StreamKind::from_loose("irl"), StreamKind::Irl);
}

// ─── Lang ─────────────────────────────────────────────────────────────

#[test]
fn unknown_lang_defaults_to_english() {
    assert_eq!(Lang::from_loose("de"), Lang::En);
    assert_eq!(Lang::from_loose("ru"), Lang::Ru);
    assert_eq!(Lang::from_loose("es"), Lang::Es);
}

// ─── Canonical values ─────────────────────────────────────────────────

#[test]
fn canonical_values_round_trip_through_from_loose() {
    for mode in [
        Mode::Funny,
        Mode::Motivator,
        Mode::Serious,
        Mode::Chill,
        Mode::Urban,
        Mode::Edgy,
    ] {
        assert_eq!(Mode::from_loose(mode.as_str()), mode);
    }
    for task_type in [TaskType::Task, TaskType::Question, TaskType::Banter] {
        assert_eq!(TaskType::from_loose(task_type.as_str()), task_type);
    }
    for kind in [StreamKind::JustChatting, StreamKind::Irl, StreamKind::Other] {
        assert_eq!(StreamKind::from_loose(kind.as_str()), kind);
    }
    for lang in [Lang::En, Lang::Ru, Lang::Es] {
        assert_eq!(Lang::from_loose(lang.as_str()), lang);
    }
}
