//! Lexical anti-repetition: pick the candidate least similar to recent lines.
//!
//! Similarity is word-set Jaccard over normalized text: cheap enough to run
//! on every request without embeddings, and good enough to catch the
//! provider paraphrasing something shown minutes ago.

/// Candidates whose normalized form is shorter than this are discarded.
const MIN_NORMALIZED_CHARS: usize = 6;

/// Lowercase, map punctuation to spaces, and collapse whitespace runs.
///
/// Used only for scoring; the displayed line keeps its original text.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_space = true;
        }
    }
    out
}

/// Jaccard similarity of the normalized word sets of `a` and `b`.
///
/// Returns 0.0 when either side normalizes to nothing.
#[must_use]
#[allow(clippy::cast_precision_loss)] // word counts stay far below 2^52
pub fn jaccard(a: &str, b: &str) -> f64 {
    let norm_a = normalize(a);
    let norm_b = normalize(b);
    let set_a: std::collections::HashSet<&str> = norm_a.split_whitespace().collect();
    let set_b: std::collections::HashSet<&str> = norm_b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.len() + set_b.len() - intersection;
    intersection as f64 / union as f64
}

/// Pick the candidate with the lowest maximum Jaccard similarity against
/// the `recent` set.
///
/// Empty and too-short candidates are filtered out first; `None` means the
/// caller must fall back. With an empty `recent` set every candidate scores
/// 0 and the first usable candidate wins. Ties break toward the earliest
/// candidate in input order.
#[must_use]
pub fn pick_dissimilar(candidates: &[String], recent: &[String]) -> Option<String> {
    let pool: Vec<&String> = candidates
        .iter()
        .filter(|c| normalize(c).chars().count() >= MIN_NORMALIZED_CHARS)
        .collect();

    let mut best: Option<(&String, f64)> = None;
    for candidate in pool {
        let score = recent
            .iter()
            .map(|r| jaccard(candidate, r))
            .fold(0.0_f64, f64::max);
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(line, _)| line.trim().to_owned())
}
