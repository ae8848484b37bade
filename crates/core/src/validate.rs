//! Judging of word and sentence submissions against a tour.
//!
//! The functions here are pure: they look at the tour and the progress so far
//! and return a [`ValidationResult`]. Recording a correct answer is the
//! caller's job (see `GameState`).

use crate::model::Tour;
use crate::normalize::{normalize_submission, strip_dashes};
use crate::progress::TourProgress;

/// Outcome of checking a submission. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Nothing was submitted.
    EmptyInput,
    /// A new canonical match. `matched` is the normalized submission.
    Correct { matched: String },
    /// Matches something already recorded for this tour.
    AlreadyFound,
    Incorrect,
}

impl ValidationResult {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self, ValidationResult::Correct { .. })
    }
}

/// Check a typed sentence against the tour's canonical sentences.
///
/// Both sides are trimmed and lower-cased before comparing. Outcomes in
/// priority order: empty input, new match, already found, incorrect.
#[must_use]
pub fn judge_sentence(tour: &Tour, progress: &TourProgress, submission: &str) -> ValidationResult {
    let normalized = normalize_submission(submission);
    if normalized.is_empty() {
        return ValidationResult::EmptyInput;
    }

    let position = tour.position();
    let matches_canonical = tour
        .sentences()
        .iter()
        .any(|canonical| normalize_submission(canonical.text()) == normalized);
    let already_found = progress.is_sentence_found(position, &normalized);

    match (matches_canonical, already_found) {
        (true, false) => ValidationResult::Correct {
            matched: normalized,
        },
        (_, true) => ValidationResult::AlreadyFound,
        (false, false) => ValidationResult::Incorrect,
    }
}

/// Check a word assembled from letters against the tour's vocabulary.
///
/// Canonical words have their syllable dashes removed before comparing.
#[must_use]
pub fn judge_word(tour: &Tour, progress: &TourProgress, word: &str) -> ValidationResult {
    let candidate = normalize_submission(word);
    if candidate.is_empty() {
        return ValidationResult::EmptyInput;
    }

    let position = tour.position();
    let matches_canonical = tour
        .words()
        .iter()
        .any(|canonical| strip_dashes(canonical).to_lowercase() == candidate);
    let already_found = progress.is_word_found(position, &candidate);

    match (matches_canonical, already_found) {
        (true, false) => ValidationResult::Correct { matched: candidate },
        (_, true) => ValidationResult::AlreadyFound,
        (false, false) => ValidationResult::Incorrect,
    }
}
