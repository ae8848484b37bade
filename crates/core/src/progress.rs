use std::collections::BTreeMap;

use crate::model::{TourList, TourPosition};
use crate::normalize::normalize_submission;

/// Result of recording a found word or sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marked {
    Added,
    /// Already recorded for this position; nothing changed.
    AlreadyFound,
}

/// Words and sentences found so far, per tour position.
///
/// Entries are unique per position. Sentences are stored in submission
/// normalized form (trimmed, lower-cased) so that `"  Hello "` and `"hello"`
/// are the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TourProgress {
    words: BTreeMap<TourPosition, Vec<String>>,
    sentences: BTreeMap<TourPosition, Vec<String>>,
}

impl TourProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_word_found(&mut self, position: TourPosition, word: &str) -> Marked {
        insert_unique(self.words.entry(position).or_default(), word.to_string())
    }

    pub fn mark_sentence_found(&mut self, position: TourPosition, sentence: &str) -> Marked {
        insert_unique(
            self.sentences.entry(position).or_default(),
            normalize_submission(sentence),
        )
    }

    #[must_use]
    pub fn is_word_found(&self, position: TourPosition, word: &str) -> bool {
        self.found_words(position).iter().any(|found| found == word)
    }

    #[must_use]
    pub fn is_sentence_found(&self, position: TourPosition, sentence: &str) -> bool {
        let normalized = normalize_submission(sentence);
        self.found_sentences(position)
            .iter()
            .any(|found| *found == normalized)
    }

    #[must_use]
    pub fn found_words(&self, position: TourPosition) -> &[String] {
        self.words.get(&position).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn found_sentences(&self, position: TourPosition) -> &[String] {
        self.sentences.get(&position).map_or(&[], Vec::as_slice)
    }

    /// Union of found words across all positions, without duplicates, in
    /// position then discovery order. Feeds the sentence builder palette.
    #[must_use]
    pub fn all_found_words(&self) -> Vec<String> {
        let mut all: Vec<String> = Vec::new();
        for word in self.words.values().flatten() {
            if !all.contains(word) {
                all.push(word.clone());
            }
        }
        all
    }

    #[must_use]
    pub fn total_found_words(&self) -> usize {
        self.words.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn total_found_sentences(&self) -> usize {
        self.sentences.values().map(Vec::len).sum()
    }

    /// True once every canonical word and sentence of the tour was found.
    ///
    /// Returns false when `position` is not in `tours`.
    #[must_use]
    pub fn is_position_complete(&self, tours: &TourList, position: TourPosition) -> bool {
        let Some(tour) = tours.get(position) else {
            return false;
        };
        self.found_words(position).len() >= tour.words().len()
            && self.found_sentences(position).len() >= tour.sentences().len()
    }
}

fn insert_unique(found: &mut Vec<String>, value: String) -> Marked {
    if found.contains(&value) {
        return Marked::AlreadyFound;
    }
    found.push(value);
    Marked::Added
}
