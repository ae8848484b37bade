//! Word analysis for moderators: which tour a piece of text belongs to and
//! whether the words of a sentence are already taught by then.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{TourList, TourPosition};
use crate::normalize::normalize_word;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// The text starts with the detected tour's letter.
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedTour {
    pub position: TourPosition,
    pub letter: char,
    pub confidence: Confidence,
}

/// Guess the tour a text belongs to: the latest tour whose letter occurs in
/// it. Blank text, or text with none of the tour letters, gives `None`.
#[must_use]
pub fn detect_tour(tours: &TourList, text: &str) -> Option<DetectedTour> {
    let content = text.trim();
    if content.is_empty() {
        return None;
    }
    let tour = tours
        .iter()
        .rev()
        .find(|tour| content.contains(tour.letter()))?;
    let confidence = if content.starts_with(tour.letter()) {
        Confidence::High
    } else {
        Confidence::Medium
    };
    Some(DetectedTour {
        position: tour.position(),
        letter: tour.letter(),
        confidence,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedWord {
    /// First spelling seen, as stored in the tour.
    pub original: String,
    pub tours: BTreeSet<TourPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAnalysis {
    pub word: String,
    pub original: String,
    /// Tours whose vocabulary already contains this word.
    pub exists_in: Vec<TourPosition>,
    pub estimated: Option<DetectedTour>,
}

/// Status of one word of a sentence relative to a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordStatus {
    /// In the vocabulary of the tour being edited.
    Current,
    /// Taught by an earlier tour.
    Previous { position: TourPosition, letter: char },
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedWord {
    pub word: String,
    pub status: WordStatus,
    /// For invalid words, the tour the word would most likely belong to.
    pub suggested: Option<DetectedTour>,
}

/// Every tour word, keyed by its normalized form.
#[derive(Debug, Clone)]
pub struct WordIndex<'a> {
    tours: &'a TourList,
    words: BTreeMap<String, IndexedWord>,
}

impl<'a> WordIndex<'a> {
    #[must_use]
    pub fn new(tours: &'a TourList) -> Self {
        let mut words: BTreeMap<String, IndexedWord> = BTreeMap::new();
        for tour in tours {
            for word in tour.words() {
                let normalized = normalize_word(word);
                if normalized.is_empty() {
                    continue;
                }
                words
                    .entry(normalized)
                    .or_insert_with(|| IndexedWord {
                        original: word.clone(),
                        tours: BTreeSet::new(),
                    })
                    .tours
                    .insert(tour.position());
            }
        }
        Self { tours, words }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn lookup(&self, word: &str) -> Option<&IndexedWord> {
        self.words.get(&normalize_word(word))
    }

    /// Analyze one word. Returns `None` when nothing is left after
    /// normalization.
    #[must_use]
    pub fn analyze_word(&self, word: &str) -> Option<WordAnalysis> {
        let normalized = normalize_word(word);
        if normalized.is_empty() {
            return None;
        }
        let exists_in = self
            .words
            .get(&normalized)
            .map(|entry| entry.tours.iter().copied().collect())
            .unwrap_or_default();
        Some(WordAnalysis {
            estimated: detect_tour(self.tours, &normalized),
            word: normalized,
            original: word.to_string(),
            exists_in,
        })
    }

    /// Analyze each whitespace-separated word of `sentence`.
    #[must_use]
    pub fn analyze_sentence(&self, sentence: &str) -> Vec<WordAnalysis> {
        sentence
            .split_whitespace()
            .filter_map(|word| self.analyze_word(word))
            .collect()
    }

    /// Classify each word of `sentence` against the tour at `current`.
    ///
    /// A word of the current tour is `Current`, one from an earlier tour is
    /// `Previous` (the earliest such tour), anything else is `Invalid`.
    #[must_use]
    pub fn classify_sentence(&self, current: TourPosition, sentence: &str) -> Vec<ClassifiedWord> {
        sentence
            .split_whitespace()
            .filter_map(|raw| {
                let word = normalize_word(raw);
                if word.is_empty() {
                    return None;
                }
                let tours = self.words.get(&word).map(|entry| &entry.tours);
                let status = if tours.is_some_and(|set| set.contains(&current)) {
                    WordStatus::Current
                } else if let Some(earlier) = tours
                    .and_then(|set| set.iter().copied().find(|position| *position < current))
                {
                    WordStatus::Previous {
                        position: earlier,
                        letter: self.tours.get(earlier).map_or(' ', |tour| tour.letter()),
                    }
                } else {
                    WordStatus::Invalid
                };
                let suggested = match status {
                    WordStatus::Invalid => detect_tour(self.tours, &word),
                    _ => None,
                };
                Some(ClassifiedWord {
                    word,
                    status,
                    suggested,
                })
            })
            .collect()
    }
}
