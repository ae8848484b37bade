use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::TourPosition;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TourError {
    #[error("tour letter must be a single character, got {0:?}")]
    InvalidLetter(String),

    #[error("tour position must be >= 1")]
    InvalidPosition,

    #[error("tour list must start at position 1, found {found}")]
    DoesNotStartAtOne { found: TourPosition },

    #[error("tour positions are not contiguous: expected {expected}, found {found}")]
    Gap {
        expected: TourPosition,
        found: TourPosition,
    },
}

//
// ─── CONTENT ENTRIES ───────────────────────────────────────────────────────────
//

/// A canonical sentence of a tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SentenceEntry")]
pub struct Sentence {
    pub sentence: String,
}

impl Sentence {
    #[must_use]
    pub fn new(sentence: impl Into<String>) -> Self {
        Self {
            sentence: sentence.into(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.sentence
    }
}

/// A proverb revealed as the tour's artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProverbEntry")]
pub struct Proverb {
    pub proverb: String,
}

impl Proverb {
    #[must_use]
    pub fn new(proverb: impl Into<String>) -> Self {
        Self {
            proverb: proverb.into(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.proverb
    }
}

// The API returns either bare strings or `{ "sentence": ... }` records
// depending on the table revision.
#[derive(Deserialize)]
#[serde(untagged)]
enum SentenceEntry {
    Text(String),
    Record { sentence: String },
}

impl From<SentenceEntry> for Sentence {
    fn from(entry: SentenceEntry) -> Self {
        match entry {
            SentenceEntry::Text(sentence) | SentenceEntry::Record { sentence } => {
                Self { sentence }
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProverbEntry {
    Text(String),
    Record { proverb: String },
}

impl From<ProverbEntry> for Proverb {
    fn from(entry: ProverbEntry) -> Self {
        match entry {
            ProverbEntry::Text(proverb) | ProverbEntry::Record { proverb } => Self { proverb },
        }
    }
}

/// Reading material is stored either as one text or as a list of passages.
#[derive(Deserialize, Default)]
#[serde(untagged)]
pub(crate) enum ReadingField {
    #[default]
    Missing,
    One(String),
    Many(Vec<String>),
}

impl ReadingField {
    pub(crate) fn into_passages(self) -> Vec<String> {
        match self {
            ReadingField::Missing => Vec::new(),
            ReadingField::One(text) if text.trim().is_empty() => Vec::new(),
            ReadingField::One(text) => vec![text],
            ReadingField::Many(list) => list,
        }
    }
}

//
// ─── TOUR ──────────────────────────────────────────────────────────────────────
//

/// One lesson of the primer, built around a single letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TourRecord")]
pub struct Tour {
    position: TourPosition,
    letter: char,
    words: Vec<String>,
    sentences: Vec<Sentence>,
    proverbs: Vec<Proverb>,
    reading: Vec<String>,
}

/// Wire shape of a tour as served by the content API.
#[derive(Deserialize)]
struct TourRecord {
    position: u32,
    letter: String,
    #[serde(default)]
    words: Option<Vec<String>>,
    #[serde(default)]
    sentences: Option<Vec<Sentence>>,
    #[serde(default)]
    proverbs: Option<Vec<Proverb>>,
    #[serde(default)]
    reading: ReadingField,
}

impl TryFrom<TourRecord> for Tour {
    type Error = TourError;

    fn try_from(record: TourRecord) -> Result<Self, Self::Error> {
        let position = TourPosition::new(record.position).ok_or(TourError::InvalidPosition)?;
        let letter = parse_letter(&record.letter)?;
        Ok(Self {
            position,
            letter,
            words: record.words.unwrap_or_default(),
            sentences: record.sentences.unwrap_or_default(),
            proverbs: record.proverbs.unwrap_or_default(),
            reading: record.reading.into_passages(),
        })
    }
}

/// Parse a tour letter, which must be exactly one character after trimming.
///
/// # Errors
///
/// Returns `TourError::InvalidLetter` for empty or multi-character input.
pub fn parse_letter(raw: &str) -> Result<char, TourError> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => Ok(letter),
        _ => Err(TourError::InvalidLetter(raw.to_string())),
    }
}

impl Tour {
    #[must_use]
    pub fn new(position: TourPosition, letter: char) -> Self {
        Self {
            position,
            letter,
            words: Vec::new(),
            sentences: Vec::new(),
            proverbs: Vec::new(),
            reading: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words = words.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_sentences<I, S>(mut self, sentences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sentences = sentences.into_iter().map(Sentence::new).collect();
        self
    }

    #[must_use]
    pub fn with_proverbs<I, S>(mut self, proverbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.proverbs = proverbs.into_iter().map(Proverb::new).collect();
        self
    }

    #[must_use]
    pub fn with_reading<I, S>(mut self, reading: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reading = reading.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn position(&self) -> TourPosition {
        self.position
    }

    #[must_use]
    pub fn letter(&self) -> char {
        self.letter
    }

    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    #[must_use]
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    #[must_use]
    pub fn proverbs(&self) -> &[Proverb] {
        &self.proverbs
    }

    #[must_use]
    pub fn reading(&self) -> &[String] {
        &self.reading
    }

    pub(crate) fn words_mut(&mut self) -> &mut Vec<String> {
        &mut self.words
    }

    pub(crate) fn sentences_mut(&mut self) -> &mut Vec<Sentence> {
        &mut self.sentences
    }

    pub(crate) fn proverbs_mut(&mut self) -> &mut Vec<Proverb> {
        &mut self.proverbs
    }

    pub(crate) fn reading_mut(&mut self) -> &mut Vec<String> {
        &mut self.reading
    }
}

//
// ─── TOUR LIST ─────────────────────────────────────────────────────────────────
//

/// Ordered, contiguous list of tours for one content table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TourList {
    tours: Vec<Tour>,
}

impl TourList {
    /// Build a tour list, sorting by position and checking contiguity from 1.
    ///
    /// # Errors
    ///
    /// Returns `TourError::DoesNotStartAtOne` or `TourError::Gap` when the
    /// positions are not exactly `1..=n`.
    pub fn new(mut tours: Vec<Tour>) -> Result<Self, TourError> {
        tours.sort_by_key(Tour::position);
        for (index, tour) in tours.iter().enumerate() {
            let expected = TourPosition::from_index(index).ok_or(TourError::InvalidPosition)?;
            if tour.position() != expected {
                if index == 0 {
                    return Err(TourError::DoesNotStartAtOne {
                        found: tour.position(),
                    });
                }
                return Err(TourError::Gap {
                    expected,
                    found: tour.position(),
                });
            }
        }
        Ok(Self { tours })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tours.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: TourPosition) -> Option<&Tour> {
        self.tours.get(position.index())
    }

    pub(crate) fn get_mut(&mut self, position: TourPosition) -> Option<&mut Tour> {
        self.tours.get_mut(position.index())
    }

    #[must_use]
    pub fn contains(&self, position: TourPosition) -> bool {
        position.index() < self.tours.len()
    }

    #[must_use]
    pub fn last_position(&self) -> Option<TourPosition> {
        self.tours.last().map(Tour::position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tour> {
        self.tours.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Tour] {
        &self.tours
    }

    /// Letters of every tour strictly before `position`, in play order.
    pub fn letters_before(&self, position: TourPosition) -> impl Iterator<Item = char> + '_ {
        self.tours
            .iter()
            .take_while(move |tour| tour.position() < position)
            .map(Tour::letter)
    }
}

impl<'de> Deserialize<'de> for TourList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tours = Vec::<Tour>::deserialize(deserializer)?;
        TourList::new(tours).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a TourList {
    type Item = &'a Tour;
    type IntoIter = std::slice::Iter<'a, Tour>;

    fn into_iter(self) -> Self::IntoIter {
        self.tours.iter()
    }
}
