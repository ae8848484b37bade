use serde::{Deserialize, Serialize};

use crate::model::ids::TourPosition;
use crate::model::tour::{Proverb, ReadingField, Sentence, Tour, TourError, parse_letter};

/// Detail of a single tour plus the alphabet unlocked up to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionDetail {
    pub position: TourPosition,
    /// Letters of every tour up to and including `position`.
    pub letters: Vec<char>,
    pub info: PositionInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionInfo {
    pub words: Vec<String>,
    pub sentences: Vec<Sentence>,
    pub proverbs: Vec<Proverb>,
    pub reading: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct PositionDetailRecord {
    position: u32,
    #[serde(default)]
    letters: Vec<String>,
    #[serde(default)]
    position_info: Option<PositionInfoRecord>,
}

#[derive(Deserialize, Default)]
struct PositionInfoRecord {
    #[serde(default)]
    words: Option<Vec<String>>,
    #[serde(default)]
    sentences: Option<Vec<Sentence>>,
    #[serde(default)]
    proverbs: Option<Vec<Proverb>>,
    #[serde(default)]
    reading: ReadingField,
}

impl TryFrom<PositionDetailRecord> for PositionDetail {
    type Error = TourError;

    fn try_from(record: PositionDetailRecord) -> Result<Self, Self::Error> {
        let position = TourPosition::new(record.position).ok_or(TourError::InvalidPosition)?;
        let letters = record
            .letters
            .iter()
            .map(|raw| parse_letter(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let info = record.position_info.unwrap_or_default();
        Ok(Self {
            position,
            letters,
            info: PositionInfo {
                words: info.words.unwrap_or_default(),
                sentences: info.sentences.unwrap_or_default(),
                proverbs: info.proverbs.unwrap_or_default(),
                reading: info.reading.into_passages(),
            },
        })
    }
}

impl<'de> Deserialize<'de> for PositionDetail {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let record = PositionDetailRecord::deserialize(deserializer)?;
        PositionDetail::try_from(record).map_err(serde::de::Error::custom)
    }
}

/// Per-tour summary used by table-of-contents views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourSummary {
    pub letter: String,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default)]
    pub sentence_count: u32,
    #[serde(default)]
    pub has_proverbs: bool,
    #[serde(default)]
    pub has_reading: bool,
}

impl TourSummary {
    /// Summary of an already loaded tour.
    #[must_use]
    pub fn from_tour(tour: &Tour) -> Self {
        let count = |len: usize| u32::try_from(len).unwrap_or(u32::MAX);
        Self {
            letter: tour.letter().to_string(),
            word_count: count(tour.words().len()),
            sentence_count: count(tour.sentences().len()),
            has_proverbs: !tour.proverbs().is_empty(),
            has_reading: !tour.reading().is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_position_payload() {
        let json = r#"{
            "position": 2,
            "letters": ["ა", "ბ"],
            "table": "gogebashvili_1",
            "position_info": {
                "words": ["ბაბა"],
                "sentences": ["ბაბა აბა."],
                "proverbs": [],
                "reading": "ბაბა"
            }
        }"#;
        let detail: PositionDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.position.value(), 2);
        assert_eq!(detail.letters, vec!['ა', 'ბ']);
        assert_eq!(detail.info.words, vec!["ბაბა".to_string()]);
        assert_eq!(detail.info.sentences[0].text(), "ბაბა აბა.");
        assert_eq!(detail.info.reading, vec!["ბაბა".to_string()]);
    }

    #[test]
    fn missing_position_info_is_empty() {
        let detail: PositionDetail =
            serde_json::from_str(r#"{"position": 1, "letters": ["ა"]}"#).unwrap();
        assert!(detail.info.words.is_empty());
        assert!(detail.info.sentences.is_empty());
    }

    #[test]
    fn summary_defaults_counts() {
        let summary: TourSummary = serde_json::from_str(r#"{"letter": "ა"}"#).unwrap();
        assert_eq!(summary.word_count, 0);
        assert!(!summary.has_reading);
    }
}
