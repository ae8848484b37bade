use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::TourPosition;
use crate::model::tour::{Proverb, Sentence, Tour, TourList};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentError {
    #[error("content cannot be empty")]
    EmptyContent,

    #[error("tour {0} does not exist")]
    UnknownTour(TourPosition),

    #[error("{kind} #{index} does not exist in tour {position}")]
    UnknownIndex {
        kind: ContentKind,
        position: TourPosition,
        index: usize,
    },
}

//
// ─── KINDS & ACTIONS ───────────────────────────────────────────────────────────
//

/// The four kinds of tour content a moderator can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentKind {
    Word,
    Sentence,
    Proverb,
    Reading,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Word,
        ContentKind::Sentence,
        ContentKind::Proverb,
        ContentKind::Reading,
    ];

    /// Path segment of the moderator endpoints.
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            ContentKind::Word => "word",
            ContentKind::Sentence => "sentence",
            ContentKind::Proverb => "proverb",
            ContentKind::Reading => "reading",
        }
    }

    /// Plural name used for item ids and tabs.
    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            ContentKind::Word => "words",
            ContentKind::Sentence => "sentences",
            ContentKind::Proverb => "proverbs",
            ContentKind::Reading => "reading",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentAction {
    Add,
    Update,
    Delete,
}

impl ContentAction {
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            ContentAction::Add => "add",
            ContentAction::Update => "update",
            ContentAction::Delete => "delete",
        }
    }
}

//
// ─── CHANGES ───────────────────────────────────────────────────────────────────
//

/// A content edit requested by a moderator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentChange {
    Add {
        kind: ContentKind,
        position: TourPosition,
        content: String,
    },
    Update {
        kind: ContentKind,
        position: TourPosition,
        index: usize,
        content: String,
    },
    Delete {
        kind: ContentKind,
        position: TourPosition,
        index: usize,
    },
}

impl ContentChange {
    #[must_use]
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentChange::Add { kind, .. }
            | ContentChange::Update { kind, .. }
            | ContentChange::Delete { kind, .. } => *kind,
        }
    }

    #[must_use]
    pub fn action(&self) -> ContentAction {
        match self {
            ContentChange::Add { .. } => ContentAction::Add,
            ContentChange::Update { .. } => ContentAction::Update,
            ContentChange::Delete { .. } => ContentAction::Delete,
        }
    }

    #[must_use]
    pub fn position(&self) -> TourPosition {
        match self {
            ContentChange::Add { position, .. }
            | ContentChange::Update { position, .. }
            | ContentChange::Delete { position, .. } => *position,
        }
    }

    /// Build the request body, stamping the audit fields for this action.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::EmptyContent` for add/update with blank text.
    pub fn to_request(
        &self,
        table_name: &str,
        username: &str,
        at: DateTime<Utc>,
    ) -> Result<ContentRequest, ContentError> {
        let mut request = ContentRequest {
            position: self.position().value(),
            content: None,
            array_index: None,
            table_name: table_name.to_string(),
            added_by: None,
            added_at: None,
            edited_by: None,
            edited_at: None,
            deleted_by: None,
            deleted_at: None,
        };
        let stamp = at.to_rfc3339();
        match self {
            ContentChange::Add { content, .. } => {
                request.content = Some(non_empty(content)?);
                request.added_by = Some(username.to_string());
                request.added_at = Some(stamp);
            }
            ContentChange::Update { index, content, .. } => {
                request.content = Some(non_empty(content)?);
                request.array_index = Some(*index);
                request.edited_by = Some(username.to_string());
                request.edited_at = Some(stamp);
            }
            ContentChange::Delete { index, .. } => {
                request.array_index = Some(*index);
                request.deleted_by = Some(username.to_string());
                request.deleted_at = Some(stamp);
            }
        }
        Ok(request)
    }
}

fn non_empty(content: &str) -> Result<String, ContentError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ContentError::EmptyContent);
    }
    Ok(trimmed.to_string())
}

/// JSON body of `PATCH /moderator/dedaena/{table}/{kind}/{action}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRequest {
    pub position: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "arrayIndex", skip_serializing_if = "Option::is_none")]
    pub array_index: Option<usize>,
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

/// What a locally applied change replaced, enough to undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedChange {
    Added {
        kind: ContentKind,
        position: TourPosition,
        index: usize,
    },
    Updated {
        kind: ContentKind,
        position: TourPosition,
        index: usize,
        previous: String,
    },
    Deleted {
        kind: ContentKind,
        position: TourPosition,
        index: usize,
        previous: String,
    },
}

//
// ─── APPLYING CHANGES TO A TOUR LIST ───────────────────────────────────────────
//

impl TourList {
    /// Apply a moderator change locally.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the tour or entry does not exist or the
    /// content is blank.
    pub fn apply_change(&mut self, change: &ContentChange) -> Result<AppliedChange, ContentError> {
        let position = change.position();
        let kind = change.kind();
        let tour = self
            .get_mut(position)
            .ok_or(ContentError::UnknownTour(position))?;

        match change {
            ContentChange::Add { content, .. } => {
                let content = non_empty(content)?;
                let index = entry_count(tour, kind);
                insert_entry(tour, kind, index, content);
                Ok(AppliedChange::Added {
                    kind,
                    position,
                    index,
                })
            }
            ContentChange::Update { index, content, .. } => {
                let content = non_empty(content)?;
                let previous = replace_entry(tour, kind, *index, content).ok_or(
                    ContentError::UnknownIndex {
                        kind,
                        position,
                        index: *index,
                    },
                )?;
                Ok(AppliedChange::Updated {
                    kind,
                    position,
                    index: *index,
                    previous,
                })
            }
            ContentChange::Delete { index, .. } => {
                let previous =
                    remove_entry(tour, kind, *index).ok_or(ContentError::UnknownIndex {
                        kind,
                        position,
                        index: *index,
                    })?;
                Ok(AppliedChange::Deleted {
                    kind,
                    position,
                    index: *index,
                    previous,
                })
            }
        }
    }

    /// Undo a change previously returned by [`TourList::apply_change`].
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the list changed shape in between.
    pub fn revert_change(&mut self, applied: AppliedChange) -> Result<(), ContentError> {
        match applied {
            AppliedChange::Added {
                kind,
                position,
                index,
            } => {
                let tour = self
                    .get_mut(position)
                    .ok_or(ContentError::UnknownTour(position))?;
                remove_entry(tour, kind, index).ok_or(ContentError::UnknownIndex {
                    kind,
                    position,
                    index,
                })?;
            }
            AppliedChange::Updated {
                kind,
                position,
                index,
                previous,
            } => {
                let tour = self
                    .get_mut(position)
                    .ok_or(ContentError::UnknownTour(position))?;
                replace_entry(tour, kind, index, previous).ok_or(ContentError::UnknownIndex {
                    kind,
                    position,
                    index,
                })?;
            }
            AppliedChange::Deleted {
                kind,
                position,
                index,
                previous,
            } => {
                let tour = self
                    .get_mut(position)
                    .ok_or(ContentError::UnknownTour(position))?;
                if index > entry_count(tour, kind) {
                    return Err(ContentError::UnknownIndex {
                        kind,
                        position,
                        index,
                    });
                }
                insert_entry(tour, kind, index, previous);
            }
        }
        Ok(())
    }
}

/// Text of every entry of `kind` in a tour.
#[must_use]
pub fn entries(tour: &Tour, kind: ContentKind) -> Vec<&str> {
    match kind {
        ContentKind::Word => tour.words().iter().map(String::as_str).collect(),
        ContentKind::Sentence => tour.sentences().iter().map(Sentence::text).collect(),
        ContentKind::Proverb => tour.proverbs().iter().map(Proverb::text).collect(),
        ContentKind::Reading => tour.reading().iter().map(String::as_str).collect(),
    }
}

fn entry_count(tour: &Tour, kind: ContentKind) -> usize {
    match kind {
        ContentKind::Word => tour.words().len(),
        ContentKind::Sentence => tour.sentences().len(),
        ContentKind::Proverb => tour.proverbs().len(),
        ContentKind::Reading => tour.reading().len(),
    }
}

fn insert_entry(tour: &mut Tour, kind: ContentKind, index: usize, content: String) {
    match kind {
        ContentKind::Word => tour.words_mut().insert(index, content),
        ContentKind::Sentence => tour.sentences_mut().insert(index, Sentence::new(content)),
        ContentKind::Proverb => tour.proverbs_mut().insert(index, Proverb::new(content)),
        ContentKind::Reading => tour.reading_mut().insert(index, content),
    }
}

fn replace_entry(tour: &mut Tour, kind: ContentKind, index: usize, content: String) -> Option<String> {
    match kind {
        ContentKind::Word => tour
            .words_mut()
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, content)),
        ContentKind::Sentence => tour
            .sentences_mut()
            .get_mut(index)
            .map(|slot| std::mem::replace(&mut slot.sentence, content)),
        ContentKind::Proverb => tour
            .proverbs_mut()
            .get_mut(index)
            .map(|slot| std::mem::replace(&mut slot.proverb, content)),
        ContentKind::Reading => tour
            .reading_mut()
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, content)),
    }
}

fn remove_entry(tour: &mut Tour, kind: ContentKind, index: usize) -> Option<String> {
    if index >= entry_count(tour, kind) {
        return None;
    }
    Some(match kind {
        ContentKind::Word => tour.words_mut().remove(index),
        ContentKind::Sentence => tour.sentences_mut().remove(index).sentence,
        ContentKind::Proverb => tour.proverbs_mut().remove(index).proverb,
        ContentKind::Reading => tour.reading_mut().remove(index),
    })
}

//
// ─── FLATTENED ITEMS ───────────────────────────────────────────────────────────
//

/// One editable entry of the moderator table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    /// `{position}-{kind}-{index}`, stable until the list is edited.
    pub id: String,
    pub kind: ContentKind,
    pub content: String,
    pub index: usize,
    pub position: TourPosition,
    pub letter: char,
}

/// Flatten every entry of every tour into moderator items.
#[must_use]
pub fn flatten(tours: &TourList) -> Vec<ContentItem> {
    let mut items = Vec::new();
    for tour in tours {
        for kind in ContentKind::ALL {
            for (index, content) in entries(tour, kind).into_iter().enumerate() {
                items.push(ContentItem {
                    id: format!("{}-{}-{index}", tour.position(), kind.plural()),
                    kind,
                    content: content.to_string(),
                    index,
                    position: tour.position(),
                    letter: tour.letter(),
                });
            }
        }
    }
    items
}

/// Tab, tour and search filter of the moderator table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFilter {
    pub kind: ContentKind,
    pub tour: Option<TourPosition>,
    pub search: String,
}

impl ContentFilter {
    #[must_use]
    pub fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            tour: None,
            search: String::new(),
        }
    }

    #[must_use]
    pub fn matches(&self, item: &ContentItem) -> bool {
        let needle = self.search.to_lowercase();
        item.kind == self.kind
            && self.tour.is_none_or(|tour| tour == item.position)
            && (needle.is_empty() || item.content.to_lowercase().contains(&needle))
    }
}

/// Entry totals per kind across all tours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentCounts {
    pub words: usize,
    pub sentences: usize,
    pub proverbs: usize,
    pub reading: usize,
}

impl ContentCounts {
    #[must_use]
    pub fn from_items(items: &[ContentItem]) -> Self {
        let mut counts = Self::default();
        for item in items {
            match item.kind {
                ContentKind::Word => counts.words += 1,
                ContentKind::Sentence => counts.sentences += 1,
                ContentKind::Proverb => counts.proverbs += 1,
                ContentKind::Reading => counts.reading += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn pos(value: u32) -> TourPosition {
        TourPosition::new(value).unwrap()
    }

    fn tours() -> TourList {
        TourList::new(vec![
            Tour::new(pos(1), 'ა')
                .with_words(["ია", "აი"])
                .with_sentences(["ია აია."]),
            Tour::new(pos(2), 'ბ').with_words(["ბაბა"]).with_proverbs(["ბ ანდაზა"]),
        ])
        .unwrap()
    }

    #[test]
    fn update_then_revert_restores_previous() {
        let mut list = tours();
        let change = ContentChange::Update {
            kind: ContentKind::Word,
            position: pos(1),
            index: 1,
            content: " აია ".to_string(),
        };
        let applied = list.apply_change(&change).unwrap();
        assert_eq!(list.get(pos(1)).unwrap().words()[1], "აია");

        list.revert_change(applied).unwrap();
        assert_eq!(list, tours());
    }

    #[test]
    fn delete_then_revert_reinserts_at_index() {
        let mut list = tours();
        let applied = list
            .apply_change(&ContentChange::Delete {
                kind: ContentKind::Word,
                position: pos(1),
                index: 0,
            })
            .unwrap();
        assert_eq!(list.get(pos(1)).unwrap().words(), ["აი"]);
        list.revert_change(applied).unwrap();
        assert_eq!(list, tours());
    }

    #[test]
    fn add_rejects_blank_and_unknown_tour() {
        let mut list = tours();
        let blank = ContentChange::Add {
            kind: ContentKind::Sentence,
            position: pos(1),
            content: "   ".to_string(),
        };
        assert_eq!(list.apply_change(&blank), Err(ContentError::EmptyContent));

        let missing = ContentChange::Add {
            kind: ContentKind::Sentence,
            position: pos(9),
            content: "x".to_string(),
        };
        assert_eq!(
            list.apply_change(&missing),
            Err(ContentError::UnknownTour(pos(9)))
        );
    }

    #[test]
    fn request_carries_audit_fields_for_action() {
        let change = ContentChange::Delete {
            kind: ContentKind::Proverb,
            position: pos(2),
            index: 0,
        };
        let request = change.to_request("gogebashvili_1", "nino", fixed_now()).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["arrayIndex"], 0);
        assert_eq!(json["deleted_by"], "nino");
        assert!(json.get("added_by").is_none());
        assert!(json.get("content").is_none());
    }

    #[test]
    fn flatten_and_filter_items() {
        let items = flatten(&tours());
        let counts = ContentCounts::from_items(&items);
        assert_eq!(counts.words, 3);
        assert_eq!(counts.sentences, 1);
        assert_eq!(counts.proverbs, 1);
        assert_eq!(items[0].id, "1-words-0");

        let mut filter = ContentFilter::new(ContentKind::Word);
        filter.tour = Some(pos(2));
        let matched: Vec<_> = items.iter().filter(|i| filter.matches(i)).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].content, "ბაბა");
    }
}
