//! The game store: one value holding everything a play session mutates.
//!
//! Every user action is a method on [`GameState`] that returns what happened.
//! Nothing here does I/O, so a whole session can be driven from tests.

use thiserror::Error;

use crate::charges::LetterCharges;
use crate::model::{Tour, TourList, TourPosition};
use crate::progress::{Marked, TourProgress};
use crate::progression::{AdvanceOutcome, Progression, ProgressionError, TourButtonState};
use crate::validate::{ValidationResult, judge_sentence, judge_word};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RevealError {
    #[error("not every letter has a charge yet")]
    NotCharged,

    #[error("tour {0} has no proverb to reveal")]
    NoArtifact(TourPosition),
}

/// When the sentence buffer is cleared after a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputClearPolicy {
    /// Clear after every non-empty check, whatever the outcome.
    #[default]
    Always,
    /// Clear only after a correct sentence; keep the text for another try.
    OnSuccess,
}

/// Found versus canonical count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub found: usize,
    pub total: usize,
}

impl Tally {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.found >= self.total
    }
}

/// Per-tour numbers for the tour picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourStats {
    pub position: TourPosition,
    pub letter: char,
    pub words: Tally,
    pub sentences: Tally,
    pub complete: bool,
    pub state: TourButtonState,
}

/// Session-wide numbers for the stats panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStats {
    pub position: TourPosition,
    pub total_positions: usize,
    pub total_found_words: usize,
    pub total_found_sentences: usize,
    /// Current position over tour count, rounded.
    pub progress_percent: u32,
    pub current_words: Tally,
    pub current_sentences: Tally,
    pub has_next: bool,
}

#[derive(Debug, Clone)]
pub struct GameState {
    tours: TourList,
    progression: Progression,
    progress: TourProgress,
    charges: LetterCharges,
    selection: Vec<char>,
    sentence: String,
    proverb_index: usize,
    clear_policy: InputClearPolicy,
    generation: u64,
}

impl GameState {
    /// Start a session at `position` with empty progress.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::UnknownPosition` when `position` is not one
    /// of `tours`.
    pub fn new(tours: TourList, position: TourPosition) -> Result<Self, ProgressionError> {
        let progression = Progression::start(&tours, position)?;
        let charges = LetterCharges::seeded(&tours, position);
        Ok(Self {
            tours,
            progression,
            progress: TourProgress::new(),
            charges,
            selection: Vec::new(),
            sentence: String::new(),
            proverb_index: 0,
            clear_policy: InputClearPolicy::default(),
            generation: 0,
        })
    }

    #[must_use]
    pub fn with_clear_policy(mut self, policy: InputClearPolicy) -> Self {
        self.clear_policy = policy;
        self
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn tours(&self) -> &TourList {
        &self.tours
    }

    #[must_use]
    pub fn position(&self) -> TourPosition {
        self.progression.current()
    }

    /// The tour being played. Always present: the position is validated on
    /// every move.
    #[must_use]
    pub fn current_tour(&self) -> Option<&Tour> {
        self.tours.get(self.position())
    }

    #[must_use]
    pub fn progress(&self) -> &TourProgress {
        &self.progress
    }

    #[must_use]
    pub fn charges(&self) -> &LetterCharges {
        &self.charges
    }

    #[must_use]
    pub fn selection(&self) -> &[char] {
        &self.selection
    }

    #[must_use]
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    #[must_use]
    pub fn clear_policy(&self) -> InputClearPolicy {
        self.clear_policy
    }

    /// Bumped on every position change. Async loads started under an older
    /// generation must be discarded.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_current_generation(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Letters available on the palette: those of every tour up to and
    /// including the current one.
    #[must_use]
    pub fn palette(&self) -> Vec<char> {
        self.tours
            .iter()
            .take_while(|tour| tour.position() <= self.position())
            .map(Tour::letter)
            .collect()
    }

    /// Words found anywhere so far, for the sentence builder.
    #[must_use]
    pub fn word_palette(&self) -> Vec<String> {
        self.progress.all_found_words()
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Jump to any loaded tour.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::UnknownPosition` for a position that is not
    /// loaded; the state is unchanged in that case.
    pub fn go_to(&mut self, position: TourPosition) -> Result<(), ProgressionError> {
        self.progression.go_to(&self.tours, position)?;
        self.on_position_changed();
        Ok(())
    }

    /// Move to the next tour if there is one.
    pub fn advance(&mut self) -> AdvanceOutcome {
        let outcome = self.progression.advance(&self.tours);
        if let AdvanceOutcome::Moved(_) = outcome {
            self.on_position_changed();
        }
        outcome
    }

    fn on_position_changed(&mut self) {
        self.selection.clear();
        self.sentence.clear();
        self.proverb_index = 0;
        self.charges.reseed(&self.tours, self.position());
        self.generation = self.generation.wrapping_add(1);
    }

    //
    // ─── WORD BUILDER ──────────────────────────────────────────────────────────
    //

    pub fn select_letter(&mut self, letter: char) {
        self.selection.push(letter);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Check the selected letters as a word. The selection is always cleared.
    pub fn check_word(&mut self) -> ValidationResult {
        let word: String = self.selection.drain(..).collect();
        let position = self.position();
        let Some(tour) = self.tours.get(position) else {
            return ValidationResult::Incorrect;
        };

        let result = judge_word(tour, &self.progress, &word);
        if let ValidationResult::Correct { matched } = &result {
            self.progress.mark_word_found(position, matched);
        }
        result
    }

    //
    // ─── SENTENCE BUILDER ──────────────────────────────────────────────────────
    //

    /// Append a word, separated from previous text by one space.
    pub fn push_word(&mut self, word: &str) {
        if !self.sentence.is_empty() {
            self.sentence.push(' ');
        }
        self.sentence.push_str(word);
    }

    /// Append a letter or punctuation mark with no separator.
    pub fn push_char(&mut self, ch: char) {
        self.sentence.push(ch);
    }

    pub fn pop_char(&mut self) -> Option<char> {
        self.sentence.pop()
    }

    pub fn set_sentence(&mut self, text: impl Into<String>) {
        self.sentence = text.into();
    }

    pub fn clear_sentence(&mut self) {
        self.sentence.clear();
    }

    /// Check the sentence buffer against the current tour.
    ///
    /// Empty input changes nothing. A correct sentence is recorded, charges
    /// the letters it contains and clears the buffer; other outcomes clear it
    /// according to the [`InputClearPolicy`].
    pub fn check_sentence(&mut self) -> ValidationResult {
        let position = self.position();
        let Some(tour) = self.tours.get(position) else {
            return ValidationResult::Incorrect;
        };

        let result = judge_sentence(tour, &self.progress, &self.sentence);
        match &result {
            ValidationResult::EmptyInput => {}
            ValidationResult::Correct { matched } => {
                if self.progress.mark_sentence_found(position, matched) == Marked::Added {
                    self.charges.record_sentence(matched);
                }
                self.sentence.clear();
            }
            ValidationResult::AlreadyFound | ValidationResult::Incorrect => {
                if self.clear_policy == InputClearPolicy::Always {
                    self.sentence.clear();
                }
            }
        }
        result
    }

    /// Replace the buffer with `text` and check it.
    pub fn submit_sentence(&mut self, text: &str) -> ValidationResult {
        self.set_sentence(text);
        self.check_sentence()
    }

    //
    // ─── ARTIFACT ──────────────────────────────────────────────────────────────
    //

    /// The proverb the next reveal would show, if any.
    #[must_use]
    pub fn current_proverb(&self) -> Option<&str> {
        let proverbs = self.current_tour()?.proverbs();
        proverbs
            .get(self.proverb_index % proverbs.len().max(1))
            .map(|proverb| proverb.text())
    }

    #[must_use]
    pub fn can_reveal(&self) -> bool {
        self.charges.all_charged() && self.current_proverb().is_some()
    }

    /// Reveal the current tour's proverb, spending one charge per letter and
    /// moving on to the tour's next proverb.
    ///
    /// # Errors
    ///
    /// `RevealError::NotCharged` until every tracked letter has a charge,
    /// `RevealError::NoArtifact` when the tour has no proverb.
    pub fn reveal_artifact(&mut self) -> Result<String, RevealError> {
        if !self.charges.all_charged() {
            return Err(RevealError::NotCharged);
        }
        let proverb = self
            .current_proverb()
            .map(str::to_string)
            .ok_or(RevealError::NoArtifact(self.position()))?;

        self.charges.spend();
        let count = self.current_tour().map_or(1, |tour| tour.proverbs().len().max(1));
        self.proverb_index = (self.proverb_index + 1) % count;
        Ok(proverb)
    }

    //
    // ─── STATISTICS ────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn is_position_complete(&self, position: TourPosition) -> bool {
        self.progress.is_position_complete(&self.tours, position)
    }

    #[must_use]
    pub fn is_current_complete(&self) -> bool {
        self.is_position_complete(self.position())
    }

    #[must_use]
    pub fn tour_stats(&self) -> Vec<TourStats> {
        self.tours
            .iter()
            .map(|tour| {
                let position = tour.position();
                TourStats {
                    position,
                    letter: tour.letter(),
                    words: Tally {
                        found: self.progress.found_words(position).len(),
                        total: tour.words().len(),
                    },
                    sentences: Tally {
                        found: self.progress.found_sentences(position).len(),
                        total: tour.sentences().len(),
                    },
                    complete: self.is_position_complete(position),
                    state: self.progression.button_state(position),
                }
            })
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> GameStats {
        let position = self.position();
        let (current_words, current_sentences) = self
            .current_tour()
            .map(|tour| {
                (
                    Tally {
                        found: self.progress.found_words(position).len(),
                        total: tour.words().len(),
                    },
                    Tally {
                        found: self.progress.found_sentences(position).len(),
                        total: tour.sentences().len(),
                    },
                )
            })
            .unwrap_or_default();

        GameStats {
            position,
            total_positions: self.tours.len(),
            total_found_words: self.progress.total_found_words(),
            total_found_sentences: self.progress.total_found_sentences(),
            progress_percent: percent(position.value(), self.tours.len()),
            current_words,
            current_sentences,
            has_next: self.progression.has_next(&self.tours),
        }
    }
}

fn percent(part: u32, whole: usize) -> u32 {
    let Ok(whole) = u32::try_from(whole) else {
        return 0;
    };
    if whole == 0 {
        return 0;
    }
    (part.min(whole) * 100 + whole / 2) / whole
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(value: u32) -> TourPosition {
        TourPosition::new(value).unwrap()
    }

    /// Three tours, one sentence each, like the primer's opening pages.
    fn tours() -> TourList {
        TourList::new(vec![
            Tour::new(pos(1), 'ა')
                .with_words(["ა-ი", "ია"])
                .with_sentences(["ა"]),
            Tour::new(pos(2), 'ბ')
                .with_words(["ბაბა"])
                .with_sentences(["ბაბა."])
                .with_proverbs(["პირველი ანდაზა", "მეორე ანდაზა"]),
            Tour::new(pos(3), 'გ').with_sentences(["გაბა"]),
        ])
        .unwrap()
    }

    fn game_at(position: u32) -> GameState {
        GameState::new(tours(), pos(position)).unwrap()
    }

    #[test]
    fn correct_then_already_found_without_growing_the_set() {
        let mut game = game_at(1);
        assert!(game.submit_sentence("ა").is_correct());
        assert_eq!(game.submit_sentence("ა"), ValidationResult::AlreadyFound);
        assert_eq!(game.progress().found_sentences(pos(1)).len(), 1);
    }

    #[test]
    fn normalized_variants_count_once() {
        let mut game = GameState::new(
            TourList::new(vec![Tour::new(pos(1), 'ა').with_sentences(["Hello"])]).unwrap(),
            pos(1),
        )
        .unwrap();
        assert!(game.submit_sentence("  Hello  ").is_correct());
        assert_eq!(game.submit_sentence("hello"), ValidationResult::AlreadyFound);
        assert!(game.is_current_complete());
    }

    #[test]
    fn empty_submission_mutates_nothing() {
        let mut game = game_at(2);
        let before = game.clone();
        assert_eq!(game.check_sentence(), ValidationResult::EmptyInput);
        assert_eq!(game.progress(), before.progress());
        assert_eq!(game.charges(), before.charges());
    }

    #[test]
    fn charging_from_an_earlier_tour_sentence() {
        let mut game = game_at(2);
        assert_eq!(game.charges().iter().collect::<Vec<_>>(), vec![('ა', 0)]);
        assert!(!game.charges().all_charged());

        // Tour 1's sentence found while tour 1 is active carries back to tour 2.
        game.go_to(pos(1)).unwrap();
        assert!(game.charges().is_empty());
        assert!(game.submit_sentence("ა").is_correct());
        game.go_to(pos(2)).unwrap();

        assert_eq!(game.charges().iter().collect::<Vec<_>>(), vec![('ა', 1)]);
        assert!(game.charges().all_charged());
        assert!(game.can_reveal());
    }

    #[test]
    fn current_tour_letters_count_until_the_next_move() {
        let mut game = game_at(2);
        assert!(game.submit_sentence("ბაბა.").is_correct());
        assert_eq!(game.charges().get('ა'), Some(2));
        assert_eq!(game.charges().get('ბ'), Some(2));

        game.go_to(pos(2)).unwrap();
        assert_eq!(game.charges().iter().collect::<Vec<_>>(), vec![('ა', 2)]);
    }

    #[test]
    fn reveal_spends_and_rotates_proverbs() {
        let mut game = game_at(2);
        assert_eq!(game.reveal_artifact(), Err(RevealError::NotCharged));

        game.submit_sentence("ბაბა.");
        assert!(game.can_reveal());
        assert_eq!(game.reveal_artifact().unwrap(), "პირველი ანდაზა");
        assert_eq!(game.charges().get('ა'), Some(1));
        assert_eq!(game.reveal_artifact().unwrap(), "მეორე ანდაზა");
        assert_eq!(game.charges().get('ა'), Some(0));
        assert_eq!(game.charges().get('ბ'), Some(0));
        assert_eq!(game.reveal_artifact(), Err(RevealError::NotCharged));
        assert_eq!(game.current_proverb(), Some("პირველი ანდაზა"));
    }

    #[test]
    fn reveal_without_proverb_is_no_artifact() {
        let mut game = game_at(3);
        game.submit_sentence("გაბა");
        assert!(game.charges().all_charged());
        assert!(!game.can_reveal());
        assert_eq!(game.reveal_artifact(), Err(RevealError::NoArtifact(pos(3))));
        assert_eq!(game.charges().get('ა'), Some(2));
        assert_eq!(game.charges().get('გ'), Some(1));
    }

    #[test]
    fn clear_policy_controls_buffer_after_failure() {
        let mut always = game_at(1);
        always.set_sentence("არა");
        assert_eq!(always.check_sentence(), ValidationResult::Incorrect);
        assert_eq!(always.sentence(), "");

        let mut on_success = game_at(1).with_clear_policy(InputClearPolicy::OnSuccess);
        on_success.set_sentence("არა");
        assert_eq!(on_success.check_sentence(), ValidationResult::Incorrect);
        assert_eq!(on_success.sentence(), "არა");
        on_success.set_sentence("ა");
        assert!(on_success.check_sentence().is_correct());
        assert_eq!(on_success.sentence(), "");
    }

    #[test]
    fn sentence_buffer_editing() {
        let mut game = game_at(1);
        game.push_word("ია");
        game.push_word("აი");
        game.push_char('.');
        assert_eq!(game.sentence(), "ია აი.");
        assert_eq!(game.pop_char(), Some('.'));
        game.clear_sentence();
        assert_eq!(game.pop_char(), None);
    }

    #[test]
    fn word_builder_checks_and_always_clears() {
        let mut game = game_at(1);
        assert_eq!(game.check_word(), ValidationResult::EmptyInput);

        game.select_letter('ა');
        game.select_letter('ი');
        assert!(game.check_word().is_correct());
        assert!(game.selection().is_empty());

        game.select_letter('ა');
        game.select_letter('ი');
        assert_eq!(game.check_word(), ValidationResult::AlreadyFound);

        game.select_letter('ი');
        assert_eq!(game.check_word(), ValidationResult::Incorrect);
        assert!(game.selection().is_empty());
        assert_eq!(game.word_palette(), vec!["აი"]);
    }

    #[test]
    fn completion_tracks_words_and_sentences() {
        let mut game = game_at(1);
        assert!(!game.is_current_complete());
        game.select_letter('ა');
        game.select_letter('ი');
        game.check_word();
        game.select_letter('ი');
        game.select_letter('ა');
        game.check_word();
        assert!(!game.is_current_complete());
        game.submit_sentence("ა");
        assert!(game.is_current_complete());
    }

    #[test]
    fn advance_at_last_tour_stays_put() {
        let mut game = game_at(3);
        let generation = game.generation();
        assert_eq!(game.advance(), AdvanceOutcome::NoMoreTours);
        assert_eq!(game.position(), pos(3));
        assert!(game.current_tour().is_some());
        assert!(game.is_current_generation(generation));
    }

    #[test]
    fn moving_resets_buffers_and_bumps_generation() {
        let mut game = game_at(1);
        game.select_letter('ა');
        game.set_sentence("ა");
        let generation = game.generation();

        assert_eq!(game.advance(), AdvanceOutcome::Moved(pos(2)));
        assert!(game.selection().is_empty());
        assert_eq!(game.sentence(), "");
        assert!(!game.is_current_generation(generation));
        assert_eq!(game.palette(), vec!['ა', 'ბ']);
    }

    #[test]
    fn go_to_unknown_position_is_rejected() {
        let mut game = game_at(1);
        assert_eq!(
            game.go_to(pos(4)),
            Err(ProgressionError::UnknownPosition(pos(4)))
        );
        assert_eq!(game.position(), pos(1));
    }

    #[test]
    fn stats_report_totals_and_button_states() {
        let mut game = game_at(2);
        game.submit_sentence("ბაბა.");
        let stats = game.stats();
        assert_eq!(stats.total_positions, 3);
        assert_eq!(stats.total_found_sentences, 1);
        assert_eq!(stats.progress_percent, 67);
        assert_eq!(stats.current_sentences, Tally { found: 1, total: 1 });
        assert!(stats.has_next);

        let states: Vec<_> = game.tour_stats().iter().map(|t| t.state).collect();
        assert_eq!(
            states,
            vec![
                TourButtonState::Before,
                TourButtonState::Active,
                TourButtonState::After
            ]
        );
    }
}
