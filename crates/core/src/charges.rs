use std::collections::BTreeMap;

use crate::model::{TourList, TourPosition};
use crate::normalize::georgian_letters;

/// Per-letter charge counters earned from correct sentences.
///
/// Moving to a position seeds the letters of tours already passed (strictly
/// before it) at zero and drops every other letter. A correct sentence adds
/// one for each Georgian letter it contains, inserting letters not seen yet,
/// and a reveal takes one from every counter, floored at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterCharges {
    counts: BTreeMap<char, u32>,
}

impl LetterCharges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Charges seeded for `position` of `tours`, all at zero.
    #[must_use]
    pub fn seeded(tours: &TourList, position: TourPosition) -> Self {
        let mut charges = Self::new();
        charges.reseed(tours, position);
        charges
    }

    /// Re-scope tracking to the letters before `position`.
    ///
    /// Letters that stay tracked keep their counts, newly reached letters
    /// start at zero and letters no longer in scope are dropped.
    pub fn reseed(&mut self, tours: &TourList, position: TourPosition) {
        let mut counts = BTreeMap::new();
        for letter in tours.letters_before(position) {
            let kept = self.counts.get(&letter).copied().unwrap_or(0);
            counts.insert(letter, kept);
        }
        self.counts = counts;
    }

    /// Count every Georgian letter of a correct sentence.
    ///
    /// Returns how many charges were added.
    pub fn record_sentence(&mut self, text: &str) -> u32 {
        let mut added = 0;
        for letter in georgian_letters(text) {
            let count = self.counts.entry(letter).or_insert(0);
            *count = count.saturating_add(1);
            added += 1;
        }
        added
    }

    /// True when at least one letter is tracked and every one is charged.
    #[must_use]
    pub fn all_charged(&self) -> bool {
        !self.counts.is_empty() && self.counts.values().all(|count| *count > 0)
    }

    /// Spend one charge from every letter, never going below zero.
    pub fn spend(&mut self) {
        for count in self.counts.values_mut() {
            *count = count.saturating_sub(1);
        }
    }

    #[must_use]
    pub fn get(&self, letter: char) -> Option<u32> {
        self.counts.get(&letter).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, u32)> + '_ {
        self.counts.iter().map(|(letter, count)| (*letter, *count))
    }
}
