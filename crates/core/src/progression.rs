use thiserror::Error;

use crate::model::{TourList, TourPosition};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressionError {
    #[error("tour {0} is not loaded")]
    UnknownPosition(TourPosition),
}

/// Result of [`Progression::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Moved(TourPosition),
    /// Already at the last tour; the position did not change.
    NoMoreTours,
}

/// How a tour relates to the current position, for the tour picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourButtonState {
    Before,
    Active,
    After,
}

/// Current tour position with free navigation.
///
/// Completion of a tour is never required to move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progression {
    current: TourPosition,
}

impl Progression {
    /// Start at `position`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::UnknownPosition` when `position` is not in
    /// `tours`.
    pub fn start(tours: &TourList, position: TourPosition) -> Result<Self, ProgressionError> {
        if !tours.contains(position) {
            return Err(ProgressionError::UnknownPosition(position));
        }
        Ok(Self { current: position })
    }

    #[must_use]
    pub fn current(&self) -> TourPosition {
        self.current
    }

    /// Jump to any loaded tour.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::UnknownPosition` when `position` is not in
    /// `tours`; the current position is left unchanged.
    pub fn go_to(&mut self, tours: &TourList, position: TourPosition) -> Result<(), ProgressionError> {
        if !tours.contains(position) {
            return Err(ProgressionError::UnknownPosition(position));
        }
        self.current = position;
        Ok(())
    }

    /// Move to the next tour, stopping at the last one.
    pub fn advance(&mut self, tours: &TourList) -> AdvanceOutcome {
        match self.current.next().filter(|next| tours.contains(*next)) {
            Some(next) => {
                self.current = next;
                AdvanceOutcome::Moved(next)
            }
            None => AdvanceOutcome::NoMoreTours,
        }
    }

    #[must_use]
    pub fn has_next(&self, tours: &TourList) -> bool {
        self.current.next().is_some_and(|next| tours.contains(next))
    }

    #[must_use]
    pub fn button_state(&self, position: TourPosition) -> TourButtonState {
        match position.cmp(&self.current) {
            std::cmp::Ordering::Less => TourButtonState::Before,
            std::cmp::Ordering::Equal => TourButtonState::Active,
            std::cmp::Ordering::Greater => TourButtonState::After,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tour;

    fn pos(value: u32) -> TourPosition {
        TourPosition::new(value).unwrap()
    }

    fn tours() -> TourList {
        TourList::new(vec![
            Tour::new(pos(1), 'ა'),
            Tour::new(pos(2), 'ბ'),
            Tour::new(pos(3), 'გ'),
        ])
        .unwrap()
    }

    #[test]
    fn advance_stops_at_last_tour() {
        let tours = tours();
        let mut progression = Progression::start(&tours, pos(2)).unwrap();
        assert_eq!(progression.advance(&tours), AdvanceOutcome::Moved(pos(3)));
        assert!(!progression.has_next(&tours));

        assert_eq!(progression.advance(&tours), AdvanceOutcome::NoMoreTours);
        assert_eq!(progression.current(), pos(3));
        assert!(tours.get(progression.current()).is_some());
    }

    #[test]
    fn go_to_allows_skipping_ahead() {
        let tours = tours();
        let mut progression = Progression::start(&tours, pos(1)).unwrap();
        progression.go_to(&tours, pos(3)).unwrap();
        assert_eq!(progression.current(), pos(3));
        progression.go_to(&tours, pos(1)).unwrap();
        assert_eq!(progression.current(), pos(1));
    }

    #[test]
    fn go_to_unknown_position_keeps_current() {
        let tours = tours();
        let mut progression = Progression::start(&tours, pos(2)).unwrap();
        assert_eq!(
            progression.go_to(&tours, pos(9)),
            Err(ProgressionError::UnknownPosition(pos(9)))
        );
        assert_eq!(progression.current(), pos(2));
    }

    #[test]
    fn start_requires_loaded_position() {
        let empty = TourList::default();
        assert!(Progression::start(&empty, pos(1)).is_err());
    }

    #[test]
    fn button_states_relative_to_current() {
        let progression = Progression::start(&tours(), pos(2)).unwrap();
        assert_eq!(progression.button_state(pos(1)), TourButtonState::Before);
        assert_eq!(progression.button_state(pos(2)), TourButtonState::Active);
        assert_eq!(progression.button_state(pos(3)), TourButtonState::After);
    }
}
