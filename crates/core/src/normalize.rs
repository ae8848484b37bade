//! Text normalization shared by the game and the moderator tools.
//!
//! Three rules are used across the app:
//!
//! - **Submissions** ([`normalize_submission`]): trim surrounding whitespace and
//!   lower-case. Inner spacing and punctuation are significant, so a sentence
//!   must be typed with the same words, spaces and punctuation as the canonical
//!   text.
//! - **Words** ([`normalize_word`]): drop every character in [`PUNCTUATION`]
//!   and all whitespace, then lower-case. Used for duplicate detection and
//!   tour lookup, so `"მზე"` and `"მზე."` compare equal.
//! - **Canonical words** ([`strip_dashes`]): trim and drop the hyphen/dash
//!   family. Tour vocabulary marks syllables with dashes (`"ბა-ბუ"`) that the
//!   word builder never produces.
//!
//! Lower-casing uses Unicode rules, which fold Georgian Mtavruli capitals
//! (U+1C90..U+1CBF) into Mkhedruli letters.

/// First letter of the modern Georgian (Mkhedruli) alphabet, `ა`.
pub const GEORGIAN_FIRST: char = '\u{10D0}';
/// Last letter counted by the game, `ჰ`.
pub const GEORGIAN_LAST: char = '\u{10F0}';

/// Characters removed by [`normalize_word`].
pub const PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '(', ')', '[', ']', '{', '}', '<', '>', '"', '\'', '“', '”',
    '„', '‘', '’', '«', '»', '—', '–', '-',
];

const DASHES: &[char] = &['-', '–', '—'];

/// Trim and lower-case a user submission.
#[must_use]
pub fn normalize_submission(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether `ch` is in the Georgian letter range `ა..=ჰ`.
#[must_use]
pub fn is_georgian_letter(ch: char) -> bool {
    (GEORGIAN_FIRST..=GEORGIAN_LAST).contains(&ch)
}

/// The Georgian letters of `text`, in order, repeats included.
pub fn georgian_letters(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().filter(|ch| is_georgian_letter(*ch))
}

/// Canonical form of a single word for lookups and duplicate detection.
#[must_use]
pub fn normalize_word(word: &str) -> String {
    word.chars()
        .filter(|ch| !PUNCTUATION.contains(ch) && !ch.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Trim and remove hyphens and dashes.
#[must_use]
pub fn strip_dashes(word: &str) -> String {
    word.trim().chars().filter(|ch| !DASHES.contains(ch)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_trims_and_lowercases() {
        assert_eq!(normalize_submission("  Hello  "), "hello");
        assert_eq!(normalize_submission("hello"), "hello");
        assert_eq!(normalize_submission("   "), "");
    }

    #[test]
    fn submission_is_idempotent() {
        let once = normalize_submission("  ია აია.  ");
        assert_eq!(normalize_submission(&once), once);
    }

    #[test]
    fn submission_folds_mtavruli() {
        // Mtavruli capital AN lower-cases to Mkhedruli `ა`.
        assert_eq!(normalize_submission("\u{1C90}"), "ა");
    }

    #[test]
    fn georgian_range_bounds() {
        assert!(is_georgian_letter('ა'));
        assert!(is_georgian_letter('ჰ'));
        assert!(!is_georgian_letter('a'));
        assert!(!is_georgian_letter('.'));
        assert!(!is_georgian_letter('\u{10F1}'));
    }

    #[test]
    fn letters_keep_repeats_and_drop_everything_else() {
        let letters: String = georgian_letters("ბაბა, aba!").collect();
        assert_eq!(letters, "ბაბა");
    }

    #[test]
    fn word_normalization_ignores_trailing_punctuation() {
        assert_eq!(normalize_word("მზე"), normalize_word("მზე."));
        assert_eq!(normalize_word("«მზე»,"), "მზე");
        assert_eq!(normalize_word(" ბა-ბუ "), "ბაბუ");
    }

    #[test]
    fn word_normalization_of_punctuation_only_is_empty() {
        assert_eq!(normalize_word("—"), "");
    }

    #[test]
    fn strip_dashes_keeps_case_and_letters() {
        assert_eq!(strip_dashes(" ბა-ბუ "), "ბაბუ");
        assert_eq!(strip_dashes("ია—ია"), "იაია");
    }
}
