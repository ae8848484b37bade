//! Line-oriented play loop over a `GameSession`.

use std::io::{self, BufRead, Write};

use dedaena_core::GameState;
use dedaena_core::ValidationResult;
use dedaena_core::model::{PositionDetail, TourPosition};
use dedaena_core::progression::TourButtonState;
use services::{GameError, GameService, GameSession};

const HELP: &str = "\
  <text>          check a sentence
  :pick <letters> add letters to the word builder
  :word           check the built word
  :add <word>     append a word to the sentence buffer
  :char <c>       append a letter or punctuation mark
  :back           remove the last character
  :clear          clear the sentence buffer
  :check          check the sentence buffer
  :reveal         reveal a proverb when every letter is charged
  :letters        show unlocked letters and charges
  :words          show found words
  :next           go to the next tour
  :go <n>         jump to tour n
  :stats          show progress
  :help           this list
  :quit           leave";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Sentence(String),
    Pick(String),
    Word,
    Add(String),
    Char(char),
    Back,
    Clear,
    Check,
    Reveal,
    Letters,
    Words,
    Next,
    Go(TourPosition),
    Stats,
    Help,
    Quit,
    Invalid(String),
}

impl Input {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(command) = line.strip_prefix(':') else {
            return Some(Self::Sentence(line.to_string()));
        };
        let (name, rest) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, rest)| (name, rest.trim()));

        let parsed = match (name, rest) {
            ("pick", letters) if !letters.is_empty() => Self::Pick(letters.to_string()),
            ("word", "") => Self::Word,
            ("add", word) if !word.is_empty() => Self::Add(word.to_string()),
            ("char", ch) => {
                let mut chars = ch.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Self::Char(ch),
                    _ => Self::Invalid(":char takes exactly one character".to_string()),
                }
            }
            ("back", "") => Self::Back,
            ("clear", "") => Self::Clear,
            ("check", "") => Self::Check,
            ("reveal", "") => Self::Reveal,
            ("letters", "") => Self::Letters,
            ("words", "") => Self::Words,
            ("next", "") => Self::Next,
            ("go", raw) => match raw.parse() {
                Ok(position) => Self::Go(position),
                Err(_) => Self::Invalid(format!("not a tour number: {raw:?}")),
            },
            ("stats", "") => Self::Stats,
            ("help" | "h", _) => Self::Help,
            ("quit" | "q", _) => Self::Quit,
            _ => Self::Invalid(format!("unknown command :{name} (try :help)")),
        };
        Some(parsed)
    }
}

fn describe(result: &ValidationResult) -> String {
    match result {
        ValidationResult::EmptyInput => "nothing to check".to_string(),
        ValidationResult::Correct { matched } => format!("correct: {matched}"),
        ValidationResult::AlreadyFound => "already found".to_string(),
        ValidationResult::Incorrect => "not in this tour".to_string(),
    }
}

fn print_detail(detail: &PositionDetail) {
    let letters: String = detail.letters.iter().collect();
    println!();
    println!("tour {}  letters {letters}", detail.position);
    println!(
        "  {} words, {} sentences, {} proverbs",
        detail.info.words.len(),
        detail.info.sentences.len(),
        detail.info.proverbs.len()
    );
    for passage in &detail.info.reading {
        println!("  | {passage}");
    }
}

fn print_letters(game: &GameState) {
    let palette: String = game.palette().into_iter().collect();
    println!("letters: {palette}");
    if game.charges().is_empty() {
        println!("no letters to charge yet");
        return;
    }
    let charges: Vec<String> = game
        .charges()
        .iter()
        .map(|(letter, count)| format!("{letter}:{count}"))
        .collect();
    println!("charges: {}", charges.join(" "));
}

fn print_stats(game: &GameState) {
    let stats = game.stats();
    println!(
        "tour {} of {} ({}%)  words {}/{}  sentences {}/{}",
        stats.position,
        stats.total_positions,
        stats.progress_percent,
        stats.current_words.found,
        stats.current_words.total,
        stats.current_sentences.found,
        stats.current_sentences.total,
    );
    println!(
        "found overall: {} words, {} sentences",
        stats.total_found_words, stats.total_found_sentences
    );
    let tours: Vec<String> = game
        .tour_stats()
        .iter()
        .map(|tour| {
            let mark = match tour.state {
                TourButtonState::Active => '>',
                _ if tour.complete => '*',
                TourButtonState::Before => '.',
                TourButtonState::After => ' ',
            };
            format!("{mark}{}", tour.letter)
        })
        .collect();
    println!("{}", tours.join(" "));
}

fn chime(sound: bool) {
    if sound {
        print!("\x07");
    }
}

async fn show_position(
    session: &GameSession,
    load: impl Future<Output = Result<PositionDetail, GameError>>,
) {
    match load.await {
        Ok(detail) => print_detail(&detail),
        Err(GameError::StaleResponse { .. }) => {}
        Err(err) => {
            tracing::warn!(error = %err, "tour detail unavailable");
            println!("could not load the tour: {err}");
            if let Ok(state) = session.snapshot() {
                print_letters(&state);
            }
        }
    }
}

/// Play `game` from `position` until `:quit` or end of input.
///
/// # Errors
///
/// Returns an error if the tours cannot be loaded or the terminal fails.
pub async fn run(
    game: &GameService,
    position: TourPosition,
    sound: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = game.start(position).await?;
    show_position(&session, session.load_current_detail()).await;
    println!("type a sentence, or :help");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let Some(input) = Input::parse(&line?) else {
            continue;
        };

        match input {
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Invalid(message) => println!("{message}"),
            Input::Sentence(text) => {
                let result = session.update(|state| state.submit_sentence(&text))?;
                if result.is_correct() {
                    chime(sound);
                }
                println!("{}", describe(&result));
            }
            Input::Pick(letters) => {
                let selection: String = session.update(|state| {
                    letters
                        .chars()
                        .filter(|ch| !ch.is_whitespace())
                        .for_each(|ch| state.select_letter(ch));
                    state.selection().iter().collect()
                })?;
                println!("word: {selection}");
            }
            Input::Word => {
                let result = session.update(GameState::check_word)?;
                if result.is_correct() {
                    chime(sound);
                }
                println!("{}", describe(&result));
            }
            Input::Add(word) => {
                let buffer = session.update(|state| {
                    state.push_word(&word);
                    state.sentence().to_string()
                })?;
                println!("sentence: {buffer}");
            }
            Input::Char(ch) => {
                let buffer = session.update(|state| {
                    state.push_char(ch);
                    state.sentence().to_string()
                })?;
                println!("sentence: {buffer}");
            }
            Input::Back => {
                let buffer = session.update(|state| {
                    state.pop_char();
                    state.sentence().to_string()
                })?;
                println!("sentence: {buffer}");
            }
            Input::Clear => {
                session.update(GameState::clear_sentence)?;
                println!("sentence cleared");
            }
            Input::Check => {
                let result = session.update(GameState::check_sentence)?;
                if result.is_correct() {
                    chime(sound);
                }
                println!("{}", describe(&result));
            }
            Input::Reveal => match session.update(GameState::reveal_artifact)? {
                Ok(proverb) => {
                    chime(sound);
                    println!("proverb: {proverb}");
                }
                Err(err) => println!("{err}"),
            },
            Input::Letters => print_letters(&session.snapshot()?),
            Input::Words => {
                let words = session.snapshot()?.word_palette();
                if words.is_empty() {
                    println!("no words found yet");
                } else {
                    println!("{}", words.join(" "));
                }
            }
            Input::Next => match session.update(GameState::advance)? {
                dedaena_core::AdvanceOutcome::Moved(_) => {
                    show_position(&session, session.load_current_detail()).await;
                }
                dedaena_core::AdvanceOutcome::NoMoreTours => println!("this is the last tour"),
            },
            Input::Go(target) => match session.update(|state| state.go_to(target))? {
                Ok(()) => show_position(&session, session.load_current_detail()).await,
                Err(err) => println!("{err}"),
            },
            Input::Stats => print_stats(&session.snapshot()?),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_sentence() {
        assert_eq!(
            Input::parse("  ბაბა აბა. "),
            Some(Input::Sentence("ბაბა აბა.".to_string()))
        );
        assert_eq!(Input::parse("   "), None);
    }

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(Input::parse(":pick ბაბა"), Some(Input::Pick("ბაბა".to_string())));
        assert_eq!(Input::parse(":char !"), Some(Input::Char('!')));
        assert_eq!(
            Input::parse(":go 3"),
            Some(Input::Go(TourPosition::new(3).unwrap()))
        );
        assert_eq!(Input::parse(":q"), Some(Input::Quit));
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert!(matches!(Input::parse(":go 0"), Some(Input::Invalid(_))));
        assert!(matches!(Input::parse(":char ab"), Some(Input::Invalid(_))));
        assert!(matches!(Input::parse(":dance"), Some(Input::Invalid(_))));
        assert!(matches!(Input::parse(":pick"), Some(Input::Invalid(_))));
    }
}
