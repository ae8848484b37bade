use std::sync::Arc;

use async_trait::async_trait;
use dedaena_core::model::{PositionDetail, Tour, TourList, TourPosition, TourSummary};
use dedaena_core::validate::ValidationResult;
use services::{ApiError, ContentSource, GameError, GameService, InMemoryContentSource};
use tokio::sync::Notify;

const TABLE: &str = "gogebashvili_1";

fn pos(value: u32) -> TourPosition {
    TourPosition::new(value).unwrap()
}

fn tours() -> TourList {
    TourList::new(vec![
        Tour::new(pos(1), 'ა').with_sentences(["ა"]),
        Tour::new(pos(2), 'ბ')
            .with_words(["ბა-ბა"])
            .with_sentences(["ბაბა.", "აბა!"])
            .with_proverbs(["ბაბა ბაბაა"]),
        Tour::new(pos(3), 'გ')
            .with_sentences(["გაგა"])
            .with_reading(["გაგა ბაბა"]),
    ])
    .unwrap()
}

fn service() -> GameService {
    let source = InMemoryContentSource::new().with_table(TABLE, tours());
    GameService::new(Arc::new(source), TABLE)
}

#[tokio::test]
async fn play_through_the_table() {
    let session = service().start(pos(1)).await.unwrap();

    let result = session.update(|game| game.submit_sentence("  ა  ")).unwrap();
    assert_eq!(
        result,
        ValidationResult::Correct {
            matched: "ა".to_string()
        }
    );

    let detail = session.advance().await.unwrap().unwrap();
    assert_eq!(detail.position, pos(2));
    assert_eq!(detail.letters, vec!['ა', 'ბ']);

    let word = session
        .update(|game| {
            for letter in "ბაბა".chars() {
                game.select_letter(letter);
            }
            game.check_word()
        })
        .unwrap();
    assert!(word.is_correct());

    // The first tour's sentence already charged `ა`.
    let proverb = session
        .update(|game| {
            assert_eq!(game.charges().get('ა'), Some(1));
            assert!(game.can_reveal());
            game.reveal_artifact()
        })
        .unwrap()
        .unwrap();
    assert_eq!(proverb, "ბაბა ბაბაა");

    let charged = session
        .update(|game| {
            assert!(!game.can_reveal());
            game.submit_sentence("ბაბა.");
            game.can_reveal()
        })
        .unwrap();
    assert!(charged);

    let stats = session.snapshot().unwrap().stats();
    assert_eq!(stats.position, pos(2));
    assert_eq!(stats.total_found_sentences, 2);
    assert_eq!(stats.total_found_words, 1);
    assert_eq!(stats.current_sentences.found, 1);
    assert_eq!(stats.current_sentences.total, 2);
    assert_eq!(stats.progress_percent, 67);
    assert!(stats.has_next);

    let detail = session.advance().await.unwrap().unwrap();
    assert_eq!(detail.info.reading, vec!["გაგა ბაბა".to_string()]);
    assert!(session.advance().await.unwrap().is_none());
    assert_eq!(session.snapshot().unwrap().position(), pos(3));
}

#[tokio::test]
async fn moving_back_keeps_found_sentences() {
    let session = service().start(pos(2)).await.unwrap();
    session
        .update(|game| game.submit_sentence("აბა!"))
        .unwrap();
    session.go_to(pos(1)).await.unwrap();
    session.go_to(pos(2)).await.unwrap();

    let again = session.update(|game| game.submit_sentence("აბა!")).unwrap();
    assert_eq!(again, ValidationResult::AlreadyFound);
}

#[tokio::test]
async fn unknown_position_is_rejected() {
    let session = service().start(pos(1)).await.unwrap();
    assert!(matches!(
        session.go_to(pos(9)).await,
        Err(GameError::Progression(_))
    ));
    assert_eq!(session.snapshot().unwrap().position(), pos(1));

    assert!(matches!(
        service().start(pos(4)).await,
        Err(GameError::Progression(_))
    ));
}

#[tokio::test]
async fn missing_or_empty_table_fails_to_start() {
    let missing = GameService::new(Arc::new(InMemoryContentSource::new()), TABLE);
    assert!(matches!(
        missing.start(pos(1)).await,
        Err(GameError::Api(ApiError::NotFound { .. }))
    ));

    let empty = InMemoryContentSource::new().with_table(TABLE, TourList::default());
    let empty = GameService::new(Arc::new(empty), TABLE);
    assert!(matches!(
        empty.start(pos(1)).await,
        Err(GameError::EmptyTable(table)) if table == TABLE
    ));
}

#[tokio::test]
async fn table_of_contents_summarizes_tours() {
    let toc = service().table_of_contents().await.unwrap();
    assert_eq!(toc.len(), 3);
    assert_eq!(toc[1].letter, "ბ");
    assert_eq!(toc[1].sentence_count, 2);
    assert!(toc[1].has_proverbs);
    assert!(toc[2].has_reading);
}

/// Holds every position load until released.
struct GatedSource {
    inner: InMemoryContentSource,
    gate: Arc<Notify>,
}

#[async_trait]
impl ContentSource for GatedSource {
    async fn load_all(&self, table: &str) -> Result<TourList, ApiError> {
        self.inner.load_all(table).await
    }

    async fn load_position(
        &self,
        table: &str,
        position: TourPosition,
    ) -> Result<PositionDetail, ApiError> {
        self.gate.notified().await;
        self.inner.load_position(table, position).await
    }

    async fn general_info(&self, table: &str) -> Result<Vec<TourSummary>, ApiError> {
        self.inner.general_info(table).await
    }
}

#[tokio::test]
async fn late_detail_for_an_old_position_is_dropped() {
    let gate = Arc::new(Notify::new());
    let source = GatedSource {
        inner: InMemoryContentSource::new().with_table(TABLE, tours()),
        gate: Arc::clone(&gate),
    };
    let session = GameService::new(Arc::new(source), TABLE)
        .start(pos(1))
        .await
        .unwrap();

    let (stale, ()) = tokio::join!(session.load_current_detail(), async {
        session
            .update(|game| game.go_to(pos(3)))
            .unwrap()
            .unwrap();
        gate.notify_one();
    });

    assert!(matches!(
        stale,
        Err(GameError::StaleResponse { requested, current }) if current > requested
    ));
    assert_eq!(session.snapshot().unwrap().position(), pos(3));

    gate.notify_one();
    let fresh = session.load_current_detail().await.unwrap();
    assert_eq!(fresh.position, pos(3));
}
