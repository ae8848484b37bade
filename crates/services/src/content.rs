use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dedaena_core::model::{PositionDetail, PositionInfo, TourList, TourPosition, TourSummary};

use crate::api::ApiClient;
use crate::error::ApiError;

/// Read access to the tours of a content table.
///
/// Every call is an independent GET: no caching, no retry.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// The full ordered tour list of `table`.
    async fn load_all(&self, table: &str) -> Result<TourList, ApiError>;

    /// One tour plus the letters unlocked up to it.
    async fn load_position(
        &self,
        table: &str,
        position: TourPosition,
    ) -> Result<PositionDetail, ApiError>;

    /// Per-tour summary for a table of contents.
    async fn general_info(&self, table: &str) -> Result<Vec<TourSummary>, ApiError>;
}

/// `ContentSource` backed by the public dedaena endpoints.
#[derive(Clone, Debug)]
pub struct HttpContentSource {
    api: ApiClient,
}

impl HttpContentSource {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn load_all(&self, table: &str) -> Result<TourList, ApiError> {
        self.api.get(&format!("dedaena/{table}"), None).await
    }

    async fn load_position(
        &self,
        table: &str,
        position: TourPosition,
    ) -> Result<PositionDetail, ApiError> {
        self.api
            .get(&format!("dedaena/{table}/position/{position}"), None)
            .await
    }

    async fn general_info(&self, table: &str) -> Result<Vec<TourSummary>, ApiError> {
        self.api
            .get(&format!("dedaena/{table}/general-info"), None)
            .await
    }
}

/// Fixed tables held in memory, for tests and offline play.
#[derive(Clone, Debug, Default)]
pub struct InMemoryContentSource {
    tables: Arc<HashMap<String, TourList>>,
}

impl InMemoryContentSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_table(self, name: impl Into<String>, tours: TourList) -> Self {
        let mut tables = Arc::unwrap_or_clone(self.tables);
        tables.insert(name.into(), tours);
        Self {
            tables: Arc::new(tables),
        }
    }

    fn table(&self, table: &str) -> Result<&TourList, ApiError> {
        self.tables.get(table).ok_or_else(|| ApiError::NotFound {
            detail: format!("table {table} not found"),
        })
    }
}

#[async_trait]
impl ContentSource for InMemoryContentSource {
    async fn load_all(&self, table: &str) -> Result<TourList, ApiError> {
        self.table(table).cloned()
    }

    async fn load_position(
        &self,
        table: &str,
        position: TourPosition,
    ) -> Result<PositionDetail, ApiError> {
        let tours = self.table(table)?;
        let tour = tours.get(position).ok_or_else(|| ApiError::NotFound {
            detail: format!("position {position} not found"),
        })?;
        let letters = tours
            .iter()
            .take_while(|candidate| candidate.position() <= position)
            .map(|candidate| candidate.letter())
            .collect();
        Ok(PositionDetail {
            position,
            letters,
            info: PositionInfo {
                words: tour.words().to_vec(),
                sentences: tour.sentences().to_vec(),
                proverbs: tour.proverbs().to_vec(),
                reading: tour.reading().to_vec(),
            },
        })
    }

    async fn general_info(&self, table: &str) -> Result<Vec<TourSummary>, ApiError> {
        Ok(self
            .table(table)?
            .iter()
            .map(TourSummary::from_tour)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dedaena_core::model::Tour;

    fn pos(value: u32) -> TourPosition {
        TourPosition::new(value).unwrap()
    }

    fn source() -> InMemoryContentSource {
        let tours = TourList::new(vec![
            Tour::new(pos(1), 'ა').with_words(["ია"]),
            Tour::new(pos(2), 'ბ')
                .with_sentences(["ბაბა."])
                .with_proverbs(["ანდაზა"]),
        ])
        .unwrap();
        InMemoryContentSource::new().with_table("test", tours)
    }

    #[tokio::test]
    async fn position_detail_lists_letters_through_position() {
        let detail = source().load_position("test", pos(2)).await.unwrap();
        assert_eq!(detail.letters, vec!['ა', 'ბ']);
        assert_eq!(detail.info.sentences.len(), 1);
    }

    #[tokio::test]
    async fn unknown_table_and_position_are_not_found() {
        let source = source();
        assert!(matches!(
            source.load_all("missing").await,
            Err(ApiError::NotFound { .. })
        ));
        assert!(matches!(
            source.load_position("test", pos(5)).await,
            Err(ApiError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn general_info_summarizes_each_tour() {
        let info = source().general_info("test").await.unwrap();
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].word_count, 1);
        assert!(info[1].has_proverbs);
        assert!(!info[1].has_reading);
    }
}
