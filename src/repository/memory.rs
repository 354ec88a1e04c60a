use tokio::sync::RwLock;

use crate::{
    domain::recommendation::{NewRecommendation, Recommendation, ScoreBand, ScoreChange},
    repository::errors::RepositoryError,
    usecase::contracts::RecommendationRepository,
};

#[derive(Default)]
struct Table {
    next_id: i32,
    rows: Vec<Recommendation>,
}

/// Process-local storage with the same ordering and uniqueness rules as the
/// `recommendations` table. Rows are kept in insertion (id) order.
#[derive(Default)]
pub struct InMemoryRecommendationRepository {
    table: RwLock<Table>,
}

impl InMemoryRecommendationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed row, keeping its score. Returns the assigned id.
    pub async fn insert_with_score(&self, recommendation: &NewRecommendation, score: i32) -> Result<i32, RepositoryError> {
        let mut table = self.table.write().await;

        if table.rows.iter().any(|r| r.name == recommendation.name) {
            return Err(RepositoryError::Conflict(format!(
                "recommendation named {:?} already exists",
                recommendation.name
            )));
        }

        table.next_id += 1;
        let id = table.next_id;
        table.rows.push(Recommendation {
            id,
            name: recommendation.name.clone(),
            youtube_link: recommendation.youtube_link.clone(),
            score,
        });
        Ok(id)
    }

    fn newest_first<'a>(rows: impl DoubleEndedIterator<Item = &'a Recommendation>) -> Vec<Recommendation> {
        rows.rev().cloned().collect()
    }
}

impl RecommendationRepository for InMemoryRecommendationRepository {
    #[tracing::instrument(skip(self, recommendation), fields(name = %recommendation.name))]
    async fn create(&self, recommendation: &NewRecommendation) -> Result<(), RepositoryError> {
        let id = self.insert_with_score(recommendation, 0).await?;
        tracing::debug!(recommendation_id = id, "recommendation created successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(recommendation_id = id))]
    async fn find(&self, id: i32) -> Result<Option<Recommendation>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|r| r.id == id).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Recommendation>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|r| r.name == name).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self, band: Option<ScoreBand>) -> Result<Vec<Recommendation>, RepositoryError> {
        let table = self.table.read().await;
        let rows = Self::newest_first(
            table
                .rows
                .iter()
                .filter(|r| band.is_none_or(|b| b.contains(r.score))),
        );
        tracing::debug!(?band, count = rows.len(), "found recommendations");
        Ok(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn find_recent(&self, limit: i64) -> Result<Vec<Recommendation>, RepositoryError> {
        let table = self.table.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(table.rows.iter().rev().take(limit).cloned().collect())
    }

    #[tracing::instrument(skip(self), fields(recommendation_id = id))]
    async fn update_score(&self, id: i32, change: ScoreChange) -> Result<Recommendation, RepositoryError> {
        let mut table = self.table.write().await;
        let row = table
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepositoryError::NotFound)?;

        row.score = row
            .score
            .checked_add(change.delta())
            .ok_or_else(|| RepositoryError::DatabaseError(format!("score of recommendation {id} out of range")))?;
        tracing::debug!(recommendation_id = id, score = row.score, "score updated successfully");
        Ok(row.clone())
    }

    #[tracing::instrument(skip(self), fields(recommendation_id = id))]
    async fn remove(&self, id: i32) -> Result<(), RepositoryError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|r| r.id != id);

        if table.rows.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_top_by_score(&self, limit: i64) -> Result<Vec<Recommendation>, RepositoryError> {
        let table = self.table.read().await;
        let mut rows = table.rows.clone();
        // stable sort keeps id order among equal scores
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }
}
