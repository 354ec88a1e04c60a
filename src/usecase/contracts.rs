use crate::{
    domain::recommendation::{NewRecommendation, Recommendation, ScoreBand, ScoreChange},
    repository::errors::RepositoryError,
};

#[cfg_attr(test, mockall::automock)]
pub trait RecommendationRepository: Send + Sync {
    async fn create(&self, recommendation: &NewRecommendation) -> Result<(), RepositoryError>;
    async fn find(&self, id: i32) -> Result<Option<Recommendation>, RepositoryError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Recommendation>, RepositoryError>;
    /// Newest first. `None` returns every recommendation.
    async fn find_all(&self, band: Option<ScoreBand>) -> Result<Vec<Recommendation>, RepositoryError>;
    async fn find_recent(&self, limit: i64) -> Result<Vec<Recommendation>, RepositoryError>;
    /// Applies the change in a single statement and returns the updated row.
    async fn update_score(&self, id: i32, change: ScoreChange) -> Result<Recommendation, RepositoryError>;
    async fn remove(&self, id: i32) -> Result<(), RepositoryError>;
    async fn get_top_by_score(&self, limit: i64) -> Result<Vec<Recommendation>, RepositoryError>;
}

/// Source of uniform draws in `[0, 1)`.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send + Sync {
    fn next_f64(&self) -> f64;
}
