pub mod errors;
pub mod memory;
pub mod postgres;

use crate::{
    domain::recommendation::{NewRecommendation, Recommendation, ScoreBand, ScoreChange},
    repository::{
        errors::RepositoryError, memory::InMemoryRecommendationRepository,
        postgres::PostgresRecommendationRepository,
    },
    usecase::contracts::RecommendationRepository,
};

/// The storage backend chosen at startup.
pub enum RecommendationStore {
    Postgres(PostgresRecommendationRepository),
    Memory(InMemoryRecommendationRepository),
}

impl RecommendationStore {
    pub async fn close(&self) {
        if let RecommendationStore::Postgres(repository) = self {
            repository.close().await;
        }
    }
}

impl RecommendationRepository for RecommendationStore {
    async fn create(&self, recommendation: &NewRecommendation) -> Result<(), RepositoryError> {
        match self {
            RecommendationStore::Postgres(r) => r.create(recommendation).await,
            RecommendationStore::Memory(r) => r.create(recommendation).await,
        }
    }

    async fn find(&self, id: i32) -> Result<Option<Recommendation>, RepositoryError> {
        match self {
            RecommendationStore::Postgres(r) => r.find(id).await,
            RecommendationStore::Memory(r) => r.find(id).await,
        }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Recommendation>, RepositoryError> {
        match self {
            RecommendationStore::Postgres(r) => r.find_by_name(name).await,
            RecommendationStore::Memory(r) => r.find_by_name(name).await,
        }
    }

    async fn find_all(&self, band: Option<ScoreBand>) -> Result<Vec<Recommendation>, RepositoryError> {
        match self {
            RecommendationStore::Postgres(r) => r.find_all(band).await,
            RecommendationStore::Memory(r) => r.find_all(band).await,
        }
    }

    async fn find_recent(&self, limit: i64) -> Result<Vec<Recommendation>, RepositoryError> {
        match self {
            RecommendationStore::Postgres(r) => r.find_recent(limit).await,
            RecommendationStore::Memory(r) => r.find_recent(limit).await,
        }
    }

    async fn update_score(&self, id: i32, change: ScoreChange) -> Result<Recommendation, RepositoryError> {
        match self {
            RecommendationStore::Postgres(r) => r.update_score(id, change).await,
            RecommendationStore::Memory(r) => r.update_score(id, change).await,
        }
    }

    async fn remove(&self, id: i32) -> Result<(), RepositoryError> {
        match self {
            RecommendationStore::Postgres(r) => r.remove(id).await,
            RecommendationStore::Memory(r) => r.remove(id).await,
        }
    }

    async fn get_top_by_score(&self, limit: i64) -> Result<Vec<Recommendation>, RepositoryError> {
        match self {
            RecommendationStore::Postgres(r) => r.get_top_by_score(limit).await,
            RecommendationStore::Memory(r) => r.get_top_by_score(limit).await,
        }
    }
}
