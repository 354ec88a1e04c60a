use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    domain::recommendation::{NewRecommendation, Recommendation, ScoreBand, ScoreChange},
    repository::errors::RepositoryError,
    usecase::contracts::RecommendationRepository,
};

pub struct PostgresRecommendationRepository {
    pool: PgPool,
}

impl PostgresRecommendationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl RecommendationRepository for PostgresRecommendationRepository {
    #[tracing::instrument(skip(self, recommendation), fields(name = %recommendation.name))]
    async fn create(&self, recommendation: &NewRecommendation) -> Result<(), RepositoryError> {
        tracing::debug!("creating recommendation");

        sqlx::query(
            r#"
            INSERT INTO recommendations (name, youtube_link)
            VALUES ($1, $2)
            "#
        )
        .bind(&recommendation.name)
        .bind(&recommendation.youtube_link)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        tracing::debug!(name = %recommendation.name, "recommendation created successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(recommendation_id = id))]
    async fn find(&self, id: i32) -> Result<Option<Recommendation>, RepositoryError> {
        tracing::debug!("finding recommendation by id");

        let recommendation = sqlx::query_as::<_, Recommendation>(
            r#"
            SELECT id, name, youtube_link, score
            FROM recommendations
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(recommendation)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Recommendation>, RepositoryError> {
        tracing::debug!("finding recommendation by name");

        let recommendation = sqlx::query_as::<_, Recommendation>(
            r#"
            SELECT id, name, youtube_link, score
            FROM recommendations
            WHERE name = $1
            "#
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(recommendation)
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self, band: Option<ScoreBand>) -> Result<Vec<Recommendation>, RepositoryError> {
        tracing::debug!("finding recommendations");

        let (min_score, max_score) = band.map(ScoreBand::bounds).unwrap_or((None, None));

        let recommendations = sqlx::query_as::<_, Recommendation>(
            r#"
            SELECT id, name, youtube_link, score
            FROM recommendations
            WHERE ($1::INTEGER IS NULL OR score >= $1)
              AND ($2::INTEGER IS NULL OR score <= $2)
            ORDER BY id DESC
            "#
        )
        .bind(min_score)
        .bind(max_score)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        tracing::debug!(?band, count = recommendations.len(), "found recommendations");
        Ok(recommendations)
    }

    #[tracing::instrument(skip(self))]
    async fn find_recent(&self, limit: i64) -> Result<Vec<Recommendation>, RepositoryError> {
        tracing::debug!("finding recent recommendations");

        let recommendations = sqlx::query_as::<_, Recommendation>(
            r#"
            SELECT id, name, youtube_link, score
            FROM recommendations
            ORDER BY id DESC
            LIMIT $1
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(recommendations)
    }

    #[tracing::instrument(skip(self), fields(recommendation_id = id))]
    async fn update_score(&self, id: i32, change: ScoreChange) -> Result<Recommendation, RepositoryError> {
        tracing::debug!(?change, "updating recommendation score");

        let recommendation = sqlx::query_as::<_, Recommendation>(
            r#"
            UPDATE recommendations
            SET score = score + $2
            WHERE id = $1
            RETURNING id, name, youtube_link, score
            "#
        )
        .bind(id)
        .bind(change.delta())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?
        .ok_or(RepositoryError::NotFound)?;

        tracing::debug!(recommendation_id = id, score = recommendation.score, "score updated successfully");
        Ok(recommendation)
    }

    #[tracing::instrument(skip(self), fields(recommendation_id = id))]
    async fn remove(&self, id: i32) -> Result<(), RepositoryError> {
        tracing::debug!("removing recommendation");

        let result = sqlx::query(
            r#"
            DELETE FROM recommendations
            WHERE id = $1
            "#
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(recommendation_id = id, "recommendation removed successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_top_by_score(&self, limit: i64) -> Result<Vec<Recommendation>, RepositoryError> {
        tracing::debug!("finding top recommendations");

        let recommendations = sqlx::query_as::<_, Recommendation>(
            r#"
            SELECT id, name, youtube_link, score
            FROM recommendations
            ORDER BY score DESC, id ASC
            LIMIT $1
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        tracing::debug!(limit, count = recommendations.len(), "found top recommendations");
        Ok(recommendations)
    }
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
