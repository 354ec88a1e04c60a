use crate::domain::recommendation::{
    is_youtube_watch_link, NewRecommendation, Recommendation, ScoreBand, ScoreChange, RECENT_LIMIT,
};
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::{RandomSource, RecommendationRepository};
use crate::usecase::error::UsecaseError;
use crate::usecase::random::index_from_draw;

pub struct RecommendationsUseCase<R, G>
where
    R: RecommendationRepository,
    G: RandomSource,
{
    recommendation_repository: R,
    random: G,
}

impl<R, G> RecommendationsUseCase<R, G>
where
    R: RecommendationRepository,
    G: RandomSource,
{
    pub fn new(recommendation_repository: R, random: G) -> Self {
        Self {
            recommendation_repository,
            random,
        }
    }

    pub fn recommendation_repository(&self) -> &R {
        &self.recommendation_repository
    }

    #[tracing::instrument(skip(self, recommendation), fields(name = %recommendation.name))]
    pub async fn insert(&self, recommendation: NewRecommendation) -> Result<(), UsecaseError> {
        tracing::debug!("inserting recommendation");

        if recommendation.name.trim().is_empty() {
            return Err(UsecaseError::Validation("name must not be empty".to_string()));
        }

        if !is_youtube_watch_link(&recommendation.youtube_link) {
            return Err(UsecaseError::Validation(
                "youtubeLink must be a YouTube watch link".to_string(),
            ));
        }

        let existing = self
            .recommendation_repository
            .find_by_name(&recommendation.name)
            .await?;
        if existing.is_some() {
            return Err(UsecaseError::Conflict(
                "Recommendations names must be unique".to_string(),
            ));
        }

        self.recommendation_repository
            .create(&recommendation)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    UsecaseError::Conflict("Recommendations names must be unique".to_string())
                }
                other => other.into(),
            })?;

        metrics::counter!("recommendations_created_total").increment(1);
        tracing::info!(name = %recommendation.name, "recommendation created");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(recommendation_id = id))]
    pub async fn upvote(&self, id: i32) -> Result<Recommendation, UsecaseError> {
        tracing::debug!("upvoting recommendation");

        self.get_by_id_or_fail(id).await?;

        let updated = self
            .recommendation_repository
            .update_score(id, ScoreChange::Increment)
            .await?;

        metrics::counter!("recommendation_votes_total", "direction" => "up").increment(1);
        tracing::debug!(recommendation_id = id, score = updated.score, "recommendation upvoted");
        Ok(updated)
    }

    /// Decrements the score and deletes the recommendation once it falls below the threshold.
    #[tracing::instrument(skip(self), fields(recommendation_id = id))]
    pub async fn downvote(&self, id: i32) -> Result<(), UsecaseError> {
        tracing::debug!("downvoting recommendation");

        self.get_by_id_or_fail(id).await?;

        let updated = self
            .recommendation_repository
            .update_score(id, ScoreChange::Decrement)
            .await?;

        metrics::counter!("recommendation_votes_total", "direction" => "down").increment(1);

        if updated.is_below_threshold() {
            self.recommendation_repository.remove(id).await?;
            metrics::counter!("recommendations_removed_total").increment(1);
            tracing::info!(recommendation_id = id, score = updated.score, "recommendation removed after downvote");
        } else {
            tracing::debug!(recommendation_id = id, score = updated.score, "recommendation downvoted");
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self) -> Result<Vec<Recommendation>, UsecaseError> {
        tracing::debug!("listing recent recommendations");

        let recommendations = self
            .recommendation_repository
            .find_recent(RECENT_LIMIT)
            .await?;

        tracing::debug!(count = recommendations.len(), "recent recommendations listed");
        Ok(recommendations)
    }

    #[tracing::instrument(skip(self), fields(recommendation_id = id))]
    pub async fn get_by_id(&self, id: i32) -> Result<Recommendation, UsecaseError> {
        self.get_by_id_or_fail(id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_top(&self, amount: i64) -> Result<Vec<Recommendation>, UsecaseError> {
        tracing::debug!("listing top recommendations");

        if amount < 0 {
            return Err(UsecaseError::Validation(
                "amount must not be negative".to_string(),
            ));
        }

        let recommendations = self
            .recommendation_repository
            .get_top_by_score(amount)
            .await?;

        tracing::debug!(amount, count = recommendations.len(), "top recommendations listed");
        Ok(recommendations)
    }

    /// Weighted pick: the first draw chooses a score band, the second an entry
    /// of that band. An empty band falls back to every recommendation.
    #[tracing::instrument(skip(self))]
    pub async fn get_random(&self) -> Result<Recommendation, UsecaseError> {
        let band = ScoreBand::from_draw(self.random.next_f64());
        tracing::debug!(?band, "picking random recommendation");

        let mut pool = self.recommendation_repository.find_all(Some(band)).await?;
        if pool.is_empty() {
            tracing::debug!(?band, "score band empty, falling back to all recommendations");
            pool = self.recommendation_repository.find_all(None).await?;
        }

        if pool.is_empty() {
            return Err(UsecaseError::NotFound("Recommendation".to_string()));
        }

        let index = index_from_draw(self.random.next_f64(), pool.len());
        Ok(pool.swap_remove(index))
    }

    async fn get_by_id_or_fail(&self, id: i32) -> Result<Recommendation, UsecaseError> {
        self.recommendation_repository
            .find(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Recommendation".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::contracts::{MockRandomSource, MockRecommendationRepository};

    fn make_recommendation(id: i32, score: i32) -> Recommendation {
        Recommendation {
            id,
            name: format!("Song {id}"),
            youtube_link: format!("https://www.youtube.com/watch?v=song{id}"),
            score,
        }
    }

    fn valid_body() -> NewRecommendation {
        NewRecommendation::new(
            "Falamansa - Xote dos Milagres".to_string(),
            "https://www.youtube.com/watch?v=chwyjJbcs1Y".to_string(),
        )
    }

    fn scripted_random(draws: Vec<f64>) -> MockRandomSource {
        let mut random = MockRandomSource::new();
        let mut draws = draws.into_iter();
        random
            .expect_next_f64()
            .returning(move || draws.next().expect("unexpected random draw"));
        random
    }

    #[tokio::test]
    async fn test_insert_creates_when_name_is_free() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo
            .expect_find_by_name()
            .withf(|name| name == "Falamansa - Xote dos Milagres")
            .times(1)
            .returning(|_| Ok(None));

        mock_repo
            .expect_create()
            .times(1)
            .returning(|_| Ok(()));

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase.insert(valid_body()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_insert_duplicate_name_conflicts_without_write() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo
            .expect_find_by_name()
            .times(1)
            .returning(|_| Ok(Some(make_recommendation(1, 0))));

        mock_repo.expect_create().times(0);

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase.insert(valid_body()).await;

        assert!(matches!(result, Err(UsecaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_insert_invalid_link_fails_validation() {
        let mut mock_repo = MockRecommendationRepository::new();
        mock_repo.expect_find_by_name().times(0);
        mock_repo.expect_create().times(0);

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase
            .insert(NewRecommendation::new(
                "Song".to_string(),
                "https://example.com".to_string(),
            ))
            .await;

        assert!(matches!(result, Err(UsecaseError::Validation(_))));
    }

    #[tokio::test]
    async fn test_insert_empty_name_fails_validation() {
        let mut mock_repo = MockRecommendationRepository::new();
        mock_repo.expect_find_by_name().times(0);
        mock_repo.expect_create().times(0);

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase
            .insert(NewRecommendation::new(
                String::new(),
                "https://www.youtube.com/watch?v=chwyjJbcs1Y".to_string(),
            ))
            .await;

        assert!(matches!(result, Err(UsecaseError::Validation(msg)) if msg.contains("name")));
    }

    #[tokio::test]
    async fn test_insert_storage_unique_violation_is_conflict() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo.expect_find_by_name().returning(|_| Ok(None));
        mock_repo
            .expect_create()
            .returning(|_| Err(RepositoryError::Conflict("duplicate key".to_string())));

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase.insert(valid_body()).await;

        assert!(matches!(result, Err(UsecaseError::Conflict(msg)) if msg.contains("unique")));
    }

    #[tokio::test]
    async fn test_upvote_increments_score() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo
            .expect_find()
            .with(mockall::predicate::eq(3))
            .times(1)
            .returning(|id| Ok(Some(make_recommendation(id, 4))));

        mock_repo
            .expect_update_score()
            .with(
                mockall::predicate::eq(3),
                mockall::predicate::eq(ScoreChange::Increment),
            )
            .times(1)
            .returning(|id, _| Ok(make_recommendation(id, 5)));

        mock_repo.expect_remove().times(0);

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let updated = usecase.upvote(3).await.unwrap();

        assert_eq!(updated.score, 5);
    }

    #[tokio::test]
    async fn test_upvote_missing_recommendation() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo.expect_find().times(1).returning(|_| Ok(None));
        mock_repo.expect_update_score().times(0);

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase.upvote(42).await;

        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_downvote_decrements_and_keeps_above_threshold() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo
            .expect_find()
            .times(1)
            .returning(|id| Ok(Some(make_recommendation(id, -4))));

        mock_repo
            .expect_update_score()
            .with(
                mockall::predicate::eq(1),
                mockall::predicate::eq(ScoreChange::Decrement),
            )
            .times(1)
            .returning(|id, _| Ok(make_recommendation(id, -5)));

        mock_repo.expect_remove().times(0);

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        assert!(usecase.downvote(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_downvote_below_threshold_removes() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo
            .expect_find()
            .times(1)
            .returning(|id| Ok(Some(make_recommendation(id, -5))));

        mock_repo
            .expect_update_score()
            .times(1)
            .returning(|id, _| Ok(make_recommendation(id, -6)));

        mock_repo
            .expect_remove()
            .with(mockall::predicate::eq(1))
            .times(1)
            .returning(|_| Ok(()));

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        assert!(usecase.downvote(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_downvote_missing_recommendation() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo.expect_find().times(1).returning(|_| Ok(None));
        mock_repo.expect_update_score().times(0);
        mock_repo.expect_remove().times(0);

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase.downvote(9).await;

        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_lists_recent() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo
            .expect_find_recent()
            .with(mockall::predicate::eq(RECENT_LIMIT))
            .times(1)
            .returning(|_| Ok(vec![make_recommendation(2, 0), make_recommendation(1, 0)]));

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase.get().await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, 2);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo
            .expect_find()
            .with(mockall::predicate::eq(5))
            .returning(|id| Ok(Some(make_recommendation(id, 0))));

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase.get_by_id(5).await.unwrap();

        assert_eq!(result, make_recommendation(5, 0));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let mut mock_repo = MockRecommendationRepository::new();
        mock_repo.expect_find().returning(|_| Ok(None));

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase.get_by_id(5).await;

        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_top() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo
            .expect_get_top_by_score()
            .with(mockall::predicate::eq(1))
            .times(1)
            .returning(|_| Ok(vec![make_recommendation(1, 30)]));

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase.get_top(1).await.unwrap();

        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_get_top_negative_amount() {
        let mut mock_repo = MockRecommendationRepository::new();
        mock_repo.expect_get_top_by_score().times(0);

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase.get_top(-1).await;

        assert!(matches!(result, Err(UsecaseError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_random_prefers_great_band() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo
            .expect_find_all()
            .with(mockall::predicate::eq(Some(ScoreBand::Great)))
            .times(1)
            .returning(|_| Ok(vec![make_recommendation(1, 20), make_recommendation(2, 15)]));

        let usecase = RecommendationsUseCase::new(mock_repo, scripted_random(vec![0.3, 0.75]));
        let result = usecase.get_random().await.unwrap();

        assert_eq!(result.id, 2);
    }

    #[tokio::test]
    async fn test_get_random_prefers_regular_band() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo
            .expect_find_all()
            .with(mockall::predicate::eq(Some(ScoreBand::Regular)))
            .times(1)
            .returning(|_| Ok(vec![make_recommendation(4, 3)]));

        let usecase = RecommendationsUseCase::new(mock_repo, scripted_random(vec![0.8, 0.1]));
        let result = usecase.get_random().await.unwrap();

        assert_eq!(result.id, 4);
    }

    #[tokio::test]
    async fn test_get_random_falls_back_to_all() {
        let mut mock_repo = MockRecommendationRepository::new();
        let mut seq = mockall::Sequence::new();

        mock_repo
            .expect_find_all()
            .with(mockall::predicate::eq(Some(ScoreBand::Great)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![]));

        mock_repo
            .expect_find_all()
            .with(mockall::predicate::eq(None))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![make_recommendation(8, -2)]));

        let usecase = RecommendationsUseCase::new(mock_repo, scripted_random(vec![0.5, 0.9]));
        let result = usecase.get_random().await.unwrap();

        assert_eq!(result.id, 8);
    }

    #[tokio::test]
    async fn test_get_random_empty_set_draws_once() {
        let mut mock_repo = MockRecommendationRepository::new();

        mock_repo
            .expect_find_all()
            .times(2)
            .returning(|_| Ok(vec![]));

        let mut random = MockRandomSource::new();
        random.expect_next_f64().times(1).returning(|| 0.2);

        let usecase = RecommendationsUseCase::new(mock_repo, random);
        let result = usecase.get_random().await;

        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_repository_failure_is_internal() {
        let mut mock_repo = MockRecommendationRepository::new();
        mock_repo
            .expect_find_recent()
            .returning(|_| Err(RepositoryError::DatabaseError("connection reset".to_string())));

        let usecase = RecommendationsUseCase::new(mock_repo, MockRandomSource::new());
        let result = usecase.get().await;

        assert!(matches!(result, Err(UsecaseError::Internal(_))));
    }
}
