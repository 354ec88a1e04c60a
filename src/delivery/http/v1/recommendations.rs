use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::domain::recommendation::NewRecommendation;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecommendationRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub youtube_link: String,
}

#[tracing::instrument(skip(state, payload))]
pub async fn create_recommendation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRecommendationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling create recommendation request");

    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!(status = %rejection.status(), "rejected request body");
        UsecaseError::Validation(rejection.body_text())
    })?;

    if let Err(validation_errors) = payload.validate() {
        tracing::warn!(?validation_errors, "validation failed");
        return Err(UsecaseError::Validation(format!("{:?}", validation_errors)));
    }

    state
        .recommendations_usecase
        .insert(NewRecommendation::new(payload.name, payload.youtube_link))
        .await?;

    Ok(StatusCode::CREATED)
}

#[tracing::instrument(skip(state))]
pub async fn list_recommendations(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling list recommendations request");

    let recommendations = state.recommendations_usecase.get().await?;

    tracing::debug!(count = recommendations.len(), "recommendations listed successfully");
    Ok((StatusCode::OK, Json(recommendations)))
}

#[tracing::instrument(skip(state))]
pub async fn random_recommendation(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling random recommendation request");

    let recommendation = state.recommendations_usecase.get_random().await?;

    tracing::debug!(recommendation_id = recommendation.id, "random recommendation picked");
    Ok((StatusCode::OK, Json(recommendation)))
}

#[tracing::instrument(skip(state))]
pub async fn top_recommendations(
    State(state): State<Arc<AppState>>,
    Path(amount): Path<i64>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling top recommendations request");

    let recommendations = state.recommendations_usecase.get_top(amount).await?;

    Ok((StatusCode::OK, Json(recommendations)))
}

#[tracing::instrument(skip(state))]
pub async fn get_recommendation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling get recommendation request");

    let recommendation = state.recommendations_usecase.get_by_id(id).await?;

    Ok((StatusCode::OK, Json(recommendation)))
}

#[tracing::instrument(skip(state))]
pub async fn upvote_recommendation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling upvote request");

    let recommendation = state.recommendations_usecase.upvote(id).await?;

    tracing::debug!(recommendation_id = id, score = recommendation.score, "upvote applied");
    Ok(StatusCode::OK)
}

#[tracing::instrument(skip(state))]
pub async fn downvote_recommendation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling downvote request");

    state.recommendations_usecase.downvote(id).await?;

    Ok(StatusCode::OK)
}
