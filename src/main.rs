mod config;
mod delivery;
mod domain;
mod repository;
mod telemetry;
mod usecase;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::StorageKind;
use crate::delivery::http::v1::recommendations::{
    create_recommendation, downvote_recommendation, get_recommendation, list_recommendations,
    random_recommendation, top_recommendations, upvote_recommendation,
};
use crate::repository::memory::InMemoryRecommendationRepository;
use crate::repository::postgres::{create_pool, PostgresRecommendationRepository};
use crate::repository::RecommendationStore;
use crate::usecase::random::ThreadRandom;
use crate::usecase::recommendations::RecommendationsUseCase;

pub struct AppState {
    pub recommendations_usecase: RecommendationsUseCase<RecommendationStore, ThreadRandom>,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let tracer_provider = if config.telemetry_enabled {
        let telemetry_config = telemetry::TelemetryConfig::from(&config);
        Some(telemetry::init_telemetry_with_subscriber(&telemetry_config, env_filter)?)
    } else {
        telemetry::init_subscriber_without_telemetry(env_filter);
        None
    };

    tracing::info!("starting the recommendations service");

    let metrics_handle = PrometheusBuilder::new().install_recorder()?;
    metrics_process::Collector::default().describe();
    tracing::info!("prometheus metrics initialized");

    tracing::info!(storage = ?config.storage, telemetry_enabled = config.telemetry_enabled, "config loaded");

    let store = match config.storage {
        StorageKind::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required when STORAGE=postgres")?;
            let pool = create_pool(database_url, config.database_max_connections).await?;
            tracing::info!("database pool created");

            sqlx::migrate!().run(&pool).await?;
            tracing::info!("database migrations applied");

            RecommendationStore::Postgres(PostgresRecommendationRepository::new(pool))
        }
        StorageKind::Memory => {
            tracing::warn!("using in-memory storage, data is lost on shutdown");
            RecommendationStore::Memory(InMemoryRecommendationRepository::new())
        }
    };

    let recommendations_usecase = RecommendationsUseCase::new(store, ThreadRandom);

    let shared_state = Arc::new(AppState {
        recommendations_usecase,
        metrics_handle,
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("recommendations service running on {addr}");
    axum::serve(listener, app(shared_state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shared_state
        .recommendations_usecase
        .recommendation_repository()
        .close()
        .await;
    tracing::info!("storage closed");

    if let Some(provider) = tracer_provider {
        telemetry::shutdown_telemetry(provider);
    }

    Ok(())
}

fn app(shared_state: Arc<AppState>) -> Router {
    let recommendations_api = Router::new()
        .route(
            "/recommendations",
            get(list_recommendations).post(create_recommendation),
        )
        .route("/recommendations/random", get(random_recommendation))
        .route("/recommendations/top/{amount}", get(top_recommendations))
        .route("/recommendations/{id}", get(get_recommendation))
        .route("/recommendations/{id}/upvote", post(upvote_recommendation))
        .route("/recommendations/{id}/downvote", post(downvote_recommendation));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .merge(recommendations_api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    metrics_process::Collector::default().collect();
    state.metrics_handle.render()
}

#[tracing::instrument]
async fn healthz() -> &'static str {
    "OK"
}
