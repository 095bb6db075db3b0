use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mealsmith_llm::anthropic::AnthropicProvider;
use mealsmith_llm::GenerationClient;
use mealsmith_worker::{JobRunner, RunnerConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mealsmith_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = mealsmith_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    mealsmith_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    let provider = AnthropicProvider::from_env().expect("Generation provider not configured");
    let generator = GenerationClient::with_default_policy(Arc::new(provider));

    let config = RunnerConfig::from_env();
    let runner = JobRunner::new(pool, generator, config);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        shutdown.cancel();
    });

    runner.run(cancel).await;
}
