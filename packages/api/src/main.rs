use std::env::set_var;
use std::sync::Arc;

use lambda_http::{run, Error};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use games_api::config::AppConfig;
use games_api::state::AppState;
use shared::providers::app_store::AppStoreProvider;
use shared::providers::play_store::PlayStoreProvider;
use shared::repositories::game_repository::DynamoDbGameRepository;
use shared::services::catalog_sync_service::CatalogSyncService;
use shared::services::game_service::GameService;

#[tokio::main]
async fn main() -> Result<(), Error> {
    set_var("AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH", "true");
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    // Set up services
    let aws_config = aws_config::load_from_env().await;
    let client = aws_sdk_dynamodb::Client::new(&aws_config);
    let http_client = reqwest::Client::new();

    let game_repository = Arc::new(DynamoDbGameRepository::new(
        client,
        config.games_table.clone(),
    ));
    let game_service = Arc::new(GameService::new(game_repository.clone()));

    let android = Arc::new(PlayStoreProvider::new(
        http_client.clone(),
        config.play_scraper_url.clone(),
    ));
    let ios = Arc::new(AppStoreProvider::new(
        http_client,
        config.app_store_rss_url.clone(),
        config.app_store_country.clone(),
    ));
    let catalog_sync_service = Arc::new(
        CatalogSyncService::new(game_repository, android, ios).with_limit(config.populate_limit),
    );

    let app = games_api::create_app(AppState {
        game_service,
        catalog_sync_service,
        await_sync_updates: config.running_in_lambda,
    });

    if config.running_in_lambda {
        return run(app).await;
    }

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server is up on port {}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}
