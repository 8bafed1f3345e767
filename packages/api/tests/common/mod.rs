#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;

use games_api::state::AppState;
use shared::models::game::{Game, GameCandidate, GameFilter, Platform};
use shared::models::provider::ProviderItem;
use shared::providers::errors::provider_errors::ProviderError;
use shared::providers::CatalogProvider;
use shared::repositories::errors::game_repository_errors::GameRepositoryError;
use shared::repositories::game_repository::{accept_new_games, GameRepository};
use shared::services::catalog_sync_service::CatalogSyncService;
use shared::services::game_service::GameService;

/// Vec-backed store that enforces the same natural-key uniqueness as the
/// DynamoDB table.
#[derive(Default)]
pub struct InMemoryGameRepository {
    games: RwLock<Vec<Game>>,
    failing_updates: HashSet<String>,
    fail_bulk_create: bool,
    app_version_after_list: Option<String>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_games(games: Vec<Game>) -> Self {
        Self {
            games: RwLock::new(games),
            ..Self::default()
        }
    }

    /// Updates of games with this name fail.
    pub fn failing_update_for(mut self, name: &str) -> Self {
        self.failing_updates.insert(name.to_string());
        self
    }

    /// Every stored game gets this `app_version` right after `list_games`
    /// has taken its snapshot, as if a client edited it mid-sync.
    pub fn editing_app_version_after_list(mut self, app_version: &str) -> Self {
        self.app_version_after_list = Some(app_version.to_string());
        self
    }

    pub fn failing_bulk_create(mut self) -> Self {
        self.fail_bulk_create = true;
        self
    }

    pub async fn snapshot(&self) -> Vec<Game> {
        self.games.read().await.clone()
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let mut games = self.games.write().await;
        if games
            .iter()
            .any(|existing| existing.has_natural_key(&game.name, game.platform))
        {
            return Err(GameRepositoryError::AlreadyExists);
        }
        games.push(game.clone());
        Ok(())
    }

    async fn bulk_create_games(
        &self,
        new_games: &[Game],
        ignore_duplicates: bool,
    ) -> Result<Vec<Game>, GameRepositoryError> {
        if self.fail_bulk_create {
            return Err(GameRepositoryError::DynamoDb("bulk insert failed".to_string()));
        }
        let mut games = self.games.write().await;
        let existing: HashSet<(String, Platform)> = games
            .iter()
            .map(|game| (game.name.clone(), game.platform))
            .collect();
        let accepted = accept_new_games(new_games, &existing, ignore_duplicates)?;
        games.extend(accepted.iter().cloned());
        Ok(accepted)
    }

    async fn list_games(&self) -> Result<Vec<Game>, GameRepositoryError> {
        let mut games = self.games.write().await;
        let snapshot = games.clone();
        if let Some(app_version) = &self.app_version_after_list {
            for game in games.iter_mut() {
                game.app_version = Some(app_version.clone());
            }
        }
        Ok(snapshot)
    }

    async fn find_games(&self, filter: &GameFilter) -> Result<Vec<Game>, GameRepositoryError> {
        let games = self.games.read().await;
        Ok(games
            .iter()
            .filter(|game| filter.matches(game))
            .cloned()
            .collect())
    }

    async fn get_game_by_id(&self, game_id: &str) -> Result<Game, GameRepositoryError> {
        let games = self.games.read().await;
        games
            .iter()
            .find(|game| game.id == game_id)
            .cloned()
            .ok_or(GameRepositoryError::NotFound)
    }

    async fn natural_key_exists(
        &self,
        name: &str,
        platform: Platform,
    ) -> Result<bool, GameRepositoryError> {
        let games = self.games.read().await;
        Ok(games.iter().any(|game| game.has_natural_key(name, platform)))
    }

    async fn update_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        if self.failing_updates.contains(&game.name) {
            return Err(GameRepositoryError::DynamoDb("update failed".to_string()));
        }
        let mut games = self.games.write().await;
        let stored = games
            .iter_mut()
            .find(|existing| existing.id == game.id)
            .ok_or(GameRepositoryError::NotFound)?;
        *stored = game.clone();
        Ok(())
    }

    async fn update_from_candidate(
        &self,
        game_id: &str,
        candidate: &GameCandidate,
    ) -> Result<(), GameRepositoryError> {
        if self.failing_updates.contains(&candidate.name) {
            return Err(GameRepositoryError::DynamoDb("update failed".to_string()));
        }
        let mut games = self.games.write().await;
        let stored = games
            .iter_mut()
            .find(|existing| existing.id == game_id)
            .ok_or(GameRepositoryError::NotFound)?;
        stored.apply_candidate(candidate);
        Ok(())
    }

    async fn delete_game(&self, game_id: &str) -> Result<(), GameRepositoryError> {
        let mut games = self.games.write().await;
        let before = games.len();
        games.retain(|game| game.id != game_id);
        if games.len() == before {
            return Err(GameRepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Provider that answers with a fixed list, or fails when built with `failing`.
pub struct StubProvider {
    platform: Platform,
    items: Option<Vec<ProviderItem>>,
}

impl StubProvider {
    pub fn returning(platform: Platform, items: Vec<ProviderItem>) -> Self {
        Self {
            platform,
            items: Some(items),
        }
    }

    pub fn failing(platform: Platform) -> Self {
        Self {
            platform,
            items: None,
        }
    }
}

#[async_trait]
impl CatalogProvider for StubProvider {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn list_top(&self, num: usize) -> Result<Vec<ProviderItem>, ProviderError> {
        match &self.items {
            Some(items) => Ok(items.iter().take(num).cloned().collect()),
            None => Err(ProviderError::UnexpectedStatus {
                provider: "stub",
                status: 503,
            }),
        }
    }
}

pub fn provider_item(title: &str, app_id: &str, developer_id: &str) -> ProviderItem {
    ProviderItem {
        id: None,
        app_id: app_id.to_string(),
        title: title.to_string(),
        developer_id: developer_id.to_string(),
    }
}

pub fn ios_item(title: &str, id: &str, app_id: &str, developer_id: &str) -> ProviderItem {
    ProviderItem {
        id: Some(id.to_string()),
        ..provider_item(title, app_id, developer_id)
    }
}

pub fn create_test_game(name: &str, platform: Platform) -> Game {
    Game::new(
        "publisher".to_string(),
        name.to_string(),
        platform,
        "store".to_string(),
        "com.example".to_string(),
        Some("1.0".to_string()),
        true,
    )
}

pub fn create_test_app(
    repository: Arc<InMemoryGameRepository>,
    android: StubProvider,
    ios: StubProvider,
) -> Router {
    let game_service = Arc::new(GameService::new(repository.clone()));
    let catalog_sync_service = Arc::new(CatalogSyncService::new(
        repository,
        Arc::new(android),
        Arc::new(ios),
    ));
    games_api::create_app(AppState {
        game_service,
        catalog_sync_service,
        await_sync_updates: false,
    })
}

/// Same as `create_test_app`, but populate waits for its updates the way the
/// Lambda deployment does.
pub fn create_lambda_app(
    repository: Arc<InMemoryGameRepository>,
    android: StubProvider,
    ios: StubProvider,
) -> Router {
    let game_service = Arc::new(GameService::new(repository.clone()));
    let catalog_sync_service = Arc::new(CatalogSyncService::new(
        repository,
        Arc::new(android),
        Arc::new(ios),
    ));
    games_api::create_app(AppState {
        game_service,
        catalog_sync_service,
        await_sync_updates: true,
    })
}

pub fn create_crud_app(repository: Arc<InMemoryGameRepository>) -> Router {
    create_test_app(
        repository,
        StubProvider::returning(Platform::Android, vec![]),
        StubProvider::returning(Platform::Ios, vec![]),
    )
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Polls `check` until it holds; background sync updates are not awaited by
/// the handler.
pub async fn eventually<F>(repository: &InMemoryGameRepository, check: F) -> bool
where
    F: Fn(&[Game]) -> bool,
{
    for _ in 0..50 {
        if check(&repository.snapshot().await) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
