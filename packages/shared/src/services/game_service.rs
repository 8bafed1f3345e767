use std::sync::Arc;

use chrono::Utc;

use crate::models::game::requests::GameRequest;
use crate::models::game::{Game, GameFilter};
use crate::repositories::game_repository::GameRepository;
use crate::services::errors::game_service_errors::GameServiceError;

#[derive(Clone)]
pub struct GameService {
    repository: Arc<dyn GameRepository + Send + Sync>,
}

impl GameService {
    pub fn new(repository: Arc<dyn GameRepository + Send + Sync>) -> Self {
        GameService { repository }
    }

    pub async fn create_game(&self, request: &GameRequest) -> Result<Game, GameServiceError> {
        validate_request(request)?;
        if self
            .repository
            .natural_key_exists(&request.name, request.platform)
            .await?
        {
            return Err(GameServiceError::GameAlreadyExists);
        }
        let game = Game::new(
            request.publisher_id.clone(),
            request.name.clone(),
            request.platform,
            request.store_id.clone(),
            request.bundle_id.clone(),
            request.app_version.clone(),
            request.is_published,
        );
        self.repository.create_game(&game).await?;
        Ok(game)
    }

    pub async fn list_games(&self) -> Result<Vec<Game>, GameServiceError> {
        Ok(self.repository.list_games().await?)
    }

    pub async fn get_game_by_id(&self, game_id: &str) -> Result<Game, GameServiceError> {
        if game_id.is_empty() {
            return Err(GameServiceError::ValidationError(
                "Game ID cannot be empty".to_string(),
            ));
        }
        Ok(self.repository.get_game_by_id(game_id).await?)
    }

    /// Overwrites all seven client-editable fields of an existing game.
    pub async fn update_game(
        &self,
        game_id: &str,
        request: &GameRequest,
    ) -> Result<Game, GameServiceError> {
        validate_request(request)?;
        let mut game = self.get_game_by_id(game_id).await?;

        let renamed = !game.has_natural_key(&request.name, request.platform);
        if renamed
            && self
                .repository
                .natural_key_exists(&request.name, request.platform)
                .await?
        {
            return Err(GameServiceError::GameAlreadyExists);
        }

        game.publisher_id = request.publisher_id.clone();
        game.name = request.name.clone();
        game.platform = request.platform;
        game.store_id = request.store_id.clone();
        game.bundle_id = request.bundle_id.clone();
        game.app_version = request.app_version.clone();
        game.is_published = request.is_published;
        game.updated_at = Utc::now();

        self.repository.update_game(&game).await?;
        Ok(game)
    }

    pub async fn delete_game(&self, game_id: &str) -> Result<(), GameServiceError> {
        if game_id.is_empty() {
            return Err(GameServiceError::ValidationError(
                "Game ID cannot be empty".to_string(),
            ));
        }
        Ok(self.repository.delete_game(game_id).await?)
    }

    /// Substring match on name (case-sensitive) AND exact platform. With
    /// neither filter usable this is the full catalog.
    pub async fn search_games(
        &self,
        name: Option<&str>,
        platform: Option<&str>,
    ) -> Result<Vec<Game>, GameServiceError> {
        let filter = GameFilter::from_search(name, platform);
        if filter.is_empty() {
            return self.list_games().await;
        }
        Ok(self.repository.find_games(&filter).await?)
    }
}

fn validate_request(request: &GameRequest) -> Result<(), GameServiceError> {
    if request.name.is_empty()
        || request.publisher_id.is_empty()
        || request.store_id.is_empty()
        || request.bundle_id.is_empty()
    {
        return Err(GameServiceError::ValidationError(
            "Name, publisher ID, store ID, or bundle ID cannot be empty".to_string(),
        ));
    }
    Ok(())
}
