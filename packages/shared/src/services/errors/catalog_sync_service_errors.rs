use crate::models::game::Platform;
use crate::providers::errors::provider_errors::ProviderError;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[derive(Debug)]
pub enum CatalogSyncError {
    Provider(Platform, ProviderError),
    RepositoryError(GameRepositoryError),
}

impl std::fmt::Display for CatalogSyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSyncError::Provider(platform, err) => {
                write!(f, "Failed to fetch the {} catalog: {}", platform, err)
            }
            CatalogSyncError::RepositoryError(err) => write!(f, "Repository error: {}", err),
        }
    }
}

impl std::error::Error for CatalogSyncError {}

impl From<GameRepositoryError> for CatalogSyncError {
    fn from(err: GameRepositoryError) -> Self {
        CatalogSyncError::RepositoryError(err)
    }
}
