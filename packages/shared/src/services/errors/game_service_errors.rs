use std::fmt;

use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[derive(Debug)]
pub enum GameServiceError {
    RepositoryError(String),
    GameAlreadyExists,
    GameNotFound,
    ValidationError(String),
}

impl fmt::Display for GameServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
            GameServiceError::GameAlreadyExists => {
                write!(f, "A game with this name and platform already exists")
            }
            GameServiceError::GameNotFound => write!(f, "Game not found"),
            GameServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for GameServiceError {}

impl From<GameRepositoryError> for GameServiceError {
    fn from(err: GameRepositoryError) -> Self {
        match err {
            GameRepositoryError::NotFound => GameServiceError::GameNotFound,
            GameRepositoryError::AlreadyExists => GameServiceError::GameAlreadyExists,
            _ => GameServiceError::RepositoryError(err.to_string()),
        }
    }
}
