use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::models::game::responses::ErrorResponse;
use shared::services::errors::{
    catalog_sync_service_errors::CatalogSyncError, game_service_errors::GameServiceError,
};

#[derive(Debug)]
pub enum ApiError {
    GameService(GameServiceError),
    CatalogSync(CatalogSyncError),
    InvalidBody(String),
}

impl From<GameServiceError> for ApiError {
    fn from(error: GameServiceError) -> Self {
        ApiError::GameService(error)
    }
}

impl From<CatalogSyncError> for ApiError {
    fn from(error: CatalogSyncError) -> Self {
        ApiError::CatalogSync(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::GameService(err) => write!(f, "{}", err),
            ApiError::CatalogSync(err) => write!(f, "{}", err),
            ApiError::InvalidBody(msg) => write!(f, "Invalid request body: {}", msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::GameService(GameServiceError::GameNotFound) => StatusCode::NOT_FOUND,
            ApiError::GameService(
                GameServiceError::ValidationError(_)
                | GameServiceError::GameAlreadyExists
                | GameServiceError::RepositoryError(_),
            ) => StatusCode::BAD_REQUEST,

            ApiError::CatalogSync(_) => StatusCode::BAD_REQUEST,

            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
