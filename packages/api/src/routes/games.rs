use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use futures::future::join_all;
use tracing::{debug, error, info};

use crate::{error::ApiError, state::AppState};
use shared::models::game::requests::{GameRequest, SearchRequest};
use shared::models::game::responses::{DeleteGameResponse, PopulateResponse};
use shared::models::game::Game;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/games", get(list_games).post(create_game))
        .route("/api/games/search", post(search_games))
        .route("/api/games/populate", get(populate_games))
        .route(
            "/api/games/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
}

async fn list_games(State(state): State<AppState>) -> Result<Json<Vec<Game>>, ApiError> {
    state.game_service.list_games().await.map(Json).map_err(|e| {
        error!("There was an error querying games: {}", e);
        ApiError::from(e)
    })
}

async fn create_game(
    State(state): State<AppState>,
    payload: Result<Json<GameRequest>, JsonRejection>,
) -> Result<Json<Game>, ApiError> {
    let Json(request) = payload?;
    let game = state.game_service.create_game(&request).await.map_err(|e| {
        error!("There was an error creating game {}: {}", request.name, e);
        ApiError::from(e)
    })?;
    debug!("Game created successfully: {}", game.id);
    Ok(Json(game))
}

async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<Game>, ApiError> {
    state
        .game_service
        .get_game_by_id(&game_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to retrieve game {}: {}", game_id, e);
            ApiError::from(e)
        })
}

async fn update_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    payload: Result<Json<GameRequest>, JsonRejection>,
) -> Result<Json<Game>, ApiError> {
    let Json(request) = payload?;
    let game = state
        .game_service
        .update_game(&game_id, &request)
        .await
        .map_err(|e| {
            error!("Error updating game {}: {}", game_id, e);
            ApiError::from(e)
        })?;
    debug!("Game updated successfully: {}", game_id);
    Ok(Json(game))
}

async fn delete_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<DeleteGameResponse>, ApiError> {
    state
        .game_service
        .delete_game(&game_id)
        .await
        .map_err(|e| {
            error!("Error deleting game {}: {}", game_id, e);
            ApiError::from(e)
        })?;
    debug!("Game deleted successfully: {}", game_id);
    Ok(Json(DeleteGameResponse { id: game_id }))
}

async fn search_games(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<Game>>, ApiError> {
    let Json(request) = payload?;
    state
        .game_service
        .search_games(request.name.as_deref(), request.platform.as_deref())
        .await
        .map(Json)
        .map_err(|e| {
            error!("There was an error querying games: {}", e);
            ApiError::from(e)
        })
}

async fn populate_games(State(state): State<AppState>) -> Result<Json<PopulateResponse>, ApiError> {
    let outcome = state.catalog_sync_service.populate().await.map_err(|e| {
        error!("There was an error creating the top games of each store: {}", e);
        ApiError::from(e)
    })?;
    info!(
        "Populated {} new games, {} updates queued",
        outcome.inserted.len(),
        outcome.updates.len()
    );
    if state.await_sync_updates {
        for result in join_all(outcome.update_tasks).await {
            if let Err(e) = result {
                error!("Catalog sync update task did not complete: {}", e);
            }
        }
    } else {
        // Dropping the handles lets the queued updates finish in the background.
        drop(outcome.update_tasks);
    }
    Ok(Json(PopulateResponse {
        insert: outcome.inserted,
        try_to_update: outcome.updates,
    }))
}
