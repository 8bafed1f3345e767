use std::sync::Arc;

use shared::services::catalog_sync_service::CatalogSyncService;
use shared::services::game_service::GameService;

#[derive(Clone)]
pub struct AppState {
    pub game_service: Arc<GameService>,
    pub catalog_sync_service: Arc<CatalogSyncService>,
    /// Hold the populate response until its updates finish. Needed on Lambda,
    /// where the sandbox is frozen once the response is sent.
    pub await_sync_updates: bool,
}
