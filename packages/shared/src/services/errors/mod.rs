pub mod catalog_sync_service_errors;
pub mod game_service_errors;
