pub mod catalog_sync_service;
pub mod errors;
pub mod game_service;
