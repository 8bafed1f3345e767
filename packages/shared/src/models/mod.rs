pub mod game;
pub mod provider;
