use serde::{Deserialize, Serialize};

use super::{Game, GameUpdate};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DeleteGameResponse {
    pub id: String,
}

/// Result of a catalog sync: the rows that were inserted and the
/// updates that were queued against existing rows.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PopulateResponse {
    pub insert: Vec<Game>,
    pub try_to_update: Vec<GameUpdate>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
