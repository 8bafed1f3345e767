use serde::{Deserialize, Serialize};

use super::Platform;

/// Body of `POST /api/games` and `PUT /api/games/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameRequest {
    pub publisher_id: String,
    pub name: String,
    pub platform: Platform,
    pub store_id: String,
    pub bundle_id: String,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

/// Body of `POST /api/games/search`. Platform stays a raw string because
/// unknown values are ignored rather than rejected.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SearchRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}
