pub mod requests;
pub mod responses;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    /// Exact, case-sensitive match on the wire names.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub publisher_id: String,
    pub name: String,
    pub platform: Platform,
    pub store_id: String,
    pub bundle_id: String,
    pub app_version: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    pub fn new(
        publisher_id: String,
        name: String,
        platform: Platform,
        store_id: String,
        bundle_id: String,
        app_version: Option<String>,
        is_published: bool,
    ) -> Self {
        let now = Utc::now();
        Game {
            id: Uuid::new_v4().to_string(),
            publisher_id,
            name,
            platform,
            store_id,
            bundle_id,
            app_version,
            is_published,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_candidate(candidate: GameCandidate) -> Self {
        Game::new(
            candidate.publisher_id,
            candidate.name,
            candidate.platform,
            candidate.store_id,
            candidate.bundle_id,
            None,
            candidate.is_published,
        )
    }

    /// Two records describe the same game iff name and platform are equal.
    pub fn has_natural_key(&self, name: &str, platform: Platform) -> bool {
        self.name == name && self.platform == platform
    }

    /// Copies the catalog-sourced fields of `candidate` onto this record.
    /// `app_version` is left alone. In-memory counterpart of
    /// `GameRepository::update_from_candidate`.
    pub fn apply_candidate(&mut self, candidate: &GameCandidate) {
        self.publisher_id = candidate.publisher_id.clone();
        self.name = candidate.name.clone();
        self.platform = candidate.platform;
        self.store_id = candidate.store_id.clone();
        self.bundle_id = candidate.bundle_id.clone();
        self.is_published = candidate.is_published;
        self.updated_at = Utc::now();
    }
}

/// A game derived from a provider listing that has not been persisted yet.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameCandidate {
    pub publisher_id: String,
    pub name: String,
    pub platform: Platform,
    pub store_id: String,
    pub bundle_id: String,
    pub is_published: bool,
}

/// An existing record paired with the candidate that should overwrite it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GameUpdate {
    pub old: Game,
    pub new: GameCandidate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameFilter {
    pub name: Option<String>,
    pub platform: Option<Platform>,
}

impl GameFilter {
    /// Builds a filter from raw search input. An empty name is treated as
    /// absent and any platform other than `ios`/`android` is ignored.
    pub fn from_search(name: Option<&str>, platform: Option<&str>) -> Self {
        GameFilter {
            name: name.filter(|name| !name.is_empty()).map(str::to_string),
            platform: platform.and_then(|platform| platform.parse().ok()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.platform.is_none()
    }

    /// In-memory form of the filter. `DynamoDbGameRepository` evaluates the
    /// same predicate as a scan filter expression.
    pub fn matches(&self, game: &Game) -> bool {
        let name_matches = self
            .name
            .as_deref()
            .map_or(true, |name| game.name.contains(name));
        let platform_matches = self
            .platform
            .map_or(true, |platform| game.platform == platform);
        name_matches && platform_matches
    }
}
