use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_dynamo::{from_item, to_attribute_value, to_item};
use tracing::{debug, warn};

use crate::models::game::{Game, GameCandidate, GameFilter, Platform};
use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[cfg(test)]
use mockall::automock;

/// Global secondary index keyed on `name` (partition) and `platform` (sort).
pub const NATURAL_KEY_INDEX: &str = "GSI_GameByNameAndPlatform";

/// BatchWriteItem accepts at most 25 put requests per call.
const BATCH_WRITE_LIMIT: usize = 25;

/// Catalog fields written by a sync update. `appVersion` is not among them.
const CANDIDATE_UPDATE_EXPRESSION: &str = "SET publisherId = :publisherId, #name = :name, \
     #platform = :platform, storeId = :storeId, bundleId = :bundleId, \
     isPublished = :isPublished, updatedAt = :updatedAt";

/// Picks the rows of `games` that may be written.
///
/// A row is a duplicate when its `(name, platform)` is in `existing` or was
/// already accepted earlier in the batch. Duplicates are skipped when
/// `ignore_duplicates` is set; otherwise the first one fails the whole batch.
/// Accepted rows keep their input order.
pub fn accept_new_games(
    games: &[Game],
    existing: &HashSet<(String, Platform)>,
    ignore_duplicates: bool,
) -> Result<Vec<Game>, GameRepositoryError> {
    let mut seen = HashSet::new();
    let mut accepted = Vec::with_capacity(games.len());
    for game in games {
        let key = (game.name.clone(), game.platform);
        if existing.contains(&key) || !seen.insert(key) {
            if !ignore_duplicates {
                return Err(GameRepositoryError::AlreadyExists);
            }
            warn!(
                "Skipping duplicate game {} ({}) during bulk insert",
                game.name, game.platform
            );
            continue;
        }
        accepted.push(game.clone());
    }
    Ok(accepted)
}

fn attribute<T: Serialize>(value: T) -> Result<AttributeValue, GameRepositoryError> {
    to_attribute_value(value).map_err(|e| GameRepositoryError::Serialization(e.to_string()))
}

fn candidate_update_values(
    candidate: &GameCandidate,
    updated_at: DateTime<Utc>,
) -> Result<HashMap<String, AttributeValue>, GameRepositoryError> {
    Ok(HashMap::from([
        (":publisherId".to_string(), attribute(&candidate.publisher_id)?),
        (":name".to_string(), attribute(&candidate.name)?),
        (":platform".to_string(), attribute(candidate.platform)?),
        (":storeId".to_string(), attribute(&candidate.store_id)?),
        (":bundleId".to_string(), attribute(&candidate.bundle_id)?),
        (":isPublished".to_string(), attribute(candidate.is_published)?),
        (":updatedAt".to_string(), attribute(updated_at)?),
    ]))
}

pub struct DynamoDbGameRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbGameRepository {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    async fn scan_games(&self, filter: &GameFilter) -> Result<Vec<Game>, GameRepositoryError> {
        let mut conditions = Vec::new();
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        if let Some(name) = &filter.name {
            conditions.push("contains(#name, :name)");
            names.insert("#name".to_string(), "name".to_string());
            values.insert(":name".to_string(), AttributeValue::S(name.clone()));
        }
        if let Some(platform) = filter.platform {
            conditions.push("#platform = :platform");
            names.insert("#platform".to_string(), "platform".to_string());
            values.insert(
                ":platform".to_string(),
                AttributeValue::S(platform.as_str().to_string()),
            );
        }

        let filter_expression = (!conditions.is_empty()).then(|| conditions.join(" AND "));
        let names = (!names.is_empty()).then_some(names);
        let values = (!values.is_empty()).then_some(values);

        let mut games = Vec::new();
        let mut start_key = None;
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_filter_expression(filter_expression.clone())
                .set_expression_attribute_names(names.clone())
                .set_expression_attribute_values(values.clone())
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| GameRepositoryError::DynamoDb(DisplayErrorContext(&e).to_string()))?;

            for item in output.items.unwrap_or_default() {
                let game: Game = from_item(item)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                games.push(game);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }
        Ok(games)
    }

    fn put_request(game: &Game) -> Result<WriteRequest, GameRepositoryError> {
        let item = to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        let put = PutRequest::builder()
            .set_item(Some(item))
            .build()
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;
        Ok(WriteRequest::builder().put_request(put).build())
    }
}

/// Persistent collection of games. Implementations own id assignment and
/// enforce uniqueness of the `(name, platform)` pair.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError>;
    /// Writes `games` in bulk and returns the rows that were stored. With
    /// `ignore_duplicates`, rows clashing on `(name, platform)` with the table or
    /// with an earlier row of the batch are skipped instead of failing the call.
    async fn bulk_create_games(
        &self,
        games: &[Game],
        ignore_duplicates: bool,
    ) -> Result<Vec<Game>, GameRepositoryError>;
    async fn list_games(&self) -> Result<Vec<Game>, GameRepositoryError>;
    async fn find_games(&self, filter: &GameFilter) -> Result<Vec<Game>, GameRepositoryError>;
    async fn get_game_by_id(&self, game_id: &str) -> Result<Game, GameRepositoryError>;
    async fn natural_key_exists(
        &self,
        name: &str,
        platform: Platform,
    ) -> Result<bool, GameRepositoryError>;
    async fn update_game(&self, game: &Game) -> Result<(), GameRepositoryError>;
    /// Writes only the catalog fields of `candidate` onto the stored game
    /// `game_id`, leaving every other attribute as it is in the store.
    async fn update_from_candidate(
        &self,
        game_id: &str,
        candidate: &GameCandidate,
    ) -> Result<(), GameRepositoryError>;
    async fn delete_game(&self, game_id: &str) -> Result<(), GameRepositoryError>;
}

#[async_trait]
impl GameRepository for DynamoDbGameRepository {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        if self.natural_key_exists(&game.name, game.platform).await? {
            return Err(GameRepositoryError::AlreadyExists);
        }
        let item = to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                if e.into_service_error().is_conditional_check_failed_exception() {
                    GameRepositoryError::AlreadyExists
                } else {
                    GameRepositoryError::DynamoDb(message)
                }
            })?;
        Ok(())
    }

    async fn bulk_create_games(
        &self,
        games: &[Game],
        ignore_duplicates: bool,
    ) -> Result<Vec<Game>, GameRepositoryError> {
        let mut checked = HashSet::new();
        let mut existing = HashSet::new();
        for game in games {
            let key = (game.name.clone(), game.platform);
            if checked.insert(key.clone())
                && self.natural_key_exists(&game.name, game.platform).await?
            {
                existing.insert(key);
            }
        }
        let accepted = accept_new_games(games, &existing, ignore_duplicates)?;

        for chunk in accepted.chunks(BATCH_WRITE_LIMIT) {
            let requests = chunk
                .iter()
                .map(Self::put_request)
                .collect::<Result<Vec<_>, _>>()?;
            let output = self
                .client
                .batch_write_item()
                .request_items(&self.table_name, requests)
                .send()
                .await
                .map_err(|e| GameRepositoryError::DynamoDb(DisplayErrorContext(&e).to_string()))?;

            let unprocessed = output
                .unprocessed_items
                .as_ref()
                .and_then(|items| items.get(&self.table_name))
                .map_or(0, Vec::len);
            if unprocessed > 0 {
                return Err(GameRepositoryError::DynamoDb(format!(
                    "{} of {} games were not written",
                    unprocessed,
                    chunk.len()
                )));
            }
            debug!("Wrote batch of {} games", chunk.len());
        }
        Ok(accepted)
    }

    async fn list_games(&self) -> Result<Vec<Game>, GameRepositoryError> {
        self.scan_games(&GameFilter::default()).await
    }

    async fn find_games(&self, filter: &GameFilter) -> Result<Vec<Game>, GameRepositoryError> {
        self.scan_games(filter).await
    }

    async fn get_game_by_id(&self, game_id: &str) -> Result<Game, GameRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(
                "id",
                to_attribute_value(game_id)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(DisplayErrorContext(&e).to_string()))?;
        if let Some(item) = output.item {
            let game: Game =
                from_item(item).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
            Ok(game)
        } else {
            Err(GameRepositoryError::NotFound)
        }
    }

    async fn natural_key_exists(
        &self,
        name: &str,
        platform: Platform,
    ) -> Result<bool, GameRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(NATURAL_KEY_INDEX)
            .key_condition_expression("#name = :name AND #platform = :platform")
            .expression_attribute_names("#name", "name")
            .expression_attribute_names("#platform", "platform")
            .expression_attribute_values(":name", AttributeValue::S(name.to_string()))
            .expression_attribute_values(
                ":platform",
                AttributeValue::S(platform.as_str().to_string()),
            )
            .limit(1)
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(DisplayErrorContext(&e).to_string()))?;
        Ok(output
            .items
            .as_ref()
            .is_some_and(|items| !items.is_empty()))
    }

    async fn update_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let item = to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_exists(id)")
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                if e.into_service_error().is_conditional_check_failed_exception() {
                    GameRepositoryError::NotFound
                } else {
                    GameRepositoryError::DynamoDb(message)
                }
            })?;
        Ok(())
    }

    async fn update_from_candidate(
        &self,
        game_id: &str,
        candidate: &GameCandidate,
    ) -> Result<(), GameRepositoryError> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("id", attribute(game_id)?)
            .update_expression(CANDIDATE_UPDATE_EXPRESSION)
            .condition_expression("attribute_exists(id)")
            .expression_attribute_names("#name", "name")
            .expression_attribute_names("#platform", "platform")
            .set_expression_attribute_values(Some(candidate_update_values(
                candidate,
                Utc::now(),
            )?))
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                if e.into_service_error().is_conditional_check_failed_exception() {
                    GameRepositoryError::NotFound
                } else {
                    GameRepositoryError::DynamoDb(message)
                }
            })?;
        Ok(())
    }

    async fn delete_game(&self, game_id: &str) -> Result<(), GameRepositoryError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(
                "id",
                to_attribute_value(game_id)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?,
            )
            .condition_expression("attribute_exists(id)")
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                if e.into_service_error().is_conditional_check_failed_exception() {
                    GameRepositoryError::NotFound
                } else {
                    GameRepositoryError::DynamoDb(message)
                }
            })?;
        Ok(())
    }
}
