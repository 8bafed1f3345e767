use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::models::game::{Game, GameCandidate, GameUpdate, Platform};
use crate::models::provider::ProviderItem;
use crate::providers::CatalogProvider;
use crate::repositories::game_repository::GameRepository;
use crate::services::errors::catalog_sync_service_errors::CatalogSyncError;

pub const DEFAULT_POPULATE_LIMIT: usize = 100;

const IOS_TRACKING_SUFFIX: &str = "?uo=2";

/// Removes the App Store's trailing `?uo=2` tracking query from a developer id.
pub fn strip_tracking_suffix(developer_id: &str) -> &str {
    developer_id
        .strip_suffix(IOS_TRACKING_SUFFIX)
        .unwrap_or(developer_id)
}

pub fn normalize_android(item: &ProviderItem) -> GameCandidate {
    GameCandidate {
        publisher_id: item.developer_id.clone(),
        name: item.title.clone(),
        platform: Platform::Android,
        store_id: item.app_id.clone(),
        bundle_id: item.app_id.clone(),
        is_published: true,
    }
}

pub fn normalize_ios(item: &ProviderItem) -> GameCandidate {
    GameCandidate {
        publisher_id: strip_tracking_suffix(&item.developer_id).to_string(),
        name: item.title.clone(),
        platform: Platform::Ios,
        store_id: item.id.clone().unwrap_or_default(),
        bundle_id: item.app_id.clone(),
        is_published: true,
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct SyncPlan {
    pub to_insert: Vec<GameCandidate>,
    pub to_update: Vec<GameUpdate>,
}

/// Routes every candidate to either the insert set or the update set.
///
/// A candidate goes to update when some existing record shares its
/// `(name, platform)`. Each matching record yields its own update, so
/// duplicates already in the store are all refreshed rather than corrected.
pub fn partition(candidates: Vec<GameCandidate>, existing: &[Game]) -> SyncPlan {
    let mut plan = SyncPlan::default();
    for candidate in candidates {
        let mut matched = false;
        for game in existing
            .iter()
            .filter(|game| game.has_natural_key(&candidate.name, candidate.platform))
        {
            matched = true;
            plan.to_update.push(GameUpdate {
                old: game.clone(),
                new: candidate.clone(),
            });
        }
        if !matched {
            plan.to_insert.push(candidate);
        }
    }
    plan
}

#[derive(Debug)]
pub struct SyncOutcome {
    pub inserted: Vec<Game>,
    pub updates: Vec<GameUpdate>,
    /// Background updates. Dropping the handles detaches them.
    pub update_tasks: Vec<JoinHandle<()>>,
}

pub struct CatalogSyncService {
    repository: Arc<dyn GameRepository + Send + Sync>,
    android: Arc<dyn CatalogProvider + Send + Sync>,
    ios: Arc<dyn CatalogProvider + Send + Sync>,
    limit: usize,
}

impl CatalogSyncService {
    pub fn new(
        repository: Arc<dyn GameRepository + Send + Sync>,
        android: Arc<dyn CatalogProvider + Send + Sync>,
        ios: Arc<dyn CatalogProvider + Send + Sync>,
    ) -> Self {
        CatalogSyncService {
            repository,
            android,
            ios,
            limit: DEFAULT_POPULATE_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Pulls both top lists, reconciles them against the store and applies
    /// the result. Nothing is written unless both providers answered.
    pub async fn populate(&self) -> Result<SyncOutcome, CatalogSyncError> {
        let (android_items, ios_items) = tokio::try_join!(
            self.fetch(self.android.as_ref()),
            self.fetch(self.ios.as_ref()),
        )?;

        let candidates: Vec<GameCandidate> = android_items
            .iter()
            .map(normalize_android)
            .chain(ios_items.iter().map(normalize_ios))
            .collect();

        let existing = self.repository.list_games().await?;
        let plan = partition(candidates, &existing);
        info!(
            "Catalog sync: {} android and {} ios items, {} to insert, {} to update",
            android_items.len(),
            ios_items.len(),
            plan.to_insert.len(),
            plan.to_update.len()
        );

        let update_tasks = self.spawn_updates(&plan.to_update);

        let new_games: Vec<Game> = plan.to_insert.into_iter().map(Game::from_candidate).collect();
        let inserted = self.repository.bulk_create_games(&new_games, true).await?;
        debug!("Catalog sync inserted {} games", inserted.len());

        Ok(SyncOutcome {
            inserted,
            updates: plan.to_update,
            update_tasks,
        })
    }

    async fn fetch(
        &self,
        provider: &(dyn CatalogProvider + Send + Sync),
    ) -> Result<Vec<ProviderItem>, CatalogSyncError> {
        provider
            .list_top(self.limit)
            .await
            .map_err(|e| CatalogSyncError::Provider(provider.platform(), e))
    }

    // Each update runs on its own; a failure is logged and does not affect
    // the others or the caller. Only the catalog fields are written, so edits
    // made to the record after the snapshot (appVersion among them) survive.
    fn spawn_updates(&self, updates: &[GameUpdate]) -> Vec<JoinHandle<()>> {
        updates
            .iter()
            .cloned()
            .map(|update| {
                let repository = Arc::clone(&self.repository);
                tokio::spawn(async move {
                    let GameUpdate { old, new } = update;
                    match repository.update_from_candidate(&old.id, &new).await {
                        Ok(()) => debug!("Updated game {} ({})", old.id, new.name),
                        Err(e) => error!("Error updating game {} ({}): {}", old.id, new.name, e),
                    }
                })
            })
            .collect()
    }
}
