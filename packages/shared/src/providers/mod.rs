pub mod app_store;
pub mod errors;
pub mod play_store;

use async_trait::async_trait;

use crate::models::game::Platform;
use crate::models::provider::ProviderItem;
use crate::providers::errors::provider_errors::ProviderError;

#[cfg(test)]
use mockall::automock;

/// A read-only source of ranked "top free games" for one platform.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    fn platform(&self) -> Platform;
    async fn list_top(&self, num: usize) -> Result<Vec<ProviderItem>, ProviderError>;
}
