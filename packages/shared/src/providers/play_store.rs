use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::models::game::Platform;
use crate::models::provider::ProviderItem;
use crate::providers::errors::provider_errors::ProviderError;
use crate::providers::CatalogProvider;

const PROVIDER_NAME: &str = "Play Store";

/// Client for a google-play-scraper compatible HTTP service.
///
/// `GET {base_url}/apps?collection=TOP_FREE&category=GAME&num={num}` is
/// expected to answer with a JSON array of `{title, appId, developerId}`.
pub struct PlayStoreProvider {
    client: Client,
    base_url: String,
}

impl PlayStoreProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CatalogProvider for PlayStoreProvider {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    async fn list_top(&self, num: usize) -> Result<Vec<ProviderItem>, ProviderError> {
        let url = format!("{}/apps", self.base_url.trim_end_matches('/'));
        let num = num.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("collection", "TOP_FREE"),
                ("category", "GAME"),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Request(format!("{}: {}", PROVIDER_NAME, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                provider: PROVIDER_NAME,
                status: status.as_u16(),
            });
        }

        let items: Vec<ProviderItem> = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("{}: {}", PROVIDER_NAME, e)))?;
        debug!("{} returned {} items", PROVIDER_NAME, items.len());
        Ok(items)
    }
}
