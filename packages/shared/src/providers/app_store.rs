use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::models::game::Platform;
use crate::models::provider::ProviderItem;
use crate::providers::errors::provider_errors::ProviderError;
use crate::providers::CatalogProvider;

const PROVIDER_NAME: &str = "App Store";
const GAMES_GENRE_ID: u32 = 6014;

#[derive(Debug, Deserialize)]
struct RssResponse {
    feed: RssFeed,
}

#[derive(Debug, Deserialize)]
struct RssFeed {
    #[serde(default)]
    entry: Option<RssEntries>,
}

// The feed collapses a single-entry list into a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RssEntries {
    Many(Vec<RssEntry>),
    One(Box<RssEntry>),
}

#[derive(Debug, Deserialize)]
struct RssEntry {
    #[serde(rename = "im:name")]
    name: RssLabel,
    id: RssId,
    #[serde(rename = "im:artist")]
    artist: Option<RssArtist>,
}

#[derive(Debug, Deserialize)]
struct RssLabel {
    label: String,
}

#[derive(Debug, Deserialize)]
struct RssId {
    attributes: RssIdAttributes,
}

#[derive(Debug, Deserialize)]
struct RssIdAttributes {
    #[serde(rename = "im:id")]
    id: String,
    #[serde(rename = "im:bundleId")]
    bundle_id: String,
}

#[derive(Debug, Deserialize)]
struct RssArtist {
    attributes: Option<RssArtistAttributes>,
}

#[derive(Debug, Deserialize)]
struct RssArtistAttributes {
    href: String,
}

impl From<RssEntry> for ProviderItem {
    fn from(entry: RssEntry) -> Self {
        let developer_id = entry
            .artist
            .and_then(|artist| artist.attributes)
            .map(|attributes| developer_id_from_url(&attributes.href))
            .unwrap_or_default();
        ProviderItem {
            id: Some(entry.id.attributes.id),
            app_id: entry.id.attributes.bundle_id,
            title: entry.name.label,
            developer_id,
        }
    }
}

/// `https://apps.apple.com/us/developer/acme/id123?uo=2` -> `123?uo=2`.
/// The tracking query is kept; callers decide whether to strip it.
fn developer_id_from_url(href: &str) -> String {
    href.split("/id").nth(1).unwrap_or_default().to_string()
}

/// Client for the public iTunes "top free applications" RSS feed,
/// restricted to the Games genre.
pub struct AppStoreProvider {
    client: Client,
    base_url: String,
    country: String,
}

impl AppStoreProvider {
    pub fn new(client: Client, base_url: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            country: country.into(),
        }
    }

    fn feed_url(&self, num: usize) -> String {
        format!(
            "{}/{}/rss/topfreeapplications/limit={}/genre={}/json",
            self.base_url.trim_end_matches('/'),
            self.country,
            num,
            GAMES_GENRE_ID
        )
    }
}

#[async_trait]
impl CatalogProvider for AppStoreProvider {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    async fn list_top(&self, num: usize) -> Result<Vec<ProviderItem>, ProviderError> {
        let response = self
            .client
            .get(self.feed_url(num))
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

        let body: RssResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("{}: {}", PROVIDER_NAME, e)))?;

        let items: Vec<ProviderItem> = match body.feed.entry {
            Some(RssEntries::Many(entries)) => entries.into_iter().map(ProviderItem::from).collect(),
            Some(RssEntries::One(entry)) => vec![ProviderItem::from(*entry)],
            None => Vec::new(),
        };
        debug!("{} returned {} items", PROVIDER_NAME, items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use test_case::test_case;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rss_entry(name: &str, id: &str, bundle_id: &str, artist_href: Option<&str>) -> Value {
        let mut entry = json!({
            "im:name": { "label": name },
            "id": {
                "label": format!("https://apps.apple.com/us/app/id{}", id),
                "attributes": { "im:id": id, "im:bundleId": bundle_id }
            },
            "im:price": { "attributes": { "amount": "0.00000", "currency": "USD" } }
        });
        entry["im:artist"] = match artist_href {
            Some(href) => json!({ "label": "Developer", "attributes": { "href": href } }),
            None => json!({ "label": "Developer" }),
        };
        entry
    }

    #[test_case("https://apps.apple.com/us/developer/acme/id284882218?uo=2", "284882218?uo=2" ; "with tracking suffix")]
    #[test_case("https://apps.apple.com/us/developer/acme/id284882218", "284882218" ; "plain")]
    #[test_case("https://apps.apple.com/us/developer/acme", "" ; "no id segment")]
    fn test_developer_id_from_url(href: &str, expected: &str) {
        assert_eq!(developer_id_from_url(href), expected);
    }

    #[tokio::test]
    async fn test_list_top_maps_feed_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/us/rss/topfreeapplications/limit=2/genre=6014/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "feed": {
                    "entry": [
                        rss_entry(
                            "Chess",
                            "111",
                            "com.chess.ios",
                            Some("https://apps.apple.com/us/developer/chess/id9?uo=2")
                        ),
                        rss_entry("Go", "222", "com.go.ios", None)
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = AppStoreProvider::new(Client::new(), server.uri(), "us");
        let items = provider.list_top(2).await.unwrap();

        assert_eq!(
            items,
            vec![
                ProviderItem {
                    id: Some("111".to_string()),
                    app_id: "com.chess.ios".to_string(),
                    title: "Chess".to_string(),
                    developer_id: "9?uo=2".to_string(),
                },
                ProviderItem {
                    id: Some("222".to_string()),
                    app_id: "com.go.ios".to_string(),
                    title: "Go".to_string(),
                    developer_id: String::new(),
                },
            ]
        );
        assert_eq!(provider.platform(), Platform::Ios);
    }

    #[tokio::test]
    async fn test_list_top_accepts_single_entry_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "feed": { "entry": rss_entry("Chess", "111", "com.chess.ios", None) }
            })))
            .mount(&server)
            .await;

        let provider = AppStoreProvider::new(Client::new(), server.uri(), "us");
        let items = provider.list_top(1).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Chess");
    }

    #[tokio::test]
    async fn test_list_top_accepts_empty_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "feed": {} })))
            .mount(&server)
            .await;

        let provider = AppStoreProvider::new(Client::new(), server.uri(), "gb");
        assert!(provider.list_top(100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_top_reports_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = AppStoreProvider::new(Client::new(), server.uri(), "us");
        let result = provider.list_top(100).await;

        assert!(matches!(
            result,
            Err(ProviderError::UnexpectedStatus { status: 404, .. })
        ));
    }
}
