use serde::{Deserialize, Serialize};

/// One entry of a provider's top list, in the provider's own vocabulary.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderItem {
    /// Numeric store id. Only the App Store reports one.
    #[serde(default)]
    pub id: Option<String>,
    pub app_id: String,
    pub title: String,
    #[serde(default)]
    pub developer_id: String,
}
