use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// SEO page keyed by an engine reference code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnginePage {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub code: String,
    pub slug: String,
    pub brand: String,
    pub brand_slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default)]
    pub displacement: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub compatible_models: Vec<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Distinct brand with the number of published pages under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandCount {
    pub brand: String,
    pub brand_slug: String,
    pub count: u64,
}
