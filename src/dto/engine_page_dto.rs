use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::engine_page::EnginePage;

/// Body of create, update and each import row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnginePageRequest {
    #[validate(length(min = 1, max = 60))]
    pub code: String,
    #[serde(default)]
    #[validate(length(max = 120))]
    pub slug: Option<String>,
    /// Accepts the French `marque` key used by spreadsheet exports.
    #[serde(alias = "marque")]
    #[validate(length(min = 1, max = 80))]
    pub brand: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default)]
    pub displacement: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub compatible_models: Vec<String>,
    #[serde(default)]
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnginePageDto {
    pub id: String,
    pub code: String,
    pub slug: String,
    pub brand: String,
    pub brand_slug: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub fuel: Option<String>,
    pub displacement: Option<String>,
    pub power: Option<String>,
    pub compatible_models: Vec<String>,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<EnginePage> for EnginePageDto {
    fn from(page: EnginePage) -> Self {
        EnginePageDto {
            id: page.id.map(|id| id.to_hex()).unwrap_or_default(),
            code: page.code,
            slug: page.slug,
            brand: page.brand,
            brand_slug: page.brand_slug,
            title: page.title,
            description: page.description,
            content: page.content,
            fuel: page.fuel,
            displacement: page.displacement,
            power: page.power,
            compatible_models: page.compatible_models,
            published: page.published,
            created_at: page.created_at,
            updated_at: page.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRowError {
    pub index: usize,
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<ImportRowError>,
}

/// `?q=&page=&limit=&marque=` on the public engine page list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnginePageListQuery {
    pub q: Option<String>,
    pub marque: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
