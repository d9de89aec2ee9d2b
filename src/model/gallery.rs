use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub category: Option<String>,
    pub object_key: String,
    pub url: String,
    pub content_type: String,
    pub size: i64,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}
