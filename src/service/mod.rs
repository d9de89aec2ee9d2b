pub mod auth_service;
pub mod engine_page_service;
pub mod gallery_service;
pub mod quote_service;
pub mod reply_service;
pub mod settings_service;
pub mod sitemap_service;
pub mod submission;

use bson::oid::ObjectId;

use crate::util::error::ServiceError;

/// Path ids that are not valid ObjectIds cannot match a document.
pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id.trim()).map_err(|_| ServiceError::NotFound(format!("Unknown id: {}", id)))
}
