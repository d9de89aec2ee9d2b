use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::gallery_dto::{GalleryImageDto, GalleryPatchRequest, GalleryUploadForm, UploadedFile, MAX_IMAGE_BYTES};
use crate::dto::pagination::{ListQuery, Page};
use crate::model::gallery::GalleryImage;
use crate::model::quote::non_blank;
use crate::repository::gallery_repo::GalleryRepository;
use crate::service::parse_object_id;
use crate::util::error::ServiceError;
use crate::util::minio::ObjectStorage;

#[async_trait]
pub trait GalleryService: Send + Sync {
    async fn list_public(&self) -> Result<Vec<GalleryImageDto>, ServiceError>;
    async fn list_admin(&self, query: ListQuery) -> Result<Page<GalleryImageDto>, ServiceError>;
    async fn upload(&self, file: UploadedFile, form: GalleryUploadForm) -> Result<GalleryImageDto, ServiceError>;
    async fn update(&self, id: &str, patch: GalleryPatchRequest) -> Result<GalleryImageDto, ServiceError>;
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
}

pub struct GalleryServiceImpl {
    pub gallery_repo: Arc<dyn GalleryRepository>,
    /// `None` when MinIO is not configured; uploads are then refused.
    pub storage: Option<Arc<dyn ObjectStorage>>,
}

fn storage_unavailable() -> ServiceError {
    ServiceError::Upstream("Object storage is not configured".to_string())
}

pub fn object_key_for(file: &UploadedFile) -> String {
    format!("gallery/{}.{}", Uuid::new_v4(), file.extension())
}

fn trimmed(value: Option<String>) -> String {
    value.and_then(non_blank).unwrap_or_default()
}

#[async_trait]
impl GalleryService for GalleryServiceImpl {
    #[instrument(skip(self))]
    async fn list_public(&self) -> Result<Vec<GalleryImageDto>, ServiceError> {
        let images = self.gallery_repo.list_published().await?;
        info!("Fetched {} published gallery images", images.len());
        Ok(images.into_iter().map(GalleryImageDto::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_admin(&self, query: ListQuery) -> Result<Page<GalleryImageDto>, ServiceError> {
        let (page, limit) = query.page_and_limit();
        let (images, total) = self.gallery_repo.search(query.search(), page, limit).await?;
        Ok(Page::new(images, total, page, limit).map(GalleryImageDto::from))
    }

    #[instrument(skip(self, file, form), fields(filename = %file.filename, size = file.content.len()))]
    async fn upload(&self, file: UploadedFile, form: GalleryUploadForm) -> Result<GalleryImageDto, ServiceError> {
        form.validate()
            .map_err(|e| ServiceError::InvalidInput(format!("Validation error: {}", e)))?;
        if file.content.is_empty() {
            return Err(ServiceError::InvalidInput("The uploaded file is empty".to_string()));
        }
        if !file.is_image() {
            return Err(ServiceError::InvalidInput("Only image files can be uploaded".to_string()));
        }
        if file.content.len() > MAX_IMAGE_BYTES {
            return Err(ServiceError::InvalidInput("Images are limited to 5 MB".to_string()));
        }
        let storage = self.storage.as_ref().ok_or_else(storage_unavailable)?;

        let object_key = object_key_for(&file);
        let size = file.content.len() as i64;
        let res = storage.put_object(&object_key, file.content, Some(&file.content_type)).await;
        if let Err(e) = &res {
            error!("Failed to store gallery image {}: {e}", object_key);
        }
        res?;

        let now = Utc::now().to_rfc3339();
        let title = trimmed(form.title);
        let image = GalleryImage {
            id: None,
            alt: form.alt.and_then(non_blank).unwrap_or_else(|| title.clone()),
            title,
            category: form.category.and_then(non_blank),
            url: storage.public_url(&object_key),
            object_key,
            content_type: file.content_type,
            size,
            position: 0,
            published: true,
            created_at: now.clone(),
            updated_at: now,
        };
        let created = self.gallery_repo.create(image).await?;
        info!("Gallery image uploaded");
        Ok(created.into())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: GalleryPatchRequest) -> Result<GalleryImageDto, ServiceError> {
        patch
            .validate()
            .map_err(|e| ServiceError::InvalidInput(format!("Validation error: {}", e)))?;
        let object_id = parse_object_id(id)?;
        let mut image = self.gallery_repo.get_by_id(object_id).await?;

        if let Some(title) = patch.title {
            image.title = title.trim().to_string();
        }
        if let Some(alt) = patch.alt {
            image.alt = alt.trim().to_string();
        }
        if let Some(category) = patch.category {
            image.category = non_blank(category);
        }
        if let Some(position) = patch.position {
            image.position = position;
        }
        if let Some(published) = patch.published {
            image.published = published;
        }
        image.updated_at = Utc::now().to_rfc3339();

        self.gallery_repo.replace(&image).await?;
        info!("Gallery image updated");
        Ok(image.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let object_id = parse_object_id(id)?;
        let image = self.gallery_repo.get_by_id(object_id).await?;
        match &self.storage {
            Some(storage) => {
                if let Err(e) = storage.remove_object(&image.object_key).await {
                    warn!("Could not remove object {}: {e}", image.object_key);
                }
            }
            None => warn!("Object storage not configured, leaving {} in place", image.object_key),
        }
        self.gallery_repo.delete(object_id).await?;
        info!("Gallery image deleted");
        Ok(())
    }
}
