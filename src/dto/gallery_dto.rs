use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::gallery::GalleryImage;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// File pulled out of a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Extension taken from the file name, falling back to the MIME subtype.
    pub fn extension(&self) -> String {
        let from_name = self
            .filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));
        let from_type = self
            .content_type
            .strip_prefix("image/")
            .map(|sub| sub.split(['+', ';']).next().unwrap_or(sub))
            .filter(|sub| !sub.is_empty());
        from_name
            .or(from_type)
            .map(|ext| if ext.eq_ignore_ascii_case("jpeg") { "jpg".to_string() } else { ext.to_ascii_lowercase() })
            .unwrap_or_else(|| "bin".to_string())
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct GalleryUploadForm {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 300))]
    pub alt: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPatchRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 300))]
    pub alt: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    pub position: Option<i32>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImageDto {
    pub id: String,
    pub title: String,
    pub alt: String,
    pub category: Option<String>,
    pub url: String,
    pub content_type: String,
    pub size: i64,
    pub position: i32,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GalleryImage> for GalleryImageDto {
    fn from(image: GalleryImage) -> Self {
        GalleryImageDto {
            id: image.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: image.title,
            alt: image.alt,
            category: image.category,
            url: image.url,
            content_type: image.content_type,
            size: image.size,
            position: image.position,
            published: image.published,
            created_at: image.created_at,
            updated_at: image.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: &str) -> UploadedFile {
        UploadedFile { filename: name.to_string(), content_type: content_type.to_string(), content: Vec::new() }
    }

    #[test]
    fn test_extension() {
        assert_eq!(file("bloc.PNG", "image/png").extension(), "png");
        assert_eq!(file("photo", "image/jpeg").extension(), "jpg");
        assert_eq!(file("photo.jpeg", "image/jpeg").extension(), "jpg");
        assert_eq!(file("logo", "image/svg+xml").extension(), "svg");
        assert_eq!(file("x", "application/octet-stream").extension(), "bin");
    }

    #[test]
    fn test_is_image() {
        assert!(file("a.webp", "image/webp").is_image());
        assert!(!file("a.pdf", "application/pdf").is_image());
    }
}
