use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::dto::engine_page_dto::{
    EnginePageDto, EnginePageListQuery, EnginePageRequest, ImportReport, ImportRowError,
};
use crate::dto::pagination::{normalize, ListQuery, Page};
use crate::model::engine_page::{BrandCount, EnginePage};
use crate::model::quote::non_blank;
use crate::repository::engine_page_repo::{EnginePageFilter, EnginePageRepository};
use crate::service::parse_object_id;
use crate::util::error::ServiceError;
use crate::util::slug::slugify;

#[async_trait]
pub trait EnginePageService: Send + Sync {
    async fn list_admin(&self, query: ListQuery) -> Result<Page<EnginePageDto>, ServiceError>;
    async fn get(&self, id: &str) -> Result<EnginePageDto, ServiceError>;
    async fn create(&self, request: EnginePageRequest) -> Result<EnginePageDto, ServiceError>;
    async fn update(&self, id: &str, request: EnginePageRequest) -> Result<EnginePageDto, ServiceError>;
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
    /// Upsert by code; a bad row is reported and the rest still go through.
    async fn import(&self, rows: Vec<Value>) -> Result<ImportReport, ServiceError>;

    async fn list_public(&self, query: EnginePageListQuery) -> Result<Page<EnginePageDto>, ServiceError>;
    async fn brands(&self) -> Result<Vec<BrandCount>, ServiceError>;
    async fn list_by_brand(&self, marque: &str, query: ListQuery) -> Result<Page<EnginePageDto>, ServiceError>;
    /// Published page by slug, or by engine code.
    async fn get_public(&self, slug_or_code: &str) -> Result<EnginePageDto, ServiceError>;
}

pub struct EnginePageServiceImpl {
    pub engine_page_repo: Arc<dyn EnginePageRepository>,
}

fn invalid(e: validator::ValidationErrors) -> ServiceError {
    ServiceError::InvalidInput(format!("Validation error: {}", e))
}

fn text(value: Option<String>) -> String {
    value.and_then(non_blank).unwrap_or_default()
}

/// Turn a request into a page, keeping id, creation date and unset flags from `existing`.
pub fn build_page(request: EnginePageRequest, existing: Option<&EnginePage>) -> Result<EnginePage, ServiceError> {
    request.validate().map_err(invalid)?;

    let code = request.code.trim().to_string();
    let brand = request.brand.trim().to_string();
    if code.is_empty() || brand.is_empty() {
        return Err(ServiceError::InvalidInput("code and brand are required".to_string()));
    }

    let slug = request
        .slug
        .as_deref()
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| slugify(&code));
    if slug.is_empty() {
        return Err(ServiceError::InvalidInput(format!("Cannot derive a slug from code {}", code)));
    }
    let brand_slug = slugify(&brand);
    if brand_slug.is_empty() {
        return Err(ServiceError::InvalidInput(format!("Cannot derive a slug from brand {}", brand)));
    }

    let title = request
        .title
        .and_then(non_blank)
        .unwrap_or_else(|| format!("Moteur {} {}", brand, code));
    let published = request
        .published
        .or(existing.map(|page| page.published))
        .unwrap_or(true);
    let now = Utc::now().to_rfc3339();

    Ok(EnginePage {
        id: existing.and_then(|page| page.id),
        slug,
        brand_slug,
        title,
        description: text(request.description),
        content: text(request.content),
        fuel: request.fuel.and_then(non_blank),
        displacement: request.displacement.and_then(non_blank),
        power: request.power.and_then(non_blank),
        compatible_models: request
            .compatible_models
            .into_iter()
            .filter_map(non_blank)
            .collect(),
        published,
        created_at: existing.map(|page| page.created_at.clone()).unwrap_or_else(|| now.clone()),
        updated_at: now,
        code,
        brand,
    })
}

impl EnginePageServiceImpl {
    async fn paged(&self, filter: EnginePageFilter, page: u32, limit: u32) -> Result<Page<EnginePageDto>, ServiceError> {
        let (pages, total) = self.engine_page_repo.search(&filter, page, limit).await?;
        Ok(Page::new(pages, total, page, limit).map(EnginePageDto::from))
    }

    /// `Ok(true)` for a created page, `Ok(false)` for an updated one.
    async fn upsert(&self, request: EnginePageRequest) -> Result<bool, ServiceError> {
        let existing = self.engine_page_repo.find_by_code(request.code.trim()).await?;
        let page = build_page(request, existing.as_ref())?;
        match existing {
            Some(_) => {
                self.engine_page_repo.replace(&page).await?;
                Ok(false)
            }
            None => {
                self.engine_page_repo.create(page).await?;
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl EnginePageService for EnginePageServiceImpl {
    #[instrument(skip(self))]
    async fn list_admin(&self, query: ListQuery) -> Result<Page<EnginePageDto>, ServiceError> {
        let (page, limit) = query.page_and_limit();
        let filter = EnginePageFilter {
            q: query.search().map(str::to_string),
            ..EnginePageFilter::default()
        };
        self.paged(filter, page, limit).await
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<EnginePageDto, ServiceError> {
        let page = self.engine_page_repo.get_by_id(parse_object_id(id)?).await?;
        Ok(page.into())
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    async fn create(&self, request: EnginePageRequest) -> Result<EnginePageDto, ServiceError> {
        let page = build_page(request, None)?;
        let res = self.engine_page_repo.create(page).await;
        match &res {
            Ok(_) => info!("Engine page created"),
            Err(e) => error!("Failed to create engine page: {e}"),
        }
        Ok(res?.into())
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    async fn update(&self, id: &str, request: EnginePageRequest) -> Result<EnginePageDto, ServiceError> {
        let existing = self.engine_page_repo.get_by_id(parse_object_id(id)?).await?;
        let page = build_page(request, Some(&existing))?;
        let res = self.engine_page_repo.replace(&page).await;
        match &res {
            Ok(()) => info!("Engine page updated"),
            Err(e) => error!("Failed to update engine page: {e}"),
        }
        res?;
        Ok(page.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.engine_page_repo.delete(parse_object_id(id)?).await?;
        info!("Engine page deleted");
        Ok(())
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn import(&self, rows: Vec<Value>) -> Result<ImportReport, ServiceError> {
        let mut report = ImportReport::default();
        for (index, row) in rows.into_iter().enumerate() {
            let code = row.get("code").and_then(Value::as_str).map(str::to_string);
            let outcome = match serde_json::from_value::<EnginePageRequest>(row) {
                Ok(request) => self.upsert(request).await,
                Err(e) => Err(ServiceError::InvalidInput(format!("Invalid row: {}", e))),
            };
            match outcome {
                Ok(true) => report.created += 1,
                Ok(false) => report.updated += 1,
                Err(e) => {
                    warn!("Import row {} rejected: {e}", index);
                    report.errors.push(ImportRowError { index, code, message: e.to_string() });
                }
            }
        }
        info!(
            "Engine page import done: {} created, {} updated, {} errors",
            report.created,
            report.updated,
            report.errors.len()
        );
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn list_public(&self, query: EnginePageListQuery) -> Result<Page<EnginePageDto>, ServiceError> {
        let (page, limit) = normalize(query.page, query.limit);
        let filter = EnginePageFilter {
            q: query.q.and_then(non_blank),
            published_only: true,
            brand_slug: query.marque.as_deref().map(slugify).filter(|s| !s.is_empty()),
        };
        self.paged(filter, page, limit).await
    }

    #[instrument(skip(self))]
    async fn brands(&self) -> Result<Vec<BrandCount>, ServiceError> {
        Ok(self.engine_page_repo.brands().await?)
    }

    #[instrument(skip(self))]
    async fn list_by_brand(&self, marque: &str, query: ListQuery) -> Result<Page<EnginePageDto>, ServiceError> {
        let brand_slug = slugify(marque);
        if brand_slug.is_empty() {
            return Err(ServiceError::NotFound(format!("Unknown brand: {}", marque)));
        }
        let (page, limit) = query.page_and_limit();
        let filter = EnginePageFilter {
            q: query.search().map(str::to_string),
            published_only: true,
            brand_slug: Some(brand_slug),
        };
        self.paged(filter, page, limit).await
    }

    #[instrument(skip(self))]
    async fn get_public(&self, slug_or_code: &str) -> Result<EnginePageDto, ServiceError> {
        self.engine_page_repo
            .find_by_slug_or_code(slug_or_code.trim())
            .await?
            .filter(|page| page.published)
            .map(EnginePageDto::from)
            .ok_or_else(|| ServiceError::NotFound(format!("Engine page not found: {}", slug_or_code)))
    }
}
