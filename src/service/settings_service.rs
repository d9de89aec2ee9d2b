use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::config::SiteConfig;
use crate::model::quote::non_blank;
use crate::model::settings::{PublicSite, SiteSettings};
use crate::repository::settings_repo::SettingsRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait SettingsService: Send + Sync {
    async fn get(&self) -> Result<SiteSettings, ServiceError>;
    async fn update(&self, settings: SiteSettings) -> Result<SiteSettings, ServiceError>;
    /// Public subset merged over the environment; never fails.
    async fn public_site(&self) -> PublicSite;
}

pub struct SettingsServiceImpl {
    pub settings_repo: Arc<dyn SettingsRepository>,
    pub defaults: SiteConfig,
}

fn cleaned(settings: SiteSettings) -> SiteSettings {
    SiteSettings {
        site_label: settings.site_label.and_then(non_blank),
        whatsapp_url: settings.whatsapp_url.and_then(non_blank),
        contact_email: settings.contact_email.and_then(non_blank),
        contact_phone: settings.contact_phone.and_then(non_blank),
        hero_video_urls: settings
            .hero_video_urls
            .into_iter()
            .filter_map(|(key, url)| non_blank(url).map(|url| (key.trim().to_lowercase(), url)))
            .filter(|(key, _)| !key.is_empty())
            .collect(),
        og_image: settings.og_image.and_then(non_blank),
        updated_at: Some(Utc::now().to_rfc3339()),
    }
}

#[async_trait]
impl SettingsService for SettingsServiceImpl {
    #[instrument(skip(self))]
    async fn get(&self) -> Result<SiteSettings, ServiceError> {
        Ok(self.settings_repo.get().await?.unwrap_or_default())
    }

    #[instrument(skip(self, settings))]
    async fn update(&self, settings: SiteSettings) -> Result<SiteSettings, ServiceError> {
        if let Some(email) = settings.contact_email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            crate::util::email::validate_email_address(email)?;
        }
        let settings = cleaned(settings);
        let res = self.settings_repo.save(&settings).await;
        match &res {
            Ok(()) => info!("Site settings saved"),
            Err(e) => error!("Failed to save site settings: {e}"),
        }
        res?;
        Ok(settings)
    }

    #[instrument(skip(self))]
    async fn public_site(&self) -> PublicSite {
        let stored = match self.settings_repo.get().await {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                warn!("Settings unavailable, serving environment defaults: {e}");
                SiteSettings::default()
            }
        };
        PublicSite::merge(&self.defaults, &stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaned_drops_blanks() {
        let mut settings = SiteSettings {
            site_label: Some("  ".to_string()),
            contact_phone: Some(" 06 12 34 56 78 ".to_string()),
            ..SiteSettings::default()
        };
        settings.hero_video_urls.insert(" Home ".to_string(), "home.mp4".to_string());
        settings.hero_video_urls.insert("empty".to_string(), " ".to_string());

        let cleaned = cleaned(settings);
        assert_eq!(cleaned.site_label, None);
        assert_eq!(cleaned.contact_phone.as_deref(), Some("06 12 34 56 78"));
        assert_eq!(cleaned.hero_video_urls.len(), 1);
        assert_eq!(cleaned.hero_video_urls["home"], "home.mp4");
        assert!(cleaned.updated_at.is_some());
    }
}
