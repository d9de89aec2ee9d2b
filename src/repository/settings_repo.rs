use async_trait::async_trait;
use bson::doc;
use mongodb::{options::ReplaceOptions, Collection, Database};
use tracing::{info, instrument};

use crate::model::settings::SiteSettings;
use crate::repository::repository_error::RepositoryResult;

const SETTINGS_ID: &str = "site";

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self) -> RepositoryResult<Option<SiteSettings>>;
    async fn save(&self, settings: &SiteSettings) -> RepositoryResult<()>;
}

/// Stores the single settings document under a fixed `_id`.
pub struct MongoSettingsRepository {
    collection: Collection<SiteSettings>,
}

impl MongoSettingsRepository {
    pub fn new(db: &Database) -> Self {
        MongoSettingsRepository { collection: db.collection("settings") }
    }
}

#[async_trait]
impl SettingsRepository for MongoSettingsRepository {
    #[instrument(skip(self))]
    async fn get(&self) -> RepositoryResult<Option<SiteSettings>> {
        Ok(self.collection.find_one(doc! { "_id": SETTINGS_ID }, None).await?)
    }

    #[instrument(skip(self, settings))]
    async fn save(&self, settings: &SiteSettings) -> RepositoryResult<()> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection
            .replace_one(doc! { "_id": SETTINGS_ID }, settings, options)
            .await?;
        info!("Site settings saved");
        Ok(())
    }
}
