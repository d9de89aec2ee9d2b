use axum::{
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{
    AdminConfig, AppConfig, ConfigError, EmailConfig, JwtConfig, MinioConfig, MongoConfig, QuoteApiConfig,
    RedisConfig, SiteConfig,
};
use crate::handler::auth_handler::AuthState;
use crate::middlewares::admin_middleware::{admin_page_guard, AdminAuthState};
use crate::repository::blob_store::{BlobStore, MemoryBlobStore};
use crate::repository::client_reply_repo::MongoClientReplyRepository;
use crate::repository::engine_page_repo::{EnginePageRepository, MongoEnginePageRepository};
use crate::repository::gallery_repo::MongoGalleryRepository;
use crate::repository::quote_store::{BlobQuoteRepository, QuoteRepository};
use crate::repository::settings_repo::MongoSettingsRepository;
use crate::router::{
    auth_router::auth_router, engine_page_router::engine_page_router, gallery_router::gallery_router,
    quote_router::quote_router, reply_router::reply_router, settings_router::settings_router,
    site_router::site_router,
};
use crate::service::auth_service::{AuthService, AuthServiceImpl};
use crate::service::engine_page_service::{EnginePageService, EnginePageServiceImpl};
use crate::service::gallery_service::{GalleryService, GalleryServiceImpl};
use crate::service::quote_service::{QuoteService, QuoteServiceImpl};
use crate::service::reply_service::{ReplyService, ReplyServiceImpl};
use crate::service::settings_service::{SettingsService, SettingsServiceImpl};
use crate::service::sitemap_service::{SitemapService, SitemapServiceImpl};
use crate::service::submission::{build_attempts, InternalEmailChannel, QuoteIntakeService, QuoteIntakeServiceImpl};
use crate::util::email::{Mailer, SmtpEmailService};
use crate::util::error::ServiceError;
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::minio::{MinioService, ObjectStorage};
use crate::util::redis::RedisService;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("MongoDB error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("Service setup error: {0}")]
    Service(#[from] ServiceError),
    #[error("Invalid listen address: {0}")]
    Address(String),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Every service the HTTP layer needs, behind traits so tests can swap fakes in.
pub struct AppServices {
    pub intake: Arc<dyn QuoteIntakeService>,
    pub quotes: Arc<dyn QuoteService>,
    pub replies: Arc<dyn ReplyService>,
    pub gallery: Arc<dyn GalleryService>,
    pub engine_pages: Arc<dyn EnginePageService>,
    pub settings: Arc<dyn SettingsService>,
    pub sitemap: Arc<dyn SitemapService>,
    pub auth: Arc<dyn AuthService>,
    /// Bearer token of the inbound client-reply bridge.
    pub backend_token: Option<String>,
}

pub fn build_router(services: AppServices, config: &AppConfig) -> Router {
    let admin_auth_state = Arc::new(AdminAuthState {
        auth_service: services.auth.clone(),
        backend_token: services.backend_token,
    });
    let auth_state = Arc::new(AuthState {
        auth_service: services.auth,
        cookie_secure: config.cookie_secure,
    });

    let mut router = Router::new()
        .merge(quote_router(services.intake, services.quotes, admin_auth_state.clone()))
        .merge(reply_router(services.replies, admin_auth_state.clone()))
        .merge(gallery_router(services.gallery, admin_auth_state.clone()))
        .merge(engine_page_router(services.engine_pages, admin_auth_state.clone()))
        .merge(settings_router(services.settings, admin_auth_state.clone()))
        .merge(auth_router(auth_state, admin_auth_state.clone()))
        .merge(site_router(services.sitemap));

    // The built front-end answers every other path; `/admin/*` goes through the page guard.
    if let Some(dist) = &config.site_dist_dir {
        let index = Path::new(dist).join("index.html");
        router = router.fallback_service(ServeDir::new(dist).fallback(ServeFile::new(index)));
    }

    let router = router
        .layer(middleware::from_fn_with_state(admin_auth_state, admin_page_guard))
        .layer(TraceLayer::new_for_http());

    match HeaderValue::from_str(&config.public_site_url) {
        Ok(origin) => router.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_credentials(true),
        ),
        Err(_) => {
            warn!("PUBLIC_SITE_URL is not a valid origin, CORS disabled");
            router
        }
    }
}

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Result<Self, StartupError> {
        let config = AppConfig::from_env();
        let site = SiteConfig::from_env();
        let quote_api = QuoteApiConfig::from_env()?;
        let jwt_config = JwtConfig::from_env()?;
        let admin_config = AdminConfig::from_env()?;
        let mongo_config = MongoConfig::from_env()?;

        let db = crate::repository::mongo::connect(&mongo_config).await?;
        let blob_store = Self::blob_store().await;
        let mailer = Self::mailer();
        let storage = Self::object_storage().await;

        let quotes: Arc<dyn QuoteRepository> = Arc::new(BlobQuoteRepository::new(blob_store));
        let engine_page_repo: Arc<dyn EnginePageRepository> = Arc::new(MongoEnginePageRepository::new(&db));

        let email_channel = mailer
            .clone()
            .map(|mailer| Arc::new(InternalEmailChannel::new(mailer, site.site_label.clone())));
        let attempts = build_attempts(&quote_api, email_channel.clone(), &site);

        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let auth = AuthServiceImpl::new(admin_config, jwt_utils)?;

        let services = AppServices {
            intake: Arc::new(QuoteIntakeServiceImpl { quotes: quotes.clone(), attempts, email_channel }),
            quotes: Arc::new(QuoteServiceImpl::new(quotes.clone())),
            replies: Arc::new(ReplyServiceImpl {
                quotes,
                client_replies: Arc::new(MongoClientReplyRepository::new(&db)),
                mailer,
            }),
            gallery: Arc::new(GalleryServiceImpl {
                gallery_repo: Arc::new(MongoGalleryRepository::new(&db)),
                storage,
            }),
            engine_pages: Arc::new(EnginePageServiceImpl { engine_page_repo: engine_page_repo.clone() }),
            settings: Arc::new(SettingsServiceImpl {
                settings_repo: Arc::new(MongoSettingsRepository::new(&db)),
                defaults: site,
            }),
            sitemap: Arc::new(SitemapServiceImpl {
                engine_page_repo,
                base_url: config.public_site_url.clone(),
            }),
            auth: Arc::new(auth),
            backend_token: quote_api.backend_token,
        };

        let router = build_router(services, &config);
        Ok(App { config, router })
    }

    /// Redis when configured and reachable, otherwise an in-process store.
    async fn blob_store() -> Arc<dyn BlobStore> {
        let config = match RedisConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                warn!("Redis not configured ({e}), quotes are kept in memory");
                return Arc::new(MemoryBlobStore::new());
            }
        };
        match RedisService::new(config).await {
            Ok(redis) => Arc::new(redis),
            Err(e) => {
                warn!("Redis unavailable ({e}), quotes are kept in memory");
                Arc::new(MemoryBlobStore::new())
            }
        }
    }

    fn mailer() -> Option<Arc<dyn Mailer>> {
        let config = match EmailConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                warn!("SMTP not configured ({e}), e-mail channel disabled");
                return None;
            }
        };
        match SmtpEmailService::new(config) {
            Ok(service) => Some(Arc::new(service)),
            Err(e) => {
                warn!("SMTP transport failed to build ({e}), e-mail channel disabled");
                None
            }
        }
    }

    async fn object_storage() -> Option<Arc<dyn ObjectStorage>> {
        let config = match MinioConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                warn!("MinIO not configured ({e}), gallery uploads disabled");
                return None;
            }
        };
        match MinioService::new(config).await {
            Ok(service) => Some(Arc::new(service)),
            Err(e) => {
                warn!("MinIO unavailable ({e}), gallery uploads disabled");
                None
            }
        }
    }

    pub async fn start(self) -> Result<(), StartupError> {
        let host = self
            .config
            .host
            .parse()
            .map_err(|_| StartupError::Address(self.config.host.clone()))?;
        let addr = SocketAddr::new(host, self.config.port);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("🚀 Server running at http://{}", addr);
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
