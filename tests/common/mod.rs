#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use bson::oid::ObjectId;
use cpf_backend::app::app::{build_router, AppServices};
use cpf_backend::config::{AdminConfig, AppConfig, JwtConfig, SiteConfig};
use cpf_backend::model::client_reply::ClientReply;
use cpf_backend::model::engine_page::{BrandCount, EnginePage};
use cpf_backend::model::gallery::GalleryImage;
use cpf_backend::model::settings::SiteSettings;
use cpf_backend::repository::blob_store::MemoryBlobStore;
use cpf_backend::repository::client_reply_repo::ClientReplyRepository;
use cpf_backend::repository::engine_page_repo::{EnginePageFilter, EnginePageRepository};
use cpf_backend::repository::gallery_repo::GalleryRepository;
use cpf_backend::repository::quote_store::{BlobQuoteRepository, QuoteRepository};
use cpf_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use cpf_backend::repository::settings_repo::SettingsRepository;
use cpf_backend::service::auth_service::AuthServiceImpl;
use cpf_backend::service::engine_page_service::EnginePageServiceImpl;
use cpf_backend::service::gallery_service::GalleryServiceImpl;
use cpf_backend::service::quote_service::QuoteServiceImpl;
use cpf_backend::service::reply_service::ReplyServiceImpl;
use cpf_backend::service::settings_service::SettingsServiceImpl;
use cpf_backend::service::sitemap_service::SitemapServiceImpl;
use cpf_backend::service::submission::{ChannelAttempt, InternalEmailChannel, QuoteIntakeServiceImpl};
use cpf_backend::util::email::{EmailError, EmailMessage, Mailer};
use cpf_backend::util::jwt::JwtTokenUtilsImpl;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "changeme123";
pub const BACKEND_TOKEN: &str = "bridge-token-test";
pub const SITE_URL: &str = "https://moteurs.example.com";

/// Initialize tracing for tests
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Mailer that keeps every message instead of talking SMTP.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        RecordingMailer { sent: Mutex::new(Vec::new()), fail: true }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::SmtpError("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    fn quote_inbox(&self) -> &str {
        "atelier@example.com"
    }

    fn sender_name(&self) -> &str {
        "Moteurs Test"
    }
}

#[derive(Default)]
pub struct MemoryClientReplies {
    pub replies: Mutex<Vec<ClientReply>>,
    pub unavailable: bool,
}

#[async_trait]
impl ClientReplyRepository for MemoryClientReplies {
    async fn create(&self, mut reply: ClientReply) -> RepositoryResult<ClientReply> {
        reply.id = Some(ObjectId::new());
        self.replies.lock().unwrap().push(reply.clone());
        Ok(reply)
    }

    async fn list_for_quote(&self, quote_id: &str) -> RepositoryResult<Vec<ClientReply>> {
        if self.unavailable {
            return Err(RepositoryError::connection("replies store offline"));
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.quote_id == quote_id)
            .cloned()
            .collect())
    }
}

fn paged<T: Clone>(items: &[T], page: u32, limit: u32) -> Vec<T> {
    items
        .iter()
        .skip(((page.max(1) - 1) * limit) as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

#[derive(Default)]
pub struct MemoryGallery {
    pub images: Mutex<Vec<GalleryImage>>,
}

#[async_trait]
impl GalleryRepository for MemoryGallery {
    async fn create(&self, mut image: GalleryImage) -> RepositoryResult<GalleryImage> {
        image.id = Some(ObjectId::new());
        self.images.lock().unwrap().push(image.clone());
        Ok(image)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<GalleryImage> {
        self.images
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Gallery image not found: {}", id)))
    }

    async fn list_published(&self) -> RepositoryResult<Vec<GalleryImage>> {
        Ok(self.images.lock().unwrap().iter().filter(|i| i.published).cloned().collect())
    }

    async fn search(&self, q: Option<&str>, page: u32, limit: u32) -> RepositoryResult<(Vec<GalleryImage>, u64)> {
        let needle = q.map(str::to_lowercase);
        let matching: Vec<GalleryImage> = self
            .images
            .lock()
            .unwrap()
            .iter()
            .filter(|i| match &needle {
                Some(n) => i.title.to_lowercase().contains(n) || i.alt.to_lowercase().contains(n),
                None => true,
            })
            .cloned()
            .collect();
        Ok((paged(&matching, page, limit), matching.len() as u64))
    }

    async fn replace(&self, image: &GalleryImage) -> RepositoryResult<()> {
        let mut images = self.images.lock().unwrap();
        match images.iter_mut().find(|i| i.id == image.id) {
            Some(slot) => {
                *slot = image.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found("Gallery image not found")),
        }
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        self.images.lock().unwrap().retain(|i| i.id != Some(id));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryEnginePages {
    pub pages: Mutex<Vec<EnginePage>>,
}

impl MemoryEnginePages {
    fn matches(filter: &EnginePageFilter, page: &EnginePage) -> bool {
        if filter.published_only && !page.published {
            return false;
        }
        if let Some(brand_slug) = &filter.brand_slug {
            if &page.brand_slug != brand_slug {
                return false;
            }
        }
        match &filter.q {
            Some(q) => {
                let q = q.to_lowercase();
                page.code.to_lowercase().contains(&q)
                    || page.title.to_lowercase().contains(&q)
                    || page.brand.to_lowercase().contains(&q)
            }
            None => true,
        }
    }
}

#[async_trait]
impl EnginePageRepository for MemoryEnginePages {
    async fn create(&self, mut page: EnginePage) -> RepositoryResult<EnginePage> {
        let mut pages = self.pages.lock().unwrap();
        if pages.iter().any(|p| p.slug == page.slug || p.code == page.code) {
            return Err(RepositoryError::already_exists(format!("Engine page {} already exists", page.code)));
        }
        page.id = Some(ObjectId::new());
        pages.push(page.clone());
        Ok(page)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<EnginePage> {
        self.pages
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Engine page not found: {}", id)))
    }

    async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<EnginePage>> {
        Ok(self.pages.lock().unwrap().iter().find(|p| p.code == code).cloned())
    }

    async fn find_by_slug_or_code(&self, key: &str) -> RepositoryResult<Option<EnginePage>> {
        let pages = self.pages.lock().unwrap();
        Ok(pages
            .iter()
            .find(|p| p.slug == key)
            .or_else(|| pages.iter().find(|p| p.code == key))
            .cloned())
    }

    async fn search(&self, filter: &EnginePageFilter, page: u32, limit: u32) -> RepositoryResult<(Vec<EnginePage>, u64)> {
        let matching: Vec<EnginePage> = self
            .pages
            .lock()
            .unwrap()
            .iter()
            .filter(|p| Self::matches(filter, p))
            .cloned()
            .collect();
        Ok((paged(&matching, page, limit), matching.len() as u64))
    }

    async fn list_published(&self) -> RepositoryResult<Vec<EnginePage>> {
        Ok(self.pages.lock().unwrap().iter().filter(|p| p.published).cloned().collect())
    }

    async fn brands(&self) -> RepositoryResult<Vec<BrandCount>> {
        let mut counts: BTreeMap<String, BrandCount> = BTreeMap::new();
        for page in self.pages.lock().unwrap().iter().filter(|p| p.published) {
            counts
                .entry(page.brand_slug.clone())
                .or_insert_with(|| BrandCount { brand: page.brand.clone(), brand_slug: page.brand_slug.clone(), count: 0 })
                .count += 1;
        }
        Ok(counts.into_values().collect())
    }

    async fn replace(&self, page: &EnginePage) -> RepositoryResult<()> {
        let mut pages = self.pages.lock().unwrap();
        match pages.iter_mut().find(|p| p.id == page.id) {
            Some(slot) => {
                *slot = page.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found("Engine page not found")),
        }
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut pages = self.pages.lock().unwrap();
        let before = pages.len();
        pages.retain(|p| p.id != Some(id));
        if pages.len() == before {
            return Err(RepositoryError::not_found(format!("Engine page not found: {}", id)));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySettings {
    pub stored: Mutex<Option<SiteSettings>>,
}

#[async_trait]
impl SettingsRepository for MemorySettings {
    async fn get(&self) -> RepositoryResult<Option<SiteSettings>> {
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save(&self, settings: &SiteSettings) -> RepositoryResult<()> {
        *self.stored.lock().unwrap() = Some(settings.clone());
        Ok(())
    }
}

/// Knobs for one test application.
#[derive(Default)]
pub struct TestOptions {
    pub mailer: Option<Arc<RecordingMailer>>,
    pub attempts: Vec<Arc<dyn ChannelAttempt>>,
    pub replies_unavailable: bool,
    pub site: SiteConfig,
}

pub struct TestApp {
    pub router: Router,
    pub quotes: Arc<dyn QuoteRepository>,
    pub client_replies: Arc<MemoryClientReplies>,
    pub engine_pages: Arc<MemoryEnginePages>,
}

pub fn app_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        public_site_url: SITE_URL.to_string(),
        site_dist_dir: None,
        cookie_secure: false,
    }
}

pub fn setup_app(options: TestOptions) -> TestApp {
    init_tracing();
    let quotes: Arc<dyn QuoteRepository> = Arc::new(BlobQuoteRepository::new(Arc::new(MemoryBlobStore::new())));
    let client_replies = Arc::new(MemoryClientReplies {
        unavailable: options.replies_unavailable,
        ..MemoryClientReplies::default()
    });
    let engine_pages = Arc::new(MemoryEnginePages::default());

    let mailer = options.mailer.map(|m| m as Arc<dyn Mailer>);
    let email_channel = mailer
        .clone()
        .map(|m| Arc::new(InternalEmailChannel::new(m, options.site.site_label.clone())));

    let admin = AdminConfig { password: Some(ADMIN_PASSWORD.to_string()), password_hash: None };
    let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()));
    let auth = AuthServiceImpl::new(admin, jwt_utils).expect("auth service");

    let services = AppServices {
        intake: Arc::new(QuoteIntakeServiceImpl {
            quotes: quotes.clone(),
            attempts: options.attempts,
            email_channel,
        }),
        quotes: Arc::new(QuoteServiceImpl::new(quotes.clone())),
        replies: Arc::new(ReplyServiceImpl {
            quotes: quotes.clone(),
            client_replies: client_replies.clone(),
            mailer,
        }),
        gallery: Arc::new(GalleryServiceImpl {
            gallery_repo: Arc::new(MemoryGallery::default()),
            storage: None,
        }),
        engine_pages: Arc::new(EnginePageServiceImpl { engine_page_repo: engine_pages.clone() }),
        settings: Arc::new(SettingsServiceImpl {
            settings_repo: Arc::new(MemorySettings::default()),
            defaults: options.site,
        }),
        sitemap: Arc::new(SitemapServiceImpl {
            engine_page_repo: engine_pages.clone(),
            base_url: SITE_URL.to_string(),
        }),
        auth: Arc::new(auth),
        backend_token: Some(BACKEND_TOKEN.to_string()),
    };

    TestApp {
        router: build_router(services, &app_config()),
        quotes,
        client_replies,
        engine_pages,
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn with_cookie(mut req: Request<Body>, cookie: &str) -> Request<Body> {
    req.headers_mut().insert(header::COOKIE, cookie.parse().unwrap());
    req
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, json)
}

/// Logs in and returns the `name=value` pair to send back as a `Cookie` header.
pub async fn admin_cookie(app: &Router) -> String {
    let req = json_request("POST", "/api/auth/login", serde_json::json!({ "password": ADMIN_PASSWORD }));
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap()
        .to_string();
    set_cookie.split(';').next().unwrap().to_string()
}

/// Hand-built multipart body; `files` are `(field, filename, content type, bytes)`.
pub fn multipart_request(
    uri: &str,
    cookie: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &str, &[u8])],
) -> Request<Body> {
    let boundary = "cpf-test-boundary";
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    for (name, filename, content_type, data) in files {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}
