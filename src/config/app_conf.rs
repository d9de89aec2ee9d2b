use std::env;
use tracing::warn;

use crate::config::{env_any, env_bool};

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Public origin of the marketing site, used for sitemap URLs and e-mail links.
    pub public_site_url: String,
    /// Built front-end served for `/admin/*` pages, when present.
    pub site_dist_dir: Option<String>,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let public_site_url = env_any(&["PUBLIC_SITE_URL", "REACT_APP_SITE_URL"])
            .unwrap_or_else(|| {
                warn!("PUBLIC_SITE_URL not set, using default: http://localhost:3000");
                "http://localhost:3000".to_string()
            })
            .trim_end_matches('/')
            .to_string();
        let site_dist_dir = env_any(&["SITE_DIST_DIR"]);
        let cookie_secure = env_bool("COOKIE_SECURE")
            .unwrap_or_else(|| public_site_url.starts_with("https://"));
        AppConfig { host, port, public_site_url, site_dist_dir, cookie_secure }
    }
}
