use std::collections::BTreeMap;
use std::env;
use tracing::{debug, info, warn};

use crate::config::env_any;

/// Public site identity, read from the same variables as the front-end build.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub site_label: String,
    /// `https://wa.me/<number>` (or any WhatsApp click-to-chat URL).
    pub whatsapp_url: Option<String>,
    pub og_image: Option<String>,
    /// `HERO_VIDEO_URL_<NAME>` entries keyed by lower-cased `<NAME>`.
    pub hero_video_urls: BTreeMap<String, String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl SiteConfig {
    pub fn from_env() -> Self {
        info!("Loading site configuration from environment variables");

        let site_label = env_any(&["SITE_LABEL", "REACT_APP_SITE_LABEL"]).unwrap_or_else(|| {
            warn!("SITE_LABEL not set, using default");
            "Moteurs d'occasion".to_string()
        });
        let whatsapp_url = env_any(&["WHATSAPP_URL", "REACT_APP_WHATSAPP_URL"]);
        if whatsapp_url.is_none() {
            warn!("WHATSAPP_URL not set, WhatsApp links are built from CONTACT_PHONE");
        }

        let hero_video_urls = hero_videos_from(env::vars());
        debug!("Hero videos configured: {}", hero_video_urls.len());

        SiteConfig {
            site_label,
            whatsapp_url,
            og_image: env_any(&["OG_IMAGE", "REACT_APP_OG_IMAGE"]),
            hero_video_urls,
            contact_email: env_any(&["CONTACT_EMAIL", "REACT_APP_CONTACT_EMAIL"]),
            contact_phone: env_any(&["CONTACT_PHONE", "REACT_APP_CONTACT_PHONE"]),
        }
    }
}

fn hero_videos_from(vars: impl Iterator<Item = (String, String)>) -> BTreeMap<String, String> {
    vars.filter_map(|(key, value)| {
        let name = key
            .strip_prefix("REACT_APP_HERO_VIDEO_URL_")
            .or_else(|| key.strip_prefix("HERO_VIDEO_URL_"))?;
        let value = value.trim();
        if name.is_empty() || value.is_empty() {
            return None;
        }
        Some((name.to_ascii_lowercase(), value.to_string()))
    })
    .collect()
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            site_label: "Moteurs d'occasion".to_string(),
            whatsapp_url: None,
            og_image: None,
            hero_video_urls: BTreeMap::new(),
            contact_email: None,
            contact_phone: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hero_videos_accept_both_prefixes() {
        let vars = vec![
            ("REACT_APP_HERO_VIDEO_URL_DESKTOP".to_string(), "https://cdn/desktop.mp4".to_string()),
            ("HERO_VIDEO_URL_MOBILE".to_string(), " https://cdn/mobile.mp4 ".to_string()),
            ("HERO_VIDEO_URL_EMPTY".to_string(), "".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ];
        let videos = hero_videos_from(vars.into_iter());
        assert_eq!(videos.len(), 2);
        assert_eq!(videos["desktop"], "https://cdn/desktop.mp4");
        assert_eq!(videos["mobile"], "https://cdn/mobile.mp4");
    }
}
