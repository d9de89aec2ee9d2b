use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;

/// Single settings document edited from the admin screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(default)]
    pub site_label: Option<String>,
    #[serde(default)]
    pub whatsapp_url: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub hero_video_urls: BTreeMap<String, String>,
    #[serde(default)]
    pub og_image: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Settings exposed on the public site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSite {
    pub site_label: String,
    pub whatsapp_url: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub hero_video_urls: BTreeMap<String, String>,
    pub og_image: Option<String>,
}

impl PublicSite {
    /// Stored values win over the environment; hero videos merge per key.
    pub fn merge(defaults: &SiteConfig, stored: &SiteSettings) -> Self {
        let pick = |stored: &Option<String>, default: &Option<String>| {
            stored
                .as_ref()
                .filter(|v| !v.trim().is_empty())
                .or(default.as_ref())
                .cloned()
        };
        let mut hero_video_urls = defaults.hero_video_urls.clone();
        hero_video_urls.extend(
            stored
                .hero_video_urls
                .iter()
                .filter(|(_, url)| !url.trim().is_empty())
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        PublicSite {
            site_label: stored
                .site_label
                .clone()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| defaults.site_label.clone()),
            whatsapp_url: pick(&stored.whatsapp_url, &defaults.whatsapp_url),
            contact_email: pick(&stored.contact_email, &defaults.contact_email),
            contact_phone: pick(&stored.contact_phone, &defaults.contact_phone),
            hero_video_urls,
            og_image: pick(&stored.og_image, &defaults.og_image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_values_override_environment() {
        let mut defaults = SiteConfig::default();
        defaults.whatsapp_url = Some("https://wa.me/33600000000".to_string());
        defaults.hero_video_urls.insert("home".to_string(), "env.mp4".to_string());
        defaults.hero_video_urls.insert("moteurs".to_string(), "moteurs.mp4".to_string());

        let mut stored = SiteSettings {
            site_label: Some("Atelier Moteurs".to_string()),
            whatsapp_url: Some("  ".to_string()),
            ..SiteSettings::default()
        };
        stored.hero_video_urls.insert("home".to_string(), "db.mp4".to_string());

        let site = PublicSite::merge(&defaults, &stored);
        assert_eq!(site.site_label, "Atelier Moteurs");
        assert_eq!(site.whatsapp_url.as_deref(), Some("https://wa.me/33600000000"));
        assert_eq!(site.hero_video_urls["home"], "db.mp4");
        assert_eq!(site.hero_video_urls["moteurs"], "moteurs.mp4");
    }
}
