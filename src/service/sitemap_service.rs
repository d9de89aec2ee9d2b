use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::model::engine_page::EnginePage;
use crate::repository::engine_page_repo::EnginePageRepository;
use crate::util::error::ServiceError;

/// Client routes that always exist.
pub const STATIC_ROUTES: [&str; 8] = [
    "/",
    "/contact",
    "/a-propos",
    "/demande-devis",
    "/mentions-legales",
    "/cgv",
    "/politique-de-confidentialite",
    "/moteurs",
];

#[async_trait]
pub trait SitemapService: Send + Sync {
    async fn sitemap_xml(&self) -> Result<String, ServiceError>;
}

pub struct SitemapServiceImpl {
    pub engine_page_repo: Arc<dyn EnginePageRepository>,
    /// Origin without trailing slash, e.g. `https://www.example.fr`.
    pub base_url: String,
}

struct SitemapEntry {
    path: String,
    lastmod: Option<String>,
}

/// Static routes, then one route per brand, then one per engine page.
fn entries(pages: &[EnginePage]) -> Vec<SitemapEntry> {
    let mut entries: Vec<SitemapEntry> = STATIC_ROUTES
        .iter()
        .map(|path| SitemapEntry { path: path.to_string(), lastmod: None })
        .collect();

    let brands: BTreeSet<&str> = pages.iter().map(|p| p.brand_slug.as_str()).filter(|s| !s.is_empty()).collect();
    entries.extend(brands.into_iter().map(|brand| SitemapEntry {
        path: format!("/moteurs/{}", brand),
        lastmod: None,
    }));

    entries.extend(pages.iter().filter(|p| !p.slug.is_empty()).map(|page| SitemapEntry {
        path: format!("/codes-moteur/{}", page.slug),
        lastmod: page.updated_at.get(..10).map(str::to_string),
    }));
    entries
}

pub fn render_sitemap(base_url: &str, pages: &[EnginePage]) -> String {
    let base = base_url.trim_end_matches('/');
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries(pages) {
        let loc = format!("{}{}", base, entry.path);
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", html_escape::encode_text(&loc)));
        if let Some(lastmod) = entry.lastmod {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", html_escape::encode_text(&lastmod)));
        }
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

#[async_trait]
impl SitemapService for SitemapServiceImpl {
    #[instrument(skip(self))]
    async fn sitemap_xml(&self) -> Result<String, ServiceError> {
        let pages = self.engine_page_repo.list_published().await?;
        info!("Rendering sitemap with {} engine pages", pages.len());
        Ok(render_sitemap(&self.base_url, &pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(slug: &str, brand_slug: &str) -> EnginePage {
        EnginePage {
            id: None,
            code: slug.to_uppercase(),
            slug: slug.to_string(),
            brand: brand_slug.to_string(),
            brand_slug: brand_slug.to_string(),
            title: String::new(),
            description: String::new(),
            content: String::new(),
            fuel: None,
            displacement: None,
            power: None,
            compatible_models: Vec::new(),
            published: true,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            updated_at: "2024-05-02T08:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_sitemap_lists_static_brand_and_page_routes() {
        let xml = render_sitemap(
            "https://moteurs.example.fr/",
            &[page("k9k", "renault"), page("f4r", "renault"), page("m9r", "nissan")],
        );
        assert!(xml.contains("<loc>https://moteurs.example.fr/</loc>"));
        assert!(xml.contains("<loc>https://moteurs.example.fr/politique-de-confidentialite</loc>"));
        assert_eq!(xml.matches("/moteurs/renault<").count(), 1);
        assert!(xml.contains("/moteurs/nissan</loc>"));
        assert!(xml.contains("<loc>https://moteurs.example.fr/codes-moteur/k9k</loc>\n    <lastmod>2024-05-02</lastmod>"));
        assert_eq!(xml.matches("<url>").count(), STATIC_ROUTES.len() + 2 + 3);
    }

    #[test]
    fn test_locations_are_escaped() {
        let xml = render_sitemap("https://example.fr", &[page("a&b", "x")]);
        assert!(xml.contains("/codes-moteur/a&amp;b"));
    }
}
