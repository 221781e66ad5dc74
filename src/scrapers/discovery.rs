use crate::models::{collapse_whitespace, CommunityLink};
use crate::scrapers::traits::PageRenderer;
use crate::scrapers::types::Navigation;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

static SECTION: Lazy<Selector> = Lazy::new(|| Selector::parse(".sitemap-serp-section").unwrap());
static REGION_HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h2 a").unwrap());
static COMMUNITY_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".sitemap-serp-section-second-level h3 a").unwrap());

/// Render the property directory and collect every community link on it
pub async fn discover_links(
    renderer: &dyn PageRenderer,
    directory_url: &str,
    navigation: Navigation,
) -> Result<Vec<CommunityLink>> {
    let base = Url::parse(directory_url)
        .with_context(|| format!("Invalid directory URL: {}", directory_url))?;

    info!("Opening property directory {}...", directory_url);
    let html = renderer
        .render(directory_url, navigation)
        .await
        .context("Failed to load property directory")?;

    info!("Extracting community links...");
    let links = parse_directory(&html, &base);
    if links.is_empty() {
        anyhow::bail!("No community links found on {}", directory_url);
    }

    info!("Total communities found: {}", links.len());
    Ok(links)
}

/// Walk region sections and their nested community links, in page order
pub fn parse_directory(html: &str, base: &Url) -> Vec<CommunityLink> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for section in document.select(&SECTION) {
        let region = section
            .select(&REGION_HEADING)
            .next()
            .map(|heading| collapse_whitespace(&heading.text().collect::<String>()))
            .unwrap_or_default();

        for element in section.select(&COMMUNITY_LINK) {
            let name = collapse_whitespace(&element.text().collect::<String>());
            let Some(href) = element.value().attr("href").map(str::trim) else {
                continue;
            };
            if name.is_empty() || href.is_empty() {
                continue;
            }

            match base.join(href) {
                Ok(url) => links.push(CommunityLink {
                    origin_region: region.clone(),
                    name,
                    source_url: url.to_string(),
                }),
                Err(e) => debug!("Skipping unusable link {}: {}", href, e),
            }
        }
    }

    links
}
