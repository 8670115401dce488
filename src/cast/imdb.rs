//! IMDb cast scraper: search, title page, full credits, cast table rows
use super::{CastEntry, CastTable};
use crate::config::{HttpConfig, MetadataConfig};
use crate::error::{Error, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const SERVICE: &str = "imdb";

pub struct ImdbScraper {
    client: Client,
    config: MetadataConfig,
}

impl ImdbScraper {
    pub fn new(config: MetadataConfig, http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_seconds))
            .user_agent(http.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    /// Scrape the full cast of the first search hit for `title`
    pub async fn fetch_cast(&self, title: &str) -> Result<CastTable> {
        info!("🎬 Looking up cast for: {}", title);

        let find_url = format!("{}/find?q={}", self.base_url(), urlencoding::encode(title));
        let find_html = self.get_html(&find_url).await?;
        let Some(title_href) = extract_first_title_link(&find_html) else {
            return Err(Error::NotFound(format!("no IMDb title found for '{}'", title)));
        };

        let title_html = self.get_html(&self.absolute_url(&title_href)?).await?;
        let Some(credits_href) = extract_full_credits_link(&title_html) else {
            return Err(Error::NotFound(format!("no full credits page for '{}'", title)));
        };

        let credits_html = self.get_html(&self.absolute_url(&credits_href)?).await?;
        let table = extract_cast(&credits_html);
        if table.is_empty() {
            return Err(Error::NotFound(format!("empty cast list for '{}'", title)));
        }

        info!("✅ Found {} cast entries", table.len());
        Ok(table)
    }

    async fn get_html(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::external(SERVICE, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::external(SERVICE, format!("HTTP {} for {}", response.status(), url)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::external(SERVICE, e.to_string()))
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn absolute_url(&self, href: &str) -> Result<String> {
        let base = Url::parse(&self.config.base_url)
            .map_err(|e| Error::Config(format!("invalid metadata base_url: {}", e)))?;
        base.join(href)
            .map(String::from)
            .map_err(|e| Error::external(SERVICE, format!("bad link '{}': {}", href, e)))
    }
}

/// href of the first search result title
pub fn extract_first_title_link(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a.ipc-metadata-list-summary-item__t[href]").ok()?;
    document
        .select(&selector)
        .find_map(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// href of the first link pointing at the full credits page
pub fn extract_full_credits_link(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").ok()?;
    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains("fullcredits"))
        .map(str::to_string)
}

/// Rows of `table.cast_list`: second cell is the name, fourth the character.
/// Rows without both cells are section headers and are skipped.
pub fn extract_cast(html: &str) -> CastTable {
    let document = Html::parse_document(html);
    let (Ok(row_selector), Ok(cell_selector), Ok(img_selector)) = (
        Selector::parse("table.cast_list tr"),
        Selector::parse("td"),
        Selector::parse("img"),
    ) else {
        return CastTable::new();
    };

    let mut table = CastTable::new();
    for row in document.select(&row_selector) {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.len() < 4 {
            continue;
        }

        let name = clean_text(&cells[1].text().collect::<String>());
        if name.is_empty() {
            continue;
        }
        let character = clean_text(&cells[3].text().collect::<String>());

        let image_url = row.select(&img_selector).next().and_then(|img| {
            let attrs = img.value();
            attrs
                .attr("data-src")
                .or_else(|| attrs.attr("loadlate"))
                .or_else(|| attrs.attr("src"))
                .map(str::to_string)
        });

        table.insert(CastEntry {
            name,
            character,
            image_url,
        });
    }
    table
}

/// Collapse runs of whitespace, including the newlines IMDb puts inside cells
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
