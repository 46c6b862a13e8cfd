use crate::error::{Result, ScanError};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector is valid"));

/// Pulls absolute link URLs out of a fetched document.
pub trait LinkExtractor: Send + Sync {
    fn extract_links(&self, body: &str, base_url: &str) -> Result<Vec<String>>;
}

/// Resolves every `<a href>` in an HTML body against the page URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &str, base_url: &str) -> Result<Vec<String>> {
        let base = Url::parse(base_url)
            .map_err(|e| ScanError::ParseError(format!("couldn't parse URL {}: {}", base_url, e)))?;

        let document = Html::parse_document(body);
        let mut links = Vec::new();

        for element in document.select(&LINK_SELECTOR) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            match base.join(href) {
                Ok(resolved) => links.push(resolved.to_string()),
                Err(e) => debug!("couldn't parse href '{}': {}", href, e),
            }
        }

        Ok(links)
    }
}
