// ABOUTME: Parsed page handed from the fetcher to the extractor.
// ABOUTME: Wraps scraper::Html with the page URL and the base URL used for link resolution.

use scraper::Html;
use url::Url;

use crate::error::ScrapeError;
use crate::extractors::select::select_attrs;

/// One fetched page, queryable by CSS selectors.
pub struct Document {
    html: Html,
    url: Url,
    base_url: Url,
}

impl Document {
    /// Parses `html` as the page located at `url`.
    pub fn parse(html: &str, url: &str) -> Result<Self, ScrapeError> {
        let parsed = Url::parse(url).map_err(|e| {
            ScrapeError::invalid_url(url, "ParseDocument", Some(anyhow::anyhow!("{}", e)))
        })?;
        Ok(Self::from_parts(html, parsed))
    }

    /// Parses `html` with an already validated page URL.
    ///
    /// The first `<base href>` wins over the page URL when it resolves.
    pub fn from_parts(html: &str, url: Url) -> Self {
        let html = Html::parse_document(html);
        let base_url = select_attrs(&html, "base[href]", "href")
            .first()
            .and_then(|href| url.join(href.trim()).ok())
            .unwrap_or_else(|| url.clone());
        Self {
            html,
            url,
            base_url,
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// The URL the page was fetched from (after redirects).
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a possibly relative reference against the base URL.
    ///
    /// A reference that cannot be joined is returned unchanged.
    pub fn resolve(&self, reference: &str) -> String {
        match self.base_url.join(reference) {
            Ok(joined) => joined.to_string(),
            Err(_) => reference.to_string(),
        }
    }
}
