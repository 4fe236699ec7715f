
use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use super::extractor::extract_page;
use super::{LoadError, WebPage};
use crate::http::{build_agent, send_with_retry};

/// Default timeout for a single page fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches web pages and reduces them to readable text
#[derive(Debug, Clone)]
pub struct WebLoader {
    agent: ureq::Agent,
}

impl Default for WebLoader {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

impl WebLoader {
    #[inline]
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
        }
    }

    /// Fetch every non-blank URL in order. Any failure aborts the whole load.
    #[inline]
    pub fn fetch_pages(&self, urls: &[String]) -> Result<Vec<WebPage>, LoadError> {
        let urls: Vec<&str> = urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .collect();

        if urls.is_empty() {
            return Err(LoadError::NoValidUrls);
        }

        // Reject bad input before any network traffic
        let parsed = urls
            .iter()
            .map(|url| validate_url(url))
            .collect::<Result<Vec<_>, _>>()?;

        info!("Fetching {} web page(s)", parsed.len());

        parsed.iter().map(|url| self.fetch_page(url)).collect()
    }

    /// Fetch one page
    #[inline]
    pub fn fetch_page(&self, url: &Url) -> Result<WebPage, LoadError> {
        debug!("Fetching page: {}", url);

        let html = send_with_retry(url.as_str(), 1, || {
            self.agent
                .get(url.as_str())
                .call()
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
        .map_err(|e| LoadError::Fetch {
            url: url.to_string(),
            message: format!("{:#}", e),
        })?;

        let page = extract_page(&html);
        debug!(
            "Fetched {} '{}' ({} bytes of HTML, {} chars of text)",
            url,
            page.title,
            html.len(),
            page.text.len()
        );

        Ok(WebPage {
            url: url.to_string(),
            title: page.title,
            text: page.text,
        })
    }
}

/// Validate that a URL is absolute http(s) with a host
#[inline]
pub fn validate_url(url_str: &str) -> Result<Url, LoadError> {
    let invalid = |reason: String| LoadError::InvalidUrl {
        url: url_str.to_string(),
        reason,
    };

    let url = Url::parse(url_str).map_err(|e| invalid(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!(
            "scheme must be http or https, got {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(url)
}
