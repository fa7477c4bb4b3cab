use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, COOKIE, UPGRADE_INSECURE_REQUESTS};
use tracing::{debug, warn};
use url::Url;

use crate::adapters::fetcher::cookies;
use crate::config::types::FetcherConfig;
use crate::domain::document::RawDocument;
use crate::error::{ImportError, Result};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Single-request fetcher. No retries: a failed page is reported, not re-tried.
pub struct HttpFetcher {
    http: Client,
    config: FetcherConfig,
}

impl HttpFetcher {
    pub fn new(config: FetcherConfig) -> std::result::Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub async fn fetch_page(&self, url: &Url, cookie_header: Option<&str>) -> Result<RawDocument> {
        debug!(url = %url, "Fetching page");

        let mut request = self
            .http
            .get(url.clone())
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, &self.config.accept_language)
            .header(UPGRADE_INSECURE_REQUESTS, "1");
        if let Some(cookie) = cookie_header.and_then(cookies::normalize_header) {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(url, e))?;
        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Listing page returned an error status");
            return Err(ImportError::FetchHttpError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let html = response.text().await.map_err(|e| self.map_send_error(url, e))?;
        let len = html.chars().count();
        if len < self.config.min_content_chars {
            return Err(ImportError::FetchEmptyContent {
                len,
                min: self.config.min_content_chars,
            });
        }

        debug!(url = %final_url, len, "Fetched page");
        Ok(RawDocument::new(final_url, html))
    }

    fn map_send_error(&self, url: &Url, e: reqwest::Error) -> ImportError {
        if e.is_timeout() {
            ImportError::FetchTimeout {
                url: url.to_string(),
                timeout_secs: self.config.request_timeout_secs,
            }
        } else {
            ImportError::Http(e)
        }
    }
}
