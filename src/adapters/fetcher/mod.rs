pub mod browser;
pub mod cookies;
pub mod http;

use async_trait::async_trait;
use tracing::info;
use url::Url;

use crate::config::types::{BrowserConfig, FetcherConfig};
use crate::domain::document::RawDocument;
use crate::error::{ImportError, Result};
use crate::ports::page_fetcher::{FetchMode, FetchOptions, PageFetcher};

use self::http::HttpFetcher;

/// Routes each fetch to the plain client or the headless browser.
pub struct ListingFetcher {
    http: HttpFetcher,
    browser: BrowserConfig,
}

impl ListingFetcher {
    pub fn new(
        fetcher: FetcherConfig,
        browser: BrowserConfig,
    ) -> std::result::Result<Self, reqwest::Error> {
        Ok(Self {
            http: HttpFetcher::new(fetcher)?,
            browser,
        })
    }

    pub fn browser_available(&self) -> bool {
        cfg!(feature = "browser") && self.browser.enabled
    }
}

#[async_trait]
impl PageFetcher for ListingFetcher {
    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<RawDocument> {
        let cookie = options.cookie_header.as_deref();
        match options.mode {
            FetchMode::Plain => self.http.fetch_page(url, cookie).await,
            FetchMode::Browser => {
                if !self.browser_available() {
                    return Err(ImportError::BrowserDisabled);
                }
                info!(url = %url, "Fetching with headless browser");
                browser::fetch_rendered(url, cookie, &self.browser).await
            }
        }
    }
}
