use async_trait::async_trait;
use url::Url;

use crate::domain::document::RawDocument;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Single HTTP GET.
    #[default]
    Plain,
    /// Headless browser with stealth settings.
    Browser,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub mode: FetchMode,
    /// Raw `Cookie` header to replay, optionally prefixed with `Cookie:`.
    pub cookie_header: Option<String>,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<RawDocument>;
}
