use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use crate::domain::document::RawDocument;
use crate::domain::field::PartialRecord;
use crate::error::Result;
use crate::ports::page_fetcher::{FetchOptions, PageFetcher};
use crate::ports::text_extractor::TextExtractor;

type PageFn = Box<dyn Fn(&str) -> Result<RawDocument> + Send + Sync>;
type ReplyFn = Box<dyn Fn(&str) -> Result<PartialRecord> + Send + Sync>;

pub struct MockFetcher {
    page_fn: Mutex<PageFn>,
    seen: Arc<Mutex<Vec<FetchOptions>>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            page_fn: Mutex::new(Box::new(|url| Ok(page_with_body(url, "<h1>Mock listing</h1>")))),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn with_page(self, f: impl Fn(&str) -> Result<RawDocument> + Send + Sync + 'static) -> Self {
        *self.page_fn.lock().unwrap() = Box::new(f);
        self
    }

    /// Options of every fetch made so far.
    pub fn seen_options(&self) -> Arc<Mutex<Vec<FetchOptions>>> {
        Arc::clone(&self.seen)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<RawDocument> {
        self.seen.lock().unwrap().push(options.clone());
        (self.page_fn.lock().unwrap())(url.as_str())
    }
}

pub struct MockExtractor {
    reply_fn: Mutex<ReplyFn>,
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            reply_fn: Mutex::new(Box::new(|_| Ok(PartialRecord::default()))),
        }
    }

    #[must_use]
    pub fn with_reply(
        self,
        f: impl Fn(&str) -> Result<PartialRecord> + Send + Sync + 'static,
    ) -> Self {
        *self.reply_fn.lock().unwrap() = Box::new(f);
        self
    }
}

#[async_trait]
impl TextExtractor for MockExtractor {
    async fn extract_from_text(&self, text: &str, _schema: &str) -> Result<PartialRecord> {
        (self.reply_fn.lock().unwrap())(text)
    }
}

pub fn page_with_body(url: &str, body: &str) -> RawDocument {
    RawDocument::new(url, format!("<html><head></head><body>{body}</body></html>"))
}

pub fn page_with_next_data(url: &str, json: &str) -> RawDocument {
    RawDocument::new(
        url,
        format!(
            r#"<html><head><script id="__NEXT_DATA__" type="application/json">{json}</script></head><body><div></div></body></html>"#
        ),
    )
}
