use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use crate::adapters::ai::gemini::GeminiExtractor;
use crate::adapters::ai::prompt::schema_description;
use crate::adapters::extraction::{dom_candidates, structured_candidates};
use crate::adapters::fetcher::ListingFetcher;
use crate::config::types::{Config, ExtractionConfig, ImportConfig};
use crate::domain::draft::PropertyDraft;
use crate::domain::field::Tier;
use crate::error::{ImportError, Result};
use crate::pipeline::normalizer::normalize;
use crate::ports::page_fetcher::{FetchMode, FetchOptions, PageFetcher};
use crate::ports::text_extractor::TextExtractor;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRequest {
    pub url: String,
    pub cookie_header: Option<String>,
    pub mode: FetchMode,
}

impl ImportRequest {
    pub fn plain(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Runs one listing import end to end. Holds no per-import state.
pub struct ListingImporter {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Option<Arc<dyn TextExtractor>>,
    extraction: ExtractionConfig,
    import: ImportConfig,
}

impl ListingImporter {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Option<Arc<dyn TextExtractor>>,
        extraction: ExtractionConfig,
        import: ImportConfig,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            extraction,
            import,
        }
    }

    /// Wire the production adapters from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = ListingFetcher::new(config.fetcher.clone(), config.browser.clone())?;
        let extractor: Option<Arc<dyn TextExtractor>> = if config.ai.enabled {
            Some(Arc::new(GeminiExtractor::new(config.ai.clone())?))
        } else {
            info!("AI fallback disabled");
            None
        };
        Ok(Self::new(
            Arc::new(fetcher),
            extractor,
            config.extraction.clone(),
            config.import.clone(),
        ))
    }

    /// Parse and vet the listing URL.
    pub fn validate_url(&self, raw: &str) -> Result<Url> {
        let url = Url::parse(raw.trim()).map_err(|e| ImportError::InvalidUrl {
            reason: format!("{raw}: {e}"),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ImportError::InvalidUrl {
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        let host = url
            .host_str()
            .ok_or_else(|| ImportError::InvalidUrl {
                reason: "URL has no host".into(),
            })?
            .to_ascii_lowercase();
        if !self.import.allowed_hosts.is_empty()
            && !self
                .import
                .allowed_hosts
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&host))
        {
            return Err(ImportError::InvalidUrl {
                reason: format!("host '{host}' is not an allowed listing site"),
            });
        }
        Ok(url)
    }

    pub async fn import(&self, request: &ImportRequest) -> Result<PropertyDraft> {
        let url = self.validate_url(&request.url)?;
        info!(url = %url, mode = ?request.mode, "Importing listing");

        let options = FetchOptions {
            mode: request.mode,
            cookie_header: request.cookie_header.clone(),
        };
        let doc = self.fetcher.fetch(&url, &options).await?;

        let mut candidates = structured_candidates(&doc, &self.extraction);
        candidates.extend(dom_candidates(&doc, &self.extraction));

        let missing = candidates.missing_required();
        let text_len = doc.visible_text.chars().count();
        let enough_text = text_len >= self.import.min_visible_text_chars;

        if !missing.is_empty() {
            match &self.extractor {
                Some(extractor) if enough_text => {
                    debug!(?missing, "Required fields missing, running AI tier");
                    let record = extractor
                        .extract_from_text(&doc.visible_text, &schema_description())
                        .await?;
                    candidates.extend(record.into_candidates(Tier::Ai));
                }
                Some(_) => {
                    warn!(text_len, "Too little visible text for the AI tier");
                }
                None => debug!(?missing, "AI tier not configured, using defaults"),
            }
        }

        if candidates.is_empty() && !enough_text {
            return Err(ImportError::NoUsableContent);
        }

        let draft = normalize(&candidates);
        info!(url = %url, candidates = candidates.len(), name = %draft.name, "Listing imported");
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::field::{FieldValue, PartialRecord, TargetField};
    use crate::test_helpers::{MockExtractor, MockFetcher, page_with_body, page_with_next_data};

    fn importer(fetcher: MockFetcher, extractor: Option<MockExtractor>) -> ListingImporter {
        ListingImporter::new(
            Arc::new(fetcher),
            extractor.map(|e| Arc::new(e) as Arc<dyn TextExtractor>),
            ExtractionConfig::default(),
            ImportConfig::default(),
        )
    }

    #[tokio::test]
    async fn rejects_non_http_urls() {
        let imp = importer(MockFetcher::new(), None);
        for raw in ["ftp://example.com/x", "not a url", "/rooms/1", "file:///etc/passwd"] {
            let err = imp.import(&ImportRequest::plain(raw)).await.unwrap_err();
            assert!(matches!(err, ImportError::InvalidUrl { .. }), "{raw}");
        }
    }

    #[test]
    fn allowed_hosts_are_enforced() {
        let imp = ListingImporter::new(
            Arc::new(MockFetcher::new()),
            None,
            ExtractionConfig::default(),
            ImportConfig {
                allowed_hosts: vec!["www.airbnb.fr".into(), "airbnb.fr".into()],
                ..ImportConfig::default()
            },
        );
        assert!(imp.validate_url("https://WWW.airbnb.fr/rooms/1").is_ok());
        let err = imp.validate_url("http://169.254.169.254/latest").unwrap_err();
        assert!(matches!(err, ImportError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn structured_blob_fills_draft_without_ai() {
        let fetcher = MockFetcher::new().with_page(|url| {
            Ok(page_with_next_data(
                url,
                r#"{"listing":{"name":"Loft Paris","description":"Bright loft","address":"1 Rue X","amenities":["wifi","kitchen"]}}"#,
            ))
        });
        let extractor = MockExtractor::new().with_reply(|_| panic!("AI tier must not run"));
        let draft = importer(fetcher, Some(extractor))
            .import(&ImportRequest::plain("https://example.com/rooms/1"))
            .await
            .unwrap();
        assert_eq!(draft.name, "Loft Paris");
        assert_eq!(draft.amenities, vec!["wifi", "kitchen"]);
    }

    #[tokio::test]
    async fn ai_fills_missing_fields() {
        let fetcher = MockFetcher::new().with_page(|url| {
            Ok(page_with_body(
                url,
                &"<p>A calm two-room flat near the canal with a late check-in.</p>".repeat(4),
            ))
        });
        let extractor = MockExtractor::new().with_reply(|_| {
            let mut record = PartialRecord::default();
            record.insert(TargetField::CheckInTime, FieldValue::Text("16:00".into()));
            Ok(record)
        });
        let draft = importer(fetcher, Some(extractor))
            .import(&ImportRequest::plain("https://example.com/rooms/1"))
            .await
            .unwrap();
        assert_eq!(draft.check_in_time, "16:00");
    }

    #[tokio::test]
    async fn ai_errors_are_fatal() {
        let fetcher = MockFetcher::new().with_page(|url| {
            Ok(page_with_body(url, &"<p>Plenty of descriptive text here.</p>".repeat(5)))
        });
        let extractor = MockExtractor::new().with_reply(|_| {
            Err(ImportError::MissingCredential {
                provider: "Gemini",
                env_var: "GEMINI_API_KEY",
            })
        });
        let err = importer(fetcher, Some(extractor))
            .import(&ImportRequest::plain("https://example.com/rooms/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingCredential { .. }));
    }

    #[tokio::test]
    async fn blank_page_without_candidates_is_no_usable_content() {
        let fetcher = MockFetcher::new().with_page(|url| Ok(page_with_body(url, "<div></div>")));
        let extractor = MockExtractor::new().with_reply(|_| panic!("AI tier must not run"));
        let err = importer(fetcher, Some(extractor))
            .import(&ImportRequest::plain("https://example.com/rooms/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::NoUsableContent));
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let fetcher = MockFetcher::new().with_page(|_| Err(ImportError::BrowserDisabled));
        let err = importer(fetcher, None)
            .import(&ImportRequest {
                url: "https://example.com/rooms/1".into(),
                cookie_header: None,
                mode: FetchMode::Browser,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::BrowserDisabled));
    }

    #[tokio::test]
    async fn request_options_reach_the_fetcher() {
        let fetcher = MockFetcher::new().with_page(|url| Ok(page_with_body(url, "<h1>Seen</h1>")));
        let seen = fetcher.seen_options();
        importer(fetcher, None)
            .import(&ImportRequest {
                url: "https://example.com/rooms/9".into(),
                cookie_header: Some("a=1".into()),
                mode: FetchMode::Browser,
            })
            .await
            .unwrap();
        let recorded = seen.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].mode, FetchMode::Browser);
        assert_eq!(recorded[0].cookie_header.as_deref(), Some("a=1"));
    }
}
