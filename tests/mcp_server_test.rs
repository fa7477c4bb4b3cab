use std::sync::Arc;

use listing_import::config::types::{ExtractionConfig, ImportConfig};
use listing_import::domain::document::RawDocument;
use listing_import::domain::field::{FieldValue, PartialRecord, TargetField};
use listing_import::error::{ImportError, Result};
use listing_import::mcp::server::ImportMcpServer;
use listing_import::pipeline::importer::{ImportRequest, ListingImporter};
use listing_import::ports::page_fetcher::{FetchMode, FetchOptions, PageFetcher};
use listing_import::ports::text_extractor::TextExtractor;

use async_trait::async_trait;
use rmcp::ServerHandler;
use rmcp::model::ProtocolVersion;
use url::Url;

/// Serves a fixed listing page; browser mode is refused.
struct FixedPage;

#[async_trait]
impl PageFetcher for FixedPage {
    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<RawDocument> {
        if options.mode == FetchMode::Browser {
            return Err(ImportError::BrowserDisabled);
        }
        Ok(RawDocument::new(
            url.as_str(),
            r#"<html><head>
                <meta property="og:description" content="Sunny studio facing the canal">
            </head><body>
                <h1>Canal Studio</h1>
                <div data-section-id="AMENITIES_DEFAULT"><ul><li>Wifi</li><li>Kitchen</li><li>Wifi</li></ul></div>
                <div data-section-id="HOST_OVERVIEW_DEFAULT"><h2>Hosted by Camille</h2></div>
                <p>Check-in after 4 PM. Pets welcome.</p>
            </body></html>"#,
        ))
    }
}

/// Answers with house details a page would only state in prose.
struct ProseReader;

#[async_trait]
impl TextExtractor for ProseReader {
    async fn extract_from_text(&self, _text: &str, _schema: &str) -> Result<PartialRecord> {
        let mut record = PartialRecord::default();
        record.insert(TargetField::Address, FieldValue::Text("8 Quai de Valmy, Paris".into()));
        record.insert(TargetField::CheckInTime, FieldValue::Text("4 PM".into()));
        record.insert(TargetField::PetsAllowed, FieldValue::Flag(true));
        record.insert(TargetField::Name, FieldValue::Text("Ignored name".into()));
        Ok(record)
    }
}

fn importer(with_ai: bool) -> ListingImporter {
    let extractor: Option<Arc<dyn TextExtractor>> = if with_ai {
        Some(Arc::new(ProseReader))
    } else {
        None
    };
    ListingImporter::new(
        Arc::new(FixedPage),
        extractor,
        ExtractionConfig::default(),
        ImportConfig {
            min_visible_text_chars: 20,
            ..ImportConfig::default()
        },
    )
}

#[test]
fn server_exposes_import_tool() {
    let server = ImportMcpServer::new(Arc::new(importer(false)));
    let info = server.get_info();
    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.prompts.is_none());
    assert!(info.instructions.unwrap().contains("import_listing"));
}

#[test]
fn server_get_info_has_protocol_version() {
    let server = ImportMcpServer::new(Arc::new(importer(true)));
    let info = server.get_info();
    assert_eq!(info.protocol_version, ProtocolVersion::LATEST);
}

#[tokio::test]
async fn dom_and_ai_tiers_combine_into_one_draft() {
    let draft = importer(true)
        .import(&ImportRequest::plain("https://www.airbnb.fr/rooms/555"))
        .await
        .unwrap();

    assert_eq!(draft.name, "Canal Studio");
    assert_eq!(draft.description, "Sunny studio facing the canal");
    assert_eq!(draft.amenities, vec!["Wifi", "Kitchen"]);
    assert_eq!(draft.host_name, "Camille");
    assert_eq!(draft.address, "8 Quai de Valmy, Paris");
    assert_eq!(draft.check_in_time, "16:00");
    assert!(draft.pets_allowed);
}

#[tokio::test]
async fn without_ai_the_draft_keeps_defaults() {
    let draft = importer(false)
        .import(&ImportRequest::plain("https://www.airbnb.fr/rooms/555"))
        .await
        .unwrap();

    assert_eq!(draft.name, "Canal Studio");
    assert_eq!(draft.address, "Address to complete");
    assert_eq!(draft.check_in_time, "15:00");
    assert!(!draft.pets_allowed);
}

#[tokio::test]
async fn rendered_request_surfaces_browser_error() {
    let err = importer(true)
        .import(&ImportRequest {
            url: "https://www.airbnb.fr/rooms/555".into(),
            cookie_header: None,
            mode: FetchMode::Browser,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::BrowserDisabled));
}
