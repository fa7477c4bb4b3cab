#![no_main]
use libfuzzer_sys::fuzz_target;

use listing_import::adapters::extraction::structured_candidates;
use listing_import::config::types::ExtractionConfig;
use listing_import::domain::document::RawDocument;

fuzz_target!(|data: &[u8]| {
    if let Ok(html) = std::str::from_utf8(data) {
        let doc = RawDocument::new("https://www.airbnb.com/rooms/1", html);
        let _ = structured_candidates(&doc, &ExtractionConfig::default());
    }
});
