#![no_main]
use libfuzzer_sys::fuzz_target;

use listing_import::adapters::extraction::deep_resolver::{ExpectedType, resolve_scoped};
use listing_import::adapters::extraction::structured;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = resolve_scoped(&value, &["name", "address"], ExpectedType::Text);
        let _ = resolve_scoped(&value, &["amenities"], ExpectedType::Array);
        let _ = structured::extract(&value);
    }
});
