#![no_main]
use libfuzzer_sys::fuzz_target;

use listing_import::adapters::ai::prompt::parse_model_reply;
use listing_import::domain::field::Tier;
use listing_import::pipeline::normalizer::normalize;

fuzz_target!(|data: &[u8]| {
    if let Ok(reply) = std::str::from_utf8(data)
        && let Ok(record) = parse_model_reply(reply)
    {
        let _ = normalize(&record.into_candidates(Tier::Ai));
    }
});
