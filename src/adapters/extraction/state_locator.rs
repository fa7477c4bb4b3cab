use serde_json::Value;
use tracing::debug;

use crate::adapters::shared::isolate_json_object;
use crate::config::types::ExtractionConfig;
use crate::domain::document::{RawDocument, ScriptBlock};
use crate::error::{ImportError, Result};

const HYDRATION_SCRIPT_ID: &str = "__NEXT_DATA__";

/// Find the embedded application-state blob and parse it.
///
/// Candidates are ranked hydration tag, then JSON/state-named scripts, then
/// large keyword-bearing scripts. The first candidate wins even if it fails
/// to parse; there is no merging across blobs.
pub fn locate(doc: &RawDocument, config: &ExtractionConfig) -> Option<Value> {
    let script = select_candidate(&doc.embedded_state_candidates, config)?;
    match parse_state_text(&script.text) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(
                error = %e,
                script_id = script.id.as_deref().unwrap_or(""),
                "Embedded state candidate did not parse"
            );
            None
        }
    }
}

/// Pick the most plausible state script by the fixed priority order.
pub fn select_candidate<'a>(
    scripts: &'a [ScriptBlock],
    config: &ExtractionConfig,
) -> Option<&'a ScriptBlock> {
    let long_enough = |s: &ScriptBlock| s.text.trim().len() > config.min_state_chars;

    scripts
        .iter()
        .find(|s| is_hydration_tag(s) && long_enough(s))
        .or_else(|| {
            scripts
                .iter()
                .find(|s| is_state_script(s) && long_enough(s))
        })
        .or_else(|| {
            scripts.iter().find(|s| {
                s.text.len() > config.min_keyword_script_chars
                    && config
                        .state_keywords
                        .iter()
                        .any(|kw| s.text.contains(kw.as_str()))
            })
        })
}

fn is_hydration_tag(script: &ScriptBlock) -> bool {
    script.deferred_state || script.id.as_deref() == Some(HYDRATION_SCRIPT_ID)
}

fn is_state_script(script: &ScriptBlock) -> bool {
    let json_type = script
        .script_type
        .as_deref()
        .is_some_and(|t| t == "application/json" || t == "application/ld+json");
    let state_id = script.id.as_deref().is_some_and(|id| {
        let id = id.to_ascii_lowercase();
        id.contains("data") || id.contains("state")
    });
    json_type || state_id
}

/// Parse a script body as JSON, falling back to its first `{...}` span.
pub fn parse_state_text(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let span = isolate_json_object(trimmed).ok_or_else(|| ImportError::StructuredParseFailure {
        reason: "no JSON object in script".into(),
    })?;
    serde_json::from_str(span).map_err(|e| ImportError::StructuredParseFailure {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(scripts: &str) -> RawDocument {
        RawDocument::new(
            "https://example.com/rooms/1",
            format!("<html><head>{scripts}</head><body><h1>x</h1></body></html>"),
        )
    }

    fn padded(json: &Value) -> String {
        // Pushes small fixtures over the default size threshold.
        let mut obj = json.clone();
        if let Some(map) = obj.as_object_mut() {
            map.insert("_pad".into(), Value::String("p".repeat(80)));
        }
        obj.to_string()
    }

    #[test]
    fn hydration_tag_wins_over_json_script() {
        let next = padded(&json!({"props": {"pageProps": {"listing": {"name": "Next"}}}}));
        let other = padded(&json!({"listing": {"name": "Other"}}));
        let d = doc(&format!(
            r#"<script type="application/json" id="other">{other}</script>
               <script id="__NEXT_DATA__" type="application/json">{next}</script>"#
        ));
        let value = locate(&d, &ExtractionConfig::default()).unwrap();
        assert_eq!(value["props"]["pageProps"]["listing"]["name"], "Next");
    }

    #[test]
    fn deferred_state_counts_as_hydration() {
        let state = padded(&json!({"niobeClientData": [["k", {"name": "Deferred"}]]}));
        let d = doc(&format!(
            r#"<script data-deferred-state="true" type="application/json">{state}</script>"#
        ));
        let value = locate(&d, &ExtractionConfig::default()).unwrap();
        assert_eq!(value["niobeClientData"][0][1]["name"], "Deferred");
    }

    #[test]
    fn state_named_script_is_second_choice() {
        let state = padded(&json!({"listing": {"name": "From state"}}));
        let d = doc(&format!(
            r#"<script>var x = 1;</script><script id="app-state">{state}</script>"#
        ));
        let value = locate(&d, &ExtractionConfig::default()).unwrap();
        assert_eq!(value["listing"]["name"], "From state");
    }

    #[test]
    fn short_hydration_tag_is_ignored() {
        let d = doc(r#"<script id="__NEXT_DATA__">{"a":1}</script>"#);
        assert!(locate(&d, &ExtractionConfig::default()).is_none());
    }

    #[test]
    fn keyword_script_is_last_resort() {
        let filler = "x".repeat(1200);
        let d = doc(&format!(
            r#"<script>window.bootstrapData = {{"listing": {{"name": "Keyword"}}, "f": "{filler}"}};</script>"#
        ));
        let value = locate(&d, &ExtractionConfig::default()).unwrap();
        assert_eq!(value["listing"]["name"], "Keyword");
    }

    #[test]
    fn keyword_script_needs_keyword() {
        let filler = "x".repeat(1200);
        let d = doc(&format!(r#"<script>var cfg = {{"f": "{filler}"}};</script>"#));
        assert!(locate(&d, &ExtractionConfig::default()).is_none());
    }

    #[test]
    fn first_candidate_wins_even_when_unparsable() {
        let broken = "{not json at all ".repeat(10);
        let good = padded(&json!({"listing": {"name": "Good"}}));
        let d = doc(&format!(
            r#"<script id="__NEXT_DATA__">{broken}</script><script type="application/json">{good}</script>"#
        ));
        assert!(locate(&d, &ExtractionConfig::default()).is_none());
    }

    #[test]
    fn parse_state_text_isolates_object_from_assignment() {
        let value = parse_state_text(r#"window.__STATE__ = {"a": {"b": 2}};"#).unwrap();
        assert_eq!(value["a"]["b"], 2);
    }

    #[test]
    fn parse_state_text_reports_failure() {
        let err = parse_state_text("no json here").unwrap_err();
        assert!(matches!(err, ImportError::StructuredParseFailure { .. }));
    }

    #[test]
    fn no_scripts_yields_none() {
        let d = doc("");
        assert!(locate(&d, &ExtractionConfig::default()).is_none());
    }
}
