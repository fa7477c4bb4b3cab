use scraper::{Html, Selector};

/// Upper bound on the derived visible text kept per document.
pub const MAX_VISIBLE_TEXT_CHARS: usize = 10_000;

const HIDDEN_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// A `<script>` block found in the page, kept verbatim for the state locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock {
    pub id: Option<String>,
    pub script_type: Option<String>,
    pub deferred_state: bool,
    pub text: String,
}

/// A fetched page. Owned by a single import attempt and dropped once the
/// draft has been produced.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub final_url: String,
    pub html: String,
    pub visible_text: String,
    pub embedded_state_candidates: Vec<ScriptBlock>,
}

impl RawDocument {
    pub fn new(final_url: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        let document = Html::parse_document(&html);
        let visible_text = visible_text(&document);
        let embedded_state_candidates = script_blocks(&document);
        Self {
            final_url: final_url.into(),
            html,
            visible_text,
            embedded_state_candidates,
        }
    }

    pub fn parse(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Text nodes outside scripts, styles and `<head>`, one per line.
fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TEXT_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&collapsed);
        if out.chars().count() >= MAX_VISIBLE_TEXT_CHARS {
            break;
        }
    }
    crate::adapters::shared::truncate_chars(&out, MAX_VISIBLE_TEXT_CHARS).to_string()
}

fn script_blocks(document: &Html) -> Vec<ScriptBlock> {
    let Ok(selector) = Selector::parse("script") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|script| {
            let el = script.value();
            ScriptBlock {
                id: el.attr("id").map(String::from),
                script_type: el.attr("type").map(str::to_ascii_lowercase),
                deferred_state: el.attr("data-deferred-state").is_some()
                    || el.attr("id").is_some_and(|id| id.starts_with("data-deferred-state")),
                text: script.text().collect::<String>(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_text_skips_scripts_and_styles() {
        let html = r#"<html><head><title>Ignored title</title><style>body{}</style></head>
            <body><h1>Loft   Paris</h1><script>var x = "hidden";</script>
            <p>Near the <b>Louvre</b></p><noscript>enable js</noscript></body></html>"#;
        let doc = RawDocument::new("https://example.com", html);
        assert_eq!(doc.visible_text, "Loft Paris\nNear the\nLouvre");
    }

    #[test]
    fn visible_text_is_capped() {
        let body = "word ".repeat(5000);
        let html = format!("<html><body><p>{body}</p><p>{body}</p></body></html>");
        let doc = RawDocument::new("https://example.com", html);
        assert_eq!(doc.visible_text.chars().count(), MAX_VISIBLE_TEXT_CHARS);
    }

    #[test]
    fn collects_script_blocks_in_order() {
        let html = r#"<html><head>
            <script id="__NEXT_DATA__" type="application/json">{"a":1}</script>
            <script data-deferred-state="true" type="application/json">{"b":2}</script>
            <script>console.log(1)</script>
            </head><body></body></html>"#;
        let doc = RawDocument::new("https://example.com", html);
        assert_eq!(doc.embedded_state_candidates.len(), 3);
        let first = &doc.embedded_state_candidates[0];
        assert_eq!(first.id.as_deref(), Some("__NEXT_DATA__"));
        assert_eq!(first.script_type.as_deref(), Some("application/json"));
        assert!(!first.deferred_state);
        assert!(doc.embedded_state_candidates[1].deferred_state);
        assert_eq!(doc.embedded_state_candidates[2].text, "console.log(1)");
    }

    #[test]
    fn empty_html_yields_empty_text() {
        let doc = RawDocument::new("https://example.com", "");
        assert!(doc.visible_text.is_empty());
        assert!(doc.embedded_state_candidates.is_empty());
    }
}
