use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::config::types::ExtractionConfig;
use crate::domain::document::RawDocument;
use crate::domain::field::{CandidateSet, FieldKind, FieldValue, TargetField, Tier};

/// Amenity labels at or above this length are prose, not amenities.
pub const MAX_AMENITY_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Text,
    Attr(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorRule {
    pub selector: String,
    pub source: Source,
}

impl SelectorRule {
    fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            source: Source::Text,
        }
    }

    fn attr(selector: &str, attr: &'static str) -> Self {
        Self {
            selector: selector.to_string(),
            source: Source::Attr(attr),
        }
    }
}

/// Ordered selector rules for one field, most site-specific first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelectors {
    pub field: TargetField,
    /// Extracted text must be longer than this.
    pub min_chars: usize,
    pub rules: Vec<SelectorRule>,
}

/// Built-in selector table.
pub fn builtin_table() -> Vec<FieldSelectors> {
    vec![
        FieldSelectors {
            field: TargetField::Name,
            min_chars: 0,
            rules: vec![
                SelectorRule::text(r#"[data-testid="listing-title"]"#),
                SelectorRule::text(r#"[data-section-id*="TITLE_DEFAULT"] h1"#),
                SelectorRule::text("h1"),
                SelectorRule::attr(r#"meta[property="og:title"]"#, "content"),
                SelectorRule::text("title"),
            ],
        },
        FieldSelectors {
            field: TargetField::Description,
            min_chars: 0,
            rules: vec![
                SelectorRule::text(r#"[data-section-id*="DESCRIPTION_DEFAULT"]"#),
                SelectorRule::text(r#"[data-testid="listing-description"]"#),
                SelectorRule::attr(r#"meta[property="og:description"]"#, "content"),
                SelectorRule::attr(r#"meta[name="description"]"#, "content"),
            ],
        },
        FieldSelectors {
            field: TargetField::Address,
            min_chars: 5,
            rules: vec![
                SelectorRule::text(r#"[data-testid="book-it-default"] [data-testid*="address"]"#),
                SelectorRule::text(r#"[data-section-id*="LOCATION_DEFAULT"] [data-testid*="text"]"#),
                SelectorRule::text("address"),
            ],
        },
        FieldSelectors {
            field: TargetField::Amenities,
            min_chars: 0,
            rules: vec![
                SelectorRule::text(r#"[data-section-id*="AMENITIES_DEFAULT"] li"#),
                SelectorRule::text(r#"[data-testid*="amenity"]"#),
            ],
        },
        FieldSelectors {
            field: TargetField::HostName,
            min_chars: 0,
            rules: vec![
                SelectorRule::text(r#"[data-section-id*="HOST_OVERVIEW_DEFAULT"] h2"#),
                SelectorRule::text(r#"[data-section-id*="MEET_YOUR_HOST"] h2"#),
                SelectorRule::text(r#"[data-testid="host-name"]"#),
            ],
        },
    ]
}

/// The built-in table with configured extra selectors placed first.
pub fn table_with_extras(config: &ExtractionConfig) -> Vec<FieldSelectors> {
    let mut table = builtin_table();
    for (key, selectors) in &config.extra_selectors {
        let Some(field) = TargetField::from_key(key) else {
            warn!(field = %key, "Ignoring extra selectors for unknown field");
            continue;
        };
        let extra: Vec<SelectorRule> = selectors.iter().map(|s| SelectorRule::text(s)).collect();
        match table.iter_mut().find(|entry| entry.field == field) {
            Some(entry) => {
                entry.rules.splice(0..0, extra);
            }
            None => table.push(FieldSelectors {
                field,
                min_chars: 0,
                rules: extra,
            }),
        }
    }
    table
}

/// Run every table entry against the document.
pub fn extract(doc: &RawDocument, config: &ExtractionConfig) -> CandidateSet {
    let html = doc.parse();
    let mut set = CandidateSet::new();
    for entry in table_with_extras(config) {
        if let Some(value) = extract_field(&html, &entry) {
            set.push(Tier::Dom, entry.field, value);
        }
    }
    debug!(fields = set.len(), "DOM tier finished");
    set
}

/// Apply one field's rules in order and return the first acceptable value.
pub fn extract_field(html: &Html, entry: &FieldSelectors) -> Option<FieldValue> {
    match entry.field.kind() {
        FieldKind::List => collect_list(html, &entry.rules),
        FieldKind::Flag => None,
        FieldKind::Text | FieldKind::Time | FieldKind::Count => {
            entry.rules.iter().find_map(|rule| {
                let selector = parse_selector(&rule.selector)?;
                html.select(&selector)
                    .filter_map(|el| read(el, rule.source))
                    .map(|text| clean_field_text(entry.field, &text))
                    .find(|text| text.chars().count() > entry.min_chars)
                    .map(FieldValue::Text)
            })
        }
    }
}

/// Every matching node across all rules, de-duplicated in document order.
fn collect_list(html: &Html, rules: &[SelectorRule]) -> Option<FieldValue> {
    let mut items: Vec<String> = Vec::new();
    for rule in rules {
        let Some(selector) = parse_selector(&rule.selector) else {
            continue;
        };
        for text in html.select(&selector).filter_map(|el| read(el, rule.source)) {
            if text.chars().count() < MAX_AMENITY_CHARS && !items.contains(&text) {
                items.push(text);
            }
        }
    }
    (!items.is_empty()).then_some(FieldValue::List(items))
}

fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(selector) => Some(selector),
        Err(e) => {
            debug!(selector = raw, error = %e, "Skipping invalid selector");
            None
        }
    }
}

fn read(el: ElementRef<'_>, source: Source) -> Option<String> {
    let raw = match source {
        Source::Text => el.text().collect::<Vec<_>>().join(" "),
        Source::Attr(name) => el.value().attr(name)?.to_string(),
    };
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

fn clean_field_text(field: TargetField, text: &str) -> String {
    if field == TargetField::HostName {
        for prefix in ["Hosted by ", "Hôte : ", "Hôte: ", "Host: "] {
            if let Some(rest) = text.strip_prefix(prefix) {
                return rest.trim().to_string();
            }
        }
    }
    text.to_string()
}
