use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

/// Plain HTTP fetch settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    #[serde(default = "default_fetch_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            request_timeout_secs: default_fetch_timeout(),
            min_content_chars: default_min_content_chars(),
        }
    }
}

/// Headless-browser fetch settings. `enabled` is also driven by
/// `LISTING_IMPORT_BROWSER_ENABLED`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_browser_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub chrome_path: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_scroll_delay_ms")]
    pub scroll_delay_ms: u64,
    #[serde(default = "default_selector_wait_ms")]
    pub selector_wait_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: default_browser_timeout(),
            chrome_path: None,
            user_agent: default_user_agent(),
            locale: default_locale(),
            timezone: default_timezone(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            settle_ms: default_settle_ms(),
            scroll_delay_ms: default_scroll_delay_ms(),
            selector_wait_ms: default_selector_wait_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Minimum text length for a hydration or JSON script to count as state.
    #[serde(default = "default_min_state_chars")]
    pub min_state_chars: usize,
    /// Minimum text length for the keyword-matched last-resort script.
    #[serde(default = "default_min_keyword_script_chars")]
    pub min_keyword_script_chars: usize,
    #[serde(default = "default_state_keywords")]
    pub state_keywords: Vec<String>,
    /// Extra CSS selectors per field name (camelCase), tried before the built-in ones.
    #[serde(default)]
    pub extra_selectors: BTreeMap<String, Vec<String>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_state_chars: default_min_state_chars(),
            min_keyword_script_chars: default_min_keyword_script_chars(),
            state_keywords: default_state_keywords(),
            extra_selectors: BTreeMap::new(),
        }
    }
}

/// Generative-model fallback settings. `api_key` is also read from `GEMINI_API_KEY`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    #[serde(default = "default_ai_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_model(),
            base_url: default_ai_base_url(),
            request_timeout_secs: default_ai_timeout(),
            api_key: None,
            max_prompt_chars: default_max_prompt_chars(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportConfig {
    /// Hosts a listing URL may point at. Empty means any host.
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
    #[serde(default = "default_min_visible_text_chars")]
    pub min_visible_text_chars: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: Vec::new(),
            min_visible_text_chars: default_min_visible_text_chars(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into()
}

fn default_accept_language() -> String {
    "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7".into()
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_min_content_chars() -> usize {
    1000
}

fn default_browser_timeout() -> u64 {
    60
}

fn default_locale() -> String {
    "fr-FR".into()
}

fn default_timezone() -> String {
    "Europe/Paris".into()
}

fn default_latitude() -> f64 {
    48.8566
}

fn default_longitude() -> f64 {
    2.3522
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

fn default_settle_ms() -> u64 {
    3000
}

fn default_scroll_delay_ms() -> u64 {
    1000
}

fn default_selector_wait_ms() -> u64 {
    10_000
}

fn default_min_state_chars() -> usize {
    50
}

fn default_min_keyword_script_chars() -> usize {
    1000
}

fn default_state_keywords() -> Vec<String> {
    [
        "listing",
        "property",
        "airbnb",
        "pdp_listing_detail",
        "bootstrapData",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_ai_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}

fn default_ai_timeout() -> u64 {
    30
}

fn default_max_prompt_chars() -> usize {
    8000
}

fn default_min_visible_text_chars() -> usize {
    100
}
