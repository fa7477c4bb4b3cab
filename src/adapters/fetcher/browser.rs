//! Rendered fetch through headless Chromium, compiled with the `browser` feature.

#![cfg_attr(not(feature = "browser"), allow(dead_code))]

use url::Url;

use crate::config::types::BrowserConfig;
use crate::domain::document::RawDocument;
use crate::error::Result;

/// Selectors that signal the listing has rendered. Waiting on them is best-effort.
pub const READY_SELECTORS: &[&str] = &["h1", "[data-section-id]", "[data-testid]", "script#__NEXT_DATA__"];

const SELECTOR_POLL_MS: u64 = 250;

/// Chromium flags for a session that looks like a regular desktop browser.
pub fn launch_args(config: &BrowserConfig) -> Vec<String> {
    vec![
        "--disable-blink-features=AutomationControlled".into(),
        "--disable-features=IsolateOrigins,site-per-process".into(),
        "--disable-dev-shm-usage".into(),
        "--disable-gpu".into(),
        "--no-sandbox".into(),
        "--no-first-run".into(),
        "--no-default-browser-check".into(),
        format!("--user-agent={}", config.user_agent),
        format!("--lang={}", config.locale),
        format!(
            "--window-size={},{}",
            config.viewport_width, config.viewport_height
        ),
    ]
}

/// `["fr-FR", "fr", "en-US", "en"]` for locale `fr-FR`.
fn navigator_languages(locale: &str) -> Vec<String> {
    let mut langs = vec![locale.to_string()];
    if let Some((base, _)) = locale.split_once('-') {
        langs.push(base.to_string());
    }
    for fallback in ["en-US", "en"] {
        if !langs.iter().any(|l| l == fallback) {
            langs.push(fallback.to_string());
        }
    }
    langs
}

/// Script evaluated before any page script on every new document.
pub fn stealth_script(config: &BrowserConfig) -> String {
    let languages = serde_json::to_string(&navigator_languages(&config.locale))
        .unwrap_or_else(|_| "[\"en-US\",\"en\"]".into());
    format!(
        r"
Object.defineProperty(navigator, 'webdriver', {{ get: () => false, configurable: true }});
Object.defineProperty(navigator, 'plugins', {{ get: () => [1, 2, 3, 4, 5] }});
Object.defineProperty(navigator, 'languages', {{ get: () => {languages} }});
window.chrome = window.chrome || {{}};
window.chrome.runtime = window.chrome.runtime || {{}};
const originalQuery = window.navigator.permissions && window.navigator.permissions.query;
if (originalQuery) {{
  window.navigator.permissions.query = (parameters) => (
    parameters && parameters.name === 'notifications'
      ? Promise.resolve({{ state: Notification.permission }})
      : originalQuery.call(window.navigator.permissions, parameters)
  );
}}
const pinnedPosition = {{
  coords: {{ latitude: {lat}, longitude: {lon}, accuracy: 50, altitude: null, altitudeAccuracy: null, heading: null, speed: null }},
  timestamp: Date.now()
}};
if (navigator.geolocation) {{
  navigator.geolocation.getCurrentPosition = (success) => success(pinnedPosition);
  navigator.geolocation.watchPosition = (success) => {{ success(pinnedPosition); return 0; }};
}}
",
        lat = config.latitude,
        lon = config.longitude,
    )
}

#[cfg(feature = "browser")]
pub async fn fetch_rendered(
    url: &Url,
    cookie_header: Option<&str>,
    config: &BrowserConfig,
) -> Result<RawDocument> {
    use std::time::Duration;

    use crate::error::ImportError;

    let session = session::BrowserSession::launch(config).await?;
    let outcome = tokio::time::timeout(
        Duration::from_secs(config.timeout_secs),
        session.render(url, cookie_header, config),
    )
    .await;
    session.close().await;

    match outcome {
        Ok(Ok((final_url, html))) => Ok(RawDocument::new(final_url, html)),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ImportError::FetchTimeout {
            url: url.to_string(),
            timeout_secs: config.timeout_secs,
        }),
    }
}

#[cfg(not(feature = "browser"))]
pub async fn fetch_rendered(
    _url: &Url,
    _cookie_header: Option<&str>,
    _config: &BrowserConfig,
) -> Result<RawDocument> {
    Err(crate::error::ImportError::BrowserDisabled)
}

#[cfg(feature = "browser")]
mod session {
    use std::time::Duration;

    use chromiumoxide::Page;
    use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
    use chromiumoxide::cdp::browser_protocol::emulation::{
        SetDeviceMetricsOverrideParams, SetTimezoneOverrideParams,
    };
    use chromiumoxide::cdp::browser_protocol::network::CookieParam;
    use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
    use futures::StreamExt;
    use tokio::task::JoinHandle;
    use tracing::{debug, warn};
    use url::Url;

    use super::{READY_SELECTORS, SELECTOR_POLL_MS, launch_args, stealth_script};
    use crate::adapters::fetcher::cookies::parse_cookie_header;
    use crate::config::types::BrowserConfig;
    use crate::error::{ImportError, Result};

    /// A launched browser plus its CDP event loop. `close` must be awaited;
    /// dropping without it still aborts the event loop.
    pub struct BrowserSession {
        browser: Browser,
        handler: Option<JoinHandle<()>>,
    }

    impl BrowserSession {
        pub async fn launch(config: &BrowserConfig) -> Result<Self> {
            let mut builder = ChromeConfig::builder().args(launch_args(config));
            if let Some(ref path) = config.chrome_path {
                builder = builder.chrome_executable(path);
            }
            let chrome_config = builder
                .build()
                .map_err(|reason| ImportError::BrowserLaunchFailure { reason })?;

            let (browser, mut handler) = Browser::launch(chrome_config).await.map_err(|e| {
                ImportError::BrowserLaunchFailure {
                    reason: e.to_string(),
                }
            })?;
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        debug!(error = %e, "Browser event error");
                    }
                }
            });

            Ok(Self {
                browser,
                handler: Some(handler),
            })
        }

        /// Navigate, settle, scroll and return `(final_url, html)`.
        pub async fn render(
            &self,
            url: &Url,
            cookie_header: Option<&str>,
            config: &BrowserConfig,
        ) -> Result<(String, String)> {
            let page = self
                .browser
                .new_page("about:blank")
                .await
                .map_err(navigation_error)?;

            page.execute(AddScriptToEvaluateOnNewDocumentParams::new(stealth_script(
                config,
            )))
            .await
            .map_err(navigation_error)?;
            if let Err(e) = page
                .execute(SetDeviceMetricsOverrideParams::new(
                    i64::from(config.viewport_width),
                    i64::from(config.viewport_height),
                    1.0,
                    false,
                ))
                .await
            {
                warn!(error = %e, "Viewport override rejected");
            }
            if let Err(e) = page
                .execute(SetTimezoneOverrideParams::new(config.timezone.clone()))
                .await
            {
                warn!(error = %e, timezone = %config.timezone, "Timezone override rejected");
            }

            if let Some(header) = cookie_header {
                let cookies: Vec<CookieParam> = parse_cookie_header(header, url)
                    .into_iter()
                    .map(|c| {
                        let mut param = CookieParam::new(c.name, c.value);
                        param.domain = Some(c.domain);
                        param.path = Some(c.path);
                        param
                    })
                    .collect();
                if !cookies.is_empty() {
                    debug!(count = cookies.len(), "Replaying cookies");
                    page.set_cookies(cookies).await.map_err(navigation_error)?;
                }
            }

            page.goto(url.as_str()).await.map_err(navigation_error)?;
            tokio::time::sleep(Duration::from_millis(config.settle_ms)).await;
            scroll(&page, config.scroll_delay_ms).await;
            wait_for_ready(&page, Duration::from_millis(config.selector_wait_ms)).await;

            let html = page.content().await.map_err(navigation_error)?;
            let final_url = page
                .url()
                .await
                .ok()
                .flatten()
                .unwrap_or_else(|| url.to_string());
            if let Err(e) = page.close().await {
                debug!(error = %e, "Page close failed");
            }
            Ok((final_url, html))
        }

        pub async fn close(mut self) {
            if let Err(e) = self.browser.close().await {
                debug!(error = %e, "Browser close failed");
            }
            if let Err(e) = self.browser.wait().await {
                debug!(error = %e, "Browser wait failed");
            }
            if let Some(handler) = self.handler.take() {
                handler.abort();
            }
        }
    }

    impl Drop for BrowserSession {
        fn drop(&mut self) {
            if let Some(handler) = self.handler.take() {
                handler.abort();
            }
        }
    }

    fn navigation_error(e: impl std::fmt::Display) -> ImportError {
        ImportError::BrowserNavigation {
            reason: e.to_string(),
        }
    }

    /// Half page, bottom, back to top, to trigger lazy sections.
    async fn scroll(page: &Page, delay_ms: u64) {
        let steps = [
            "window.scrollTo(0, document.body.scrollHeight / 2)",
            "window.scrollTo(0, document.body.scrollHeight)",
            "window.scrollTo(0, 0)",
        ];
        for step in steps {
            if let Err(e) = page.evaluate(step).await {
                debug!(error = %e, "Scroll step failed");
            }
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    async fn wait_for_ready(page: &Page, limit: Duration) {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            for selector in READY_SELECTORS {
                if page.find_element(*selector).await.is_ok() {
                    return;
                }
            }
            if tokio::time::Instant::now() >= deadline {
                debug!("Ready selectors not found, continuing with current content");
                return;
            }
            tokio::time::sleep(Duration::from_millis(SELECTOR_POLL_MS)).await;
        }
    }
}
