use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::runtime::Runtime;
use tracing::{debug, info, instrument, warn};

use super::PageSource;
use crate::config::RenderConfig;
use crate::error::{Result, ScraperError};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Headless-browser page source for pages whose tables are built by
/// client-side script. Waits for one element to become visible, then
/// returns the rendered markup. The browser is torn down after every fetch.
pub struct RenderedPageSource {
    runtime: Runtime,
    wait_selector: String,
    timeout: Duration,
    chrome_path: Option<String>,
}

impl RenderedPageSource {
    pub fn new(config: &RenderConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            wait_selector: config.wait_selector.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            chrome_path: config.chrome_path.clone(),
        })
    }

    pub fn with_wait_selector(mut self, selector: impl Into<String>) -> Self {
        self.wait_selector = selector.into();
        self
    }

    async fn render(&self, url: &str) -> Result<String> {
        let mut builder = BrowserConfig::builder();
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(|message| ScraperError::Render {
            url: url.to_string(),
            message,
        })?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| render_error(url, e))?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = self.load(&browser, url).await;

        // Release the browser whether or not the page loaded
        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        let _ = browser.wait().await;
        handler_task.abort();

        result
    }

    async fn load(&self, browser: &Browser, url: &str) -> Result<String> {
        let page = browser.new_page(url).await.map_err(|e| render_error(url, e))?;
        self.wait_for_visible(&page, url).await?;
        page.content().await.map_err(|e| render_error(url, e))
    }

    async fn wait_for_visible(&self, page: &Page, url: &str) -> Result<()> {
        let selector = serde_json::Value::String(self.wait_selector.clone()).to_string();
        let script = format!(
            "(() => {{ const el = document.querySelector({selector}); \
             return !!el && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length); }})()"
        );

        let deadline = Instant::now() + self.timeout;
        loop {
            let visible = match page.evaluate(script.as_str()).await {
                Ok(result) => result.into_value::<bool>().unwrap_or(false),
                Err(e) => {
                    debug!("Visibility probe failed: {}", e);
                    false
                }
            };
            if visible {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ScraperError::RenderTimeout {
                    url: url.to_string(),
                    selector: self.wait_selector.clone(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

fn render_error(url: &str, e: impl std::fmt::Display) -> ScraperError {
    ScraperError::Render {
        url: url.to_string(),
        message: e.to_string(),
    }
}

impl PageSource for RenderedPageSource {
    #[instrument(skip(self))]
    fn fetch_html(&self, url: &str) -> Result<String> {
        info!("Rendering {} (waiting for '{}')", url, self.wait_selector);
        self.runtime.block_on(self.render(url))
    }
}
