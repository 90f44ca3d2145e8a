use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info, instrument};

use super::PageSource;
use crate::config::SiteConfig;
use crate::error::{Result, ScraperError};

/// Plain HTTP page source. Connection handling, headers and timeouts live
/// here and nowhere else.
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(site: &SiteConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(site.user_agent.clone())
            .timeout(Duration::from_secs(site.timeout_seconds))
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    #[instrument(skip(self))]
    fn fetch_html(&self, url: &str) -> Result<String> {
        info!("HTTP GET request to: {}", url);
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.text()?;
        debug!("HTTP response: status={}, size={} bytes", status.as_u16(), body.len());
        Ok(body)
    }
}
