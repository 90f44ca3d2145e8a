use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::PageSource;
use crate::error::{Result, ScraperError};

/// In-memory page source keyed by URL, for tests and offline replays of
/// previously saved pages. Records every URL requested.
#[derive(Default)]
pub struct StaticPageSource {
    pages: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl StaticPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.insert(url, html);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, html: impl Into<String>) {
        self.pages.insert(url.into(), html.into());
    }

    /// Registers a saved page file under `url`.
    pub fn insert_file(&mut self, url: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        let html = fs::read_to_string(path)?;
        self.insert(url, html);
        Ok(())
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl PageSource for StaticPageSource {
    fn fetch_html(&self, url: &str) -> Result<String> {
        debug!("Serving static page for {}", url);
        self.requests.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScraperError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}
