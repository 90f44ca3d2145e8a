//! Page-source providers.
//!
//! The parsing core only ever sees a `scraper::Html` document; how the page
//! was obtained (plain HTTP, headless browser, in-memory fixture) stays behind
//! the [`PageSource`] trait.

pub mod fixture;
pub mod http;
#[cfg(feature = "render")]
pub mod rendered;

pub use fixture::StaticPageSource;
pub use http::HttpPageSource;
#[cfg(feature = "render")]
pub use rendered::RenderedPageSource;

use crate::error::Result;
use scraper::Html;

/// Core trait every page provider implements
pub trait PageSource {
    /// Raw markup of the page at `url`.
    fn fetch_html(&self, url: &str) -> Result<String>;

    /// The page at `url` as a navigable document.
    fn fetch(&self, url: &str) -> Result<Html> {
        let body = self.fetch_html(url)?;
        Ok(Html::parse_document(&body))
    }
}

impl<P: PageSource + ?Sized> PageSource for &P {
    fn fetch_html(&self, url: &str) -> Result<String> {
        (**self).fetch_html(url)
    }
}

impl<P: PageSource + ?Sized> PageSource for Box<P> {
    fn fetch_html(&self, url: &str) -> Result<String> {
        (**self).fetch_html(url)
    }
}
