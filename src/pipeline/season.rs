//! Season-scoped acquisition of the team pages.
//!
//! Every call names the season it wants and may pass a document the caller
//! already holds; nothing is cached implicitly. [`SeasonCache`] is there for
//! callers that want to keep one season's page around.

use chrono::{Datelike, NaiveDate};
use scraper::Html;
use tracing::{debug, info, instrument};

use crate::apis::PageSource;
use crate::constants::{defense_path, year_path};
use crate::error::{Result, ScraperError};
use crate::parser::teams;
use crate::parser::{absolute_url, parse_uncommented};
use crate::types::{TeamLink, TeamTable};

/// Regular seasons start in September; earlier months still belong to the
/// season that began the previous year.
pub fn current_season(today: NaiveDate) -> i32 {
    if today.month() < 9 {
        today.year() - 1
    } else {
        today.year()
    }
}

/// Page sources and site root used to acquire one season's team pages.
///
/// `renderer` is needed only for the defense page, which the site fills in
/// with JavaScript.
pub struct SeasonPages<'a> {
    source: &'a dyn PageSource,
    renderer: Option<&'a dyn PageSource>,
    base_url: &'a str,
}

impl<'a> SeasonPages<'a> {
    pub fn new(source: &'a dyn PageSource, base_url: &'a str) -> Self {
        Self {
            source,
            renderer: None,
            base_url,
        }
    }

    pub fn with_renderer(mut self, renderer: &'a dyn PageSource) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// The season's standings and team-stats page.
    #[instrument(skip(self, preloaded), fields(preloaded = preloaded.is_some()))]
    pub fn year_page(&self, season: i32, preloaded: Option<Html>) -> Result<Html> {
        if let Some(doc) = preloaded {
            return Ok(doc);
        }
        fetch_uncommented(self.source, &absolute_url(self.base_url, &year_path(season)))
    }

    /// The season's opponent (defense) page, via the renderer.
    #[instrument(skip(self, preloaded), fields(preloaded = preloaded.is_some()))]
    pub fn defense_page(&self, season: i32, preloaded: Option<Html>) -> Result<Html> {
        if let Some(doc) = preloaded {
            return Ok(doc);
        }
        let url = absolute_url(self.base_url, &defense_path(season));
        let renderer = self.renderer.ok_or_else(|| ScraperError::Render {
            url: url.clone(),
            message: "no rendering page source configured".to_string(),
        })?;
        fetch_uncommented(renderer, &url)
    }

    pub fn standings(&self, season: i32, preloaded: Option<Html>) -> Result<TeamTable> {
        teams::standings(&self.year_page(season, preloaded)?)
    }

    pub fn team_links(&self, season: i32, preloaded: Option<Html>) -> Result<Vec<TeamLink>> {
        teams::team_links(&self.year_page(season, preloaded)?, self.base_url)
    }

    pub fn offense(&self, season: i32, preloaded: Option<Html>) -> Result<Vec<TeamTable>> {
        teams::offense_tables(&self.year_page(season, preloaded)?)
    }

    pub fn defense(&self, season: i32, preloaded: Option<Html>) -> Result<Vec<TeamTable>> {
        teams::defense_tables(&self.defense_page(season, preloaded)?)
    }
}

fn fetch_uncommented(source: &dyn PageSource, url: &str) -> Result<Html> {
    let body = source.fetch_html(url)?;
    Ok(parse_uncommented(&body))
}

/// Holds the document for the most recently requested season. A request
/// for the same season is served from the cache; any other season reloads.
#[derive(Default)]
pub struct SeasonCache {
    entry: Option<(i32, Html)>,
}

impl SeasonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn season(&self) -> Option<i32> {
        self.entry.as_ref().map(|(season, _)| *season)
    }

    pub fn get_or_load<F>(&mut self, season: i32, load: F) -> Result<&Html>
    where
        F: FnOnce(i32) -> Result<Html>,
    {
        let entry = match self.entry.take() {
            Some((cached, doc)) if cached == season => {
                debug!("Reusing cached page for season {}", season);
                (cached, doc)
            }
            previous => {
                if let Some((cached, _)) = previous {
                    info!("Season changed from {} to {}, reloading", cached, season);
                }
                (season, load(season)?)
            }
        };
        Ok(&self.entry.insert(entry).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::StaticPageSource;
    use std::cell::Cell;

    const BASE: &str = "https://example.com";

    #[test]
    fn test_current_season() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        assert_eq!(current_season(d("2024-08-31")), 2023);
        assert_eq!(current_season(d("2024-09-01")), 2024);
        assert_eq!(current_season(d("2025-01-10")), 2024);
    }

    #[test]
    fn test_preloaded_page_skips_fetch() {
        let source = StaticPageSource::new();
        let pages = SeasonPages::new(&source, BASE);
        let doc = Html::parse_document("<p>cached</p>");

        assert!(pages.year_page(2020, Some(doc)).is_ok());
        assert!(source.requests().is_empty());
    }

    #[test]
    fn test_year_page_includes_commented_tables() {
        let source = StaticPageSource::new().with_page(
            "https://example.com/years/2020/",
            "<div><!--<table id=\"team_stats\"><tr><td>x</td></tr></table>--></div>",
        );
        let pages = SeasonPages::new(&source, BASE);
        let doc = pages.year_page(2020, None).unwrap();

        let sel = crate::parser::selector("table#team_stats").unwrap();
        assert_eq!(doc.select(&sel).count(), 1);
        assert_eq!(source.requests(), vec!["https://example.com/years/2020/"]);
    }

    #[test]
    fn test_defense_page_needs_renderer() {
        let source = StaticPageSource::new();
        let pages = SeasonPages::new(&source, BASE);
        assert!(matches!(
            pages.defense_page(2020, None),
            Err(ScraperError::Render { .. })
        ));

        let renderer =
            StaticPageSource::new().with_page("https://example.com/years/2020/opp.htm", "<p></p>");
        let pages = SeasonPages::new(&source, BASE).with_renderer(&renderer);
        assert!(pages.defense_page(2020, None).is_ok());
        assert!(source.requests().is_empty());
    }

    #[test]
    fn test_cache_reloads_only_on_season_change() {
        let loads = Cell::new(0);
        let load = |_season: i32| {
            loads.set(loads.get() + 1);
            Ok(Html::parse_document("<p></p>"))
        };

        let mut cache = SeasonCache::new();
        cache.get_or_load(2020, load).unwrap();
        cache.get_or_load(2020, load).unwrap();
        assert_eq!(loads.get(), 1);

        cache.get_or_load(2021, load).unwrap();
        assert_eq!(loads.get(), 2);
        assert_eq!(cache.season(), Some(2021));
    }
}
