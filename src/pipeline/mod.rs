//! Game-results acquisition: discover the per-score pages, extract each one,
//! merge them into one table and add the derived columns.

pub mod accumulator;
pub mod enrich;
pub mod season;

pub use accumulator::{page_key, Accumulator, MAX_PAGES};
pub use enrich::{add_stats, assign_season, resolve_ties, season_windows, SeasonWindow};
pub use season::{current_season, SeasonCache, SeasonPages};

use std::thread;
use std::time::Duration;

use scraper::Html;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::apis::PageSource;
use crate::config::Config;
use crate::error::{Result, ScraperError};
use crate::parser::games::extract_games;
use crate::parser::links::{discover_links, score_pair};
use crate::types::Table;

const DEFAULT_WAIT: Duration = Duration::from_secs(2);

/// Reported before each detail page is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// 1-based position of the page being fetched
    pub current: usize,
    pub total: usize,
    /// `(pts_win, pts_lose)` of the score the page lists, when the link carries it
    pub score: Option<(u32, u32)>,
    pub link: String,
}

/// Outcome of one acquisition pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub pages: usize,
    pub added_rows: usize,
    pub total_rows: usize,
}

/// One sequential pass over every detail page listed on the score index.
pub struct GamesRun<'a> {
    source: &'a dyn PageSource,
    base_url: String,
    wait: Duration,
}

impl<'a> GamesRun<'a> {
    pub fn new(source: &'a dyn PageSource, base_url: impl Into<String>) -> Self {
        Self {
            source,
            base_url: base_url.into(),
            wait: DEFAULT_WAIT,
        }
    }

    pub fn from_config(source: &'a dyn PageSource, config: &Config) -> Self {
        Self::new(source, config.site.base_url.clone()).with_wait(config.pacing.wait())
    }

    /// Delay between successive detail-page fetches.
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Fetches and extracts every detail page into `acc`. Rows land in `acc`
    /// page by page, so on error it holds everything gathered so far and
    /// can seed a later run.
    #[instrument(skip_all, fields(seeded = acc.is_seeded()))]
    pub fn collect_into<F>(
        &self,
        acc: &mut Accumulator,
        index: Option<Html>,
        mut on_progress: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(&Progress),
    {
        let links = discover_links(self.source, &self.base_url, index)?;
        let total = links.len();
        if total > MAX_PAGES {
            return Err(ScraperError::InvalidArgument(format!(
                "{total} score pages exceed the {MAX_PAGES}-page key space"
            )));
        }

        let mut added_rows = 0;
        for (i, link) in links.iter().enumerate() {
            let progress = Progress {
                current: i + 1,
                total,
                score: score_pair(link),
                link: link.to_string(),
            };
            match progress.score {
                Some((win, lose)) => {
                    info!("Retrieving {}-{} score ({} of {})", win, lose, i + 1, total)
                }
                None => info!("Retrieving {} ({} of {})", link, i + 1, total),
            }
            on_progress(&progress);

            let doc = self.source.fetch(link.as_str())?;
            let page = extract_games(&doc, &self.base_url, acc.existing())?;
            let added = acc.add_page(i, page)?;
            debug!("Page {} added {} rows", i, added);
            added_rows += added;

            if i + 1 < total && !self.wait.is_zero() {
                thread::sleep(self.wait);
            }
        }

        let summary = RunSummary {
            pages: total,
            added_rows,
            total_rows: acc.len(),
        };
        info!(
            "Collected {} new games from {} pages ({} total)",
            summary.added_rows, summary.pages, summary.total_rows
        );
        Ok(summary)
    }

    /// Raw consolidated table. A seed is validated before anything is fetched.
    pub fn collect<F>(
        &self,
        seed: Option<Table>,
        index: Option<Html>,
        on_progress: F,
    ) -> Result<Table>
    where
        F: FnMut(&Progress),
    {
        let mut acc = Accumulator::from_seed(seed)?;
        self.collect_into(&mut acc, index, on_progress)?;
        Ok(acc.into_table())
    }

    /// Full run: collect, then add the derived columns.
    pub fn run<F>(&self, seed: Option<Table>, index: Option<Html>, on_progress: F) -> Result<Table>
    where
        F: FnMut(&Progress),
    {
        add_stats(self.collect(seed, index, on_progress)?)
    }
}
