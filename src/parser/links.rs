use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use tracing::{info, instrument};

use super::{absolute_url, first_href, selector};
use crate::apis::PageSource;
use crate::constants::GAME_SCORES_PATH;
use crate::error::{Result, ScraperError};
use crate::types::DetailLink;

static SCORE_PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pts_win=(\d+)&pts_lose=(\d+)").unwrap());

/// Detail-page links from the score index, in the order the rows appear.
///
/// Fails if the results table is missing or any data row has no link.
#[instrument(skip(doc))]
pub fn game_score_links(doc: &Html, base_url: &str) -> Result<Vec<DetailLink>> {
    let table_sel = selector("table.sortable.stats_table")?;
    let row_sel = selector("tr")?;

    let table = doc
        .select(&table_sel)
        .next()
        .ok_or_else(|| ScraperError::missing("results table (table.sortable.stats_table)"))?;

    // First row is the header
    let mut links = Vec::new();
    for (i, row) in table.select(&row_sel).enumerate().skip(1) {
        let href = first_href(&row)
            .ok_or_else(|| ScraperError::missing(format!("link in results row {i}")))?;
        links.push(DetailLink(absolute_url(base_url, href)));
    }

    info!("Found {} score links", links.len());
    Ok(links)
}

/// Uses the supplied index document, or fetches the default score index.
pub fn discover_links(
    source: &dyn PageSource,
    base_url: &str,
    index: Option<Html>,
) -> Result<Vec<DetailLink>> {
    let doc = match index {
        Some(doc) => doc,
        None => source.fetch(&absolute_url(base_url, GAME_SCORES_PATH))?,
    };
    game_score_links(&doc, base_url)
}

/// `(pts_win, pts_lose)` encoded in a score link's query string.
pub fn score_pair(link: &DetailLink) -> Option<(u32, u32)> {
    let caps = SCORE_PAIR_RE.captures(link.as_str())?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}
