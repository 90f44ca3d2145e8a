use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::constants::{
    FIELD_GAME_DATE, FIELD_HOME_WIN, FIELD_PTS_LOSE, FIELD_PTS_WIN, FIELD_SEASON,
};
use crate::error::{Result, ScraperError};
use crate::types::{Table, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIE_HOME_WIN: f64 = 0.5;

static GAME_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Closed interval `[Aug 1 season, Mar 1 season+1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonWindow {
    pub season: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SeasonWindow {
    pub fn for_year(season: i32) -> Option<Self> {
        Some(Self {
            season,
            start: NaiveDate::from_ymd_opt(season, 8, 1)?,
            end: NaiveDate::from_ymd_opt(season + 1, 3, 1)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One window per observed calendar year and per the year before it, so
/// January and February games find the season that started the previous
/// August. Sorted by season.
pub fn season_windows<I>(dates: I) -> Vec<SeasonWindow>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let years: BTreeSet<i32> = dates
        .into_iter()
        .flat_map(|d| [d.year() - 1, d.year()])
        .collect();
    years.into_iter().filter_map(SeasonWindow::for_year).collect()
}

/// Season label for `date`. Dates between Mar 2 and Jul 31 sit in no window
/// and belong to the next season to start.
pub fn assign_season(windows: &[SeasonWindow], date: NaiveDate) -> Option<i32> {
    windows
        .iter()
        .find(|w| w.contains(date))
        .or_else(|| windows.iter().find(|w| w.start > date))
        .map(|w| w.season)
}

fn is_tie(pts_win: &Value, pts_lose: &Value) -> bool {
    if pts_win.is_null() || pts_lose.is_null() {
        return false;
    }
    match (pts_win.as_f64(), pts_lose.as_f64()) {
        (Some(w), Some(l)) => w == l,
        _ => pts_win == pts_lose,
    }
}

/// Sets `home_win` to 0.5 on every tied game; other rows keep their
/// location indicator. Returns the number of ties.
pub fn resolve_ties(table: &mut Table) -> Result<usize> {
    let mut ties = 0;
    for record in table.records_mut() {
        let pts_win = record
            .get(FIELD_PTS_WIN)
            .ok_or_else(|| ScraperError::MissingField(FIELD_PTS_WIN.to_string()))?;
        let pts_lose = record
            .get(FIELD_PTS_LOSE)
            .ok_or_else(|| ScraperError::MissingField(FIELD_PTS_LOSE.to_string()))?;

        if is_tie(pts_win, pts_lose) {
            record.insert(FIELD_HOME_WIN, Value::Float(TIE_HOME_WIN));
            ties += 1;
        }
    }
    Ok(ties)
}

fn parse_game_date(key: &str, value: Option<&Value>) -> Result<NaiveDate> {
    let raw = match value {
        None | Some(Value::Null) => {
            return Err(ScraperError::MissingField(format!("{FIELD_GAME_DATE} in row {key}")))
        }
        Some(v) => v.to_string(),
    };
    // chrono alone accepts unpadded fields, signs and leading spaces
    if !GAME_DATE_RE.is_match(&raw) {
        return Err(ScraperError::InvalidDate { value: raw });
    }
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|_| ScraperError::InvalidDate { value: raw })
}

/// Adds the derived columns to an assembled games table: tie resolution,
/// normalized `game_date`, date ordering and the integer `season`.
#[instrument(skip(table), fields(rows = table.len()))]
pub fn add_stats(mut table: Table) -> Result<Table> {
    let ties = resolve_ties(&mut table)?;

    let dates = table
        .iter()
        .map(|row| {
            parse_game_date(&row.key, row.record.get(FIELD_GAME_DATE)).map(|d| (row.key.clone(), d))
        })
        .collect::<Result<Vec<(String, NaiveDate)>>>()?;

    let windows = season_windows(dates.iter().map(|(_, d)| *d));
    debug!("Built {} season windows", windows.len());

    let mut unassigned = 0;
    for (record, (_, date)) in table.records_mut().zip(&dates) {
        let season = assign_season(&windows, *date);
        if season.is_none() {
            unassigned += 1;
        }
        record.insert(FIELD_GAME_DATE, date.format(DATE_FORMAT).to_string());
        record.insert(FIELD_SEASON, season.map(i64::from));
    }
    if unassigned > 0 {
        warn!("{} games fall outside every season window", unassigned);
    }

    let by_key: HashMap<String, NaiveDate> = dates.into_iter().collect();
    table.sort_by_key(|row| by_key.get(&row.key).copied());

    info!("Enriched {} games ({} ties)", table.len(), ties);
    Ok(table)
}
