use scraper::{ElementRef, Html};
use tracing::{debug, instrument};

use super::{absolute_url, cell_text, data_stat, first_href, game_team_id, row_cells, selector};
use crate::constants::{
    AWAY_MARKER, COL_BOXSCORE_WORD, COL_GAME_LOCATION, COL_GAME_OUTCOME, COL_LOSER, COL_WINNER,
    FIELD_BOXSCORE, FIELD_HOME_WIN, FIELD_LOSER_ID, FIELD_WINNER_ID,
};
use crate::error::{Result, ScraperError};
use crate::types::{game_identity, ExistingSet, Record, Table, Value};

/// Extracts every game row of one detail page's `games` table.
///
/// Rows are keyed by their position below the header row. When `existing`
/// is given, rows whose game is already known are skipped, but their
/// position is still consumed so the remaining keys do not shift. Linked
/// rows are matched on the boxscore URL before extraction; linkless rows
/// are matched on their [`game_identity`] after it.
#[instrument(skip(doc, existing), fields(known = existing.map_or(0, |e| e.len())))]
pub fn extract_games(doc: &Html, base_url: &str, existing: Option<&ExistingSet>) -> Result<Table> {
    let table_sel = selector("table#games")?;
    let row_sel = selector("tr")?;

    let table_el = doc
        .select(&table_sel)
        .next()
        .ok_or_else(|| ScraperError::missing("games table (table#games)"))?;

    let mut games = Table::new();
    let mut skipped = 0usize;
    for (i, row) in table_el.select(&row_sel).skip(1).enumerate() {
        if let Some(known) = existing {
            if let Some(url) = boxscore_url(&row, base_url) {
                if known.contains(&url) {
                    skipped += 1;
                    continue;
                }
            }
        }

        let cells = row_cells(&row, false);
        if cells.is_empty() {
            // Repeated header rows carry only `th` cells
            debug!("Row {} has no data cells", i);
            continue;
        }

        let record = extract_record(&cells, base_url, i)?;
        if let (Some(known), Some(id)) = (existing, game_identity(&record)) {
            if known.contains(&id) {
                skipped += 1;
                continue;
            }
        }
        games.insert(i.to_string(), record);
    }

    debug!("Extracted {} games ({} already known)", games.len(), skipped);
    Ok(games)
}

fn extract_record(cells: &[ElementRef], base_url: &str, row: usize) -> Result<Record> {
    let mut record = Record::new();
    for cell in cells {
        let stat = data_stat(cell).ok_or_else(|| {
            ScraperError::missing(format!("data-stat on a cell in games row {row}"))
        })?;

        match stat {
            COL_WINNER => record.insert(FIELD_WINNER_ID, first_href(cell).and_then(game_team_id)),
            COL_LOSER => record.insert(FIELD_LOSER_ID, first_href(cell).and_then(game_team_id)),
            COL_GAME_LOCATION => {
                let home = if cell_text(cell).contains(AWAY_MARKER) { 0 } else { 1 };
                record.insert(FIELD_HOME_WIN, Value::Int(home));
                continue;
            }
            COL_BOXSCORE_WORD => {
                let url = first_href(cell).map(|href| absolute_url(base_url, href));
                record.insert(FIELD_BOXSCORE, url);
                continue;
            }
            COL_GAME_OUTCOME => continue,
            _ => {}
        }

        // Winner and loser keep their display text alongside the id
        record.insert(stat, cell_text(cell));
    }
    Ok(record)
}

fn boxscore_url(row: &ElementRef, base_url: &str) -> Option<String> {
    row_cells(row, false)
        .into_iter()
        .find(|cell| data_stat(cell) == Some(COL_BOXSCORE_WORD))
        .and_then(|cell| first_href(&cell).map(|href| absolute_url(base_url, href)))
}
