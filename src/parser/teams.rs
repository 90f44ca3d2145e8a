//! Team-level tables: conference standings and the offense/defense
//! category tables.
//!
//! Standings rows come in three kinds: header echoes (`Tm`), division
//! headers (a single `onecell` cell that sets the division for the rows
//! below it) and team rows. Category tables are either *standard* (one team
//! per row, ending at a summary row) or *row-tagged* (wide tables where only
//! rows carrying a row-index attribute hold data).

use scraper::{ElementRef, Html};
use tracing::{debug, info, instrument, warn};

use super::{
    absolute_url, cell_text, data_stat, first_href, row_cells, sanitize_team_name, selector,
    team_page_id,
};
use crate::constants::{
    COL_ONECELL, COL_TEAM, CONFERENCE_TABLE_IDS, DEFENSE_TABLE_IDS, FIELD_DIVISION,
    HEADER_TEAM_LABEL, OFFENSE_TABLE_IDS, ROW_INDEX_ATTR, ROW_TAGGED_CAPTIONS, STANDARD_CAPTIONS,
    SUMMARY_TEAM_LABELS, UNKNOWN_CAPTION,
};
use crate::error::{Result, ScraperError};
use crate::types::{TeamLink, TeamTable};

/// How a category table's rows are walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    Standard,
    RowTagged,
}

/// Layout and display name for a table caption. Unknown captions fall back
/// to the standard walk under a placeholder name.
pub fn classify_caption(caption: &str) -> (TableLayout, String) {
    let caption = normalize_caption(caption);
    if ROW_TAGGED_CAPTIONS.contains(&caption.as_str()) {
        (TableLayout::RowTagged, caption)
    } else if STANDARD_CAPTIONS.contains(&caption.as_str()) {
        (TableLayout::Standard, caption)
    } else {
        warn!("Unrecognized table caption '{}'; parsing as a standard table", caption);
        (TableLayout::Standard, UNKNOWN_CAPTION.to_string())
    }
}

fn normalize_caption(caption: &str) -> String {
    let caption = caption.trim();
    caption.strip_suffix(" Table").unwrap_or(caption).trim().to_string()
}

fn conference_tables(doc: &Html) -> Result<Vec<ElementRef<'_>>> {
    CONFERENCE_TABLE_IDS
        .iter()
        .map(|id| {
            let sel = selector(&format!("table#{id}"))?;
            doc.select(&sel)
                .next()
                .ok_or_else(|| ScraperError::missing(format!("{id} standings table")))
        })
        .collect()
}

/// Rows whose first header cell repeats the column label.
fn is_header_echo(row: &ElementRef) -> bool {
    row_cells(row, true)
        .into_iter()
        .find(|c| c.value().name() == "th")
        .map(|th| cell_text(&th).trim() == HEADER_TEAM_LABEL)
        .unwrap_or(false)
}

fn linked_team_id(cell: &ElementRef) -> String {
    first_href(cell).and_then(team_page_id).unwrap_or_default()
}

/// Both conference standings tables as one team table.
#[instrument(skip(doc))]
pub fn standings(doc: &Html) -> Result<TeamTable> {
    let row_sel = selector("tr")?;
    let mut table = TeamTable::new("standings", "Standings");
    let mut division = String::new();

    for conference in conference_tables(doc)? {
        for row in conference.select(&row_sel) {
            if is_header_echo(&row) {
                continue;
            }

            let mut team: Option<String> = None;
            for cell in row_cells(&row, true) {
                let Some(stat) = data_stat(&cell) else { continue };
                let value = cell_text(&cell);

                match stat {
                    COL_ONECELL => division = value.trim().to_string(),
                    COL_TEAM => {
                        let name = sanitize_team_name(&value);
                        let entry = table.start_team(&name, linked_team_id(&cell));
                        entry.stats.insert(FIELD_DIVISION, division.as_str());
                        team = Some(name);
                    }
                    _ => match &team {
                        Some(name) => {
                            if let Some(entry) = table.get_mut(name) {
                                entry.stats.insert(stat, value);
                            }
                        }
                        None => debug!("Dropping '{}' cell outside a team row", stat),
                    },
                }
            }
        }
    }

    info!("Parsed standings for {} teams", table.len());
    Ok(table)
}

/// Team page links from the standings tables.
#[instrument(skip(doc))]
pub fn team_links(doc: &Html, base_url: &str) -> Result<Vec<TeamLink>> {
    let row_sel = selector("tr")?;
    let mut links: Vec<TeamLink> = Vec::new();

    for conference in conference_tables(doc)? {
        for row in conference.select(&row_sel) {
            if is_header_echo(&row) {
                continue;
            }
            for cell in row_cells(&row, true) {
                if data_stat(&cell) != Some(COL_TEAM) {
                    continue;
                }
                let href = first_href(&cell).ok_or_else(|| {
                    ScraperError::missing(format!("team link for '{}'", cell_text(&cell).trim()))
                })?;
                let link = TeamLink {
                    name: sanitize_team_name(&cell_text(&cell)),
                    team_id: team_page_id(href).unwrap_or_default(),
                    link: absolute_url(base_url, href),
                };
                match links.iter_mut().find(|l| l.name == link.name) {
                    Some(existing) => *existing = link,
                    None => links.push(link),
                }
            }
        }
    }

    Ok(links)
}

/// Every known category table on a team-stats page.
pub fn team_stat_tables(doc: &Html, table_ids: &[&str]) -> Result<Vec<TeamTable>> {
    let wrapper_sel = selector("div.table_wrapper")?;
    let table_sel = selector("table[id]")?;
    let caption_sel = selector("caption")?;

    let mut tables = Vec::new();
    for wrapper in doc.select(&wrapper_sel) {
        let Some(table_el) = wrapper.select(&table_sel).next() else {
            continue;
        };
        let table_id = table_el.value().attr("id").unwrap_or_default();
        if !table_ids.contains(&table_id) {
            continue;
        }

        let caption = table_el
            .select(&caption_sel)
            .next()
            .map(|c| cell_text(&c))
            .unwrap_or_default();
        let (layout, name) = classify_caption(&caption);

        let mut table = TeamTable::new(table_id, name);
        match layout {
            TableLayout::Standard => parse_standard(&table_el, &mut table)?,
            TableLayout::RowTagged => parse_row_tagged(&table_el, &mut table)?,
        }
        debug!("Parsed {} ({:?}) with {} teams", table.caption, layout, table.len());
        tables.push(table);
    }

    info!("Parsed {} team stat tables", tables.len());
    Ok(tables)
}

pub fn offense_tables(doc: &Html) -> Result<Vec<TeamTable>> {
    team_stat_tables(doc, &OFFENSE_TABLE_IDS)
}

pub fn defense_tables(doc: &Html) -> Result<Vec<TeamTable>> {
    team_stat_tables(doc, &DEFENSE_TABLE_IDS)
}

enum RowOutcome {
    Team,
    NoTeam,
    Summary,
}

/// One team per body row; stops at the first summary row.
fn parse_standard(table_el: &ElementRef, table: &mut TeamTable) -> Result<()> {
    let row_sel = selector("tbody > tr, tfoot > tr")?;
    for row in table_el.select(&row_sel) {
        if let RowOutcome::Summary = walk_team_row(&row, table) {
            break;
        }
    }
    Ok(())
}

/// Only rows carrying the row-index attribute hold data.
fn parse_row_tagged(table_el: &ElementRef, table: &mut TeamTable) -> Result<()> {
    let row_sel = selector("tr")?;
    for row in table_el.select(&row_sel) {
        if row.value().attr(ROW_INDEX_ATTR).is_none() {
            continue;
        }
        if let RowOutcome::NoTeam = walk_team_row(&row, table) {
            debug!("Row-tagged row without a team cell");
        }
    }
    Ok(())
}

fn walk_team_row(row: &ElementRef, table: &mut TeamTable) -> RowOutcome {
    // Cells ahead of the team cell (e.g. the rank) are held until it appears
    let mut pending: Vec<(&str, String)> = Vec::new();
    let mut team: Option<String> = None;

    for cell in row_cells(row, true) {
        let Some(stat) = data_stat(&cell) else { continue };
        let value = cell_text(&cell);

        if stat == COL_TEAM {
            let name = sanitize_team_name(&value);
            if SUMMARY_TEAM_LABELS.contains(&name.as_str()) {
                return RowOutcome::Summary;
            }
            if name == HEADER_TEAM_LABEL {
                return RowOutcome::NoTeam;
            }
            let entry = table.start_team(&name, linked_team_id(&cell));
            for (k, v) in pending.drain(..) {
                entry.stats.insert(k, v);
            }
            team = Some(name);
            continue;
        }

        match &team {
            Some(name) => {
                if let Some(entry) = table.get_mut(name) {
                    entry.stats.insert(stat, value);
                }
            }
            None => pending.push((stat, value)),
        }
    }

    if team.is_some() {
        RowOutcome::Team
    } else {
        RowOutcome::NoTeam
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    const STANDINGS: &str = r#"
        <table id="AFC">
          <thead><tr><th data-stat="team">Tm</th><th data-stat="wins">W</th></tr></thead>
          <tbody>
            <tr><td data-stat="onecell" colspan="2">AFC East</td></tr>
            <tr><th data-stat="team"><a href="/teams/buf/2020.htm">Buffalo Bills</a>*</th><td data-stat="wins">13</td><td data-stat="losses">3</td></tr>
            <tr><th data-stat="team"><a href="/teams/mia/2020.htm">Miami Dolphins</a></th><td data-stat="wins">10</td><td data-stat="losses">6</td></tr>
            <tr><th data-stat="team">Tm</th><td data-stat="wins">W</td></tr>
            <tr><td data-stat="onecell" colspan="2">AFC North</td></tr>
            <tr><th data-stat="team"><a href="/teams/pit/2020.htm">Pittsburgh Steelers</a>*</th><td data-stat="wins">12</td><td data-stat="losses">4</td></tr>
          </tbody>
        </table>
        <table id="NFC">
          <tbody>
            <tr><td data-stat="onecell">NFC West</td></tr>
            <tr><th data-stat="team"><a href="/teams/sea/2020.htm">Seattle Seahawks</a>*</th><td data-stat="wins">12</td><td data-stat="losses">4</td></tr>
            <tr><th data-stat="team">Expansion Team</th><td data-stat="wins">0</td></tr>
          </tbody>
        </table>"#;

    #[test]
    fn test_standings_divisions_and_ids() {
        let doc = Html::parse_document(STANDINGS);
        let table = standings(&doc).unwrap();

        let names: Vec<&str> = table.team_names().collect();
        assert_eq!(
            names,
            vec![
                "Buffalo Bills",
                "Miami Dolphins",
                "Pittsburgh Steelers",
                "Seattle Seahawks",
                "Expansion Team"
            ]
        );

        let bills = table.get("Buffalo Bills").unwrap();
        assert_eq!(bills.team_id, "buf");
        assert_eq!(bills.stats.get("division"), Some(&Value::from("AFC East")));
        assert_eq!(bills.stats.get("wins"), Some(&Value::from("13")));

        let steelers = table.get("Pittsburgh Steelers").unwrap();
        assert_eq!(steelers.stats.get("division"), Some(&Value::from("AFC North")));

        let seahawks = table.get("Seattle Seahawks").unwrap();
        assert_eq!(seahawks.stats.get("division"), Some(&Value::from("NFC West")));

        assert_eq!(table.get("Expansion Team").unwrap().team_id, "");
        assert!(table.get("Tm").is_none());
    }

    #[test]
    fn test_standings_require_both_conferences() {
        let doc = Html::parse_document(r#"<table id="AFC"><tr><td>x</td></tr></table>"#);
        assert!(matches!(standings(&doc), Err(ScraperError::MissingElement { .. })));
    }

    #[test]
    fn test_team_links() {
        let doc = Html::parse_document(STANDINGS.replace(
            "<th data-stat=\"team\">Expansion Team</th>",
            "<th data-stat=\"team\"><a href=\"/teams/exp/2020.htm\">Expansion Team</a></th>",
        ).as_str());
        let links = team_links(&doc, "https://example.com").unwrap();

        assert_eq!(links.len(), 5);
        assert_eq!(links[0].name, "Buffalo Bills");
        assert_eq!(links[0].team_id, "buf");
        assert_eq!(links[0].link, "https://example.com/teams/buf/2020.htm");
    }

    #[test]
    fn test_classify_caption() {
        assert_eq!(classify_caption("Team Offense Table").0, TableLayout::Standard);
        assert_eq!(classify_caption("Team Conversions Table").0, TableLayout::RowTagged);
        assert_eq!(classify_caption("Team Drives").1, "Team Drives");

        let (layout, name) = classify_caption("Something New");
        assert_eq!(layout, TableLayout::Standard);
        assert_eq!(name, UNKNOWN_CAPTION);
    }
}
