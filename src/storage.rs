//! Delimited-text persistence for tables: the dated games export, the team
//! table exports, and reading a prior export back as a seed.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::mem::take;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, instrument};

use crate::error::{Result, ScraperError};
use crate::types::{Record, Table, TeamTable, Value};

const SEP: char = ',';
const KEY_HEADER: &str = "key";

/// `all_nfl_games{year}_{month}_{day}.csv`, month and day unpadded.
pub fn dated_filename(date: NaiveDate) -> String {
    format!("all_nfl_games{}_{}_{}.csv", date.year(), date.month(), date.day())
}

/// File name for one team table, e.g. `team_conversions_2020.csv`.
pub fn team_table_filename(table: &TeamTable, season: i32) -> String {
    let slug: String = table
        .caption
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    let slug = if slug.is_empty() { table.table_id.clone() } else { slug };
    format!("{slug}_{season}.csv")
}

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write>(w: &mut W, row: &[String]) -> std::io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{SEP}")?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    writeln!(w)
}

/// Splits delimited text into rows; quoted fields may hold separators,
/// doubled quotes and line breaks.
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            c if c == SEP && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                if row.len() == 1 && row[0].is_empty() {
                    row.clear();
                } else {
                    rows.push(take(&mut row));
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Writes `table` with a leading key column. The header is the union of
/// field names in first-seen order; nulls and absent fields are empty.
#[instrument(skip_all, fields(path = %path.as_ref().display(), rows = table.len()))]
pub fn write_table(path: impl AsRef<Path>, table: &Table) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let columns = table.columns();
    let mut out = BufWriter::new(File::create(path)?);

    let header: Vec<String> = std::iter::once(KEY_HEADER.to_string())
        .chain(columns.iter().cloned())
        .collect();
    write_row(&mut out, &header)?;

    for row in table.iter() {
        let cells: Vec<String> = std::iter::once(row.key.clone())
            .chain(
                columns
                    .iter()
                    .map(|c| row.record.get(c).map(Value::to_string).unwrap_or_default()),
            )
            .collect();
        write_row(&mut out, &cells)?;
    }
    out.flush()?;

    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Reads a table written by [`write_table`]. Every non-empty cell comes back
/// as text and every empty cell as null.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_table(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let mut rows = parse_rows(&text).into_iter();

    let Some(header) = rows.next() else {
        return Ok(Table::new());
    };
    let columns = header.get(1..).unwrap_or_default();

    let mut table = Table::new();
    for (line, mut cells) in rows.enumerate() {
        if cells.len() > header.len() {
            return Err(ScraperError::InvalidArgument(format!(
                "{}: row {} has {} cells but the header has {}",
                path.display(),
                line + 1,
                cells.len(),
                header.len()
            )));
        }
        cells.resize(header.len(), String::new());

        let mut cells = cells.into_iter();
        let key = cells.next().unwrap_or_default();
        let record: Record = columns
            .iter()
            .zip(cells)
            .map(|(column, cell)| {
                let value = if cell.is_empty() { Value::Null } else { Value::Text(cell) };
                (column.as_str(), value)
            })
            .collect();

        if table.insert(key.clone(), record).is_some() {
            return Err(ScraperError::InvalidArgument(format!(
                "{}: duplicate row key '{}'",
                path.display(),
                key
            )));
        }
    }

    debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Writes each team table to `dir`, returning the paths written.
pub fn write_team_tables(
    dir: impl AsRef<Path>,
    season: i32,
    tables: &[TeamTable],
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let path = dir.join(team_table_filename(table, season));
        write_table(&path, &table.to_table())?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_dated_filename_is_unpadded() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 7).unwrap();
        assert_eq!(dated_filename(date), "all_nfl_games2021_3_7.csv");
    }

    #[test]
    fn test_write_then_read_keeps_keys_and_nulls() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("games.csv");

        let mut table = Table::new();
        let mut first = Record::new();
        first.insert("winner", "Washington Football Team");
        first.insert("boxscore", Value::Null);
        first.insert("pts_win", Value::Int(20));
        table.insert("00000", first);
        let mut second = Record::new();
        second.insert("winner", "Kansas City, \"KC\"");
        second.insert("home_win", Value::Float(0.5));
        table.insert("00010", second);

        write_table(&path, &table).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("key,winner,boxscore,pts_win,home_win\n"));

        let back = read_table(&path).unwrap();
        let keys: Vec<&str> = back.keys().collect();
        assert_eq!(keys, vec!["00000", "00010"]);

        let first = back.get("00000").unwrap();
        assert_eq!(first.get("boxscore"), Some(&Value::Null));
        assert_eq!(first.get("pts_win"), Some(&Value::from("20")));
        assert_eq!(first.get("home_win"), Some(&Value::Null));

        let second = back.get("00010").unwrap();
        assert_eq!(second.get("winner"), Some(&Value::from("Kansas City, \"KC\"")));
        assert_eq!(second.get("home_win"), Some(&Value::from("0.5")));
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dupes.csv");
        fs::write(&path, "key,boxscore\n1,a\n1,b\n").unwrap();
        assert!(matches!(read_table(&path), Err(ScraperError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_file_is_an_empty_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        assert!(read_table(&path).unwrap().is_empty());
    }

    #[test]
    fn test_team_table_filename() {
        let table = TeamTable::new("team_conversions", "Team Conversions");
        assert_eq!(team_table_filename(&table, 2020), "team_conversions_2020.csv");
        let table = TeamTable::new("x", "***");
        assert_eq!(team_table_filename(&table, 2020), "x_2020.csv");
    }
}
