use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::constants::{
    COL_LOSER, COL_WINNER, FIELD_BOXSCORE, FIELD_GAME_DATE, FIELD_PTS_LOSE, FIELD_PTS_WIN,
};

/// A single cell value. Source cells arrive as text; the extractor and
/// enricher synthesize the numeric variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value; text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One extracted row: field name to value, in the order fields were first set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub key: String,
    pub record: Record,
}

/// Ordered mapping from row key to record. Appending never reorders
/// existing rows; re-inserting a key replaces its record in place.
#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<TableRow>,
    index: HashMap<String, usize>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.index.get(key).map(|&i| &self.rows[i].record)
    }

    pub fn insert(&mut self, key: impl Into<String>, record: Record) -> Option<Record> {
        let key = key.into();
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.rows[i].record, record));
        }
        self.index.insert(key.clone(), self.rows.len());
        self.rows.push(TableRow { key, record });
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter()
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut Record> {
        self.rows.iter_mut().map(|row| &mut row.record)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.key.as_str())
    }

    /// Union of field names across all records, in first-seen order.
    pub fn columns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for row in &self.rows {
            for key in row.record.keys() {
                if seen.insert(key) {
                    columns.push(key.to_string());
                }
            }
        }
        columns
    }

    /// Identity of every game in the table that has one; see [`game_identity`].
    pub fn game_identities(&self) -> ExistingSet {
        self.rows.iter().filter_map(|row| game_identity(&row.record)).collect()
    }

    /// Stable sort of the rows; keys stay attached to their records.
    pub fn sort_by_key<K: Ord, F: FnMut(&TableRow) -> K>(&mut self, f: F) {
        self.rows.sort_by_key(f);
        self.index = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.key.clone(), i))
            .collect();
    }
}

impl IntoIterator for Table {
    type Item = TableRow;
    type IntoIter = std::vec::IntoIter<TableRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Fields that identify a game with no boxscore link.
const FALLBACK_IDENTITY: [&str; 5] =
    [FIELD_GAME_DATE, COL_WINNER, COL_LOSER, FIELD_PTS_WIN, FIELD_PTS_LOSE];

/// The boxscore URL when there is one. Otherwise the date, teams and score
/// joined with `|`, provided the row has a date; rows without either cannot
/// be told apart and have no identity.
pub fn game_identity(record: &Record) -> Option<String> {
    if let Some(url) = record.get(FIELD_BOXSCORE).and_then(Value::as_str) {
        return Some(url.to_string());
    }
    if record.get(FIELD_GAME_DATE).map_or(true, Value::is_null) {
        return None;
    }
    let parts: Vec<String> = FALLBACK_IDENTITY
        .iter()
        .map(|field| record.get(field).map(Value::to_string).unwrap_or_default())
        .collect();
    Some(parts.join("|"))
}

/// Game identities captured by a prior run. Only ever read by the core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingSet(HashSet<String>);

impl ExistingSet {
    pub fn contains(&self, url: &str) -> bool {
        self.0.contains(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for ExistingSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        ExistingSet(iter.into_iter().collect())
    }
}

/// Absolute URL of one detail page found on an index page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DetailLink(pub String);

impl DetailLink {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DetailLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamEntry {
    pub team_id: String,
    pub stats: Record,
}

/// Flat team-name to stat-line mapping parsed from one statistical table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamTable {
    pub table_id: String,
    pub caption: String,
    teams: Vec<(String, TeamEntry)>,
}

impl TeamTable {
    pub fn new(table_id: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            caption: caption.into(),
            teams: Vec::new(),
        }
    }

    /// Starts (or restarts) the entry for `name`; a repeated name replaces
    /// the earlier entry in its original position.
    pub fn start_team(&mut self, name: &str, team_id: impl Into<String>) -> &mut TeamEntry {
        let entry = TeamEntry {
            team_id: team_id.into(),
            stats: Record::new(),
        };
        let pos = match self.teams.iter().position(|(n, _)| n == name) {
            Some(pos) => {
                self.teams[pos].1 = entry;
                pos
            }
            None => {
                self.teams.push((name.to_string(), entry));
                self.teams.len() - 1
            }
        };
        &mut self.teams[pos].1
    }

    pub fn get(&self, name: &str) -> Option<&TeamEntry> {
        self.teams.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TeamEntry> {
        self.teams.iter_mut().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    pub fn team_names(&self) -> impl Iterator<Item = &str> {
        self.teams.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TeamEntry)> {
        self.teams.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Flattens into a record table keyed by team name, `team_id` first.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        for (name, entry) in &self.teams {
            let mut record = Record::new();
            record.insert("team_id", entry.team_id.as_str());
            for (k, v) in entry.stats.iter() {
                record.insert(k, v.clone());
            }
            table.insert(name.clone(), record);
        }
        table
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamLink {
    pub name: String,
    pub team_id: String,
    pub link: String,
}
