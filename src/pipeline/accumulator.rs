use std::collections::HashSet;

use tracing::{debug, info};

use crate::constants::FIELD_BOXSCORE;
use crate::error::{Result, ScraperError};
use crate::types::{game_identity, ExistingSet, Table};

/// Page prefixes are four digits wide, so keys stay disjoint up to this many pages.
pub const MAX_PAGES: usize = 10_000;

/// Global row key for row `local_key` of page `page_index`.
pub fn page_key(page_index: usize, local_key: &str) -> String {
    format!("{page_index:04}{local_key}")
}

/// Merges per-page tables into one table.
///
/// A seeded accumulator starts from a prior run's table, keeps its keys,
/// and exposes the seed's game identities so the extractor can skip rows
/// that are already captured. Rows repeating a game already in the table
/// are dropped, which also absorbs duplicate detail links.
#[derive(Debug, Default)]
pub struct Accumulator {
    table: Table,
    existing: Option<ExistingSet>,
    seen: HashSet<String>,
    added: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects a seed that cannot supply boxscore identifiers.
    pub fn with_seed(seed: Table) -> Result<Self> {
        if let Some(row) = seed.iter().find(|row| !row.record.contains(FIELD_BOXSCORE)) {
            return Err(ScraperError::InvalidArgument(format!(
                "seed table needs a '{}' column; row '{}' has none",
                FIELD_BOXSCORE, row.key
            )));
        }

        let existing = seed.game_identities();
        info!("Seeded with {} rows ({} known games)", seed.len(), existing.len());
        Ok(Self {
            seen: existing.iter().map(str::to_string).collect(),
            existing: Some(existing),
            table: seed,
            added: 0,
        })
    }

    pub fn from_seed(seed: Option<Table>) -> Result<Self> {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Ok(Self::new()),
        }
    }

    /// Game identities of the seed, if any; never changes after construction.
    pub fn existing(&self) -> Option<&ExistingSet> {
        self.existing.as_ref()
    }

    pub fn is_seeded(&self) -> bool {
        self.existing.is_some()
    }

    /// Appends one page's rows under collision-free keys. Returns the number
    /// of rows added.
    pub fn add_page(&mut self, page_index: usize, page: Table) -> Result<usize> {
        if page_index >= MAX_PAGES {
            return Err(ScraperError::InvalidArgument(format!(
                "page index {page_index} exceeds the {MAX_PAGES}-page key space"
            )));
        }

        let mut added = 0;
        for row in page {
            if let Some(id) = game_identity(&row.record) {
                if self.seen.contains(&id) {
                    debug!("Skipping repeated game {}", id);
                    continue;
                }
                self.seen.insert(id);
            }
            let key = self.free_key(page_key(page_index, &row.key));
            self.table.insert(key, row.record);
            added += 1;
        }

        self.added += added;
        Ok(added)
    }

    /// Seed keys can coincide with generated ones; suffix until unused.
    fn free_key(&self, key: String) -> String {
        if !self.table.contains_key(&key) {
            return key;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{key}_{n}");
            if !self.table.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Rows appended since construction.
    pub fn added(&self) -> usize {
        self.added
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }
}
