pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod storage;
pub mod types;

pub use apis::{HttpPageSource, PageSource, StaticPageSource};
pub use config::Config;
pub use error::{Result, ScraperError};
pub use pipeline::{Accumulator, GamesRun, Progress, RunSummary, SeasonCache, SeasonPages};
pub use types::{
    game_identity, DetailLink, ExistingSet, Record, Table, TableRow, TeamEntry, TeamLink,
    TeamTable, Value,
};
