//! Site and column constants for pro-football-reference pages.
//! Column names are the `data-stat` attribute values the site puts on each cell.

pub const BASE_URL: &str = "https://www.pro-football-reference.com";

/// Index page listing every final score that has ever occurred
pub const GAME_SCORES_PATH: &str = "/boxscores/game-scores.htm";

pub fn year_path(season: i32) -> String {
    format!("/years/{season}/")
}

pub fn defense_path(season: i32) -> String {
    format!("/years/{season}/opp.htm")
}

// Detail-page (games table) columns with special handling
pub const COL_WINNER: &str = "winner";
pub const COL_LOSER: &str = "loser";
pub const COL_GAME_LOCATION: &str = "game_location";
pub const COL_BOXSCORE_WORD: &str = "boxscore_word";
pub const COL_GAME_OUTCOME: &str = "game_outcome";

// Fields synthesized by the record extractor and enricher
pub const FIELD_WINNER_ID: &str = "winner_id";
pub const FIELD_LOSER_ID: &str = "loser_id";
pub const FIELD_HOME_WIN: &str = "home_win";
pub const FIELD_BOXSCORE: &str = "boxscore";
pub const FIELD_PTS_WIN: &str = "pts_win";
pub const FIELD_PTS_LOSE: &str = "pts_lose";
pub const FIELD_GAME_DATE: &str = "game_date";
pub const FIELD_SEASON: &str = "season";

/// Character the games table uses to mark the winner as the away side
pub const AWAY_MARKER: char = '@';

// Team tables
pub const COL_TEAM: &str = "team";
pub const COL_ONECELL: &str = "onecell";
pub const FIELD_DIVISION: &str = "division";
pub const HEADER_TEAM_LABEL: &str = "Tm";
pub const CONFERENCE_TABLE_IDS: [&str; 2] = ["AFC", "NFC"];

/// Attribute carried by real data rows in wide tables
pub const ROW_INDEX_ATTR: &str = "data-row";

/// Summary rows that end a standard team table
pub const SUMMARY_TEAM_LABELS: [&str; 3] = ["Avg Team", "League Total", "Avg Tm"];

pub const OFFENSE_TABLE_IDS: [&str; 9] = [
    "team_stats",
    "passing",
    "rushing",
    "returns",
    "kicking",
    "punting",
    "team_scoring",
    "team_conversions",
    "drives",
];

pub const DEFENSE_TABLE_IDS: [&str; 10] = [
    "team_stats",
    "advanced_defense",
    "passing",
    "rushing",
    "returns",
    "kicking",
    "punting",
    "team_scoring",
    "team_conversions",
    "drives",
];

/// Captions of tables laid out one team per row with a `team` cell
pub const STANDARD_CAPTIONS: [&str; 14] = [
    "Team Offense",
    "Team Defense",
    "Passing Offense",
    "Passing Defense",
    "Rushing Offense",
    "Rushing Defense",
    "Kick & Punt Returns",
    "Kick & Punt Returns Defense",
    "Kicking",
    "Punting",
    "Team Scoring Offense",
    "Team Scoring Defense",
    "Advanced Defense",
    "Opponent Kicking",
];

/// Captions of wide tables that need row-attribute parsing
pub const ROW_TAGGED_CAPTIONS: [&str; 4] = [
    "Team Conversions",
    "Team Conversions Defense",
    "Team Drives",
    "Team Drives Defense",
];

/// Name given to tables whose caption matches neither list
pub const UNKNOWN_CAPTION: &str = "Unknown Table";
