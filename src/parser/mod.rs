//! HTML table parsing for pro-football-reference pages.

pub mod games;
pub mod links;
pub mod teams;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, ScraperError};

static GAME_TEAM_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/teams/([A-Za-z0-9]+)/").unwrap());
static TEAM_PAGE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"teams/([^/]+)/").unwrap());
static NON_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9 ]").unwrap());
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--(.*?)-->").unwrap());

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScraperError::Selector(format!("{css}: {e:?}")))
}

/// Parses markup after unwrapping the HTML comments that hold a `<table`,
/// so tables the site ships inside comments become part of the document.
/// Other comments, including `<!--` inside inline scripts, are left alone.
pub fn parse_uncommented(html: &str) -> Html {
    let unwrapped = COMMENT_RE.replace_all(html, |caps: &Captures| {
        if caps[1].contains("<table") {
            caps[1].to_string()
        } else {
            caps[0].to_string()
        }
    });
    Html::parse_document(&unwrapped)
}

pub fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>()
}

pub fn data_stat<'a>(cell: &ElementRef<'a>) -> Option<&'a str> {
    cell.value().attr("data-stat")
}

/// `th`/`td` children of a row, in document order.
pub fn row_cells<'a>(row: &ElementRef<'a>, include_th: bool) -> Vec<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| match el.value().name() {
            "td" => true,
            "th" => include_th,
            _ => false,
        })
        .collect()
}

/// Target of the first link inside `el`, if that link has one.
pub fn first_href<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    el.descendants()
        .filter_map(ElementRef::wrap)
        .find(|d| d.value().name() == "a")
        .and_then(|a| a.value().attr("href"))
}

pub fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    format!("{}{}", base_url.trim_end_matches('/'), href)
}

/// Team id from a games-table link such as `/teams/nwe/2020.htm`.
pub fn game_team_id(href: &str) -> Option<String> {
    GAME_TEAM_ID_RE
        .captures(href)
        .map(|caps| caps[1].to_string())
}

/// Team id from a team-page link; tolerant of any segment characters.
pub fn team_page_id(href: &str) -> Option<String> {
    TEAM_PAGE_ID_RE
        .captures(href)
        .map(|caps| caps[1].to_string())
}

/// Strips everything but ASCII letters, digits and spaces, e.g. the `*`
/// and `+` playoff markers appended to team names.
pub fn sanitize_team_name(raw: &str) -> String {
    NON_NAME_RE.replace_all(raw, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_team_name() {
        assert_eq!(sanitize_team_name("49ers*"), "49ers");
        assert_eq!(sanitize_team_name("Patriots†"), "Patriots");
        assert_eq!(sanitize_team_name("San Francisco 49ers+"), "San Francisco 49ers");
        assert_eq!(sanitize_team_name("St. Louis Rams"), "St Louis Rams");
    }

    #[test]
    fn test_team_ids() {
        assert_eq!(game_team_id("/teams/nwe/2020.htm").as_deref(), Some("nwe"));
        assert_eq!(game_team_id("/players/B/BradTo00.htm"), None);
        assert_eq!(team_page_id("/teams/sfo/2023.htm").as_deref(), Some("sfo"));
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("https://example.com/", "/boxscores/x.htm"),
            "https://example.com/boxscores/x.htm"
        );
        assert_eq!(
            absolute_url("https://example.com", "https://other.org/a"),
            "https://other.org/a"
        );
    }

    #[test]
    fn test_parse_uncommented_exposes_tables() {
        let doc = parse_uncommented(
            "<div id=\"all_passing\"><!--\n<table id=\"passing\"><tr><td>1</td></tr></table>\n--></div>",
        );
        let sel = selector("table#passing").unwrap();
        assert!(doc.select(&sel).next().is_some());
    }

    #[test]
    fn test_parse_uncommented_leaves_scripts_alone() {
        let html = concat!(
            "<script id=\"s\">var a = 1; <!-- keep -->; var b = 2;</script>",
            "<!-- a plain note -->",
            "<div class=\"table_wrapper\"><!--<table id=\"t\"><tr><td>1</td></tr></table>--></div>",
        );
        let doc = parse_uncommented(html);

        let script = doc.select(&selector("script#s").unwrap()).next().unwrap();
        assert_eq!(cell_text(&script), "var a = 1; <!-- keep -->; var b = 2;");
        assert!(doc.select(&selector("table#t").unwrap()).next().is_some());
        assert!(!doc.root_element().text().any(|t| t.contains("a plain note")));
    }
}
