#[cfg(test)]
mod tests {
    use pfr_scraper::apis::StaticPageSource;
    use pfr_scraper::parser::teams::{defense_tables, offense_tables, team_stat_tables};
    use pfr_scraper::pipeline::SeasonPages;
    use pfr_scraper::{TeamTable, Value};
    use scraper::Html;

    const BASE: &str = "https://example.com";

    const STANDARD: &str = r#"
        <div class="table_wrapper" id="all_team_stats">
          <table id="team_stats">
            <caption>Team Defense Table</caption>
            <thead><tr><th data-stat="ranker">Rk</th><th data-stat="team">Tm</th><th data-stat="points">PF</th></tr></thead>
            <tbody>
              <tr><th data-stat="ranker">1</th><td data-stat="team"><a href="/teams/pit/2020.htm">Pittsburgh Steelers</a></td><td data-stat="points">312</td></tr>
              <tr class="spacer"><td colspan="3"></td></tr>
              <tr><th data-stat="ranker">2</th><td data-stat="team"><a href="/teams/nwe/2020.htm">New England Patriots†</a></td><td data-stat="points">353</td></tr>
              <tr><th data-stat="ranker">3</th><td data-stat="team"><a href="/teams/sfo/2020.htm">San Francisco 49ers*</a></td><td data-stat="points">390</td></tr>
            </tbody>
            <tfoot>
              <tr><th data-stat="ranker"></th><td data-stat="team">Avg Team</td><td data-stat="points">418.1</td></tr>
              <tr><th data-stat="ranker"></th><td data-stat="team">League Total</td><td data-stat="points">13380</td></tr>
            </tfoot>
          </table>
        </div>"#;

    const ROW_TAGGED: &str = r#"
        <div class="table_wrapper" id="all_team_conversions">
          <table id="team_conversions">
            <caption>Team Conversions Defense Table</caption>
            <thead>
              <tr><th></th><th colspan="2">Downs</th></tr>
              <tr><th data-stat="ranker">Rk</th><th data-stat="team">Tm</th><th data-stat="third_down_pct">3D%</th></tr>
            </thead>
            <tbody>
              <tr data-row="0"><th data-stat="ranker">1</th><td data-stat="team"><a href="/teams/pit/2020.htm">Pittsburgh Steelers</a></td><td data-stat="third_down_pct">35.2%</td></tr>
              <tr><th data-stat="ranker"></th><td data-stat="team"></td><td data-stat="third_down_pct"></td></tr>
              <tr data-row="1"><th data-stat="ranker">2</th><td data-stat="team"><a href="/teams/nwe/2020.htm">New England Patriots</a></td><td data-stat="third_down_pct">38.0%</td></tr>
              <tr data-row="2"><th data-stat="ranker">3</th><td data-stat="team"><a href="/teams/sfo/2020.htm">San Francisco 49ers</a></td><td data-stat="third_down_pct">40.1%</td></tr>
            </tbody>
          </table>
        </div>"#;

    fn page(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{body}</body></html>"))
    }

    fn names(table: &TeamTable) -> Vec<&str> {
        table.team_names().collect()
    }

    #[test]
    fn test_standard_and_row_tagged_agree() {
        let doc = page(&format!("{STANDARD}{ROW_TAGGED}"));
        let tables = defense_tables(&doc).unwrap();
        assert_eq!(tables.len(), 2);

        let standard = &tables[0];
        let tagged = &tables[1];
        assert_eq!(standard.caption, "Team Defense");
        assert_eq!(tagged.caption, "Team Conversions Defense");
        assert_eq!(standard.len(), 3);
        assert_eq!(tagged.len(), 3);
        assert_eq!(names(standard), names(tagged));
    }

    #[test]
    fn test_rank_cell_before_team_is_kept() {
        let doc = page(ROW_TAGGED);
        let tables = defense_tables(&doc).unwrap();
        let pit = tables[0].get("Pittsburgh Steelers").unwrap();

        assert_eq!(pit.team_id, "pit");
        assert_eq!(pit.stats.get("ranker"), Some(&Value::from("1")));
        assert_eq!(pit.stats.get("third_down_pct"), Some(&Value::from("35.2%")));
    }

    #[test]
    fn test_team_names_are_sanitized() {
        let doc = page(STANDARD);
        let tables = defense_tables(&doc).unwrap();

        assert_eq!(
            names(&tables[0]),
            vec!["Pittsburgh Steelers", "New England Patriots", "San Francisco 49ers"]
        );
    }

    #[test]
    fn test_summary_row_ends_the_table() {
        let body = STANDARD.replace(
            r#"<tr><th data-stat="ranker">3</th>"#,
            r#"<tr><th data-stat="ranker"></th><td data-stat="team">League Total</td><td data-stat="points">0</td></tr>
               <tr><th data-stat="ranker">3</th>"#,
        );
        let tables = defense_tables(&page(&body)).unwrap();

        assert_eq!(names(&tables[0]), vec!["Pittsburgh Steelers", "New England Patriots"]);
        assert!(tables[0].get("League Total").is_none());
    }

    #[test]
    fn test_unknown_caption_gets_placeholder_name() {
        let body = STANDARD
            .replace("Team Defense Table", "Something Brand New")
            .replace(r#"id="team_stats""#, r#"id="advanced_defense""#);
        let tables = defense_tables(&page(&body)).unwrap();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].caption, "Unknown Table");
        assert_eq!(tables[0].table_id, "advanced_defense");
        assert_eq!(tables[0].len(), 3);
    }

    #[test]
    fn test_table_id_filter() {
        let doc = page(&format!("{STANDARD}{ROW_TAGGED}"));
        let only_conversions = team_stat_tables(&doc, &["team_conversions"]).unwrap();
        assert_eq!(only_conversions.len(), 1);
        assert_eq!(only_conversions[0].table_id, "team_conversions");

        let offense = offense_tables(&doc).unwrap();
        assert_eq!(offense.len(), 2);
    }

    #[test]
    fn test_commented_defense_table_via_renderer() {
        let body = format!("<html><body>{STANDARD}<!--{ROW_TAGGED}--></body></html>");
        let source = StaticPageSource::new();
        let renderer = StaticPageSource::new().with_page("https://example.com/years/2020/opp.htm", body);

        let pages = SeasonPages::new(&source, BASE).with_renderer(&renderer);
        let tables = pages.defense(2020, None).unwrap();

        assert_eq!(tables.len(), 2);
        assert!(source.requests().is_empty());
        assert_eq!(renderer.requests(), vec!["https://example.com/years/2020/opp.htm"]);
    }

    #[test]
    fn test_standings_and_links_from_year_page() {
        let year = r#"<html><body>
            <table id="AFC">
              <thead><tr><th data-stat="team">Tm</th><th data-stat="wins">W</th></tr></thead>
              <tbody>
                <tr><td data-stat="onecell">AFC East</td></tr>
                <tr><th data-stat="team"><a href="/teams/buf/2020.htm">Buffalo Bills</a>*</th><td data-stat="wins">13</td></tr>
              </tbody>
            </table>
            <table id="NFC">
              <tbody>
                <tr><td data-stat="onecell">NFC West</td></tr>
                <tr><th data-stat="team"><a href="/teams/sea/2020.htm">Seattle Seahawks</a>*</th><td data-stat="wins">12</td></tr>
              </tbody>
            </table>
          </body></html>"#;
        let source = StaticPageSource::new().with_page("https://example.com/years/2020/", year);
        let pages = SeasonPages::new(&source, BASE);

        let standings = pages.standings(2020, None).unwrap();
        assert_eq!(names(&standings), vec!["Buffalo Bills", "Seattle Seahawks"]);
        let flat = standings.to_table();
        let bills = flat.get("Buffalo Bills").unwrap();
        assert_eq!(bills.get("team_id"), Some(&Value::from("buf")));
        assert_eq!(bills.get("division"), Some(&Value::from("AFC East")));

        let links = pages.team_links(2020, None).unwrap();
        assert_eq!(links[1].link, "https://example.com/teams/sea/2020.htm");
        assert_eq!(links[1].team_id, "sea");
    }
}
