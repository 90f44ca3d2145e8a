use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use pfr_scraper::apis::{HttpPageSource, PageSource};
use pfr_scraper::config::Config;
use pfr_scraper::logging;
use pfr_scraper::pipeline::{add_stats, current_season, Accumulator, GamesRun, SeasonPages};
use pfr_scraper::storage;

#[derive(Parser)]
#[command(name = "pfr_scraper")]
#[command(about = "NFL game results and team statistics from pro-football-reference")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every game result listed on the game scores index
    Games {
        /// Prior export to extend; only games missing from it are added
        #[arg(long)]
        seed: Option<PathBuf>,
        /// Seconds to wait between detail pages
        #[arg(long)]
        wait: Option<f64>,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Conference standings for a season
    Standings {
        #[arg(long)]
        season: Option<i32>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Team page links for a season, one JSON object per line
    TeamLinks {
        #[arg(long)]
        season: Option<i32>,
    },
    /// Offense (or, with --defense, opponent) team stat tables for a season
    TeamStats {
        #[arg(long)]
        season: Option<i32>,
        /// Parse the rendered opponent page instead of the season page
        #[arg(long)]
        defense: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("loading configuration")?;
    let _guard = logging::init_logging(&config.output.log_dir);

    let source = HttpPageSource::new(&config.site)?;
    let out_dir = |out: Option<PathBuf>| out.unwrap_or_else(|| PathBuf::from(&config.output.dir));
    let season_or_current = |season: Option<i32>| {
        season.unwrap_or_else(|| current_season(Local::now().date_naive()))
    };

    match cli.command {
        Commands::Games { seed, wait, out } => {
            run_games(&config, &source, seed.as_deref(), wait, &out_dir(out))?;
        }
        Commands::Standings { season, out } => {
            let season = season_or_current(season);
            let pages = SeasonPages::new(&source, &config.site.base_url);
            let standings = pages.standings(season, None)?;
            let written = storage::write_team_tables(out_dir(out), season, &[standings])?;
            for path in written {
                println!("✅ Wrote {}", path.display());
            }
        }
        Commands::TeamLinks { season } => {
            let season = season_or_current(season);
            let pages = SeasonPages::new(&source, &config.site.base_url);
            for link in pages.team_links(season, None)? {
                println!("{}", serde_json::to_string(&link)?);
            }
        }
        Commands::TeamStats { season, defense, out } => {
            let season = season_or_current(season);
            let tables = if defense {
                defense_tables(&config, &source, season)?
            } else {
                SeasonPages::new(&source, &config.site.base_url).offense(season, None)?
            };
            if tables.is_empty() {
                warn!("No team stat tables found for season {}", season);
            }
            for path in storage::write_team_tables(out_dir(out), season, &tables)? {
                println!("✅ Wrote {}", path.display());
            }
        }
    }
    Ok(())
}

fn run_games(
    config: &Config,
    source: &dyn PageSource,
    seed: Option<&Path>,
    wait: Option<f64>,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let seed = seed
        .map(|path| {
            storage::read_table(path).with_context(|| format!("reading seed {}", path.display()))
        })
        .transpose()?;
    let mut acc = Accumulator::from_seed(seed)?;

    let mut run = GamesRun::from_config(source, config);
    if let Some(secs) = wait {
        ensure!(
            secs.is_finite() && secs >= 0.0,
            "--wait must be a non-negative number of seconds"
        );
        run = run.with_wait(Duration::from_secs_f64(secs));
    }

    let filename = storage::dated_filename(Local::now().date_naive());
    let result = run.collect_into(&mut acc, None, |p| {
        if let Some((win, lose)) = p.score {
            eprint!("\rRetrieving {win}-{lose} Score....{} of {}", p.current, p.total);
        }
    });
    eprintln!();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            error!("Game collection failed: {}", e);
            if acc.added() > 0 {
                let partial = out_dir.join(format!("partial_{filename}"));
                storage::write_table(&partial, acc.table())?;
                warn!(
                    "Rows gathered so far are in {}; pass it as --seed to resume",
                    partial.display()
                );
            }
            return Err(e.into());
        }
    };
    info!("Run summary: {}", serde_json::to_string(&summary)?);

    let table = add_stats(acc.into_table())?;
    let path = out_dir.join(filename);
    storage::write_table(&path, &table)?;
    println!(
        "✅ Wrote {} games ({} new) to {}",
        table.len(),
        summary.added_rows,
        path.display()
    );
    Ok(())
}

#[cfg(feature = "render")]
fn defense_tables(
    config: &Config,
    source: &dyn PageSource,
    season: i32,
) -> anyhow::Result<Vec<pfr_scraper::TeamTable>> {
    let renderer = pfr_scraper::apis::RenderedPageSource::new(&config.render)?;
    let pages = SeasonPages::new(source, &config.site.base_url).with_renderer(&renderer);
    Ok(pages.defense(season, None)?)
}

#[cfg(not(feature = "render"))]
fn defense_tables(
    _config: &Config,
    _source: &dyn PageSource,
    _season: i32,
) -> anyhow::Result<Vec<pfr_scraper::TeamTable>> {
    anyhow::bail!("the opponent page is rendered client-side; rebuild with `--features render`")
}
