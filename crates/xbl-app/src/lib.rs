// The `xbl-stats` command: read downloaded sheets, aggregate every league's
// season plus career stats, and write the JSON files the site serves.

pub mod output;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::{Map, Value};
use tracing::info;
use xbl_core::config::{self, Config};
use xbl_core::sheets::SheetStore;
use xbl_stats::query::{query, QueryError};
use xbl_stats::{build_career_stats, build_season_stats, StatsError};

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "xbl-stats", about = "Aggregate league spreadsheets into season and career stats")]
pub struct Args {
    /// Season to aggregate (overrides `stats.season` in the config)
    #[arg(short, long)]
    pub season: Option<u32>,

    /// Directory holding the downloaded sheets
    #[arg(short = 'g', long)]
    pub sheets_dir: Option<PathBuf>,

    /// Directory the JSON output is written to
    #[arg(short = 'S', long)]
    pub save_dir: Option<PathBuf>,

    /// Print the value at this path after aggregating, e.g. `-Q season XBL current_season`
    #[arg(short = 'Q', long, num_args = 1.., value_name = "KEY")]
    pub query: Vec<String>,

    /// Directory containing `config/` and `defaults/`; relative paths resolve against it
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,
}

/// Settings after layering command-line flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub season: u32,
    pub sheets_dir: PathBuf,
    pub save_dir: PathBuf,
}

impl Settings {
    pub fn resolve(args: &Args, config: &Config) -> anyhow::Result<Self> {
        let Some(season) = args.season.or(config.stats.season) else {
            bail!("no season given: pass --season or set stats.season in config/{}", config::CONFIG_FILE);
        };
        let sheets_dir = args
            .sheets_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.stats.sheets_dir));
        let save_dir = args
            .save_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.stats.output_dir));
        Ok(Self {
            season,
            sheets_dir: args.base_dir.join(sheets_dir),
            save_dir: args.base_dir.join(save_dir),
        })
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct Report {
    pub written: Vec<PathBuf>,
    /// `None` when no query was asked.
    pub query: Option<Result<Value, QueryError>>,
}

/// Load config from `base_dir`, copying shipped defaults into place first.
pub fn load_config(base_dir: &Path) -> anyhow::Result<Config> {
    let copied = config::ensure_config_files(base_dir).context("failed to prepare config files")?;
    for path in copied {
        info!("copied default config to {}", path.display());
    }
    config::load_config_from(base_dir).context("failed to load configuration")
}

pub fn run(args: &Args) -> anyhow::Result<Report> {
    let config = load_config(&args.base_dir)?;
    run_with_config(args, &config)
}

pub fn run_with_config(args: &Args, config: &Config) -> anyhow::Result<Report> {
    let settings = Settings::resolve(args, config)?;
    if !settings.sheets_dir.is_dir() {
        bail!(
            "missing sheet data in {}. Double check --sheets-dir or run the sheet fetch step first",
            settings.sheets_dir.display()
        );
    }
    std::fs::create_dir_all(&settings.save_dir)
        .with_context(|| format!("failed to create {}", settings.save_dir.display()))?;

    let store = SheetStore::new(&settings.sheets_dir);
    let mut written = Vec::new();

    let mut season_root = Map::new();
    for league in &config.stats.leagues {
        let layout = config
            .layout(league)
            .ok_or_else(|| StatsError::UnknownLeague(league.clone()))?;
        let stats = build_season_stats(&store, league, layout, settings.season)
            .with_context(|| format!("failed to build {league} season {}", settings.season))?;
        let value = serde_json::to_value(&stats)?;
        written.extend(output::write_season(&settings.save_dir, league, settings.season, &value)?);
        season_root.insert(league.clone(), value);
    }
    let season_root = Value::Object(season_root);

    let career = build_career_stats(&store, config, settings.season)
        .context("failed to build career stats")?;
    let career_root = serde_json::to_value(&career)?;
    let careers_path = settings.save_dir.join(output::CAREERS_FILE);
    output::write_json(&careers_path, &career_root)?;
    written.push(careers_path);

    info!("wrote {} files to {}", written.len(), settings.save_dir.display());

    let answer = (!args.query.is_empty())
        .then(|| query(&season_root, &career_root, args.query.as_slice()).cloned());

    Ok(Report {
        written,
        query: answer,
    })
}
