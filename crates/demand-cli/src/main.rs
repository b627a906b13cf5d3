//! `demand`: run the demand pipeline and print a report.
//!
//! # Usage
//!
//! ```
//! demand --forecast forecast.csv --biometric bio.csv planning
//! demand --forecast https://host/f.csv --biometric blob:1AbC \
//!   historical --state Bihar
//! demand --config demand.toml demographics --age 5-17
//! ```

mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use demand_core::{
  PipelineConfig,
  aggregate::AgeGroup,
  source::{LoadRequest, SourceDescriptor},
};
use demand_ingest::{IngestConfig, Loader, SourceFetcher};
use serde::Deserialize;
use strum::IntoEnumIterator;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "demand", about = "Biometric demand planning reports")]
struct Args {
  /// Path to a TOML config file ([pipeline], [ingest], forecast, biometric).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Forecast source: a path, an http(s) URL, or `blob:<id>`.
  #[arg(long, env = "DEMAND_FORECAST", value_name = "SRC")]
  forecast: Option<SourceDescriptor>,

  /// Biometric source: a path, an http(s) URL, or `blob:<id>`.
  #[arg(long, env = "DEMAND_BIOMETRIC", value_name = "SRC")]
  biometric: Option<SourceDescriptor>,

  #[command(subcommand)]
  report: Report,
}

#[derive(Subcommand, Debug)]
enum Report {
  /// Headline numbers over the forecast horizon.
  Summary,
  /// Per-period demand, staffing, cost, and risk.
  Planning,
  /// Top dates and the state ranking.
  Historical {
    /// Restrict to these states; repeat for several.
    #[arg(long = "state", value_name = "STATE")]
    states: Vec<String>,
  },
  /// Best / expected / worst projection per period.
  Scenarios,
  /// Update totals per age group.
  Demographics {
    #[arg(long = "state", value_name = "STATE")]
    states: Vec<String>,
    /// Age groups to include (`5-17`, `18+`); all when omitted.
    #[arg(long = "age", value_name = "GROUP")]
    ages:   Vec<AgeGroup>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
struct ConfigFile {
  pipeline:  PipelineConfig,
  ingest:    IngestConfig,
  forecast:  Option<String>,
  biometric: Option<String>,
}

impl ConfigFile {
  fn read(path: &std::path::Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")
  }
}

/// CLI flag, else config file entry, else an error naming the flag.
fn pick_source(
  flag: Option<SourceDescriptor>,
  file: Option<&str>,
  name: &str,
) -> Result<SourceDescriptor> {
  if let Some(source) = flag {
    return Ok(source);
  }
  let raw = file.with_context(|| format!("no {name} source: pass --{name}"))?;
  raw
    .parse()
    .with_context(|| format!("invalid {name} source in config file"))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  // Logs go to stderr; stdout carries the report.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg = match &args.config {
    Some(path) => ConfigFile::read(path)?,
    None => ConfigFile::default(),
  };

  // CLI flags override config file, which overrides defaults.
  let request = LoadRequest {
    forecast:  pick_source(
      args.forecast,
      file_cfg.forecast.as_deref(),
      "forecast",
    )?,
    biometric: pick_source(
      args.biometric,
      file_cfg.biometric.as_deref(),
      "biometric",
    )?,
  };

  let fetcher = SourceFetcher::new(&file_cfg.ingest)?;
  let loader = Loader::new(fetcher, file_cfg.pipeline)?;
  let dataset = loader.load(&request).await?;

  let text = match args.report {
    Report::Summary => report::summary(&dataset),
    Report::Planning => report::planning(&dataset),
    Report::Scenarios => report::scenarios(&dataset),
    Report::Historical { states } => {
      report::historical(&dataset, &dataset.state_filter(states))
    }
    Report::Demographics { states, ages } => {
      let groups = if ages.is_empty() {
        AgeGroup::iter().collect()
      } else {
        ages
      };
      report::demographics(&dataset, &dataset.state_filter(states), &groups)
    }
  };
  print!("{text}");

  Ok(())
}
