//! # SWAT CLI (`swat`)
//!
//! The `swat` binary compares keyword ranking exports: one CSV for the
//! primary site ("my site") and up to five competitor CSVs.
//!
//! ## Usage
//!
//! ```bash
//! swat --config ./config/swat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `swat compare` | Reconcile sources and print a report or export |
//! | `swat inspect <file>` | Show header resolution and row counts for one file |
//! | `swat schema` | Print the effective schema and its aliases |
//! | `swat sources <dir>` | List discovered CSV files and their health |
//!
//! ## Examples
//!
//! ```bash
//! # Primary plus two competitors, table report
//! swat compare --primary mine.csv --competitor rival=rival.csv --competitor other=other.csv
//!
//! # Every CSV in a directory, exported as a spreadsheet
//! swat compare --dir ./exports --primary-name mine --format csv --output report.csv
//!
//! # Why does this file fail?
//! swat inspect rival.csv
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use swat_analysis::config::{self, Config};
use swat_analysis::export::{self, OutputFormat};
use swat_analysis::inspect;
use swat_analysis::pipeline::{self, CompareRequest};
use swat_analysis::progress::ProgressMode;
use swat_analysis::report;
use swat_analysis::sources::{self, SourceSpec};
use swat_core::summary::summarize;

/// SWAT CLI: keyword comparison across SEO ranking exports.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults.
#[derive(Parser)]
#[command(
    name = "swat",
    about = "ANALISI S.W.A.T.: keyword comparison across SEO ranking exports",
    version,
    long_about = "Reads a ranking export for your site and up to five competitor exports, \
    reconciles them keyword by keyword, and reports shared keywords, keywords only you rank for, \
    and the gaps competitors cover."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/swat.toml`. When the file does not exist the
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/swat.toml")]
    config: PathBuf,

    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Compare the primary export against competitor exports.
    ///
    /// Sources are given explicitly (`--primary`, `--competitor`) or
    /// discovered in a directory (`--dir`). Blank files are left out; a
    /// file missing a required column fails the run unless
    /// `comparison.on_schema_error = "skip"`.
    Compare {
        /// Primary source: `NAME=PATH`, or `PATH` to use `comparison.primary_label`.
        #[arg(long, conflicts_with = "dir")]
        primary: Option<String>,

        /// Competitor source: `NAME=PATH` or `PATH` (named after the file). Repeatable.
        #[arg(long = "competitor", conflicts_with = "dir")]
        competitors: Vec<SourceSpec>,

        /// Discover CSV files in this directory. The first file (by path) is
        /// the primary unless `--primary-name` is given.
        #[arg(long)]
        dir: Option<PathBuf>,

        /// With `--dir`: file stem of the primary source.
        #[arg(long, requires = "dir")]
        primary_name: Option<String>,

        /// Output format.
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Write the output to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Progress on stderr: `off`, `human`, or `json`. Defaults to
        /// `human` when stderr is a terminal.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,

        /// Number of keyword gaps in the report (overrides `report.top_gaps`).
        #[arg(long)]
        top_gaps: Option<usize>,
    },

    /// Show how one file's headers resolve against a schema.
    Inspect {
        /// CSV file to inspect.
        path: PathBuf,

        /// Schema to resolve against: `ranking` or `pertinence`.
        #[arg(long, default_value = "ranking")]
        schema: String,

        /// Print the inspection as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the effective schema, configured aliases included.
    Schema {
        /// `ranking` or `pertinence`.
        #[arg(long, default_value = "ranking")]
        schema: String,
    },

    /// List CSV files in a directory and whether they would parse.
    Sources {
        /// Directory to scan with the `[discovery]` globs.
        dir: PathBuf,

        /// Schema to check headers against.
        #[arg(long, default_value = "ranking")]
        schema: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let cfg = config::load_or_minimal(&cli.config)?;

    match cli.command {
        Commands::Compare {
            primary,
            competitors,
            dir,
            primary_name,
            format,
            output,
            progress,
            top_gaps,
        } => {
            let request = match dir {
                Some(dir) => request_from_dir(&cfg, &dir, primary_name.as_deref())?,
                None => {
                    let Some(primary) = primary else {
                        bail!("compare needs --primary or --dir");
                    };
                    CompareRequest {
                        primary: primary_spec(&cfg, &primary)?,
                        competitors,
                    }
                }
            };

            let reporter = progress.unwrap_or_else(ProgressMode::default_for_tty).reporter();
            let run = pipeline::run_compare(&cfg, &request, reporter.as_ref()).await?;
            let summary = summarize(&run.results, top_gaps.unwrap_or(cfg.report.top_gaps));

            let content = match format {
                OutputFormat::Table => report::render_report(&run, &summary),
                OutputFormat::Json => export::render_json(&run, &summary)?,
                OutputFormat::Csv => export::render_csv(&run)?,
            };
            export::write_output(&content, output.as_deref(), run.results.len())?;
        }
        Commands::Inspect { path, schema, json } => {
            let schema = cfg.schema(&schema)?;
            inspect::run_inspect(&path, &schema, json)?;
        }
        Commands::Schema { schema } => {
            inspect::print_schema(&cfg.schema(&schema)?);
        }
        Commands::Sources { dir, schema } => {
            let schema = cfg.schema(&schema)?;
            let specs = sources::discover_sources(&dir, &cfg.discovery)?;
            sources::list_sources(&specs, &schema)?;
        }
    }

    Ok(())
}

/// `NAME=PATH` keeps its name; a bare path takes the configured primary label.
fn primary_spec(cfg: &Config, arg: &str) -> Result<SourceSpec> {
    if arg.contains('=') {
        arg.parse::<SourceSpec>().map_err(anyhow::Error::msg)
    } else {
        Ok(SourceSpec::new(cfg.comparison.primary_label.clone(), arg))
    }
}

fn request_from_dir(
    cfg: &Config,
    dir: &std::path::Path,
    primary_name: Option<&str>,
) -> Result<CompareRequest> {
    let mut specs = sources::discover_sources(dir, &cfg.discovery)?;
    if specs.is_empty() {
        bail!("No CSV files found in {}", dir.display());
    }

    let primary = match primary_name {
        Some(name) => {
            let Some(index) = specs.iter().position(|s| s.name == name) else {
                bail!("--primary-name '{}' matches no file in {}", name, dir.display());
            };
            specs.remove(index)
        }
        None => {
            let mut first = specs.remove(0);
            first.name = cfg.comparison.primary_label.clone();
            first
        }
    };
    Ok(CompareRequest {
        primary,
        competitors: specs,
    })
}
