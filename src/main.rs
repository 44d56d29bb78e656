//! iconbundle - converts SVG files into PNG tiles, a Windows `.ico` and a
//! macOS `.icns`, one output directory per SVG.

mod logging;

use anyhow::{bail, Context};
use clap::Parser;
use iconbundle::{BatchPolicy, BundleConfig, Orchestrator};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "iconbundle", version, about = "Convert SVG files to PNG, ICO, and ICNS formats")]
struct Cli {
    /// SVG files, or directories whose *.svg files are converted.
    /// Defaults to the current directory.
    #[arg(value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// Output directory.
    #[arg(short = 'O', long, value_name = "DIR", default_value = "output")]
    output_dir: PathBuf,

    /// TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Logical icon sizes, overriding the configuration.
    #[arg(long, value_delimiter = ',', value_name = "SIZES")]
    sizes: Option<Vec<u32>>,

    /// Delete the output directory first if it already exists.
    #[arg(short, long)]
    force: bool,

    /// Stop at the first SVG that fails.
    #[arg(long)]
    fail_fast: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    logging::init(cli.verbose, cli.json_logs)?;

    let mut config = match &cli.config {
        Some(path) => BundleConfig::load(path)?,
        None => BundleConfig::default(),
    };
    if let Some(sizes) = cli.sizes {
        config.sizes = sizes;
    }
    if cli.fail_fast {
        config.batch = BatchPolicy::FailFast;
    }
    let orchestrator = Orchestrator::new(config)?;

    let inputs = if cli.inputs.is_empty() {
        vec![std::env::current_dir().context("reading current directory")?]
    } else {
        cli.inputs
    };
    let sources = discover_sources(&inputs)?;
    if sources.is_empty() {
        info!("No SVG files found");
        return Ok(0);
    }

    prepare_output_dir(&cli.output_dir, cli.force)?;
    info!("{} SVG files found. Writing to {}", sources.len(), cli.output_dir.display());

    let report = orchestrator.run_batch(&sources, &cli.output_dir);
    for failure in &report.failed {
        error!("{}", failure);
    }
    info!(
        "{} icon sets created, {} failed, {} skipped",
        report.succeeded.len(),
        report.failed.len(),
        report.skipped.len()
    );
    Ok(if report.is_success() { 0 } else { 1 })
}

/// Expands directories into their `*.svg` children, sorted by name.
fn discover_sources(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            let entries = fs::read_dir(input)
                .with_context(|| format!("reading {}", input.display()))?;
            for entry in entries {
                let path = entry.with_context(|| format!("reading {}", input.display()))?.path();
                if path.is_file() && is_svg(&path) {
                    found.push(path);
                }
            }
            found.sort();
            sources.extend(found);
        } else if input.is_file() {
            sources.push(input.clone());
        } else {
            bail!("{} does not exist", input.display());
        }
    }
    Ok(sources)
}

fn is_svg(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

fn prepare_output_dir(dir: &Path, force: bool) -> anyhow::Result<()> {
    if dir.exists() {
        if !force {
            bail!("'{}' exists; pass --force to replace it", dir.display());
        }
        fs::remove_dir_all(dir).with_context(|| format!("deleting {}", dir.display()))?;
        info!("Directory '{}' has been deleted.", dir.display());
    }
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))
}
