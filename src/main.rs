//! Sukuk - Generate the sukuk leverage model workbook

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use sukuk_core::config::{Mode, load_config};
use sukuk_core::storage::{SheetSink, SinkFormat, WorkbookSeeds, sink_for};
use sukuk_core::{AssembleOptions, assemble};
use sukuk_engine::engine::RuleSeeds;
use sukuk_engine::model::all_scenarios;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "sukuk", version, about = "Generate the sukuk capital-structure model workbook")]
struct Args {
    /// Iteration columns per sheet
    #[arg(short = 'n', long)]
    iterations: Option<usize>,

    /// Output file (default: sukuk_<iterations>_iterations.xlsx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// formulas or values
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Workbook to read recurrence seeds from (values mode)
    #[arg(long)]
    seed_workbook: Option<PathBuf>,

    /// Config file (default: <config dir>/sukuk/model.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// xlsx or grd
    #[arg(short, long, default_value = "xlsx")]
    format: SinkFormat,

    /// Build scenarios in parallel
    #[arg(long)]
    parallel: bool,

    /// Only build these scenarios (repeatable)
    #[arg(short, long = "scenario")]
    scenarios: Vec<String>,

    /// Print the scenario registry and exit
    #[arg(long)]
    list_scenarios: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("sukuk={0},sukuk_core={0},warn", args.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if args.list_scenarios {
        for scenario in all_scenarios() {
            println!("{:<14}{}", scenario.name(), scenario.title());
        }
        return Ok(());
    }

    let (mut config, warnings) = load_config(args.config.as_deref());
    for warning in warnings {
        warn!("{}", warning);
    }

    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(output) = args.output {
        config.output = Some(output);
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(seed_workbook) = args.seed_workbook {
        config.seed_workbook = Some(seed_workbook);
    }
    if args.parallel {
        config.parallel = true;
    }
    if !args.scenarios.is_empty() {
        config.scenarios = Some(args.scenarios);
    }
    config.validate().context("Invalid configuration")?;

    let scenarios = config.selected_scenarios();
    let options = AssembleOptions::from(&config);
    info!(
        "Building {} scenarios with {} iterations ({})",
        scenarios.len(),
        config.iterations,
        config.mode
    );

    let assembly = match (config.mode, &config.seed_workbook) {
        (Mode::Values, Some(path)) => {
            let seeds = WorkbookSeeds::open(path, &config.seed_column, config.seed_row_offset)
                .with_context(|| format!("Failed to load seeds from {}", path.display()))?;
            assemble(&scenarios, &options, &seeds)
        }
        (Mode::Formulas, Some(path)) => {
            warn!("Ignoring seed workbook {} in formulas mode", path.display());
            assemble(&scenarios, &options, &RuleSeeds)
        }
        (_, None) => assemble(&scenarios, &options, &RuleSeeds),
    };

    if assembly.workbook.is_empty() {
        bail!("No scenario could be built");
    }

    let output = config.output_path();
    let mut sink = sink_for(args.format, &output);
    let report = sink
        .write_workbook(&assembly.workbook)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    for file in &report.files {
        println!("Wrote {}", file.display());
    }

    if !assembly.is_complete() {
        bail!("{} scenarios failed to build", assembly.failures.len());
    }
    Ok(())
}
