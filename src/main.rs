//! bms-monitor - run recorded sensor samples through the BMS supervisor.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use bms::{
    parse_samples, run_session, BmsConfig, ClassificationOutcome, FixedPhase, HalfSplit, Mode,
    Phase, PhasePolicy, StateMachine, TracingObserver,
};

#[derive(Parser)]
#[command(name = "bms-monitor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (TOML)
    #[arg(short, long, global = true, env = "BMS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every sample in a file
    Run {
        /// Sample file: `index voltage current temperature capacity` per line
        file: PathBuf,

        /// How samples are assigned to charging or discharging
        #[arg(short, long, value_enum, default_value_t = PhaseArg::HalfSplit)]
        phase: PhaseArg,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Human)]
        format: Format,
    },

    /// Print the transition table
    Table,

    /// Validate and print the effective configuration
    CheckConfig,
}

#[derive(Copy, Clone, ValueEnum)]
enum PhaseArg {
    HalfSplit,
    Charging,
    Discharging,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Human,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let default_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { file, phase, format } => run(&file, phase, format, &config),
        Commands::Table => {
            print_table();
            Ok(())
        }
        Commands::CheckConfig => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<BmsConfig> {
    let config = match path {
        Some(p) => BmsConfig::load(p)
            .with_context(|| format!("loading config from {}", p.display()))?,
        None => BmsConfig::from_env().context("reading BMS_* environment")?,
    };
    Ok(config)
}

fn run(file: &Path, phase: PhaseArg, format: Format, config: &BmsConfig) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading samples from {}", file.display()))?;
    let samples = parse_samples(&raw).with_context(|| format!("parsing {}", file.display()))?;

    let policy: Box<dyn PhasePolicy> = match phase {
        PhaseArg::HalfSplit => Box::new(HalfSplit),
        PhaseArg::Charging => Box::new(FixedPhase(Phase::Charging)),
        PhaseArg::Discharging => Box::new(FixedPhase(Phase::Discharging)),
    };

    let mut tracer = TracingObserver;
    let mut observer = |outcome: &ClassificationOutcome| {
        bms::SessionObserver::on_step(&mut tracer, outcome);
        if format == Format::Human {
            println!("{}", outcome.step_line());
        }
    };

    let report = run_session(&samples, policy.as_ref(), config, &mut observer)
        .with_context(|| format!("session over {} aborted", file.display()))?;

    if format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn print_table() {
    let machine = StateMachine::new();
    for mode in Mode::ALL {
        for (trigger, to) in machine.transitions_from(mode) {
            println!("{:<18} {:<26} {}", mode.name(), format!("{trigger:?}"), to.name());
        }
    }
}
