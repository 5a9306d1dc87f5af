//! iuu-risk command line.
//!
//! ```text
//! iuu-risk fishing   [--config PATH] [--data-dir DIR] [--out-dir DIR]
//! iuu-risk transship [--config PATH] [--data-dir DIR] [--out-dir DIR]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use iuu_risk::pipeline::{self, Analysis, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "iuu-risk", version, about = "IUU fishing risk scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score fishing trips.
    Fishing(RunArgs),
    /// Score carrier trips from encounters and loitering events.
    Transship(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// TOML file overriding the analysis defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the input tables.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Directory receiving the outputs.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

impl RunArgs {
    fn resolve(self, analysis: Analysis) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::load(analysis, self.config.as_deref())
            .with_context(|| format!("loading {analysis} configuration"))?;
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(dir) = self.out_dir {
            config.out_dir = dir;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = match cli.command {
        Commands::Fishing(args) => args.resolve(Analysis::Fishing)?,
        Commands::Transship(args) => args.resolve(Analysis::Transship)?,
    };

    tracing::info!(
        analysis = %config.analysis,
        data_dir = %config.data_dir.display(),
        out_dir = %config.out_dir.display(),
        "starting run"
    );
    let report = pipeline::run(&config).with_context(|| format!("{} analysis failed", config.analysis))?;

    for path in &report.outputs {
        println!("{}", path.display());
    }
    Ok(())
}
