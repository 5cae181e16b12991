//! Runs every requested strategy on one workload and prints a summary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use lb_sim::report::{compare, CsvSink, ResultsSink, SummaryTable};
use lb_sim::{MetricsRecord, SimError, SimulationConfig, StrategyKind};

#[derive(Debug, Parser)]
#[command(
    name = "lbsim",
    about = "Compare load-balancing strategies on a simulated resource pool"
)]
struct Cli {
    /// JSON configuration file; flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of resources.
    #[arg(long)]
    resources: Option<usize>,

    /// Simulated horizon.
    #[arg(long)]
    horizon: Option<f64>,

    /// Mean arrivals per time unit.
    #[arg(long)]
    arrival_rate: Option<f64>,

    /// Batch interval for batched strategies.
    #[arg(long)]
    batch_interval: Option<f64>,

    /// Random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Strategy to run (repeatable): round-robin, random, pso.
    #[arg(long = "strategy")]
    strategies: Vec<StrategyKind>,

    /// Directory for per-strategy and summary CSV files.
    #[arg(long)]
    out: Option<PathBuf>,
}

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig, String> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("reading {}: {e}", path.display()))?;
                serde_json::from_str(&text)
                    .map_err(|e| format!("parsing {}: {e}", path.display()))?
            }
            None => SimulationConfig::default(),
        };

        if let Some(v) = self.resources {
            config.num_resources = v;
        }
        if let Some(v) = self.horizon {
            config.horizon = v;
        }
        if let Some(v) = self.arrival_rate {
            config.arrival_rate = v;
        }
        if let Some(v) = self.batch_interval {
            config.batch_interval = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        Ok(config)
    }
}

/// Feeds the printed table and, optionally, CSV files.
struct Sinks {
    table: SummaryTable,
    csv: Option<CsvSink>,
}

impl ResultsSink for Sinks {
    fn record(&mut self, strategy: &str, metrics: &MetricsRecord) -> Result<(), SimError> {
        self.table.record(strategy, metrics)?;
        if let Some(csv) = &mut self.csv {
            csv.record(strategy, metrics)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SimError> {
        match &mut self.csv {
            Some(csv) => csv.finish(),
            None => Ok(()),
        }
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = match cli.simulation_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let kinds = if cli.strategies.is_empty() {
        StrategyKind::ALL.to_vec()
    } else {
        cli.strategies.clone()
    };

    let csv = match cli.out.as_ref().map(CsvSink::create).transpose() {
        Ok(csv) => csv,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let mut sinks = Sinks {
        table: SummaryTable::new(),
        csv,
    };

    if let Err(e) = compare(&config, &kinds, &mut sinks) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    println!("{}", sinks.table);
    ExitCode::SUCCESS
}
