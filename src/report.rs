//! Result sinks and multi-strategy comparison.
//!
//! The engine only produces [`MetricsRecord`]s. Persisting, tabulating,
//! and comparing them across strategies happens here, outside the core.
//!
//! # Usage
//!
//! ```
//! use lb_sim::report::{compare, SummaryTable};
//! use lb_sim::simulation::SimulationConfig;
//! use lb_sim::strategy::StrategyKind;
//!
//! let config = SimulationConfig::new(3, 100.0, 0.5, 10.0, 42);
//! let mut table = SummaryTable::new();
//! compare(&config, &[StrategyKind::RoundRobin, StrategyKind::Random], &mut table).unwrap();
//! assert_eq!(table.rows().len(), 2);
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::SimError;
use crate::metrics::MetricsRecord;
use crate::simulation::{Simulation, SimulationConfig};
use crate::strategy::StrategyKind;

/// Consumer of per-strategy results.
pub trait ResultsSink {
    /// Records the metrics of one strategy run.
    fn record(&mut self, strategy: &str, metrics: &MetricsRecord) -> Result<(), SimError>;

    /// Called once after the last record.
    fn finish(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}

/// Flat row: strategy name plus metrics. Undefined metrics are empty
/// CSV fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Strategy name.
    pub strategy: String,
    /// Tasks generated.
    pub tasks_submitted: usize,
    /// Tasks completed.
    pub tasks_completed: usize,
    /// Mean response time.
    pub avg_response_time: Option<f64>,
    /// Makespan.
    pub makespan: Option<f64>,
    /// Throughput.
    pub throughput: Option<f64>,
    /// Utilization.
    pub utilization: Option<f64>,
}

impl SummaryRow {
    fn new(strategy: &str, m: &MetricsRecord) -> Self {
        Self {
            strategy: strategy.to_string(),
            tasks_submitted: m.tasks_submitted,
            tasks_completed: m.tasks_completed,
            avg_response_time: m.avg_response_time,
            makespan: m.makespan,
            throughput: m.throughput,
            utilization: m.utilization,
        }
    }
}

/// In-memory cross-strategy summary.
///
/// `Display` renders an aligned table with `NaN` for undefined metrics.
#[derive(Debug, Clone, Default)]
pub struct SummaryTable {
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows in record order.
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Row for a strategy.
    pub fn get(&self, strategy: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.strategy == strategy)
    }
}

impl ResultsSink for SummaryTable {
    fn record(&mut self, strategy: &str, metrics: &MetricsRecord) -> Result<(), SimError> {
        self.rows.push(SummaryRow::new(strategy, metrics));
        Ok(())
    }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.4}"))
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<12} {:>9} {:>9} {:>14} {:>12} {:>11} {:>11}",
            "strategy",
            "submitted",
            "completed",
            "avg_response",
            "makespan",
            "throughput",
            "utilization"
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:<12} {:>9} {:>9} {:>14} {:>12} {:>11} {:>11}",
                r.strategy,
                r.tasks_submitted,
                r.tasks_completed,
                cell(r.avg_response_time),
                cell(r.makespan),
                cell(r.throughput),
                cell(r.utilization),
            )?;
        }
        Ok(())
    }
}

/// Writes `<dir>/<strategy>_metrics.csv` per record and
/// `<dir>/summary.csv` on finish.
#[derive(Debug)]
pub struct CsvSink {
    dir: PathBuf,
    summary: SummaryTable,
}

impl CsvSink {
    /// Creates the output directory if needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, SimError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            summary: SummaryTable::new(),
        })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_rows(&self, file: &str, rows: &[SummaryRow]) -> Result<PathBuf, SimError> {
        let path = self.dir.join(file);
        let mut writer = csv::Writer::from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(path)
    }
}

impl ResultsSink for CsvSink {
    fn record(&mut self, strategy: &str, metrics: &MetricsRecord) -> Result<(), SimError> {
        let row = SummaryRow::new(strategy, metrics);
        let file = format!("{strategy}_metrics.csv");
        let path = self.write_rows(&file, std::slice::from_ref(&row))?;
        info!(strategy, path = %path.display(), "saved metrics");
        self.summary.rows.push(row);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SimError> {
        let path = self.write_rows("summary.csv", &self.summary.rows)?;
        info!(path = %path.display(), "saved summary");
        Ok(())
    }
}

/// Runs every strategy in `kinds` on the same configuration and seed,
/// feeding results to `sink` in order, then calls `finish`.
///
/// Each strategy gets a fresh engine, so workloads and resource rates
/// are identical across strategies.
pub fn compare<S: ResultsSink + ?Sized>(
    config: &SimulationConfig,
    kinds: &[StrategyKind],
    sink: &mut S,
) -> Result<(), SimError> {
    for &kind in kinds {
        info!(strategy = %kind, "running strategy");
        let metrics = Simulation::from_kind(config.clone(), kind)?.run();
        sink.record(kind.label(), &metrics)?;
    }
    sink.finish()
}
