//! Per-tick prevalence reporting.
//!
//! The dashboard-facing renderer is an external collaborator; a headless
//! run records the same information as a CSV time series instead, one row
//! of per-compartment counts per tick.

use crate::compartment::Compartment;
use crate::error::EpinetError;
use crate::population::Population;
use csv::Writer;
use serde_derive::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

/// One row of the prevalence time series.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct PrevalenceRow {
    pub step: u64,
    pub susceptible: usize,
    pub exposed: usize,
    pub infected: usize,
    pub recovered: usize,
    pub dead: usize,
    pub quarantined: usize,
}

impl PrevalenceRow {
    /// Tallies the population at the given step.
    #[must_use]
    pub fn tabulate(step: u64, population: &Population) -> PrevalenceRow {
        PrevalenceRow {
            step,
            susceptible: population.count_in(Compartment::Susceptible),
            exposed: population.count_in(Compartment::Exposed),
            infected: population.count_in(Compartment::Infected),
            recovered: population.count_in(Compartment::Recovered),
            dead: population.count_in(Compartment::Dead),
            quarantined: population.count_in(Compartment::Quarantined),
        }
    }
}

// Checks that the path is valid. Creates the file and all parent
// directories if they do not exist. Called by `ReportWriter::from_path`.
fn create_report_file(path_name: &str) -> Result<File, EpinetError> {
    let path = Path::new(path_name);
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            create_dir_all(path.parent().expect("Either root or empty path provided"))?;
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(EpinetError::ReportError(
            "Report output files must be CSVs at this time".to_string(),
        )),
    }
}

/// Writes the prevalence time series for one simulation run.
pub struct ReportWriter {
    writer: Writer<File>,
}

impl ReportWriter {
    /// Opens a report at `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a `.csv` or cannot be created.
    pub fn from_path(path: &str) -> Result<ReportWriter, EpinetError> {
        let file = create_report_file(path)?;
        Ok(ReportWriter {
            writer: Writer::from_writer(file),
        })
    }

    /// Appends one row of per-compartment counts and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub fn write_counts(&mut self, step: u64, population: &Population) -> Result<(), EpinetError> {
        self.writer
            .serialize(PrevalenceRow::tabulate(step, population))?;
        self.writer.flush()?;
        Ok(())
    }
}
