//! Spreadsheet-to-metrics pipeline
//!
//! grid → [`aggregator::summarize`] → [`ratios::build_report`]

pub mod aggregator;
pub mod cell;
pub mod ratios;

pub use aggregator::{summarize, SheetLayout, LABEL_RULES, MAX_COLUMNS};
pub use cell::{leading_number, to_number};
pub use ratios::{build_report, ratio};

use crate::error::FunnelResult;
use crate::types::{FunnelReport, Grid};

/// Run the full pipeline over one fetched grid. Every call starts from
/// zeroed accumulators.
pub fn run_pipeline(grid: &Grid, layout: &SheetLayout) -> FunnelResult<FunnelReport> {
    let summary = summarize(grid, layout)?;
    Ok(build_report(&summary))
}
