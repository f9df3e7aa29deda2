//! Forecast dashboard reader
//!
//! The forecast tab holds one block of columns per agency:
//! `metric | dec | jan | feb real | feb run-rate | hist avg | feb forecast (AI)`.
//! The first row of every block is a header. Values are copied as they are
//! in the sheet; nothing here predicts anything.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ForecastAgency, ForecastConfig};
use crate::core::leading_number;
use crate::error::{FunnelError, FunnelResult};
use crate::sheets::{letters_to_column, CellRef, SheetRange, SheetSource};
use crate::types::{cell, Grid};

/// Columns in one agency block
pub const BLOCK_WIDTH: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRow {
    pub metric: String,
    pub dec: f64,
    pub jan: f64,
    pub feb_real: f64,
    pub feb_run_rate: f64,
    pub hist_avg: f64,
    #[serde(rename = "febForecastIA")]
    pub feb_forecast_ia: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub month: String,
    pub agency: String,
    pub agencies: Vec<String>,
    pub data: Vec<ForecastRow>,
}

/// Resolve the requested agency, falling back to the configured default.
pub fn find_agency<'a>(
    config: &'a ForecastConfig,
    name: Option<&str>,
) -> FunnelResult<&'a ForecastAgency> {
    let wanted = name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(&config.default_agency);
    config
        .agencies
        .iter()
        .find(|a| a.name == wanted)
        .ok_or_else(|| FunnelError::UnknownAgency(wanted.to_string()))
}

/// A1 range covering one agency block
pub fn block_range(config: &ForecastConfig, agency: &ForecastAgency) -> FunnelResult<SheetRange> {
    let column = letters_to_column(&agency.column)?;
    let start = CellRef {
        column,
        row: config.first_row,
    };
    let end = CellRef {
        column,
        row: config.last_row,
    }
    .offset_columns(BLOCK_WIDTH - 1)?;
    Ok(SheetRange::new(config.tab.clone(), start, end))
}

/// Turn a fetched block into rows, skipping its header row.
pub fn parse_rows(grid: &Grid) -> Vec<ForecastRow> {
    grid.iter()
        .skip(1)
        .map(|row| ForecastRow {
            metric: cell(row, 0).unwrap_or_default().to_string(),
            dec: leading_number(cell(row, 1)),
            jan: leading_number(cell(row, 2)),
            feb_real: leading_number(cell(row, 3)),
            feb_run_rate: leading_number(cell(row, 4)),
            hist_avg: leading_number(cell(row, 5)),
            feb_forecast_ia: leading_number(cell(row, 6)),
        })
        .collect()
}

/// Fetch and parse the forecast block for `agency` (default agency if `None`).
pub async fn load_forecast(
    source: &dyn SheetSource,
    config: &ForecastConfig,
    agency: Option<&str>,
) -> FunnelResult<ForecastReport> {
    let selected = find_agency(config, agency)?;
    let range = block_range(config, selected)?;
    debug!(agency = %selected.name, range = %range, "loading forecast block");

    let grid = source.read_range(&range.to_string()).await?;

    Ok(ForecastReport {
        month: config.month.clone(),
        agency: selected.name.clone(),
        agencies: config.agencies.iter().map(|a| a.name.clone()).collect(),
        data: parse_rows(&grid),
    })
}
