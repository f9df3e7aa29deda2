//! Row classifier and per-agency aggregation
//!
//! The consolidated sheet is a human-maintained report: column A holds a
//! section label, column B a category label, and one column per agency
//! follows. Only a handful of `(section, category)` pairs carry the funnel
//! counts; every other row is ignored.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cell::to_number;
use crate::error::{FunnelError, FunnelResult};
use crate::types::{cell, AgencyMetrics, AgencySummary, FunnelSummary, Grid, Metric};

/// One recognized label pair and the field it feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRule {
    pub section: &'static str,
    pub category: &'static str,
    pub metric: Metric,
}

/// Label pairs as they are spelled in the sheet (exact, accent-sensitive).
pub const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        section: "VISITAS A PISO",
        category: "TOTAL VISITAS A PISO",
        metric: Metric::Visitas,
    },
    LabelRule {
        section: "PRUEBAS DE MANEJO",
        category: "TOTAL PRUEBAS",
        metric: Metric::Pruebas,
    },
    LabelRule {
        section: "FINANCIERA",
        category: "Solicitudes Financiera de Marca",
        metric: Metric::Solicitudes,
    },
    LabelRule {
        section: "AVALÚOS",
        category: "Avalúos",
        metric: Metric::Avaluos,
    },
    LabelRule {
        section: "RESULTADOS",
        category: "VENTAS TOTALES",
        metric: Metric::VentasTotales,
    },
];

/// Map a row's label pair to the metric it reports, if any.
pub fn classify(section: &str, category: &str) -> Option<Metric> {
    LABEL_RULES
        .iter()
        .find(|rule| rule.section == section && rule.category == category)
        .map(|rule| rule.metric)
}

/// Where the agency header lives in the consolidated sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// Zero-based index of the header row naming the agencies
    pub header_row: usize,
    /// Zero-based column of the first agency
    pub first_agency_column: usize,
    /// Width of the agency span in the header row
    pub max_agencies: usize,
}

/// Widest sheet the Sheets API serves (column `ZZZ`)
pub const MAX_COLUMNS: usize = 18_278;

impl SheetLayout {
    /// One past the last agency column, if the span fits on a sheet.
    pub fn span_end(&self) -> Option<usize> {
        self.first_agency_column
            .checked_add(self.max_agencies)
            .filter(|&end| end <= MAX_COLUMNS)
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row: 2,
            first_agency_column: 2,
            max_agencies: 11,
        }
    }
}

/// Read the agency header: `(column, name)` pairs in left-to-right order.
///
/// Blank header cells inside the span are skipped; their column is not an
/// agency. A grid without the header row is a layout error.
pub fn agency_columns(grid: &Grid, layout: &SheetLayout) -> FunnelResult<Vec<(usize, String)>> {
    let header = grid.get(layout.header_row).ok_or_else(|| {
        FunnelError::Layout(format!(
            "header row {} not found ({} rows fetched)",
            layout.header_row + 1,
            grid.len()
        ))
    })?;

    let end = layout.span_end().ok_or_else(|| {
        FunnelError::Layout(format!(
            "agency span {}+{} is past the last column",
            layout.first_agency_column, layout.max_agencies
        ))
    })?;
    Ok((layout.first_agency_column..end)
        .filter_map(|col| cell(header, col).map(|name| (col, name.to_string())))
        .collect())
}

/// Walk the whole grid once and accumulate every recognized row into the
/// agency records and the group total.
///
/// A repeated agency name in the header folds both columns into the first
/// record with that name; the group total still counts every column.
pub fn summarize(grid: &Grid, layout: &SheetLayout) -> FunnelResult<FunnelSummary> {
    let columns = agency_columns(grid, layout)?;

    let mut agencias: Vec<AgencySummary> = Vec::with_capacity(columns.len());
    let mut slots: Vec<(usize, usize)> = Vec::with_capacity(columns.len());
    for (col, name) in columns {
        let idx = match agencias.iter().position(|a| a.agencia == name) {
            Some(idx) => idx,
            None => {
                agencias.push(AgencySummary {
                    agencia: name,
                    metrics: AgencyMetrics::default(),
                });
                agencias.len() - 1
            }
        };
        slots.push((col, idx));
    }

    let mut total_grupo = AgencyMetrics::default();
    let mut matched_rows = 0;

    for row in grid {
        let (Some(section), Some(category)) = (cell(row, 0), cell(row, 1)) else {
            continue;
        };
        let Some(metric) = classify(section, category) else {
            continue;
        };
        matched_rows += 1;

        for &(col, idx) in &slots {
            let value = to_number(cell(row, col));
            agencias[idx].metrics.add(metric, value);
            total_grupo.add(metric, value);
        }
    }

    debug!(
        agencies = agencias.len(),
        rows = grid.len(),
        matched_rows,
        "aggregated funnel sheet"
    );

    Ok(FunnelSummary {
        agencias,
        total_grupo,
        matched_rows,
    })
}
