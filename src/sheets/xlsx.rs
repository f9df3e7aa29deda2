//! Local workbook source (.xlsx)
//!
//! Reads the same A1 ranges as the live spreadsheet from an exported copy,
//! shaped like a Sheets API answer: numbers read as their number format
//! displays them, trailing empty cells and trailing empty rows are dropped.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calamine::{open_workbook, Data, Reader, Xlsx};
use tracing::info;

use super::a1::SheetRange;
use super::numfmt::{CellFormats, NumberStyle};
use super::SheetSource;
use crate::error::{FunnelError, FunnelResult};
use crate::types::Grid;

pub struct XlsxSource {
    path: PathBuf,
}

impl XlsxSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Blocking read of one range
    pub fn read_blocking(&self, range: &SheetRange) -> FunnelResult<Grid> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| {
            FunnelError::Fetch(format!(
                "Failed to open Excel file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let sheet = workbook.worksheet_range(&range.tab).map_err(|e| {
            FunnelError::Fetch(format!("Failed to read worksheet '{}': {}", range.tab, e))
        })?;

        let formats = CellFormats::load(&self.path, &range.tab)?;

        let mut grid: Grid = Vec::with_capacity(range.height());
        for row in range.start.row..=range.end.row {
            let mut cells: Vec<String> = (range.start.column..=range.end.column)
                .map(|col| {
                    let pos = ((row - 1) as u32, col as u32);
                    sheet
                        .get_value(pos)
                        .map(|data| display_text(data, formats.get(pos.0, pos.1)))
                        .unwrap_or_default()
                })
                .collect();
            while cells.last().is_some_and(|c| c.is_empty()) {
                cells.pop();
            }
            grid.push(cells);
        }
        while grid.last().is_some_and(|r| r.is_empty()) {
            grid.pop();
        }

        Ok(grid)
    }
}

#[async_trait]
impl SheetSource for XlsxSource {
    async fn read_range(&self, range: &str) -> FunnelResult<Grid> {
        let parsed: SheetRange = range.parse()?;
        let source = XlsxSource::new(&self.path);
        let grid = tokio::task::spawn_blocking(move || source.read_blocking(&parsed))
            .await
            .map_err(|e| FunnelError::Fetch(format!("workbook reader task failed: {}", e)))??;
        info!(range, rows = grid.len(), path = %self.path.display(), "read workbook range");
        Ok(grid)
    }
}

/// Numbers under a number format render as formatted; everything else
/// falls back to [`cell_text`]
fn display_text(data: &Data, style: Option<&NumberStyle>) -> String {
    match (data, style) {
        (Data::Float(f), Some(style)) => style.render(*f),
        (Data::Int(i), Some(style)) => style.render(*i as f64),
        _ => cell_text(data),
    }
}

/// Stored value of a workbook cell as text
fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}
