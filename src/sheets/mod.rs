//! Raw sheet fetchers
//!
//! A [`SheetSource`] returns the cells of one A1 range as strings. The
//! pipeline never sees where they came from:
//! - [`GoogleSheetsClient`]: the live spreadsheet, read-only
//! - [`XlsxSource`]: a local workbook export (offline runs, fixtures)

pub mod a1;
pub mod google;
pub mod numfmt;
pub mod xlsx;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SheetsAccess;
use crate::error::FunnelResult;
use crate::types::Grid;

pub use a1::{column_to_letters, letters_to_column, CellRef, SheetRange};
pub use google::{Credentials, GoogleSheetsClient};
pub use xlsx::XlsxSource;

#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Read `range` (e.g. `Res Feb 26!A1:Z200`). Rows may be ragged and
    /// trailing empty cells may be missing.
    async fn read_range(&self, range: &str) -> FunnelResult<Grid>;
}

/// Pick the sheet source for a run: a local workbook when `xlsx` is given,
/// otherwise the live spreadsheet configured in the environment.
pub fn open_source(xlsx: Option<&Path>) -> FunnelResult<Arc<dyn SheetSource>> {
    match xlsx {
        Some(path) => Ok(Arc::new(XlsxSource::new(path))),
        None => Ok(Arc::new(SheetsAccess::from_env()?.into_client()?)),
    }
}
