//! Period reports: fetch one consolidated tab and run the pipeline over it

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DashboardSettings;
use crate::core::run_pipeline;
use crate::error::FunnelResult;
use crate::sheets::SheetSource;
use crate::types::FunnelReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub period: String,
    pub label: String,
    pub metricas: FunnelReport,
}

/// Fetch the configured range for `period` and turn it into a report.
/// Either the whole report is produced or the call fails.
pub async fn load_period(
    source: &dyn SheetSource,
    settings: &DashboardSettings,
    period: &str,
) -> FunnelResult<PeriodReport> {
    let config = settings.period(period)?;
    let grid = source.read_range(&config.range).await?;
    let metricas = run_pipeline(&grid, &settings.layout)?;

    info!(
        period = %config.key,
        agencies = metricas.agencias.len(),
        "built period report"
    );

    Ok(PeriodReport {
        period: config.key.clone(),
        label: config.label.clone(),
        metricas,
    })
}
