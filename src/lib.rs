//! Funnel Dash - sales-funnel metrics for a dealership group
//!
//! Reads the monthly consolidated sheet (one column per agency, rows keyed
//! by section/category labels), aggregates the funnel counts per agency and
//! for the whole group, and derives the conversion percentages.
//!
//! # Pipeline
//!
//! - [`sheets::SheetSource`]: fetch a range as a grid of strings
//! - [`core::summarize`]: classify rows and accumulate counts
//! - [`core::build_report`]: add conversion ratios
//!
//! # Example
//!
//! ```
//! use funnel_dash::core::{run_pipeline, SheetLayout};
//!
//! let grid: Vec<Vec<String>> = vec![
//!     vec![],
//!     vec![],
//!     vec!["".into(), "".into(), "Acura".into()],
//!     vec!["VISITAS A PISO".into(), "TOTAL VISITAS A PISO".into(), "100".into()],
//!     vec!["RESULTADOS".into(), "VENTAS TOTALES".into(), "10".into()],
//! ];
//!
//! let report = run_pipeline(&grid, &SheetLayout::default())?;
//! assert_eq!(report.total_grupo.conv_ventas_sobre_visitas, 10.0);
//! # Ok::<(), funnel_dash::error::FunnelError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod forecast;
pub mod report;
pub mod sheets;
pub mod types;

// Re-export commonly used types
pub use error::{FunnelError, FunnelResult};
pub use types::{AgencyMetrics, ConversionMetrics, FunnelReport, Grid, Metric, Subject};
