//! Funnel API Server binary
//!
//! HTTP REST API serving the funnel reports to the dashboard front end.

use clap::Parser;
use funnel_dash::api::{run_api_server, ApiConfig, AppState};
use funnel_dash::config::DashboardSettings;
use funnel_dash::sheets::open_source;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "funnel-server")]
#[command(version)]
#[command(about = "Funnel API Server - sales-funnel metrics over HTTP")]
#[command(long_about = r#"
Funnel API Server

Endpoints:
  - GET /api/v1/periods          - Configured reporting periods
  - GET /api/v1/metrics/:period  - Funnel counts and conversion rates
  - GET /api/v1/forecast?agency= - Forecast block for one agency

Additional endpoints:
  - GET /health                  - Health check
  - GET /version                 - Server version info
  - GET /                        - API documentation

Google Sheets access is read from the environment:
  GOOGLE_SHEETS_SPREADSHEET_ID, GOOGLE_SHEETS_CLIENT_EMAIL,
  GOOGLE_SHEETS_PRIVATE_KEY (or GOOGLE_SHEETS_ACCESS_TOKEN)

Example usage:
  funnel-server                           # Start on localhost:8080
  funnel-server --host 0.0.0.0 --port 3000
  funnel-server --xlsx consolidado.xlsx   # Serve a local workbook

  curl http://localhost:8080/api/v1/metrics/febrero
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "FUNNEL_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "FUNNEL_PORT")]
    port: u16,

    /// YAML settings file (periods, layout, forecast blocks)
    #[arg(short, long, env = "FUNNEL_CONFIG")]
    config: Option<PathBuf>,

    /// Serve a local .xlsx workbook instead of Google Sheets
    #[arg(long, env = "FUNNEL_XLSX")]
    xlsx: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Missing configuration stops the server before it binds
    let settings = DashboardSettings::load_or_default(args.config.as_deref())?;
    let source = open_source(args.xlsx.as_deref())?;

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config, AppState::new(settings, source)).await
}
