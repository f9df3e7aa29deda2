use clap::{Parser, Subcommand};
use funnel_dash::cli;
use funnel_dash::config::DashboardSettings;
use funnel_dash::sheets::open_source;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "funnel")]
#[command(about = "Sales-funnel metrics per agency, straight from the consolidated sheet.")]
#[command(long_about = "Funnel - dealership sales-funnel metrics

Reads the monthly consolidated sheet, adds up floor visits, test drives,
finance applications, trade-in appraisals and sales per agency, and
computes the conversion rates between them.

COMMANDS:
  metrics   - Funnel counts and conversion rates for a period
  forecast  - Forecast block for one agency
  periods   - List configured periods

SOURCES:
  Google Sheets (default): needs GOOGLE_SHEETS_SPREADSHEET_ID plus
    GOOGLE_SHEETS_CLIENT_EMAIL and GOOGLE_SHEETS_PRIVATE_KEY
    (or GOOGLE_SHEETS_ACCESS_TOKEN)
  Local workbook: --xlsx export.xlsx

EXAMPLES:
  funnel metrics febrero
  funnel metrics enero --json
  funnel --xlsx consolidado.xlsx metrics febrero
  funnel forecast --agency \"MG Santa Fe\"")]
#[command(version)]
struct Cli {
    /// Read ranges from a local .xlsx workbook instead of Google Sheets
    #[arg(long, global = true, env = "FUNNEL_XLSX")]
    xlsx: Option<PathBuf>,

    /// YAML settings file (periods, layout, forecast blocks)
    #[arg(short, long, global = true, env = "FUNNEL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Funnel counts and conversion rates for a period
    Metrics {
        /// Period key (e.g. febrero)
        period: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forecast block for one agency
    Forecast {
        /// Agency name (defaults to the group total)
        #[arg(short, long)]
        agency: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured periods
    Periods,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "funnel_dash=warn".into()),
        )
        .init();

    let settings = DashboardSettings::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Metrics { period, json } => {
            let source = open_source(cli.xlsx.as_deref())?;
            cli::metrics(source.as_ref(), &settings, &period, json).await?;
        }
        Commands::Forecast { agency, json } => {
            let source = open_source(cli.xlsx.as_deref())?;
            cli::forecast(source.as_ref(), &settings, agency.as_deref(), json).await?;
        }
        Commands::Periods => cli::periods(&settings)?,
    }

    Ok(())
}
