use crate::config::DashboardSettings;
use crate::error::FunnelResult;
use crate::forecast::{load_forecast, ForecastReport};
use crate::report::{load_period, PeriodReport};
use crate::sheets::SheetSource;
use crate::types::ConversionMetrics;
use colored::Colorize;

/// Format a count for display, dropping unnecessary decimal places
pub fn format_number(n: f64) -> String {
    let rounded = (n * 100.0).round() / 100.0;
    format!("{:.2}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Format a conversion percentage with one decimal
pub fn format_percent(n: f64) -> String {
    format!("{:.1}%", n)
}

/// Execute the metrics command
pub async fn metrics(
    source: &dyn SheetSource,
    settings: &DashboardSettings,
    period: &str,
    json: bool,
) -> FunnelResult<()> {
    let report = load_period(source, settings, period).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "📊 Funnel - Sales funnel metrics".bold().green());
    println!("   Period: {}\n", report.label.bright_yellow().bold());
    print_funnel_table(&report, &settings.group_label);
    Ok(())
}

/// Print counts and conversion rates, one line per agency plus the group total
fn print_funnel_table(report: &PeriodReport, group_label: &str) {
    println!("{}", "─".repeat(118));
    println!(
        "{:<22} {:>8} {:>8} {:>8} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Agencia".bold(),
        "Visitas".bold(),
        "Pruebas".bold(),
        "Solic.".bold(),
        "Avalúos".bold(),
        "Ventas".bold(),
        "Pru/Vis".bold(),
        "Sol/Pru".bold(),
        "Ava/Sol".bold(),
        "Ven/Ava".bold(),
        "Ven/Vis".bold()
    );
    println!("{}", "─".repeat(118));

    for agency in &report.metricas.agencias {
        print_funnel_row(agency, group_label, false);
    }

    println!("{}", "─".repeat(118));
    print_funnel_row(&report.metricas.total_grupo, group_label, true);
}

fn print_funnel_row(m: &ConversionMetrics, group_label: &str, total: bool) {
    let name = m.agencia.display_name(group_label);
    let name = if total {
        name.bold().green()
    } else {
        name.bright_blue()
    };
    println!(
        "{:<22} {:>8} {:>8} {:>8} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        name,
        format_number(m.visitas),
        format_number(m.pruebas),
        format_number(m.solicitudes),
        format_number(m.avaluos),
        format_number(m.ventas),
        format_percent(m.conv_pruebas_sobre_visitas),
        format_percent(m.conv_solicitudes_sobre_pruebas),
        format_percent(m.conv_avaluos_sobre_solicitudes),
        format_percent(m.conv_ventas_sobre_avaluos),
        format_percent(m.conv_ventas_sobre_visitas).bold()
    );
}

/// Execute the forecast command
pub async fn forecast(
    source: &dyn SheetSource,
    settings: &DashboardSettings,
    agency: Option<&str>,
    json: bool,
) -> FunnelResult<()> {
    let report = load_forecast(source, &settings.forecast, agency).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "🔮 Funnel - Forecast".bold().green());
    println!("   Month:  {}", report.month.bright_yellow().bold());
    println!("   Agency: {}\n", report.agency.bright_blue().bold());
    print_forecast_table(&report);
    Ok(())
}

fn print_forecast_table(report: &ForecastReport) {
    println!("{}", "─".repeat(96));
    println!(
        "{:<28} {:>10} {:>10} {:>10} {:>12} {:>10} {:>12}",
        "Métrica".bold(),
        "Dic".bold(),
        "Ene".bold(),
        "Feb Real".bold(),
        "Run Rate".bold(),
        "Prom Hist".bold(),
        "Forecast IA".bold()
    );
    println!("{}", "─".repeat(96));

    for row in &report.data {
        println!(
            "{:<28} {:>10} {:>10} {:>10} {:>12} {:>10} {:>12}",
            row.metric.cyan(),
            format_number(row.dec),
            format_number(row.jan),
            format_number(row.feb_real),
            format_number(row.feb_run_rate),
            format_number(row.hist_avg),
            format_number(row.feb_forecast_ia).bold()
        );
    }
}

/// Execute the periods command
pub fn periods(settings: &DashboardSettings) -> FunnelResult<()> {
    println!("{}", "📅 Configured periods".bold().green());
    for period in &settings.periods {
        println!(
            "   {:<12} {:<18} {}",
            period.key.bright_blue().bold(),
            period.label,
            period.range.dimmed()
        );
    }
    println!();
    println!(
        "   Forecast: {} ({} agencies)",
        settings.forecast.tab.cyan(),
        settings.forecast.agencies.len()
    );
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
