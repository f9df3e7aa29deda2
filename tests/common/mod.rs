//! Shared fixtures for integration tests
#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Write a cell the way a person would type it: numbers as numbers,
/// everything else as text, blanks left empty.
fn write_cell(ws: &mut rust_xlsxwriter::Worksheet, r: u32, c: u16, value: &str) {
    if value.is_empty() {
        return;
    }
    match value.parse::<f64>() {
        Ok(n) => {
            ws.write_number(r, c, n).unwrap();
        }
        Err(_) => {
            ws.write_string(r, c, value).unwrap();
        }
    }
}

fn write_rows(ws: &mut rust_xlsxwriter::Worksheet, first_row: u32, first_col: u16, rows: &[&[&str]]) {
    for (r, cells) in rows.iter().enumerate() {
        for (c, value) in cells.iter().enumerate() {
            write_cell(ws, first_row + r as u32, first_col + c as u16, value);
        }
    }
}

/// Consolidated February tab: Acura + GWM Cuernavaca
pub const FEBRERO_ROWS: &[&[&str]] = &[
    &["Consolidado Febrero 2026"],
    &[],
    &["", "", "Acura", "GWM Cuernavaca"],
    &["VISITAS A PISO", "Primera visita", "70", "20"],
    &["VISITAS A PISO", "TOTAL VISITAS A PISO", "100", "50"],
    &["PRUEBAS DE MANEJO", "TOTAL PRUEBAS", "40", "1,000"],
    &["FINANCIERA", "Solicitudes Financiera de Marca", "20", ""],
    &["AVALÚOS", "Avalúos", "8", "4"],
    &["RESULTADOS", "VENTAS TOTALES", "10", "5"],
    &["RESULTADOS", "Cumplimiento", "85%", "40%"],
];

/// Forecast tab block for "Total Grupo" (starts at D7)
pub const FORECAST_ROWS: &[&[&str]] = &[
    &["Métrica", "Dic", "Ene", "Feb Real", "Feb Run Rate", "Prom Hist", "Feb Forecast IA"],
    &["Ventas Nuevos", "120", "98", "40", "112.5", "105", "110"],
    &["Ventas Seminuevos", "30", "28", "11", "31", "29", "30"],
    &["Total visitas a piso", "1500", "1320", "600", "1450", "1410", "1480"],
];

/// Build a workbook with the February tab and the forecast tab
pub fn write_dashboard_workbook(path: &Path) {
    let mut workbook = Workbook::new();

    let feb = workbook.add_worksheet();
    feb.set_name("Res Feb 26").unwrap();
    write_rows(feb, 0, 0, FEBRERO_ROWS);

    let forecast = workbook.add_worksheet();
    forecast.set_name("Dashboard Forecast").unwrap();
    write_rows(forecast, 6, 3, FORECAST_ROWS);

    workbook.save(path).unwrap();
}

pub fn dashboard_workbook() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("consolidado.xlsx");
    write_dashboard_workbook(&path);
    (dir, path)
}
