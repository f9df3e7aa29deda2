//! Conversion ratios between funnel stages

use crate::types::{AgencyMetrics, ConversionMetrics, FunnelReport, FunnelSummary, Subject};

/// Percentage of `numerator` over `denominator`; 0 when the denominator is 0.
///
/// Not capped at 100: a stage can legitimately outnumber the one before it.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        (numerator / denominator) * 100.0
    }
}

impl ConversionMetrics {
    /// Decorate absolute counts with the five conversion percentages.
    pub fn from_metrics(agencia: Subject, m: &AgencyMetrics) -> Self {
        Self {
            agencia,
            visitas: m.visitas,
            pruebas: m.pruebas,
            solicitudes: m.solicitudes,
            avaluos: m.avaluos,
            ventas: m.ventas_totales,
            conv_pruebas_sobre_visitas: ratio(m.pruebas, m.visitas),
            conv_solicitudes_sobre_pruebas: ratio(m.solicitudes, m.pruebas),
            conv_avaluos_sobre_solicitudes: ratio(m.avaluos, m.solicitudes),
            conv_ventas_sobre_avaluos: ratio(m.ventas_totales, m.avaluos),
            conv_ventas_sobre_visitas: ratio(m.ventas_totales, m.visitas),
        }
    }
}

/// Attach ratios to every agency (header order kept) and to the group total.
pub fn build_report(summary: &FunnelSummary) -> FunnelReport {
    FunnelReport {
        agencias: summary
            .agencias
            .iter()
            .map(|a| ConversionMetrics::from_metrics(Subject::Agency(a.agencia.clone()), &a.metrics))
            .collect(),
        total_grupo: ConversionMetrics::from_metrics(Subject::Group, &summary.total_grupo),
    }
}
