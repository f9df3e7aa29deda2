use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rectangular-ish grid of sheet cells. Rows may be ragged; a missing
/// trailing cell reads the same as an empty one.
pub type Grid = Vec<Vec<String>>;

/// Read a cell, treating out-of-range positions and empty strings as absent.
pub fn cell(grid_row: &[String], col: usize) -> Option<&str> {
    grid_row
        .get(col)
        .map(String::as_str)
        .filter(|s| !s.is_empty())
}

//==============================================================================
// Funnel Metrics
//==============================================================================

/// The five funnel stages tracked per agency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Floor traffic
    Visitas,
    /// Test drives
    Pruebas,
    /// Brand-finance applications
    Solicitudes,
    /// Trade-in appraisals
    Avaluos,
    /// Total sales
    VentasTotales,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Visitas,
        Metric::Pruebas,
        Metric::Solicitudes,
        Metric::Avaluos,
        Metric::VentasTotales,
    ];
}

/// Absolute funnel counts for one agency (or the whole group)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyMetrics {
    pub visitas: f64,
    pub pruebas: f64,
    pub solicitudes: f64,
    pub avaluos: f64,
    pub ventas_totales: f64,
}

impl AgencyMetrics {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Visitas => self.visitas,
            Metric::Pruebas => self.pruebas,
            Metric::Solicitudes => self.solicitudes,
            Metric::Avaluos => self.avaluos,
            Metric::VentasTotales => self.ventas_totales,
        }
    }

    fn slot(&mut self, metric: Metric) -> &mut f64 {
        match metric {
            Metric::Visitas => &mut self.visitas,
            Metric::Pruebas => &mut self.pruebas,
            Metric::Solicitudes => &mut self.solicitudes,
            Metric::Avaluos => &mut self.avaluos,
            Metric::VentasTotales => &mut self.ventas_totales,
        }
    }

    /// Accumulate a value into one field. Fields are only ever added to.
    pub fn add(&mut self, metric: Metric, value: f64) {
        *self.slot(metric) += value;
    }
}

/// Aggregated counts for one named agency column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgencySummary {
    pub agencia: String,
    #[serde(flatten)]
    pub metrics: AgencyMetrics,
}

/// Output of the aggregation pass: agencies in header order plus group totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelSummary {
    pub agencias: Vec<AgencySummary>,
    pub total_grupo: AgencyMetrics,
    /// Number of data rows whose label pair matched a tracked metric
    #[serde(skip)]
    pub matched_rows: usize,
}

//==============================================================================
// Conversion Report
//==============================================================================

/// Who a conversion record describes.
///
/// The group total is its own variant so it can never collide with a real
/// agency name. In JSON an agency serializes as its name and the group as
/// `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Agency(String),
    Group,
}

impl Subject {
    pub fn agency_name(&self) -> Option<&str> {
        match self {
            Subject::Agency(name) => Some(name),
            Subject::Group => None,
        }
    }

    /// Label for human-facing output
    pub fn display_name<'a>(&'a self, group_label: &'a str) -> &'a str {
        self.agency_name().unwrap_or(group_label)
    }
}

impl Serialize for Subject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Subject::Agency(name) => serializer.serialize_str(name),
            Subject::Group => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Subject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name: Option<String> = Option::deserialize(deserializer)?;
        Ok(name.map_or(Subject::Group, Subject::Agency))
    }
}

/// Funnel counts decorated with the derived conversion percentages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMetrics {
    pub agencia: Subject,
    pub visitas: f64,
    pub pruebas: f64,
    pub solicitudes: f64,
    pub avaluos: f64,
    pub ventas: f64,
    pub conv_pruebas_sobre_visitas: f64,
    pub conv_solicitudes_sobre_pruebas: f64,
    pub conv_avaluos_sobre_solicitudes: f64,
    pub conv_ventas_sobre_avaluos: f64,
    pub conv_ventas_sobre_visitas: f64,
}

/// Final pipeline output consumed by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelReport {
    pub agencias: Vec<ConversionMetrics>,
    pub total_grupo: ConversionMetrics,
}
