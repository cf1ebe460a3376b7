//! Writers d'export (CSV, GeoPackage)

pub mod csv;
pub mod geopackage;

use serde::Serialize;

pub use self::csv::CsvFlavor;
pub use self::geopackage::DEFAULT_TABLE_NAME;

/// Format d'artefact produit par un export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ExportFormat {
    /// CSV avec codes bruts
    CsvPlain,
    /// CSV avec libellés
    CsvInterpreted,
    /// GeoPackage, une couche de points
    GeoPackage { table_name: String },
}

impl ExportFormat {
    /// Nom court pour les logs et rapports
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::CsvPlain => "csv",
            ExportFormat::CsvInterpreted => "csv-interpreted",
            ExportFormat::GeoPackage { .. } => "gpkg",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
