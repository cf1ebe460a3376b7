//! # ovi-export
//!
//! Export des projets OVI/OMI avec isolation stricte par tenant.
//!
//! ## Features
//!
//! - Filtre tenant obligatoire + états + plage de dates inclusive
//! - CSV plat (codes) et CSV interprété (libellés)
//! - GeoPackage EPSG:4326 (couche de points, blobs binaires GeoPackage)
//! - Chargement de sources CSV avec validation ligne par ligne
//! - Rapport d'export JSON
//!
//! ## Usage CLI
//!
//! ```bash
//! # CSV plat des projets actifs d'un tenant jusqu'au 12 janvier
//! ovi-export csv -i projects.csv -o out/plano.csv -t tenant-a --status active --to 2025-01-12
//!
//! # CSV avec libellés
//! ovi-export csv -i projects.csv -o out/interpretado.csv -t tenant-a --interpreted
//!
//! # GeoPackage
//! ovi-export gpkg -i projects.csv -o out/projects.gpkg -t tenant-a --status active,closed
//! ```
//!
//! ## Usage bibliothèque
//!
//! ```rust,ignore
//! use ovi_export::{ExportFilter, ProjectExporter};
//!
//! let exporter = ProjectExporter::new(records);
//! let filter = ExportFilter::for_tenant("tenant-a").with_statuses(["active"]);
//! exporter.export_csv_plain("out/plano.csv", &filter)?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod exporter;
pub mod filter;
pub mod record;
pub mod report;
pub mod source;

pub use config::ExportConfig;
pub use error::{ExportError, SourceError};
pub use export::{CsvFlavor, ExportFormat, DEFAULT_TABLE_NAME};
pub use exporter::ProjectExporter;
pub use filter::ExportFilter;
pub use record::{ProjectRecord, PROJECT_TYPE_LABELS, STATUS_LABELS};
pub use report::{ExportReport, ExportStatus};
