//! # gpkg
//!
//! Écriture minimale de GeoPackage (OGC 12-128r) pour des couches de points.
//!
//! ## Features
//!
//! - En-tête binaire GeoPackage + WKB little-endian, sans enveloppe (29 octets par point)
//! - Amorçage des tables `gpkg_spatial_ref_sys`, `gpkg_contents`, `gpkg_geometry_columns`
//! - Insertion transactionnelle via `rusqlite`
//! - Relecture pour inspection et tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gpkg::{AttributeColumn, ColumnType, GeoPackageWriter, PointFeature, PointLayer};
//! use gpkg::Value;
//!
//! let layer = PointLayer::new("sites", vec![AttributeColumn::new("name", ColumnType::Text)])?;
//! let mut writer = GeoPackageWriter::create(Path::new("sites.gpkg"), layer)?;
//! writer.write_points(vec![PointFeature {
//!     point: geo::Point::new(-99.13, 19.43),
//!     attributes: vec![Value::Text("Zócalo".into())],
//! }])?;
//! writer.finish()?;
//! ```

pub mod binary;
pub mod error;
pub mod reader;
pub mod schema;
pub mod writer;

pub use binary::{decode_point, encode_point, DecodedPoint};
pub use error::GpkgError;
pub use reader::{read_points, GeoPackageSummary, LayerSummary};
pub use schema::{AttributeColumn, ColumnType, PointLayer, SpatialRefSys, WGS84};
pub use writer::{GeoPackageWriter, PointFeature};

/// Valeur attributaire SQLite
pub use rusqlite::types::Value;

/// Code EPSG du WGS 84 géodésique
pub const EPSG_WGS84: u32 = 4326;
