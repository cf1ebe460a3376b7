//! Relecture d'un GeoPackage (inspection, vérifications)

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::binary::{decode_point, DecodedPoint};
use crate::schema::validate_identifier;
use crate::GpkgError;

/// Résumé d'une couche déclarée dans `gpkg_contents`
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSummary {
    pub table_name: String,
    pub data_type: String,
    pub identifier: Option<String>,
    pub srs_id: Option<u32>,
    /// Colonne géométrique (depuis `gpkg_geometry_columns`)
    pub geometry_column: Option<String>,
    pub geometry_type: Option<String>,
    /// Emprise déclarée, `None` si une des bornes est NULL
    pub extent: Option<[f64; 4]>,
    pub feature_count: usize,
}

/// Résumé d'un fichier GeoPackage
#[derive(Debug, Clone)]
pub struct GeoPackageSummary {
    pub application_id: i32,
    pub user_version: i32,
    pub srs_ids: Vec<u32>,
    pub layers: Vec<LayerSummary>,
}

impl GeoPackageSummary {
    /// Ouvre un GeoPackage en lecture seule et résume son contenu
    pub fn open(path: &Path) -> Result<Self, GpkgError> {
        let conn = open_read_only(path)?;

        let application_id: i32 = conn.query_row("PRAGMA application_id", [], |r| r.get(0))?;
        let user_version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

        let srs_ids = {
            let mut stmt = conn.prepare("SELECT srs_id FROM gpkg_spatial_ref_sys ORDER BY srs_id")?;
            let rows = stmt.query_map([], |r| r.get::<_, u32>(0))?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        let rows = {
            let mut stmt = conn.prepare(
                "SELECT c.table_name, c.data_type, c.identifier, c.srs_id,
                        g.column_name, g.geometry_type_name,
                        c.min_x, c.min_y, c.max_x, c.max_y
                 FROM gpkg_contents c
                 LEFT JOIN gpkg_geometry_columns g ON g.table_name = c.table_name
                 ORDER BY c.table_name",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok(LayerSummaryRow {
                    table_name: r.get(0)?,
                    data_type: r.get(1)?,
                    identifier: r.get(2)?,
                    srs_id: r.get(3)?,
                    geometry_column: r.get(4)?,
                    geometry_type: r.get(5)?,
                    bounds: [r.get(6)?, r.get(7)?, r.get(8)?, r.get(9)?],
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        let mut layers = Vec::with_capacity(rows.len());
        for row in rows {
            let feature_count = count_rows(&conn, &row.table_name)?;
            let extent = match row.bounds {
                [Some(a), Some(b), Some(c), Some(d)] => Some([a, b, c, d]),
                _ => None,
            };
            layers.push(LayerSummary {
                table_name: row.table_name,
                data_type: row.data_type,
                identifier: row.identifier,
                srs_id: row.srs_id,
                geometry_column: row.geometry_column,
                geometry_type: row.geometry_type,
                extent,
                feature_count,
            });
        }

        Ok(Self {
            application_id,
            user_version,
            srs_ids,
            layers,
        })
    }

    /// Vrai si les pragmas identifient un GeoPackage
    pub fn is_geopackage(&self) -> bool {
        self.application_id == crate::schema::APPLICATION_ID
    }

    /// Recherche une couche par nom de table
    pub fn layer(&self, table_name: &str) -> Option<&LayerSummary> {
        self.layers.iter().find(|l| l.table_name == table_name)
    }
}

/// Relit toutes les géométries d'une couche de points, dans l'ordre des fid
pub fn read_points(path: &Path, table_name: &str) -> Result<Vec<DecodedPoint>, GpkgError> {
    validate_identifier(table_name)?;
    let conn = open_read_only(path)?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM \"{}\" ORDER BY fid",
        crate::schema::GEOMETRY_COLUMN,
        table_name
    ))?;
    let blobs = stmt
        .query_map([], |r| r.get::<_, Vec<u8>>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    blobs.iter().map(|b| decode_point(b)).collect()
}

fn open_read_only(path: &Path) -> Result<Connection, GpkgError> {
    Ok(Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?)
}

fn count_rows(conn: &Connection, table_name: &str) -> Result<usize, GpkgError> {
    validate_identifier(table_name)?;
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM \"{}\"", table_name),
        [],
        |r| r.get(0),
    )?;
    Ok(count as usize)
}

/// Ligne brute de la jointure contents/geometry_columns
struct LayerSummaryRow {
    table_name: String,
    data_type: String,
    identifier: Option<String>,
    srs_id: Option<u32>,
    geometry_column: Option<String>,
    geometry_type: Option<String>,
    bounds: [Option<f64>; 4],
}
