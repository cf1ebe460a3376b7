//! Écriture d'un GeoPackage contenant une couche de points
//!
//! Le conteneur est construit de zéro : pragmas, tables de métadonnées,
//! SRS, puis la table utilisateur. La connexion SQLite est fermée au drop
//! quel que soit le chemin de sortie.

use std::path::Path;

use geo::Point;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use tracing::debug;

use crate::binary::encode_point;
use crate::schema::{PointLayer, APPLICATION_ID, GEOMETRY_COLUMN, METADATA_DDL, USER_VERSION};
use crate::GpkgError;

/// Une feature ponctuelle prête à être insérée
#[derive(Debug, Clone)]
pub struct PointFeature {
    /// Géométrie (x, y) dans le SRS de la couche
    pub point: Point<f64>,

    /// Valeurs attributaires, dans l'ordre des colonnes de la couche
    pub attributes: Vec<Value>,
}

/// Writer GeoPackage pour une couche de points unique
pub struct GeoPackageWriter {
    conn: Connection,
    layer: PointLayer,
    features_written: usize,
}

impl GeoPackageWriter {
    /// Crée le conteneur et amorce son schéma
    ///
    /// Le fichier ne doit pas contenir de GeoPackage existant : l'appelant
    /// supprime au préalable tout fichier à écraser.
    ///
    /// # Errors
    /// Retourne une erreur SQLite si le fichier ne peut pas être ouvert ou
    /// si le DDL échoue
    pub fn create(path: &Path, layer: PointLayer) -> Result<Self, GpkgError> {
        let mut conn = Connection::open(path)?;
        bootstrap(&mut conn, &layer)?;

        debug!(
            path = %path.display(),
            table = %layer.table_name,
            srs_id = layer.srs.srs_id,
            "GeoPackage schema created"
        );

        Ok(Self {
            conn,
            layer,
            features_written: 0,
        })
    }

    /// Nombre de features insérées jusqu'ici
    pub fn features_written(&self) -> usize {
        self.features_written
    }

    /// Insère un lot de features dans une seule transaction
    ///
    /// Retourne le nombre de features insérées par ce lot.
    pub fn write_points<I>(&mut self, features: I) -> Result<usize, GpkgError>
    where
        I: IntoIterator<Item = PointFeature>,
    {
        let sql = self.layer.insert_sql();
        let expected = self.layer.columns.len();
        let srs_id = self.layer.srs.srs_id;

        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(&sql)?;
            for feature in features {
                if feature.attributes.len() != expected {
                    return Err(GpkgError::AttributeCount {
                        table: self.layer.table_name.clone(),
                        expected,
                        got: feature.attributes.len(),
                    });
                }

                let blob = encode_point(feature.point, srs_id)?;
                let values = std::iter::once(Value::Blob(blob)).chain(feature.attributes);
                stmt.execute(params_from_iter(values))?;
                inserted += 1;
            }
        }
        tx.commit()?;

        self.features_written += inserted;
        Ok(inserted)
    }

    /// Ferme explicitement la connexion et retourne le total écrit
    pub fn finish(self) -> Result<usize, GpkgError> {
        let written = self.features_written;
        self.conn.close().map_err(|(_, e)| GpkgError::Sqlite(e))?;
        Ok(written)
    }
}

/// Pragmas + métadonnées + table utilisateur
fn bootstrap(conn: &mut Connection, layer: &PointLayer) -> Result<(), GpkgError> {
    conn.execute_batch(&format!(
        "PRAGMA application_id = {};\nPRAGMA user_version = {};",
        APPLICATION_ID, USER_VERSION
    ))?;

    let tx = conn.transaction()?;
    tx.execute_batch(METADATA_DDL)?;

    let srs = &layer.srs;
    tx.execute(
        "INSERT INTO gpkg_spatial_ref_sys
         (srs_name, srs_id, organization, organization_coordsys_id, definition, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            srs.srs_name,
            srs.srs_id,
            srs.organization,
            srs.organization_coordsys_id,
            srs.definition,
            srs.description
        ],
    )?;

    tx.execute_batch(&layer.create_table_sql())?;

    // Pas d'emprise calculée : min_x/min_y/max_x/max_y restent NULL
    tx.execute(
        "INSERT INTO gpkg_contents (table_name, data_type, identifier, srs_id)
         VALUES (?1, 'features', ?1, ?2)",
        params![layer.table_name, srs.srs_id],
    )?;
    tx.execute(
        "INSERT INTO gpkg_geometry_columns
         (table_name, column_name, geometry_type_name, srs_id, z, m)
         VALUES (?1, ?2, 'POINT', ?3, 0, 0)",
        params![layer.table_name, GEOMETRY_COLUMN, srs.srs_id],
    )?;

    tx.commit()?;
    Ok(())
}
