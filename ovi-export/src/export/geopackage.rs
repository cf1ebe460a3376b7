//! Export GeoPackage d'une couche de projets

use std::path::Path;

use geo::Point;
use gpkg::{AttributeColumn, ColumnType, GeoPackageWriter, PointFeature, PointLayer, Value};
use tracing::debug;

use crate::error::ExportError;
use crate::record::ProjectRecord;

/// Nom de table par défaut de la couche exportée
pub const DEFAULT_TABLE_NAME: &str = "project_exports";

/// Colonnes attributaires (la géométrie et `fid` sont implicites)
pub fn project_layer(table_name: &str) -> Result<PointLayer, ExportError> {
    let layer = PointLayer::new(
        table_name,
        vec![
            AttributeColumn::new("id", ColumnType::Integer),
            AttributeColumn::new("tenant_id", ColumnType::Text),
            AttributeColumn::new("status_code", ColumnType::Text),
            AttributeColumn::new("created_at", ColumnType::Text),
            AttributeColumn::new("project_type_code", ColumnType::Text),
            AttributeColumn::new("name", ColumnType::Text),
        ],
    )?;
    Ok(layer)
}

/// Feature d'un projet : point (longitude, latitude) + attributs
pub fn project_feature(record: &ProjectRecord) -> PointFeature {
    PointFeature {
        point: Point::new(record.longitude, record.latitude),
        attributes: vec![
            Value::Integer(record.id),
            Value::Text(record.tenant_id.clone()),
            Value::Text(record.status_code.clone()),
            Value::Text(record.created_at.format("%Y-%m-%d").to_string()),
            Value::Text(record.project_type_code.clone()),
            Value::Text(record.name.clone()),
        ],
    }
}

/// Écrit un GeoPackage neuf à `output_path`
///
/// Un fichier existant est supprimé avant l'écriture. En cas d'erreur la
/// connexion est fermée (drop du writer) mais le fichier partiel reste.
pub fn write_geopackage(
    output_path: &Path,
    records: &[&ProjectRecord],
    layer: PointLayer,
) -> Result<usize, ExportError> {
    if output_path.exists() {
        debug!(path = %output_path.display(), "Removing previous GeoPackage");
        std::fs::remove_file(output_path)?;
    }

    let mut writer = GeoPackageWriter::create(output_path, layer)?;
    writer.write_points(records.iter().map(|r| project_feature(r)))?;
    let written = writer.finish()?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_project_feature_axis_order() {
        let record = ProjectRecord {
            id: 1,
            tenant_id: "tenant-a".to_string(),
            status_code: "active".to_string(),
            created_at: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            project_type_code: "INFRA".to_string(),
            name: "Proyecto A".to_string(),
            latitude: 19.4326,
            longitude: -99.1332,
        };

        let feature = project_feature(&record);
        assert_eq!(feature.point.x(), -99.1332);
        assert_eq!(feature.point.y(), 19.4326);
        assert_eq!(feature.attributes.len(), 6);
        assert_eq!(feature.attributes[0], Value::Integer(1));
        assert_eq!(feature.attributes[3], Value::Text("2025-01-10".to_string()));
    }

    #[test]
    fn test_project_layer_columns() {
        let layer = project_layer(DEFAULT_TABLE_NAME).unwrap();
        let names: Vec<&str> = layer.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "id",
                "tenant_id",
                "status_code",
                "created_at",
                "project_type_code",
                "name"
            ]
        );
    }

    #[test]
    fn test_invalid_table_name() {
        let err = project_layer("project exports").unwrap_err();
        assert!(matches!(
            err,
            ExportError::GeoPackage(gpkg::GpkgError::InvalidIdentifier(_))
        ));
    }
}
