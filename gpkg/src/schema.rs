//! Schéma GeoPackage : tables de métadonnées et définition des couches

use std::sync::OnceLock;

use regex::Regex;

use crate::GpkgError;

/// `PRAGMA application_id` d'un GeoPackage ("GPKG" en ASCII)
pub const APPLICATION_ID: i32 = 1_196_437_808;

/// `PRAGMA user_version` pour GeoPackage 1.3.0
pub const USER_VERSION: i32 = 10_300;

/// Tables de métadonnées obligatoires
pub const METADATA_DDL: &str = r#"
CREATE TABLE gpkg_spatial_ref_sys (
    srs_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL PRIMARY KEY,
    organization TEXT NOT NULL,
    organization_coordsys_id INTEGER NOT NULL,
    definition TEXT NOT NULL,
    description TEXT
);

CREATE TABLE gpkg_contents (
    table_name TEXT NOT NULL PRIMARY KEY,
    data_type TEXT NOT NULL,
    identifier TEXT UNIQUE,
    description TEXT DEFAULT '',
    last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
    min_x DOUBLE,
    min_y DOUBLE,
    max_x DOUBLE,
    max_y DOUBLE,
    srs_id INTEGER,
    FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);

CREATE TABLE gpkg_geometry_columns (
    table_name TEXT NOT NULL,
    column_name TEXT NOT NULL,
    geometry_type_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL,
    z TINYINT NOT NULL,
    m TINYINT NOT NULL,
    PRIMARY KEY (table_name, column_name),
    FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
    FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);
"#;

/// Entrée de `gpkg_spatial_ref_sys`
#[derive(Debug, Clone, Copy)]
pub struct SpatialRefSys {
    pub srs_name: &'static str,
    pub srs_id: u32,
    pub organization: &'static str,
    pub organization_coordsys_id: u32,
    pub definition: &'static str,
    pub description: &'static str,
}

/// WGS 84 géodésique (EPSG:4326), seul SRS enregistré par les exports
pub const WGS84: SpatialRefSys = SpatialRefSys {
    srs_name: "WGS 84 geodetic",
    srs_id: 4326,
    organization: "EPSG",
    organization_coordsys_id: 4326,
    definition: "GEOGCS[\"WGS 84\",DATUM[\"World Geodetic System 1984\",SPHEROID[\"WGS 84\",6378137,298.257223563]],PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433]]",
    description: "",
};

/// Nom de la colonne géométrique des couches écrites
pub const GEOMETRY_COLUMN: &str = "geom";

/// Type SQL d'une colonne attributaire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// Colonne attributaire d'une couche
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeColumn {
    pub name: String,
    pub column_type: ColumnType,
}

impl AttributeColumn {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Couche de points : une table utilisateur + ses métadonnées
#[derive(Debug, Clone)]
pub struct PointLayer {
    /// Nom de la table (aussi utilisé comme identifier dans gpkg_contents)
    pub table_name: String,

    /// Colonnes attributaires, dans l'ordre d'insertion
    pub columns: Vec<AttributeColumn>,

    /// SRS des géométries
    pub srs: SpatialRefSys,
}

impl PointLayer {
    /// Crée une couche WGS 84 après validation des identifiants SQL
    pub fn new(
        table_name: impl Into<String>,
        columns: Vec<AttributeColumn>,
    ) -> Result<Self, GpkgError> {
        let table_name = table_name.into();
        validate_identifier(&table_name)?;
        for column in &columns {
            validate_identifier(&column.name)?;
            if column.name == GEOMETRY_COLUMN || column.name == "fid" {
                return Err(GpkgError::InvalidIdentifier(column.name.clone()));
            }
        }

        Ok(Self {
            table_name,
            columns,
            srs: WGS84,
        })
    }

    /// DDL de la table utilisateur
    pub fn create_table_sql(&self) -> String {
        let mut sql = format!(
            "CREATE TABLE \"{}\" (\n    fid INTEGER PRIMARY KEY AUTOINCREMENT,\n    {} BLOB NOT NULL",
            self.table_name, GEOMETRY_COLUMN
        );
        for column in &self.columns {
            sql.push_str(&format!(
                ",\n    {} {} NOT NULL",
                column.name,
                column.column_type.sql()
            ));
        }
        sql.push_str("\n)");
        sql
    }

    /// Requête d'insertion d'une feature (géométrie puis attributs)
    pub fn insert_sql(&self) -> String {
        let names: Vec<&str> = std::iter::once(GEOMETRY_COLUMN)
            .chain(self.columns.iter().map(|c| c.name.as_str()))
            .collect();
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();

        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.table_name,
            names.join(", "),
            placeholders.join(", ")
        )
    }
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"))
}

/// Vérifie qu'un nom peut être interpolé dans du DDL sans échappement
pub fn validate_identifier(name: &str) -> Result<(), GpkgError> {
    let lower = name.to_ascii_lowercase();
    if !identifier_regex().is_match(name) || lower.starts_with("gpkg_") || lower.starts_with("sqlite_")
    {
        return Err(GpkgError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("project_exports").is_ok());
        assert!(validate_identifier("_layer2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2layer").is_err());
        assert!(validate_identifier("x; DROP TABLE y").is_err());
        assert!(validate_identifier("gpkg_contents").is_err());
        assert!(validate_identifier("sqlite_master").is_err());
    }

    #[test]
    fn test_layer_rejects_reserved_columns() {
        let result = PointLayer::new(
            "layer",
            vec![AttributeColumn::new("geom", ColumnType::Text)],
        );
        assert!(matches!(result, Err(GpkgError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_create_table_sql() {
        let layer = PointLayer::new(
            "layer",
            vec![
                AttributeColumn::new("id", ColumnType::Integer),
                AttributeColumn::new("name", ColumnType::Text),
            ],
        )
        .unwrap();

        let sql = layer.create_table_sql();
        assert!(sql.starts_with("CREATE TABLE \"layer\""));
        assert!(sql.contains("fid INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("geom BLOB NOT NULL"));
        assert!(sql.contains("id INTEGER NOT NULL"));
        assert!(sql.contains("name TEXT NOT NULL"));
    }

    #[test]
    fn test_insert_sql() {
        let layer = PointLayer::new(
            "layer",
            vec![AttributeColumn::new("name", ColumnType::Text)],
        )
        .unwrap();
        assert_eq!(
            layer.insert_sql(),
            "INSERT INTO \"layer\" (geom, name) VALUES (?1, ?2)"
        );
    }
}
