//! Types d'erreurs pour le crate gpkg

use thiserror::Error;

/// Erreurs pouvant survenir lors de l'écriture ou de la relecture d'un GeoPackage
#[derive(Debug, Error)]
pub enum GpkgError {
    /// Erreur SQLite (ouverture, DDL, insertion)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Erreur d'I/O sur le fichier conteneur
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Nom de table ou de colonne non utilisable tel quel en SQL
    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Blob géométrique illisible
    #[error("Invalid GeoPackage geometry blob: {reason}")]
    InvalidBlob { reason: String },

    /// Nombre de valeurs attributaires différent du nombre de colonnes
    #[error("Attribute count mismatch for {table}: expected {expected}, got {got}")]
    AttributeCount {
        table: String,
        expected: usize,
        got: usize,
    },

    /// Erreur d'encodage/décodage WKB
    #[error("WKB error: {0}")]
    Wkb(String),
}

impl GpkgError {
    /// Crée une erreur de blob invalide avec contexte
    pub fn invalid_blob(reason: impl Into<String>) -> Self {
        Self::InvalidBlob {
            reason: reason.into(),
        }
    }
}
