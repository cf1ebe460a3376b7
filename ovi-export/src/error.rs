//! Types d'erreurs de l'export et du chargement des enregistrements

use thiserror::Error;

/// Erreurs d'une opération d'export
#[derive(Debug, Error)]
pub enum ExportError {
    /// Le tenant est obligatoire : levée avant toute écriture
    #[error("tenant security violation: tenant_id is required for every export")]
    TenantSecurity,

    /// Erreur système de fichiers, propagée telle quelle
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Erreur du writer CSV hors système de fichiers (sérialisation)
    #[error("CSV error: {0}")]
    Csv(String),

    /// Erreur de construction du GeoPackage
    #[error("GeoPackage error: {0}")]
    GeoPackage(#[from] gpkg::GpkgError),
}

impl ExportError {
    /// Vrai pour l'erreur de précondition tenant
    pub fn is_tenant_security(&self) -> bool {
        matches!(self, ExportError::TenantSecurity)
    }
}

/// Une erreur d'écriture du writer CSV redevient [`ExportError::Io`]
impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => ExportError::Io(io),
            _ => ExportError::Csv(message),
        }
    }
}

/// Erreurs critiques du chargement d'un fichier source
///
/// Les erreurs ligne par ligne ne passent pas par ce type : elles sont
/// collectées dans [`crate::source::RowError`] et la ligne est ignorée.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Colonnes obligatoires absentes de l'en-tête
    #[error("Missing required columns in header: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    /// Même identifiant deux fois pour un tenant
    #[error("Duplicate project id {id} for tenant {tenant_id} at row {row}")]
    DuplicateId {
        row: usize,
        tenant_id: String,
        id: i64,
    },

    /// Label d'encodage inconnu d'encoding_rs
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),
}
