//! Chargement des enregistrements depuis un CSV, avec validation par ligne
//!
//! Les lignes invalides sont écartées et rapportées ; seules les erreurs
//! structurelles (en-tête incomplet, identifiant dupliqué) arrêtent le
//! chargement.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use encoding_rs::Encoding;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::export::csv::PLAIN_HEADER;
use crate::record::{is_known_project_type, is_known_status, ProjectRecord};

/// Colonnes attendues dans le fichier source (même schéma que le CSV plat)
pub const REQUIRED_COLUMNS: [&str; 8] = PLAIN_HEADER;

/// Erreur non fatale : la ligne est ignorée
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// Numéro de ligne, l'en-tête étant la ligne 1
    pub row: usize,
    pub message: String,
    /// Champs concernés (vide si la ligne entière est en cause)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl RowError {
    fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }
}

/// Résultat d'un chargement
#[derive(Debug, Default)]
pub struct LoadResult {
    pub records: Vec<ProjectRecord>,
    pub errors: Vec<RowError>,
}

/// Résout un label d'encodage (`utf-8`, `latin1`, `windows-1252`...)
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, SourceError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| SourceError::UnknownEncoding(label.to_string()))
}

/// Charge un fichier CSV d'enregistrements
pub fn load_records(path: &Path, encoding: &'static Encoding) -> Result<LoadResult, SourceError> {
    let bytes = std::fs::read(path)?;
    let result = parse_records(&bytes, encoding)?;

    info!(
        path = %path.display(),
        encoding = encoding.name(),
        loaded = result.records.len(),
        rejected = result.errors.len(),
        "Source records loaded"
    );

    Ok(result)
}

/// Décode puis valide un contenu CSV
pub fn parse_records(bytes: &[u8], encoding: &'static Encoding) -> Result<LoadResult, SourceError> {
    // decode() gère aussi le BOM éventuel
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(
            encoding = used.name(),
            "Malformed byte sequences replaced while decoding source"
        );
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut result = LoadResult::default();
    let mut seen: HashSet<(String, i64)> = HashSet::new();

    for (i, row) in reader.records().enumerate() {
        let row_number = i + 2;
        let row = row?;

        let (tenant_id, id) = match columns.parse_key(&row, row_number) {
            Ok(key) => key,
            Err(error) => {
                skip_row(&mut result.errors, error);
                continue;
            }
        };

        // Vérifié avant dates et coordonnées : une clé répétée est critique
        // même si l'une des deux lignes est invalide
        if !seen.insert((tenant_id.to_string(), id)) {
            return Err(SourceError::DuplicateId {
                row: row_number,
                tenant_id: tenant_id.to_string(),
                id,
            });
        }

        let record = match columns.parse_row(&row, row_number, id) {
            Ok(record) => record,
            Err(error) => {
                skip_row(&mut result.errors, error);
                continue;
            }
        };

        if !is_known_status(&record.status_code) {
            debug!(row = row_number, code = %record.status_code, "Unknown status code");
        }
        if !is_known_project_type(&record.project_type_code) {
            debug!(row = row_number, code = %record.project_type_code, "Unknown project type code");
        }

        result.records.push(record);
    }

    Ok(result)
}

fn skip_row(errors: &mut Vec<RowError>, error: RowError) {
    warn!(row = error.row, error = %error.message, "Source row skipped");
    errors.push(error);
}

/// Écrit un fichier modèle : en-tête + une ligne d'exemple
pub fn write_template(path: &Path) -> Result<(), SourceError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_path(path)?;
    writer.write_record(REQUIRED_COLUMNS)?;
    writer.write_record([
        "1",
        "tenant-demo",
        "draft",
        "2025-01-01",
        "INFRA",
        "Punto de referencia",
        "-12.0464",
        "-77.0428",
    ])?;
    writer.flush()?;
    Ok(())
}

/// Position de chaque colonne obligatoire dans l'en-tête
struct ColumnIndex([usize; 8]);

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, SourceError> {
        let mut positions = [0usize; 8];
        let mut missing = Vec::new();

        for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
            match headers.iter().position(|h| h == *name) {
                Some(pos) => positions[slot] = pos,
                None => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(SourceError::MissingHeaders(missing));
        }
        Ok(Self(positions))
    }

    fn field<'r>(&self, row: &'r StringRecord, slot: usize) -> &'r str {
        row.get(self.0[slot]).unwrap_or("")
    }

    /// Champs obligatoires présents et clé `(tenant_id, id)` lisible
    fn parse_key<'r>(
        &self,
        row: &'r StringRecord,
        row_number: usize,
    ) -> Result<(&'r str, i64), RowError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .enumerate()
            .filter(|(slot, _)| self.field(row, *slot).is_empty())
            .map(|(_, name)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(
                RowError::new(row_number, "missing required fields").with_fields(missing)
            );
        }

        let id: i64 = self.field(row, 0).parse().map_err(|_| {
            RowError::new(row_number, "id must be an integer").with_fields(vec!["id".into()])
        })?;

        Ok((self.field(row, 1), id))
    }

    fn parse_row(
        &self,
        row: &StringRecord,
        row_number: usize,
        id: i64,
    ) -> Result<ProjectRecord, RowError> {
        let created_at = NaiveDate::parse_from_str(self.field(row, 3), "%Y-%m-%d").map_err(|_| {
            RowError::new(row_number, "created_at must be a YYYY-MM-DD date")
                .with_fields(vec!["created_at".into()])
        })?;

        let (latitude, longitude) =
            validate_wgs84(self.field(row, 6), self.field(row, 7)).map_err(|message| {
                RowError::new(row_number, message)
                    .with_fields(vec!["latitude".into(), "longitude".into()])
            })?;

        Ok(ProjectRecord {
            id,
            tenant_id: self.field(row, 1).to_string(),
            status_code: self.field(row, 2).to_string(),
            created_at,
            project_type_code: self.field(row, 4).to_string(),
            name: self.field(row, 5).to_string(),
            latitude,
            longitude,
        })
    }
}

/// Coordonnées numériques et dans les bornes WGS 84
fn validate_wgs84(latitude: &str, longitude: &str) -> Result<(f64, f64), &'static str> {
    let (lat, lon) = match (latitude.parse::<f64>(), longitude.parse::<f64>()) {
        (Ok(lat), Ok(lon)) => (lat, lon),
        _ => return Err("latitude/longitude must be numeric"),
    };

    if !(-90.0..=90.0).contains(&lat) {
        return Err("latitude out of WGS84 range (-90 to 90)");
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err("longitude out of WGS84 range (-180 to 180)");
    }
    Ok((lat, lon))
}
