//! Rapport d'export
//!
//! Résume un export : format, filtre appliqué, lignes écrites, lignes
//! source rejetées, durée et empreinte de l'artefact.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::export::ExportFormat;
use crate::filter::ExportFilter;
use crate::source::RowError;

/// Statut global de l'export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportStatus {
    /// Export écrit, aucune ligne source rejetée
    Success,
    /// Export écrit, des lignes source ont été ignorées
    PartialSuccess,
    /// Export écrit sans aucune ligne de données
    Empty,
}

/// Rapport complet d'un export
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    #[serde(flatten)]
    pub format: ExportFormat,
    pub output: PathBuf,
    pub filter: ExportFilter,
    pub status: ExportStatus,
    pub duration_secs: f64,

    /// Enregistrements disponibles avant filtrage
    pub records_available: usize,
    /// Lignes de données écrites
    pub rows_written: usize,
    /// Lignes source ignorées au chargement
    pub source_errors: Vec<RowError>,

    /// Empreinte blake3 de l'artefact (hex)
    pub checksum: Option<String>,
    /// Taille de l'artefact en octets
    pub output_bytes: u64,
}

impl ExportReport {
    pub fn new(format: ExportFormat, output: &Path, filter: &ExportFilter) -> Self {
        Self {
            format,
            output: output.to_path_buf(),
            filter: filter.clone(),
            status: ExportStatus::Success,
            duration_secs: 0.0,
            records_available: 0,
            rows_written: 0,
            source_errors: Vec::new(),
            checksum: None,
            output_bytes: 0,
        }
    }

    /// Définit la durée de l'export
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.rows_written == 0 {
            ExportStatus::Empty
        } else if !self.source_errors.is_empty() {
            ExportStatus::PartialSuccess
        } else {
            ExportStatus::Success
        };
    }

    /// Calcule l'empreinte de l'artefact écrit
    pub fn compute_checksum(&mut self) -> Result<()> {
        let (checksum, bytes) = compute_file_checksum(&self.output)?;
        self.checksum = Some(checksum);
        self.output_bytes = bytes;
        Ok(())
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("EXPORT REPORT - {} ({})", self.filter.tenant_id, self.format);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!("Output: {} ({} bytes)", self.output.display(), self.output_bytes);
        if let Some(checksum) = &self.checksum {
            println!("Checksum (blake3): {}", checksum);
        }

        println!("\n--- FILTER ---");
        if self.filter.statuses.is_empty() {
            println!("Statuses: all");
        } else {
            let statuses: Vec<&str> = self.filter.statuses.iter().map(String::as_str).collect();
            println!("Statuses: {}", statuses.join(", "));
        }
        match (self.filter.start_date, self.filter.end_date) {
            (None, None) => println!("Dates: any"),
            (start, end) => println!(
                "Dates: {} .. {}",
                start.map(|d| d.to_string()).unwrap_or_else(|| "*".into()),
                end.map(|d| d.to_string()).unwrap_or_else(|| "*".into())
            ),
        }

        println!("\n--- SUMMARY ---");
        println!(
            "Rows: {} written out of {} records available",
            self.rows_written, self.records_available
        );

        if !self.source_errors.is_empty() {
            println!("\n--- SOURCE ERRORS ({}) ---", self.source_errors.len());
            for e in self.source_errors.iter().take(20) {
                if e.fields.is_empty() {
                    println!("  row {}: {}", e.row, e.message);
                } else {
                    println!("  row {}: {} [{}]", e.row, e.message, e.fields.join(", "));
                }
            }
            if self.source_errors.len() > 20 {
                println!("  ... and {} more", self.source_errors.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Cannot write report {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} [{}]: {} rows written, {} source errors",
            self.filter.tenant_id,
            self.format,
            self.rows_written,
            self.source_errors.len()
        )
    }
}

/// Empreinte blake3 et taille d'un artefact
pub fn compute_file_checksum(path: &Path) -> Result<(String, u64)> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut hasher = blake3::Hasher::new();
    let bytes = std::io::copy(&mut BufReader::new(file), &mut hasher)
        .with_context(|| format!("Cannot hash {}", path.display()))?;

    Ok((hasher.finalize().to_hex().to_string(), bytes))
}
