//! Configuration de l'outil d'export

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::export::DEFAULT_TABLE_NAME;

/// Configuration principale
///
/// Ordre de priorité : valeurs par défaut, fichier JSON, variables
/// d'environnement, puis options de ligne de commande.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Nom de la table de la couche GeoPackage
    pub table_name: String,

    /// Répertoire de base des sorties relatives
    pub output_dir: Option<PathBuf>,

    /// Encodage des fichiers source
    pub source_encoding: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            output_dir: None,
            source_encoding: "utf-8".to_string(),
        }
    }
}

impl ExportConfig {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Fichier optionnel puis surcharges d'environnement
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Applique OVI_EXPORT_TABLE, OVI_EXPORT_OUTPUT_DIR, OVI_EXPORT_ENCODING
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(table) = lookup("OVI_EXPORT_TABLE").filter(|v| !v.is_empty()) {
            self.table_name = table;
        }
        if let Some(dir) = lookup("OVI_EXPORT_OUTPUT_DIR").filter(|v| !v.is_empty()) {
            self.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(encoding) = lookup("OVI_EXPORT_ENCODING").filter(|v| !v.is_empty()) {
            self.source_encoding = encoding;
        }
        self
    }

    /// Résout un chemin de sortie relatif par rapport à `output_dir`
    pub fn output_path(&self, path: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}
