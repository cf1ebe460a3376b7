//! Moteur d'export multi-format avec isolation par tenant

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ExportError;
use crate::export::csv::{export_csv, CsvFlavor};
use crate::export::geopackage::{project_layer, write_geopackage};
use crate::export::ExportFormat;
use crate::filter::ExportFilter;
use crate::record::ProjectRecord;

/// Exporte des jeux de projets filtrés, toujours restreints à un tenant
///
/// L'exporter possède une copie privée des enregistrements reçus et ne la
/// modifie jamais : plusieurs exports successifs voient les mêmes données.
#[derive(Debug, Clone, Default)]
pub struct ProjectExporter {
    records: Vec<ProjectRecord>,
}

impl ProjectExporter {
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ProjectRecord>,
    {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Enregistrements détenus, dans l'ordre d'insertion
    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sélection commune aux trois exports
    ///
    /// # Errors
    /// [`ExportError::TenantSecurity`] si le tenant est vide
    pub fn select(&self, filter: &ExportFilter) -> Result<Vec<&ProjectRecord>, ExportError> {
        let selected = filter.apply(&self.records)?;
        debug!(
            tenant = %filter.tenant_id,
            statuses = ?filter.statuses,
            start = ?filter.start_date,
            end = ?filter.end_date,
            selected = selected.len(),
            total = self.records.len(),
            "Records filtered"
        );
        Ok(selected)
    }

    /// CSV avec codes bruts
    pub fn export_csv_plain(
        &self,
        output_path: impl AsRef<Path>,
        filter: &ExportFilter,
    ) -> Result<PathBuf, ExportError> {
        self.export_csv_flavor(output_path.as_ref(), filter, CsvFlavor::Plain)
    }

    /// CSV avec libellés d'état et de type
    pub fn export_csv_interpreted(
        &self,
        output_path: impl AsRef<Path>,
        filter: &ExportFilter,
    ) -> Result<PathBuf, ExportError> {
        self.export_csv_flavor(output_path.as_ref(), filter, CsvFlavor::Interpreted)
    }

    /// GeoPackage EPSG:4326 avec une couche de points `table_name`
    ///
    /// Écrase tout fichier existant à `output_path`.
    pub fn export_geopackage(
        &self,
        output_path: impl AsRef<Path>,
        filter: &ExportFilter,
        table_name: &str,
    ) -> Result<PathBuf, ExportError> {
        let output_path = output_path.as_ref();
        let rows = self.select(filter)?;
        let layer = project_layer(table_name)?;

        create_parent_dir(output_path)?;
        let written = write_geopackage(output_path, &rows, layer)?;

        info!(
            tenant = %filter.tenant_id,
            format = "gpkg",
            table = table_name,
            rows = written,
            path = %output_path.display(),
            "Export written"
        );

        Ok(output_path.to_path_buf())
    }

    /// Export dans le format demandé
    pub fn export(
        &self,
        format: &ExportFormat,
        output_path: impl AsRef<Path>,
        filter: &ExportFilter,
    ) -> Result<PathBuf, ExportError> {
        match format {
            ExportFormat::CsvPlain => self.export_csv_plain(output_path, filter),
            ExportFormat::CsvInterpreted => self.export_csv_interpreted(output_path, filter),
            ExportFormat::GeoPackage { table_name } => {
                self.export_geopackage(output_path, filter, table_name)
            }
        }
    }

    fn export_csv_flavor(
        &self,
        output_path: &Path,
        filter: &ExportFilter,
        flavor: CsvFlavor,
    ) -> Result<PathBuf, ExportError> {
        let rows = self.select(filter)?;

        create_parent_dir(output_path)?;
        export_csv(output_path, &rows, flavor)?;

        info!(
            tenant = %filter.tenant_id,
            format = ?flavor,
            rows = rows.len(),
            path = %output_path.display(),
            "Export written"
        );

        Ok(output_path.to_path_buf())
    }
}

fn create_parent_dir(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn exporter() -> ProjectExporter {
        ProjectExporter::new(vec![ProjectRecord {
            id: 1,
            tenant_id: "tenant-a".to_string(),
            status_code: "active".to_string(),
            created_at: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            project_type_code: "INFRA".to_string(),
            name: "Proyecto A".to_string(),
            latitude: 19.4326,
            longitude: -99.1332,
        }])
    }

    #[test]
    fn test_snapshot_is_owned() {
        let mut source = exporter().records().to_vec();
        let exporter = ProjectExporter::new(source.clone());
        source[0].tenant_id = "tenant-z".to_string();

        assert_eq!(exporter.len(), 1);
        assert_eq!(exporter.records()[0].tenant_id, "tenant-a");
    }

    #[test]
    fn test_tenant_checked_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("out.csv");

        let err = exporter()
            .export_csv_plain(&nested, &ExportFilter::for_tenant(""))
            .unwrap_err();
        assert!(err.is_tenant_security());
        assert!(!nested.parent().unwrap().exists());
    }

    #[test]
    fn test_invalid_table_name_leaves_filesystem_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("out.gpkg");

        let result =
            exporter().export_geopackage(&path, &ExportFilter::for_tenant("tenant-a"), "bad name");
        assert!(result.is_err());
        assert!(!path.parent().unwrap().exists());
    }

    #[test]
    fn test_export_dispatch_returns_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let returned = exporter()
            .export(
                &ExportFormat::CsvInterpreted,
                &path,
                &ExportFilter::for_tenant("tenant-a"),
            )
            .unwrap();
        assert_eq!(returned, path);
        assert!(std::fs::read_to_string(&path).unwrap().contains("Activo"));
    }

    #[test]
    fn test_exporter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProjectExporter>();
    }
}
