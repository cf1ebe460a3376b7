//! Export CSV (plat et interprété)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{Terminator, WriterBuilder};
use serde::Serialize;

use crate::error::ExportError;
use crate::record::{format_decimal, project_type_label, status_label, ProjectRecord};

/// En-tête du CSV plat (codes bruts)
pub const PLAIN_HEADER: [&str; 8] = [
    "id",
    "tenant_id",
    "status_code",
    "created_at",
    "project_type_code",
    "name",
    "latitude",
    "longitude",
];

/// En-tête du CSV interprété (libellés)
pub const INTERPRETED_HEADER: [&str; 8] = [
    "id",
    "tenant_id",
    "estado",
    "fecha_creacion",
    "tipo_proyecto",
    "nombre",
    "latitude",
    "longitude",
];

/// Variante de CSV produite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvFlavor {
    /// Codes écrits tels quels
    Plain,
    /// Codes remplacés par leur libellé (repli : code brut)
    Interpreted,
}

impl CsvFlavor {
    pub fn header(&self) -> &'static [&'static str; 8] {
        match self {
            CsvFlavor::Plain => &PLAIN_HEADER,
            CsvFlavor::Interpreted => &INTERPRETED_HEADER,
        }
    }

    /// Champs d'une ligne, dans l'ordre de l'en-tête
    pub fn row(&self, record: &ProjectRecord) -> [String; 8] {
        let (status, project_type) = match self {
            CsvFlavor::Plain => (
                record.status_code.as_str(),
                record.project_type_code.as_str(),
            ),
            CsvFlavor::Interpreted => (
                status_label(&record.status_code),
                project_type_label(&record.project_type_code),
            ),
        };

        [
            record.id.to_string(),
            record.tenant_id.clone(),
            status.to_string(),
            record.created_at.format("%Y-%m-%d").to_string(),
            project_type.to_string(),
            record.name.clone(),
            format_decimal(record.latitude),
            format_decimal(record.longitude),
        ]
    }
}

/// Écrit l'en-tête puis une ligne par enregistrement
pub fn write_csv<W: Write>(
    writer: W,
    records: &[&ProjectRecord],
    flavor: CsvFlavor,
) -> Result<(), ExportError> {
    let mut csv = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(writer);

    csv.write_record(flavor.header())?;
    for record in records {
        csv.write_record(&flavor.row(record))?;
    }
    csv.flush()?;

    Ok(())
}

/// Crée (ou tronque) le fichier et y écrit le CSV
pub fn export_csv(
    output_path: &Path,
    records: &[&ProjectRecord],
    flavor: CsvFlavor,
) -> Result<(), ExportError> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, records, flavor)?;
    writer.flush()?;
    Ok(())
}
