//! Définition et implémentation des commandes CLI
//!
//! - `csv`: CSV plat ou interprété (`--interpreted`)
//! - `gpkg`: GeoPackage EPSG:4326
//! - `inspect`: résumé d'un GeoPackage existant
//! - `template`: fichier source modèle

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use tracing::{info, warn};

use crate::config::ExportConfig;
use crate::export::ExportFormat;
use crate::exporter::ProjectExporter;
use crate::filter::ExportFilter;
use crate::report::ExportReport;
use crate::source::{load_records, resolve_encoding, write_template};

#[derive(Subcommand)]
pub enum Commands {
    /// Export project records to CSV
    Csv {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Replace status and project type codes with their labels
        #[arg(long)]
        interpreted: bool,
    },

    /// Export project records to a GeoPackage point layer (EPSG:4326)
    Gpkg {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Feature table name (défaut : config / project_exports)
        #[arg(long)]
        table: Option<String>,
    },

    /// Summarize an existing GeoPackage
    Inspect {
        /// Path to the .gpkg file
        #[arg(short, long)]
        path: PathBuf,

        /// Also print decoded point coordinates (first 20 per layer)
        #[arg(long)]
        points: bool,
    },

    /// Write a source CSV template (header + one sample row)
    Template {
        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Entrée/sortie d'un export
#[derive(Args)]
pub struct IoArgs {
    /// Source CSV with project records
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (relative paths resolved against the configured output dir)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Source encoding label (utf-8, latin1, windows-1252...)
    #[arg(long)]
    pub encoding: Option<String>,

    /// Write a JSON export report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Critères de filtre communs aux exports
#[derive(Args)]
pub struct FilterArgs {
    /// Tenant to export (required, exactly one)
    #[arg(short, long)]
    pub tenant: String,

    /// Status codes to keep (repeatable or comma separated)
    #[arg(long = "status", value_delimiter = ',')]
    pub statuses: Vec<String>,

    /// Inclusive start date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Inclusive end date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> ExportFilter {
        ExportFilter {
            tenant_id: self.tenant.clone(),
            statuses: self.statuses.iter().cloned().collect(),
            start_date: self.from,
            end_date: self.to,
        }
    }
}

/// Exécute une commande
pub fn run(command: Commands, config: &ExportConfig) -> Result<()> {
    match command {
        Commands::Csv {
            io,
            filter,
            interpreted,
        } => {
            let format = if interpreted {
                ExportFormat::CsvInterpreted
            } else {
                ExportFormat::CsvPlain
            };
            cmd_export(format, &io, &filter, config)?;
        }
        Commands::Gpkg { io, filter, table } => {
            let table_name = table.unwrap_or_else(|| config.table_name.clone());
            cmd_export(ExportFormat::GeoPackage { table_name }, &io, &filter, config)?;
        }
        Commands::Inspect { path, points } => cmd_inspect(&path, points)?,
        Commands::Template { output } => {
            let output = config.output_path(&output);
            write_template(&output)
                .with_context(|| format!("Cannot write template {}", output.display()))?;
            info!(path = %output.display(), "Template written");
        }
    }
    Ok(())
}

/// Charge la source, exporte et produit le rapport
pub fn cmd_export(
    format: ExportFormat,
    io: &IoArgs,
    filter_args: &FilterArgs,
    config: &ExportConfig,
) -> Result<ExportReport> {
    let start = Instant::now();
    let filter = filter_args.to_filter();
    // Précondition tenant vérifiée avant même de lire la source
    filter.ensure_tenant()?;

    let encoding_label = io.encoding.as_deref().unwrap_or(&config.source_encoding);
    let encoding = resolve_encoding(encoding_label)?;
    let loaded = load_records(&io.input, encoding)
        .with_context(|| format!("Cannot load records from {}", io.input.display()))?;
    if !loaded.errors.is_empty() {
        warn!(
            rejected = loaded.errors.len(),
            "Some source rows were skipped"
        );
    }

    let output = config.output_path(&io.output);
    let mut report = ExportReport::new(format.clone(), &output, &filter);
    report.source_errors = loaded.errors;

    let exporter = ProjectExporter::new(loaded.records);
    report.records_available = exporter.len();
    report.rows_written = exporter.select(&filter)?.len();

    info!(
        format = %format,
        tenant = %filter.tenant_id,
        output = %output.display(),
        "Starting export"
    );
    exporter
        .export(&format, &output, &filter)
        .with_context(|| format!("Export to {} failed", output.display()))?;

    report.compute_checksum()?;
    report.set_duration(start.elapsed());
    report.finalize();
    report.display();

    if let Some(path) = &io.report {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Report saved");
    }

    info!("{}", report.summary());
    Ok(report)
}

/// Affiche le contenu d'un GeoPackage
pub fn cmd_inspect(path: &Path, points: bool) -> Result<()> {
    let summary = gpkg::GeoPackageSummary::open(path)
        .with_context(|| format!("Cannot open GeoPackage {}", path.display()))?;

    if !summary.is_geopackage() {
        warn!(
            application_id = summary.application_id,
            "File does not declare the GeoPackage application id"
        );
    }

    println!("GeoPackage: {}", path.display());
    println!(
        "application_id={} user_version={} srs={:?}",
        summary.application_id, summary.user_version, summary.srs_ids
    );

    for layer in &summary.layers {
        println!(
            "  {} ({}) srs={:?} geometry={}:{} features={}",
            layer.table_name,
            layer.data_type,
            layer.srs_id,
            layer.geometry_column.as_deref().unwrap_or("-"),
            layer.geometry_type.as_deref().unwrap_or("-"),
            layer.feature_count
        );

        if points && layer.geometry_type.as_deref() == Some("POINT") {
            let decoded = gpkg::read_points(path, &layer.table_name)?;
            for p in decoded.iter().take(20) {
                println!("    POINT ({} {})", p.point.x(), p.point.y());
            }
            if decoded.len() > 20 {
                println!("    ... and {} more", decoded.len() - 20);
            }
        }
    }

    Ok(())
}

/// Parse une date YYYY-MM-DD
fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        format!(
            "Invalid date format: '{}'. Expected YYYY-MM-DD (e.g., 2025-01-31)",
            value
        )
    })
}
