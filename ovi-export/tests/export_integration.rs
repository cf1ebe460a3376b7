//! Tests d'intégration de l'exporter sur le jeu de référence à trois projets

use std::path::Path;

use chrono::NaiveDate;
use ovi_export::{ExportFilter, ProjectExporter, ProjectRecord};
use rusqlite::Connection;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_records() -> Vec<ProjectRecord> {
    vec![
        ProjectRecord {
            id: 1,
            tenant_id: "tenant-a".to_string(),
            status_code: "active".to_string(),
            created_at: date(2025, 1, 10),
            project_type_code: "INFRA".to_string(),
            name: "Proyecto A".to_string(),
            latitude: 19.4326,
            longitude: -99.1332,
        },
        ProjectRecord {
            id: 2,
            tenant_id: "tenant-a".to_string(),
            status_code: "closed".to_string(),
            created_at: date(2025, 1, 15),
            project_type_code: "SOC".to_string(),
            name: "Proyecto B".to_string(),
            latitude: 20.0,
            longitude: -100.0,
        },
        ProjectRecord {
            id: 3,
            tenant_id: "tenant-b".to_string(),
            status_code: "active".to_string(),
            created_at: date(2025, 1, 20),
            project_type_code: "ENV".to_string(),
            name: "Proyecto C".to_string(),
            latitude: 21.0,
            longitude: -101.0,
        },
    ]
}

fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |r| r.get(0)).unwrap()
}

#[test]
fn test_plain_csv_applies_filters_and_tenant() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = ProjectExporter::new(sample_records());

    let output = exporter
        .export_csv_plain(
            dir.path().join("plano.csv"),
            &ExportFilter::for_tenant("tenant-a")
                .with_statuses(["active"])
                .from_date(date(2025, 1, 1))
                .until(date(2025, 1, 12)),
        )
        .unwrap();

    let rows = read_csv(&output);
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0],
        vec![
            "id",
            "tenant_id",
            "status_code",
            "created_at",
            "project_type_code",
            "name",
            "latitude",
            "longitude"
        ]
    );
    assert_eq!(
        rows[1],
        vec![
            "1",
            "tenant-a",
            "active",
            "2025-01-10",
            "INFRA",
            "Proyecto A",
            "19.4326",
            "-99.1332"
        ]
    );
}

#[test]
fn test_plain_csv_without_start_date() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = ProjectExporter::new(sample_records());

    let output = exporter
        .export_csv_plain(
            dir.path().join("plano.csv"),
            &ExportFilter::for_tenant("tenant-a")
                .with_statuses(["active"])
                .until(date(2025, 1, 12)),
        )
        .unwrap();

    let rows = read_csv(&output);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "1");
}

#[test]
fn test_interpreted_csv_translates_catalogs() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = ProjectExporter::new(sample_records());

    let output = exporter
        .export_csv_interpreted(
            dir.path().join("interpretado.csv"),
            &ExportFilter::for_tenant("tenant-a").with_statuses(["closed"]),
        )
        .unwrap();

    let rows = read_csv(&output);
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0],
        vec![
            "id",
            "tenant_id",
            "estado",
            "fecha_creacion",
            "tipo_proyecto",
            "nombre",
            "latitude",
            "longitude"
        ]
    );
    assert_eq!(rows[1][0], "2");
    assert_eq!(rows[1][2], "Cerrado");
    assert_eq!(rows[1][4], "Social");
    assert_eq!(rows[1][6], "20.0");
}

#[test]
fn test_tenant_is_mandatory_for_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = ProjectExporter::new(sample_records());
    let filter = ExportFilter::for_tenant("");

    let csv_path = dir.path().join("x").join("x.csv");
    let gpkg_path = dir.path().join("y").join("y.gpkg");

    assert!(exporter
        .export_csv_plain(&csv_path, &filter)
        .unwrap_err()
        .is_tenant_security());
    assert!(exporter
        .export_csv_interpreted(&csv_path, &filter)
        .unwrap_err()
        .is_tenant_security());
    assert!(exporter
        .export_geopackage(&gpkg_path, &filter, "project_exports")
        .unwrap_err()
        .is_tenant_security());

    assert!(!csv_path.parent().unwrap().exists());
    assert!(!gpkg_path.parent().unwrap().exists());
}

#[test]
fn test_unknown_tenant_gives_header_only_csv() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = ProjectExporter::new(sample_records());

    let output = exporter
        .export_csv_plain(
            dir.path().join("vacio.csv"),
            &ExportFilter::for_tenant("tenant-z"),
        )
        .unwrap();

    assert_eq!(read_csv(&output).len(), 1);
}

#[test]
fn test_parent_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = ProjectExporter::new(sample_records());
    let nested = dir.path().join("a").join("b").join("c.csv");

    exporter
        .export_csv_plain(&nested, &ExportFilter::for_tenant("tenant-b"))
        .unwrap();
    // Deuxième export : répertoires déjà présents
    exporter
        .export_csv_plain(&nested, &ExportFilter::for_tenant("tenant-b"))
        .unwrap();

    let rows = read_csv(&nested);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "3");
}

#[test]
fn test_geopackage_includes_attributes_and_geometry() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = ProjectExporter::new(sample_records());

    let gpkg = exporter
        .export_geopackage(
            dir.path().join("projects.gpkg"),
            &ExportFilter::for_tenant("tenant-a")
                .with_statuses(["active", "closed"])
                .until(date(2025, 1, 15)),
            "project_exports",
        )
        .unwrap();

    let conn = Connection::open(&gpkg).unwrap();
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM project_exports"), 2);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM gpkg_contents"), 1);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM gpkg_geometry_columns"), 1);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM gpkg_spatial_ref_sys"), 1);
    assert_eq!(count(&conn, "PRAGMA application_id"), 1_196_437_808);

    let (data_type, identifier, srs_id, extent_nulls): (String, String, i64, i64) = conn
        .query_row(
            "SELECT data_type, identifier, srs_id,
                    (min_x IS NULL) + (min_y IS NULL) + (max_x IS NULL) + (max_y IS NULL)
             FROM gpkg_contents",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(data_type, "features");
    assert_eq!(identifier, "project_exports");
    assert_eq!(srs_id, 4326);
    assert_eq!(extent_nulls, 4);

    let (column, geometry_type, z, m): (String, String, i64, i64) = conn
        .query_row(
            "SELECT column_name, geometry_type_name, z, m FROM gpkg_geometry_columns",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(column, "geom");
    assert_eq!(geometry_type, "POINT");
    assert_eq!((z, m), (0, 0));

    let mut stmt = conn
        .prepare("SELECT geom, id, created_at, status_code FROM project_exports ORDER BY fid")
        .unwrap();
    let rows: Vec<(Vec<u8>, i64, String, String)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(rows.len(), 2);
    for (geom, _, _, _) in &rows {
        assert_eq!(geom.len(), 29);
        assert_eq!(&geom[..2], b"GP");
    }
    assert_eq!(rows[0].1, 1);
    assert_eq!(rows[0].2, "2025-01-10");
    assert_eq!(rows[1].1, 2);
    assert_eq!(rows[1].3, "closed");

    // X = longitude, Y = latitude
    let first = gpkg::decode_point(&rows[0].0).unwrap();
    assert_eq!(first.point.x(), -99.1332);
    assert_eq!(first.point.y(), 19.4326);
}

#[test]
fn test_geopackage_export_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = ProjectExporter::new(sample_records());
    let path = dir.path().join("projects.gpkg");

    exporter
        .export_geopackage(&path, &ExportFilter::for_tenant("tenant-a"), "project_exports")
        .unwrap();
    exporter
        .export_geopackage(&path, &ExportFilter::for_tenant("tenant-b"), "project_exports")
        .unwrap();

    let conn = Connection::open(&path).unwrap();
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM project_exports"), 1);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM gpkg_spatial_ref_sys"), 1);
    let tenant: String = conn
        .query_row("SELECT tenant_id FROM project_exports", [], |r| r.get(0))
        .unwrap();
    assert_eq!(tenant, "tenant-b");
}

#[test]
fn test_geopackage_empty_selection_keeps_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = ProjectExporter::new(sample_records());

    let path = exporter
        .export_geopackage(
            dir.path().join("vacio.gpkg"),
            &ExportFilter::for_tenant("tenant-a").with_statuses(["paused"]),
            "capa_vacia",
        )
        .unwrap();

    let summary = gpkg::GeoPackageSummary::open(&path).unwrap();
    let layer = summary.layer("capa_vacia").unwrap();
    assert_eq!(layer.feature_count, 0);
    assert_eq!(layer.identifier.as_deref(), Some("capa_vacia"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_disk_full_surfaces_as_io_error() {
    let records: Vec<ProjectRecord> = (0..2000)
        .map(|i| ProjectRecord {
            id: i,
            ..sample_records()[0].clone()
        })
        .collect();
    let exporter = ProjectExporter::new(records);
    let filter = ExportFilter::for_tenant("tenant-a");

    // Petit export (échec au flush) et gros export (échec en cours d'écriture)
    for take in [1usize, 2000] {
        let exporter = ProjectExporter::new(exporter.records()[..take].to_vec());
        let err = exporter.export_csv_plain("/dev/full", &filter).unwrap_err();
        assert!(
            matches!(err, ovi_export::ExportError::Io(_)),
            "{} rows: {:?}",
            take,
            err
        );
    }
}
