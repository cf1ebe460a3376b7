//! Encodage binaire des géométries GeoPackage
//!
//! Un blob GeoPackage = en-tête `GP` (8 octets sans enveloppe) + WKB ISO.
//! Seul le point 2D est écrit ici :
//!
//! ```text
//! 0..2   "GP"
//! 2      version (0x00)
//! 3      flags   (0x01 : little-endian, pas d'enveloppe, binaire standard)
//! 4..8   srs_id  (u32 LE)
//! 8      byte order WKB (0x01)
//! 9..13  type WKB (u32 LE, 1 = Point)
//! 13..21 X (f64 LE)
//! 21..29 Y (f64 LE)
//! ```

use geo::{Geometry, Point};
use geozero::wkb::Wkb;
use geozero::ToGeo;
use wkb::geom_to_wkb;

use crate::GpkgError;

/// Magic de l'en-tête binaire GeoPackage
pub const MAGIC: &[u8; 2] = b"GP";

/// Version du format binaire (0 = version 1)
pub const VERSION: u8 = 0x00;

/// Flags : little-endian, pas d'enveloppe, géométrie non vide, binaire standard
pub const FLAGS_LE_NO_ENVELOPE: u8 = 0x01;

/// Taille de l'en-tête sans enveloppe
pub const HEADER_LEN: usize = 8;

/// Taille d'un point WKB 2D
pub const WKB_POINT_LEN: usize = 21;

/// Taille totale d'un blob point
pub const POINT_BLOB_LEN: usize = HEADER_LEN + WKB_POINT_LEN;

/// Point relu depuis un blob GeoPackage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedPoint {
    /// SRS déclaré dans l'en-tête
    pub srs_id: u32,

    /// Coordonnées (x = longitude, y = latitude pour EPSG:4326)
    pub point: Point<f64>,
}

/// Encode un point en blob GeoPackage (toujours 29 octets)
pub fn encode_point(point: Point<f64>, srs_id: u32) -> Result<Vec<u8>, GpkgError> {
    let wkb = geom_to_wkb(&Geometry::Point(point))
        .map_err(|e| GpkgError::Wkb(format!("Failed to convert point to WKB: {:?}", e)))?;

    // L'en-tête déclare little-endian : le WKB doit l'être aussi
    if wkb.len() != WKB_POINT_LEN || wkb[0] != 1 {
        return Err(GpkgError::Wkb(format!(
            "Unexpected WKB point layout ({} bytes, byte order {:?})",
            wkb.len(),
            wkb.first()
        )));
    }

    let mut blob = Vec::with_capacity(POINT_BLOB_LEN);
    blob.extend_from_slice(MAGIC);
    blob.push(VERSION);
    blob.push(FLAGS_LE_NO_ENVELOPE);
    blob.extend_from_slice(&srs_id.to_le_bytes());
    blob.extend_from_slice(&wkb);

    Ok(blob)
}

/// Décode un blob GeoPackage contenant un point
///
/// Accepte les en-têtes avec enveloppe (ignorée) et les deux byte orders
/// pour le srs_id, comme n'importe quel lecteur GeoPackage.
pub fn decode_point(blob: &[u8]) -> Result<DecodedPoint, GpkgError> {
    if blob.len() < HEADER_LEN {
        return Err(GpkgError::invalid_blob(format!(
            "blob too short: {} bytes",
            blob.len()
        )));
    }
    if &blob[0..2] != MAGIC {
        return Err(GpkgError::invalid_blob("missing GP magic"));
    }
    if blob[2] != VERSION {
        return Err(GpkgError::invalid_blob(format!(
            "unsupported version {}",
            blob[2]
        )));
    }

    let flags = blob[3];
    let srs_bytes = [blob[4], blob[5], blob[6], blob[7]];
    let srs_id = if flags & 0x01 == 1 {
        u32::from_le_bytes(srs_bytes)
    } else {
        u32::from_be_bytes(srs_bytes)
    };

    let envelope_len = match (flags >> 1) & 0x07 {
        0 => 0,
        1 => 32,
        2 | 3 => 48,
        4 => 64,
        other => {
            return Err(GpkgError::invalid_blob(format!(
                "invalid envelope indicator {}",
                other
            )))
        }
    };

    let body_start = HEADER_LEN + envelope_len;
    if blob.len() <= body_start {
        return Err(GpkgError::invalid_blob("missing WKB body"));
    }

    let geometry = Wkb(blob[body_start..].to_vec())
        .to_geo()
        .map_err(|e| GpkgError::Wkb(e.to_string()))?;

    match geometry {
        Geometry::Point(point) => Ok(DecodedPoint { srs_id, point }),
        other => Err(GpkgError::invalid_blob(format!(
            "expected a point, got {:?}",
            other
        ))),
    }
}
