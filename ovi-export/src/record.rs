//! Enregistrement projet et tables de libellés

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Projet à exporter, tel que fourni par la source amont
///
/// Les coordonnées sont en degrés WGS 84 et ne sont pas revalidées ici.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: i64,
    pub tenant_id: String,
    /// Code d'état (draft, active, paused, closed)
    pub status_code: String,
    pub created_at: NaiveDate,
    /// Code de type de projet (INFRA, SOC, ENV)
    pub project_type_code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Libellés des codes d'état
pub const STATUS_LABELS: &[(&str, &str)] = &[
    ("draft", "Borrador"),
    ("active", "Activo"),
    ("paused", "Pausado"),
    ("closed", "Cerrado"),
];

/// Libellés des codes de type de projet
pub const PROJECT_TYPE_LABELS: &[(&str, &str)] = &[
    ("INFRA", "Infraestructura"),
    ("SOC", "Social"),
    ("ENV", "Ambiental"),
];

/// Cherche un libellé, le code brut sert de repli
pub fn label_for<'a>(table: &'static [(&'static str, &'static str)], code: &'a str) -> &'a str {
    for (key, label) in table {
        if *key == code {
            return label;
        }
    }
    code
}

/// Libellé d'un code d'état
pub fn status_label(code: &str) -> &str {
    label_for(STATUS_LABELS, code)
}

/// Libellé d'un code de type de projet
pub fn project_type_label(code: &str) -> &str {
    label_for(PROJECT_TYPE_LABELS, code)
}

/// Vrai si le code d'état fait partie du vocabulaire connu
pub fn is_known_status(code: &str) -> bool {
    STATUS_LABELS.iter().any(|(k, _)| *k == code)
}

/// Vrai si le code de type fait partie du vocabulaire connu
pub fn is_known_project_type(code: &str) -> bool {
    PROJECT_TYPE_LABELS.iter().any(|(k, _)| *k == code)
}

/// Formate un flottant en texte décimal simple
///
/// Les valeurs entières gardent une décimale (`20.0`), jamais de notation
/// exponentielle.
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
