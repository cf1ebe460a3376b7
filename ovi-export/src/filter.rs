//! Filtre d'export : tenant obligatoire, états, plage de dates

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ExportError;
use crate::record::ProjectRecord;

/// Critères de sélection d'un export
///
/// Un seul tenant par filtre : il n'existe aucun moyen d'exporter plusieurs
/// tenants en une opération.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportFilter {
    pub tenant_id: String,
    /// Codes d'état acceptés ; vide = tous
    pub statuses: BTreeSet<String>,
    /// Borne inférieure incluse
    pub start_date: Option<NaiveDate>,
    /// Borne supérieure incluse
    pub end_date: Option<NaiveDate>,
}

impl ExportFilter {
    /// Filtre sans autre critère que le tenant
    pub fn for_tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            ..Default::default()
        }
    }

    pub fn with_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statuses = statuses.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Précondition de sécurité : tenant non vide
    pub fn ensure_tenant(&self) -> Result<(), ExportError> {
        if self.tenant_id.is_empty() {
            return Err(ExportError::TenantSecurity);
        }
        Ok(())
    }

    /// Prédicat d'appartenance d'un enregistrement
    pub fn matches(&self, record: &ProjectRecord) -> bool {
        if record.tenant_id != self.tenant_id {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&record.status_code) {
            return false;
        }
        if let Some(start) = self.start_date {
            if record.created_at < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if record.created_at > end {
                return false;
            }
        }
        true
    }

    /// Applique le filtre en conservant l'ordre d'entrée
    ///
    /// # Errors
    /// [`ExportError::TenantSecurity`] si le tenant est vide
    pub fn apply<'a>(
        &self,
        records: &'a [ProjectRecord],
    ) -> Result<Vec<&'a ProjectRecord>, ExportError> {
        self.ensure_tenant()?;
        Ok(records.iter().filter(|r| self.matches(r)).collect())
    }
}
