//! Incident storage seam: list with change tokens, read by number.

use std::collections::BTreeMap;

use crate::error::ReportError;
use crate::types::Incident;

/// Source of incident records for a report.
pub trait IncidentStore {
  /// Every incident number with an opaque token that changes when the incident does.
  fn list_incidents(&self) -> Result<Vec<(u32, String)>, ReportError>;

  fn read_incident(&self, number: u32) -> Result<Incident, ReportError>;
}

/// In-memory store keyed by incident number.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  incidents: BTreeMap<u32, Incident>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert or replace; returns the previous record with the same number.
  pub fn insert(&mut self, incident: Incident) -> Option<Incident> {
    self.incidents.insert(incident.number, incident)
  }

  pub fn len(&self) -> usize {
    self.incidents.len()
  }

  pub fn is_empty(&self) -> bool {
    self.incidents.is_empty()
  }
}

impl FromIterator<Incident> for MemoryStore {
  fn from_iter<T: IntoIterator<Item = Incident>>(iter: T) -> Self {
    let mut store = Self::new();
    for incident in iter {
      store.insert(incident);
    }
    store
  }
}

impl IncidentStore for MemoryStore {
  fn list_incidents(&self) -> Result<Vec<(u32, String)>, ReportError> {
    self
      .incidents
      .values()
      .map(|incident| Ok((incident.number, change_token(incident)?)))
      .collect()
  }

  fn read_incident(&self, number: u32) -> Result<Incident, ReportError> {
    self
      .incidents
      .get(&number)
      .cloned()
      .ok_or(ReportError::NotFound(number))
  }
}

/// blake3 digest of the incident's JSON form (32 hex chars).
pub fn change_token(incident: &Incident) -> Result<String, ReportError> {
  let bytes = serde_json::to_vec(incident)?;
  let hex = blake3::hash(&bytes).to_hex();
  Ok(hex[..32].to_string())
}
