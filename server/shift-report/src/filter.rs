//! Which incidents and report entries count as activity.

use std::collections::BTreeSet;

use crate::config::{Config, DEFAULT_IGNORED_TYPES};
use crate::types::{Incident, ReportEntry};

/// Decides what the classifier skips.
pub trait ActivityFilter {
  /// Skip the incident entirely.
  fn ignore_incident(&self, incident: &Incident) -> bool;

  /// Skip one report entry; the incident's own timestamps still count.
  fn ignore_entry(&self, entry: &ReportEntry) -> bool;
}

/// Ignores incidents tagged with administrative types, and system-generated entries.
#[derive(Debug, Clone)]
pub struct StandardFilter {
  ignored_types: BTreeSet<String>,
}

impl StandardFilter {
  pub fn new<I, S>(ignored_types: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      ignored_types: ignored_types.into_iter().map(Into::into).collect(),
    }
  }

  pub fn from_config(config: &Config) -> Self {
    Self::new(config.ignored_incident_types.iter().cloned())
  }
}

impl Default for StandardFilter {
  fn default() -> Self {
    Self::new(DEFAULT_IGNORED_TYPES)
  }
}

impl ActivityFilter for StandardFilter {
  fn ignore_incident(&self, incident: &Incident) -> bool {
    incident
      .incident_types
      .iter()
      .any(|t| self.ignored_types.contains(t))
  }

  fn ignore_entry(&self, entry: &ReportEntry) -> bool {
    entry.system_entry
  }
}
