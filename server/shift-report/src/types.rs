//! Core types for the shift report (JSON contracts + internal models).

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the caller sends)
// ---------------------------------------------------------------------------

/// One inbound incident line from stdin. Unknown fields are silently ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundIncident {
  pub number: i64,
  #[serde(default)]
  pub priority: Option<i64>,
  #[serde(default)]
  pub created: Option<String>,
  #[serde(default)]
  pub dispatched: Option<String>,
  #[serde(default)]
  pub on_scene: Option<String>,
  #[serde(default)]
  pub closed: Option<String>,
  #[serde(default)]
  pub location: Option<String>,
  #[serde(default)]
  pub summary: Option<String>,
  #[serde(default)]
  pub rangers: Vec<String>,
  #[serde(default)]
  pub incident_types: Vec<String>,
  #[serde(default)]
  pub report_entries: Vec<InboundEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundEntry {
  pub created: String,
  #[serde(default)]
  pub author: String,
  #[serde(default)]
  pub text: String,
  #[serde(default)]
  pub system_entry: bool,
}

// ---------------------------------------------------------------------------
// Internal normalized types
// ---------------------------------------------------------------------------

/// A timestamped note attached to an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
  pub created: DateTime<Utc>,
  pub author: String,
  pub text: String,
  /// Generated by the system rather than typed by an operator.
  pub system_entry: bool,
}

/// Canonical incident after normalization + validation.
///
/// Identity is the incident number: equality, hashing and ordering ignore
/// every other field.
#[derive(Debug, Clone, Serialize)]
pub struct Incident {
  pub number: u32,
  pub priority: u8,
  pub created: Option<DateTime<Utc>>,
  pub dispatched: Option<DateTime<Utc>>,
  pub on_scene: Option<DateTime<Utc>>,
  pub closed: Option<DateTime<Utc>>,
  pub location: String,
  pub summary: String,
  pub rangers: Vec<String>,
  pub incident_types: Vec<String>,
  pub report_entries: Vec<ReportEntry>,
}

impl Incident {
  /// A bare incident with default priority and no timestamps.
  pub fn new(number: u32) -> Self {
    Self {
      number,
      priority: 3,
      created: None,
      dispatched: None,
      on_scene: None,
      closed: None,
      location: String::new(),
      summary: String::new(),
      rangers: Vec::new(),
      incident_types: Vec::new(),
      report_entries: Vec::new(),
    }
  }

  /// The summary if set, else the first line of the first operator-written entry.
  pub fn summary_from_report(&self) -> &str {
    if !self.summary.is_empty() {
      return &self.summary;
    }
    self
      .report_entries
      .iter()
      .filter(|e| !e.system_entry)
      .find_map(|e| e.text.lines().map(str::trim).find(|l| !l.is_empty()))
      .unwrap_or("")
  }
}

impl PartialEq for Incident {
  fn eq(&self, other: &Self) -> bool {
    self.number == other.number
  }
}

impl Eq for Incident {}

impl Hash for Incident {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.number.hash(state);
  }
}

impl PartialOrd for Incident {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Incident {
  fn cmp(&self, other: &Self) -> Ordering {
    self.number.cmp(&other.number)
  }
}

// ---------------------------------------------------------------------------
// Activity + display categories
// ---------------------------------------------------------------------------

/// What happened to an incident during one shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
  Created,
  Updated,
  Idle,
  Closed,
}

impl Activity {
  pub const ALL: [Activity; 4] = [Self::Created, Self::Updated, Self::Idle, Self::Closed];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Created => "created",
      Self::Updated => "updated",
      Self::Idle => "idle",
      Self::Closed => "closed",
    }
  }
}

impl fmt::Display for Activity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Display groupings derived per shift from the four activity buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  CreatedAndOpen,
  CarriedAndUpdated,
  CarriedAndIdle,
  CarriedAndClosed,
  OpenedAndClosed,
}

impl Category {
  pub const ALL: [Category; 5] = [
    Self::CreatedAndOpen,
    Self::CarriedAndUpdated,
    Self::CarriedAndIdle,
    Self::CarriedAndClosed,
    Self::OpenedAndClosed,
  ];

  pub fn caption(self) -> &'static str {
    match self {
      Self::CreatedAndOpen => "Created and open",
      Self::CarriedAndUpdated => "Carried and updated",
      Self::CarriedAndIdle => "Carried and idle",
      Self::CarriedAndClosed => "Carried and closed",
      Self::OpenedAndClosed => "Opened and closed",
    }
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

/// One row of an activity table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentRow {
  pub number: u32,
  pub priority: u8,
  pub rangers: String,
  pub location: String,
  pub types: String,
  pub summary: String,
}

impl From<&Incident> for IncidentRow {
  fn from(incident: &Incident) -> Self {
    Self {
      number: incident.number,
      priority: incident.priority,
      rangers: incident.rangers.join(", "),
      location: incident.location.clone(),
      types: incident.incident_types.join(", "),
      summary: incident.summary_from_report().to_string(),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
  pub category: Category,
  pub caption: String,
  pub id: String,
  pub incidents: Vec<IncidentRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShiftSummary {
  pub shift_id: String,
  pub label: String,
  pub start: String,
  pub end: String,
  pub categories: Vec<CategorySummary>,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub line: Option<usize>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
      line: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }

  pub fn with_line(mut self, line: usize) -> Self {
    self.line = Some(line);
    self
  }
}
