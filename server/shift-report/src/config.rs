//! Report configuration with sane defaults.

use chrono::{DateTime, Duration, Utc};

use crate::error::ReportError;
use crate::shift::ShiftSchedule;

/// Incident types excluded from the report unless overridden.
pub const DEFAULT_IGNORED_TYPES: [&str; 2] = ["Admin", "Junk"];

/// Tunable settings for one shift report.
#[derive(Debug, Clone)]
pub struct Config {
  /// Length of one shift, in hours.
  pub shift_hours: u32,
  /// Reference instant that shift boundaries are aligned to.
  pub anchor: DateTime<Utc>,
  /// Materialize shifts with no recorded activity between the first and last busy shift.
  pub include_quiet_shifts: bool,
  /// Most recent shifts to present (0 = all).
  pub num_shifts: usize,
  /// Incidents carrying any of these types are left out entirely.
  pub ignored_incident_types: Vec<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      shift_hours: 8,
      anchor: DateTime::<Utc>::UNIX_EPOCH,
      include_quiet_shifts: false,
      num_shifts: 0,
      ignored_incident_types: DEFAULT_IGNORED_TYPES.iter().map(|t| t.to_string()).collect(),
    }
  }
}

impl Config {
  /// Build the shift schedule these settings describe.
  pub fn schedule(&self) -> Result<ShiftSchedule, ReportError> {
    if self.shift_hours == 0 {
      return Err(ReportError::validation("shift_hours", "must be at least 1"));
    }
    ShiftSchedule::new(Duration::hours(i64::from(self.shift_hours)), self.anchor)
  }
}
