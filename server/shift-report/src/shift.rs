//! Fixed-length shift schedule: maps timestamps to the shift that contains them.

use std::fmt;

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::error::ReportError;

/// Longest accepted shift: one year.
pub const MAX_SHIFT_HOURS: i64 = 8760;

/// One scheduled period, half-open: `[start, end)`.
///
/// Equality, hashing and ordering all go through the normalized boundaries,
/// so two shifts derived from different timestamps in the same period are the
/// same bucket key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Shift {
  start: DateTime<Utc>,
  end: DateTime<Utc>,
}

impl Shift {
  pub fn start(&self) -> DateTime<Utc> {
    self.start
  }

  pub fn end(&self) -> DateTime<Utc> {
    self.end
  }

  pub fn contains(&self, ts: DateTime<Utc>) -> bool {
    self.start <= ts && ts < self.end
  }

  /// Stable anchor id for this shift ("shift:<hex>").
  pub fn id(&self) -> String {
    format!("shift:{}", self.digest())
  }

  /// Short stable digest of the shift boundaries.
  pub fn digest(&self) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(self.start.to_rfc3339().as_bytes());
    hasher.update(b"|");
    hasher.update(self.end.to_rfc3339().as_bytes());
    let hex = hasher.finalize().to_hex();
    hex[..16].to_string()
  }
}

impl fmt::Display for Shift {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let start = self.start.format("%a %Y-%m-%d %H:%M");
    let same_day = self.end.date_naive() == self.start.date_naive();
    let next_midnight =
      self.end.num_seconds_from_midnight() == 0 && self.end - self.start <= Duration::days(1);
    if same_day || next_midnight {
      write!(f, "{} to {} UTC", start, self.end.format("%H:%M"))
    } else {
      write!(f, "{} to {} UTC", start, self.end.format("%a %Y-%m-%d %H:%M"))
    }
  }
}

/// Shifts of a fixed length laid end to end from a reference instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSchedule {
  length: Duration,
  anchor: DateTime<Utc>,
}

impl ShiftSchedule {
  /// Lengths are whole seconds; the anchor is truncated to the second.
  pub fn new(length: Duration, anchor: DateTime<Utc>) -> Result<Self, ReportError> {
    if length.num_seconds() < 1 {
      return Err(ReportError::validation("shift length", "must be at least one second"));
    }
    if length > Duration::hours(MAX_SHIFT_HOURS) {
      return Err(ReportError::validation(
        "shift length",
        &format!("must be at most {} hours", MAX_SHIFT_HOURS),
      ));
    }
    let anchor = anchor
      .with_nanosecond(0)
      .ok_or_else(|| ReportError::parse("anchor out of range"))?;
    Ok(Self {
      length: Duration::seconds(length.num_seconds()),
      anchor,
    })
  }

  pub fn length(&self) -> Duration {
    self.length
  }

  pub fn anchor(&self) -> DateTime<Utc> {
    self.anchor
  }

  /// The shift containing `ts`. Timestamps before the anchor land in earlier shifts.
  ///
  /// `None` when the shift's boundaries fall outside the representable range.
  pub fn shift_of(&self, ts: DateTime<Utc>) -> Option<Shift> {
    let len = self.length.num_seconds();
    // timestamp() floors, so sub-second parts never push a value across a boundary.
    let offset = ts.timestamp().checked_sub(self.anchor.timestamp())?;
    let index = offset.div_euclid(len);
    let delta = Duration::try_seconds(index.checked_mul(len)?)?;
    let start = self.anchor.checked_add_signed(delta)?;
    Some(Shift {
      start,
      end: start.checked_add_signed(self.length)?,
    })
  }

  /// The shift immediately after `shift`, if representable.
  pub fn next(&self, shift: &Shift) -> Option<Shift> {
    Some(Shift {
      start: shift.end,
      end: shift.end.checked_add_signed(self.length)?,
    })
  }
}
