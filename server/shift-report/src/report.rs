//! Request-scoped shift report: memoizes the classification and shapes it for rendering.

use std::cell::OnceCell;
use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, info};

use crate::classify::{ActivityBuckets, ShiftActivity, ShiftClassifier};
use crate::config::Config;
use crate::error::ReportError;
use crate::filter::StandardFilter;
use crate::shift::Shift;
use crate::store::IncidentStore;
use crate::types::*;

/// One report over one incident snapshot.
///
/// The shift mapping is computed on first access and reused for the life of
/// this value; build a new report to see new data.
pub struct ShiftReport {
  incidents: Vec<Arc<Incident>>,
  classifier: ShiftClassifier,
  num_shifts: usize,
  by_shift: OnceCell<ShiftActivity>,
}

impl ShiftReport {
  pub fn new(incidents: Vec<Incident>, config: &Config) -> Result<Self, ReportError> {
    let classifier = ShiftClassifier::new(
      config.schedule()?,
      Box::new(StandardFilter::from_config(config)),
    )
    .include_quiet_shifts(config.include_quiet_shifts);
    Ok(Self::with_classifier(incidents, classifier).limit(config.num_shifts))
  }

  pub fn with_classifier(incidents: Vec<Incident>, classifier: ShiftClassifier) -> Self {
    Self {
      incidents: incidents.into_iter().map(Arc::new).collect(),
      classifier,
      num_shifts: 0,
      by_shift: OnceCell::new(),
    }
  }

  /// Read every listed incident from `store`.
  pub fn from_store<S>(store: &S, config: &Config) -> Result<Self, ReportError>
  where
    S: IncidentStore + ?Sized,
  {
    let incidents = store
      .list_incidents()?
      .into_iter()
      .map(|(number, _)| store.read_incident(number))
      .collect::<Result<Vec<_>, ReportError>>()?;
    info!(incidents = incidents.len(), "loaded incidents from store");
    Self::new(incidents, config)
  }

  /// Present at most `num_shifts` of the most recent shifts (0 = all).
  pub fn limit(mut self, num_shifts: usize) -> Self {
    self.num_shifts = num_shifts;
    self
  }

  pub fn incidents_by_shift(&self) -> &ShiftActivity {
    self.by_shift.get_or_init(|| {
      debug!(incidents = self.incidents.len(), "classifying incidents");
      self.classifier.classify(&self.incidents)
    })
  }

  /// Shifts newest first, capped at the configured limit.
  pub fn shifts_recent_first(&self) -> impl Iterator<Item = (&Shift, &ActivityBuckets)> {
    let by_shift = self.incidents_by_shift();
    let take = match self.num_shifts {
      0 => by_shift.len(),
      n => n,
    };
    by_shift.iter().rev().take(take)
  }

  pub fn summaries(&self) -> Vec<ShiftSummary> {
    self
      .shifts_recent_first()
      .map(|(shift, buckets)| summarize(shift, buckets))
      .collect()
  }

  /// Plain-text listing of every shift and activity bucket, oldest first.
  pub fn debug_text(&self) -> String {
    let mut out = String::new();
    for (shift, buckets) in self.incidents_by_shift() {
      let _ = writeln!(out, "{}", shift);
      let _ = writeln!(out);
      for activity in Activity::ALL {
        let _ = writeln!(out, "  {}", activity);
        for incident in buckets.get(activity) {
          let _ = writeln!(out, "    {}: {}", incident.number, incident.summary_from_report());
        }
        let _ = writeln!(out);
      }
      let _ = writeln!(out);
    }
    out
  }
}

/// Render-ready view of one shift: non-empty categories only, rows by number.
pub fn summarize(shift: &Shift, buckets: &ActivityBuckets) -> ShiftSummary {
  let categories = Category::ALL
    .iter()
    .filter_map(|&category| {
      let incidents = buckets.category(category);
      if incidents.is_empty() {
        return None;
      }
      Some(CategorySummary {
        category,
        caption: category.caption().to_string(),
        id: category_id(shift, category),
        incidents: incidents.iter().map(|i| IncidentRow::from(&**i)).collect(),
      })
    })
    .collect();

  ShiftSummary {
    shift_id: shift.id(),
    label: shift.to_string(),
    start: shift.start().to_rfc3339(),
    end: shift.end().to_rfc3339(),
    categories,
  }
}

/// Stable anchor id for one category table ("activity:<shift>:<caption>").
pub fn category_id(shift: &Shift, category: Category) -> String {
  let hex = blake3::hash(category.caption().as_bytes()).to_hex();
  format!("activity:{}:{}", shift.digest(), &hex[..16])
}
