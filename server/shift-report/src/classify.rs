//! Shift classifier: buckets incident activity by shift and carries open incidents forward.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use crate::filter::ActivityFilter;
use crate::shift::{Shift, ShiftSchedule};
use crate::types::{Activity, Category, Incident};

/// Incidents ordered by number.
pub type IncidentSet = BTreeSet<Arc<Incident>>;

/// Shift → activity buckets, iterated in chronological order.
pub type ShiftActivity = BTreeMap<Shift, ActivityBuckets>;

/// The four activity sets for one shift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityBuckets {
  created: IncidentSet,
  updated: IncidentSet,
  idle: IncidentSet,
  closed: IncidentSet,
}

impl ActivityBuckets {
  pub fn get(&self, activity: Activity) -> &IncidentSet {
    match activity {
      Activity::Created => &self.created,
      Activity::Updated => &self.updated,
      Activity::Idle => &self.idle,
      Activity::Closed => &self.closed,
    }
  }

  fn get_mut(&mut self, activity: Activity) -> &mut IncidentSet {
    match activity {
      Activity::Created => &mut self.created,
      Activity::Updated => &mut self.updated,
      Activity::Idle => &mut self.idle,
      Activity::Closed => &mut self.closed,
    }
  }

  /// Derive one display category by set algebra over the buckets.
  pub fn category(&self, category: Category) -> IncidentSet {
    match category {
      Category::CreatedAndOpen => self.created.difference(&self.closed).cloned().collect(),
      Category::CarriedAndUpdated => self
        .updated
        .iter()
        .filter(|i| !self.created.contains(*i) && !self.closed.contains(*i))
        .cloned()
        .collect(),
      Category::CarriedAndIdle => self.idle.clone(),
      Category::CarriedAndClosed => self.closed.difference(&self.created).cloned().collect(),
      Category::OpenedAndClosed => self.created.intersection(&self.closed).cloned().collect(),
    }
  }

  pub fn is_empty(&self) -> bool {
    Activity::ALL.iter().all(|a| self.get(*a).is_empty())
  }
}

/// Pure function from an incident snapshot to per-shift activity buckets.
pub struct ShiftClassifier {
  schedule: ShiftSchedule,
  filter: Box<dyn ActivityFilter>,
  include_quiet_shifts: bool,
}

impl ShiftClassifier {
  pub fn new(schedule: ShiftSchedule, filter: Box<dyn ActivityFilter>) -> Self {
    Self {
      schedule,
      filter,
      include_quiet_shifts: false,
    }
  }

  /// Also emit shifts with no recorded activity between the first and last busy shift.
  pub fn include_quiet_shifts(mut self, include: bool) -> Self {
    self.include_quiet_shifts = include;
    self
  }

  pub fn schedule(&self) -> &ShiftSchedule {
    &self.schedule
  }

  /// Records sharing a number collapse to the last one in `incidents`.
  pub fn classify(&self, incidents: &[Arc<Incident>]) -> ShiftActivity {
    let mut by_shift = ShiftActivity::new();

    let mut latest: BTreeMap<u32, &Arc<Incident>> = BTreeMap::new();
    for incident in incidents {
      if latest.insert(incident.number, incident).is_some() {
        debug!(number = incident.number, "duplicate incident number; keeping the later record");
      }
    }

    for incident in latest.into_values() {
      if self.filter.ignore_incident(incident) {
        debug!(number = incident.number, "ignoring incident");
        continue;
      }

      let mut add = |ts: Option<DateTime<Utc>>, activity: Activity| {
        if let Some(ts) = ts {
          let Some(shift) = self.schedule.shift_of(ts) else {
            warn!(number = incident.number, %ts, "timestamp outside schedulable range; skipping");
            return;
          };
          by_shift
            .entry(shift)
            .or_default()
            .get_mut(activity)
            .insert(Arc::clone(incident));
        }
      };

      add(incident.created, Activity::Created);
      add(incident.dispatched, Activity::Updated);
      add(incident.on_scene, Activity::Updated);
      add(incident.closed, Activity::Closed);

      for entry in &incident.report_entries {
        if !self.filter.ignore_entry(entry) {
          add(Some(entry.created), Activity::Updated);
        }
      }
    }

    if self.include_quiet_shifts {
      self.fill_quiet_shifts(&mut by_shift);
    }

    let mut open = IncidentSet::new();
    for (shift, buckets) in by_shift.iter_mut() {
      open.extend(buckets.created.iter().cloned());
      for closed in &buckets.closed {
        open.remove(closed);
      }
      buckets.idle = open.difference(&buckets.created).cloned().collect();
      trace!(%shift, open = open.len(), idle = buckets.idle.len(), "carried open incidents");
    }

    debug!(shifts = by_shift.len(), incidents = incidents.len(), "classified incidents by shift");
    by_shift
  }

  fn fill_quiet_shifts(&self, by_shift: &mut ShiftActivity) {
    let (first, last) = match (by_shift.keys().next(), by_shift.keys().next_back()) {
      (Some(first), Some(last)) => (*first, *last),
      _ => return,
    };
    let mut next = self.schedule.next(&first);
    while let Some(shift) = next.filter(|s| *s < last) {
      by_shift.entry(shift).or_default();
      next = self.schedule.next(&shift);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filter::StandardFilter;
  use crate::types::ReportEntry;
  use chrono::{Duration, TimeZone};

  fn classifier() -> ShiftClassifier {
    let schedule = ShiftSchedule::new(Duration::hours(8), DateTime::<Utc>::UNIX_EPOCH).unwrap();
    ShiftClassifier::new(schedule, Box::new(StandardFilter::default()))
  }

  /// Monday 2025-01-13 plus `hours`.
  fn mon(hours: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 13, 0, 0, 0).unwrap() + Duration::hours(hours)
  }

  fn incident(number: u32, created: Option<i64>, closed: Option<i64>) -> Incident {
    let mut i = Incident::new(number);
    i.created = created.map(mon);
    i.closed = closed.map(mon);
    i
  }

  fn numbers(set: &IncidentSet) -> Vec<u32> {
    set.iter().map(|i| i.number).collect()
  }

  fn run(incidents: Vec<Incident>) -> ShiftActivity {
    let snapshot: Vec<Arc<Incident>> = incidents.into_iter().map(Arc::new).collect();
    classifier().classify(&snapshot)
  }

  fn shift_at(hours: i64) -> Shift {
    classifier().schedule().shift_of(mon(hours)).unwrap()
  }

  #[test]
  fn created_only_lands_in_one_bucket() {
    let result = run(vec![incident(1, Some(9), None)]);
    assert_eq!(result.len(), 1);
    let buckets = &result[&shift_at(9)];
    assert_eq!(numbers(buckets.get(Activity::Created)), vec![1]);
    assert!(buckets.get(Activity::Updated).is_empty());
    assert!(buckets.get(Activity::Idle).is_empty());
    assert!(buckets.get(Activity::Closed).is_empty());
  }

  #[test]
  fn dispatch_on_scene_and_entries_are_updates() {
    let mut i = incident(1, Some(1), None);
    i.dispatched = Some(mon(2));
    i.on_scene = Some(mon(9));
    i.report_entries.push(ReportEntry {
      created: mon(17),
      author: "Tool".into(),
      text: "checked in".into(),
      system_entry: false,
    });
    i.report_entries.push(ReportEntry {
      created: mon(26),
      author: "ims".into(),
      text: "state change".into(),
      system_entry: true,
    });
    let result = run(vec![i]);

    assert_eq!(numbers(result[&shift_at(1)].get(Activity::Updated)), vec![1]);
    assert_eq!(numbers(result[&shift_at(9)].get(Activity::Updated)), vec![1]);
    assert_eq!(numbers(result[&shift_at(17)].get(Activity::Updated)), vec![1]);
    assert!(!result.contains_key(&shift_at(26)));
  }

  #[test]
  fn ignored_incident_contributes_nothing() {
    let mut i = incident(1, Some(1), Some(2));
    i.incident_types = vec!["Junk".into()];
    assert!(run(vec![i]).is_empty());
  }

  #[test]
  fn no_timestamps_no_buckets() {
    assert!(run(vec![Incident::new(5)]).is_empty());
  }

  #[test]
  fn missing_creation_skips_created_and_idle() {
    let mut i = incident(1, None, Some(20));
    i.dispatched = Some(mon(2));
    let filler = incident(2, Some(9), None);
    let result = run(vec![i, filler]);

    assert_eq!(numbers(result[&shift_at(2)].get(Activity::Updated)), vec![1]);
    assert!(result[&shift_at(9)].get(Activity::Idle).is_empty());
    let closing = &result[&shift_at(20)];
    assert_eq!(numbers(closing.get(Activity::Closed)), vec![1]);
    assert_eq!(numbers(closing.get(Activity::Idle)), vec![2]);
  }

  #[test]
  fn created_and_closed_same_shift() {
    let result = run(vec![incident(1, Some(8), Some(14))]);
    let buckets = &result[&shift_at(8)];
    assert_eq!(numbers(buckets.get(Activity::Created)), vec![1]);
    assert_eq!(numbers(buckets.get(Activity::Closed)), vec![1]);
    assert!(buckets.get(Activity::Idle).is_empty());
    assert_eq!(numbers(&buckets.category(Category::OpenedAndClosed)), vec![1]);
    assert!(buckets.category(Category::CreatedAndOpen).is_empty());
    assert!(buckets.category(Category::CarriedAndClosed).is_empty());
  }

  #[test]
  fn idle_in_busy_shifts_between_creation_and_closure() {
    // 1 is created in shift 0 and closed in shift 4; others keep shifts 1..=3 busy.
    let result = run(vec![
      incident(1, Some(1), Some(33)),
      incident(2, Some(9), None),
      incident(3, Some(17), None),
      incident(4, Some(25), None),
    ]);

    assert!(result[&shift_at(1)].get(Activity::Idle).is_empty());
    for h in [9, 17, 25] {
      assert!(result[&shift_at(h)].get(Activity::Idle).iter().any(|i| i.number == 1));
    }
    let closing = &result[&shift_at(33)];
    assert!(!closing.get(Activity::Idle).iter().any(|i| i.number == 1));
    assert_eq!(numbers(closing.get(Activity::Closed)), vec![1]);
    assert_eq!(numbers(closing.get(Activity::Idle)), vec![2, 3, 4]);
  }

  #[test]
  fn quiet_shifts_are_skipped_by_default() {
    let result = run(vec![incident(1, Some(1), Some(33))]);
    assert_eq!(result.len(), 2);
  }

  #[test]
  fn quiet_shifts_carry_idle_when_enabled() {
    let snapshot = vec![Arc::new(incident(1, Some(1), Some(33)))];
    let result = classifier().include_quiet_shifts(true).classify(&snapshot);

    assert_eq!(result.len(), 5);
    for h in [9, 17, 25] {
      let buckets = &result[&shift_at(h)];
      assert_eq!(numbers(buckets.get(Activity::Idle)), vec![1]);
      assert!(buckets.get(Activity::Created).is_empty());
    }
    assert!(result[&shift_at(33)].get(Activity::Idle).is_empty());
  }

  #[test]
  fn categories_split_updates_from_created() {
    let mut carried = incident(1, Some(1), None);
    carried.on_scene = Some(mon(10));
    let mut fresh = incident(2, Some(9), None);
    fresh.dispatched = Some(mon(10));
    let result = run(vec![carried, fresh]);
    let buckets = &result[&shift_at(9)];

    assert_eq!(numbers(&buckets.category(Category::CreatedAndOpen)), vec![2]);
    assert_eq!(numbers(&buckets.category(Category::CarriedAndUpdated)), vec![1]);
    assert_eq!(numbers(&buckets.category(Category::CarriedAndIdle)), vec![1]);
  }

  #[test]
  fn bucket_keys_ascend() {
    let result = run(vec![incident(1, Some(30), None), incident(2, Some(2), None)]);
    let keys: Vec<Shift> = result.keys().copied().collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
  }

  #[test]
  fn duplicate_numbers_keep_the_last_record() {
    let mut first = incident(1, Some(1), None);
    first.summary = "old".into();
    let mut second = incident(1, Some(9), None);
    second.summary = "new".into();
    let result = run(vec![first, second]);

    assert_eq!(result.len(), 1);
    let created = result[&shift_at(9)].get(Activity::Created);
    assert_eq!(created.iter().next().unwrap().summary, "new");
  }
}
