//! Normalize inbound incident records into canonical Incident models.

use chrono::{DateTime, Utc};

use crate::error::ReportError;
use crate::types::*;

const DEFAULT_PRIORITY: u8 = 3;

/// Parse and normalize an InboundIncident into a canonical Incident.
pub fn normalize(raw: &InboundIncident) -> Result<Incident, ReportError> {
  let number = u32::try_from(raw.number)
    .ok()
    .filter(|&n| n > 0)
    .ok_or_else(|| ReportError::validation("number", "must be a positive integer"))?;

  let priority = match raw.priority {
    None => DEFAULT_PRIORITY,
    Some(p) if (1..=5).contains(&p) => p as u8,
    Some(_) => return Err(ReportError::validation("priority", "expected 1..=5")),
  };

  let report_entries = raw
    .report_entries
    .iter()
    .enumerate()
    .map(|(i, e)| {
      let created = parse_timestamp(&format!("report_entries[{}].created", i), &e.created)?;
      Ok(ReportEntry {
        created,
        author: e.author.trim().to_string(),
        text: e.text.clone(),
        system_entry: e.system_entry,
      })
    })
    .collect::<Result<Vec<_>, ReportError>>()?;

  Ok(Incident {
    number,
    priority,
    created: parse_optional("created", raw.created.as_deref())?,
    dispatched: parse_optional("dispatched", raw.dispatched.as_deref())?,
    on_scene: parse_optional("on_scene", raw.on_scene.as_deref())?,
    closed: parse_optional("closed", raw.closed.as_deref())?,
    location: raw.location.as_deref().unwrap_or_default().trim().to_string(),
    summary: raw.summary.as_deref().unwrap_or_default().trim().to_string(),
    rangers: clean_list(&raw.rangers),
    incident_types: clean_list(&raw.incident_types),
    report_entries,
  })
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, ReportError> {
  DateTime::parse_from_rfc3339(value.trim())
    .map(|ts| ts.with_timezone(&Utc))
    .map_err(|e| ReportError::validation(field, &format!("invalid RFC3339: {}", e)))
}

/// Absent and blank timestamps both mean "never happened".
fn parse_optional(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, ReportError> {
  match value.map(str::trim) {
    None | Some("") => Ok(None),
    Some(v) => parse_timestamp(field, v).map(Some),
  }
}

/// Trim entries and drop blanks, keeping order.
fn clean_list(items: &[String]) -> Vec<String> {
  items
    .iter()
    .map(|s| s.trim())
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn make_inbound(number: i64) -> InboundIncident {
    InboundIncident {
      number,
      priority: None,
      created: Some("2025-01-13T08:00:00Z".into()),
      dispatched: None,
      on_scene: None,
      closed: None,
      location: Some(" Center Camp ".into()),
      summary: None,
      rangers: vec!["Easy E".into(), " ".into()],
      incident_types: vec!["Medical".into()],
      report_entries: vec![InboundEntry {
        created: "2025-01-13T08:05:00-08:00".into(),
        author: "SciFi".into(),
        text: "Participant down".into(),
        system_entry: false,
      }],
    }
  }

  #[test]
  fn normalize_valid_incident() {
    let incident = normalize(&make_inbound(12)).unwrap();
    assert_eq!(incident.number, 12);
    assert_eq!(incident.priority, 3);
    assert_eq!(incident.location, "Center Camp");
    assert_eq!(incident.rangers, vec!["Easy E".to_string()]);
    assert_eq!(
      incident.created,
      Some(Utc.with_ymd_and_hms(2025, 1, 13, 8, 0, 0).unwrap())
    );
    assert_eq!(
      incident.report_entries[0].created,
      Utc.with_ymd_and_hms(2025, 1, 13, 16, 5, 0).unwrap()
    );
  }

  #[test]
  fn normalize_rejects_non_positive_number() {
    let err = normalize(&make_inbound(0)).unwrap_err();
    assert!(err.to_string().contains("number"));
    assert!(normalize(&make_inbound(-4)).is_err());
  }

  #[test]
  fn normalize_rejects_bad_priority() {
    let mut raw = make_inbound(1);
    raw.priority = Some(9);
    let err = normalize(&raw).unwrap_err();
    assert!(err.to_string().contains("priority"));
  }

  #[test]
  fn normalize_rejects_bad_timestamp() {
    let mut raw = make_inbound(1);
    raw.closed = Some("yesterday".into());
    let err = normalize(&raw).unwrap_err();
    assert!(err.to_string().contains("closed"));
  }

  #[test]
  fn normalize_names_the_bad_entry() {
    let mut raw = make_inbound(1);
    raw.report_entries[0].created = "nope".into();
    let err = normalize(&raw).unwrap_err();
    assert!(err.to_string().contains("report_entries[0].created"));
  }

  #[test]
  fn blank_timestamps_are_absent() {
    let mut raw = make_inbound(1);
    raw.created = Some("  ".into());
    let incident = normalize(&raw).unwrap();
    assert!(incident.created.is_none());
  }
}
