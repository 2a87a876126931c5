//! Binary entrypoint: read incident JSON lines from stdin, write the shift report to stdout.
//!
//! Each input line is an InboundIncident. Output is either:
//! - One ShiftSummary JSON line per shift, newest first (`--format json`)
//! - A plain-text activity listing, oldest first (`--format text`)
//!
//! Invalid input lines produce an ErrorOutput JSON line and are left out of the report.

use std::io::{self, BufRead, Write};

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use shift_report::normalize::normalize;
use shift_report::types::ErrorOutput;
use shift_report::{Config, InboundIncident, MemoryStore, ReportError, ShiftReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
  Json,
  Text,
}

#[derive(Parser)]
#[command(name = "shift-report")]
#[command(about = "Bucket incident activity by shift and report created, updated, idle and closed incidents")]
struct Cli {
  /// Shift length in hours
  #[arg(long, default_value_t = 8)]
  shift_hours: u32,

  /// RFC3339 instant shift boundaries are aligned to (default: 1970-01-01T00:00:00Z)
  #[arg(long)]
  anchor: Option<String>,

  /// Most recent shifts to emit (0 = all)
  #[arg(long, default_value_t = 0)]
  shifts: usize,

  /// Emit shifts with no activity between the first and last busy shift
  #[arg(long)]
  include_quiet: bool,

  /// Output format
  #[arg(long, value_enum, default_value_t = Format::Json)]
  format: Format,

  /// Incident type to leave out (repeatable; replaces the defaults)
  #[arg(long = "ignore-type")]
  ignore_types: Vec<String>,
}

impl Cli {
  fn config(&self) -> Result<Config, ReportError> {
    let mut config = Config {
      shift_hours: self.shift_hours,
      include_quiet_shifts: self.include_quiet,
      num_shifts: self.shifts,
      ..Config::default()
    };
    if let Some(anchor) = &self.anchor {
      config.anchor = DateTime::parse_from_rfc3339(anchor)
        .map_err(|e| ReportError::validation("anchor", &format!("invalid RFC3339: {}", e)))?
        .with_timezone(&Utc);
    }
    if !self.ignore_types.is_empty() {
      config.ignored_incident_types = self.ignore_types.clone();
    }
    // Fail before reading stdin.
    config.schedule()?;
    Ok(config)
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let config = match cli.config() {
    Ok(c) => c,
    Err(e) => {
      error!(error = %e, "invalid configuration");
      let _ = writeln!(io::stderr(), "shift-report: {}", e);
      std::process::exit(2);
    }
  };

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let mut store = MemoryStore::new();

  for (index, line) in stdin.lock().lines().enumerate() {
    let line_no = index + 1;
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        let _ = writeln!(io::stderr(), "shift-report: read error: {}", e);
        std::process::exit(1);
      }
    };

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let raw: InboundIncident = match serde_json::from_str(trimmed) {
      Ok(v) => v,
      Err(e) => {
        emit_error(&mut out, ErrorOutput::new(format!("json parse: {}", e)).with_line(line_no));
        continue;
      }
    };

    match normalize(&raw) {
      Ok(incident) => {
        let number = incident.number;
        if store.insert(incident).is_some() {
          warn!(number, line = line_no, "duplicate incident number; keeping the later record");
        }
      }
      Err(e) => {
        let err = match &e {
          ReportError::Validation { field, reason } => {
            ErrorOutput::new(reason.clone()).with_field(field.clone())
          }
          _ => ErrorOutput::new(e.to_string()),
        };
        emit_error(&mut out, err.with_line(line_no));
      }
    }
  }

  info!(incidents = store.len(), "read incidents");

  let report = match ShiftReport::from_store(&store, &config) {
    Ok(r) => r,
    Err(e) => {
      error!(error = %e, "failed to build report");
      emit_error(&mut out, ErrorOutput::new(e.to_string()));
      let _ = out.flush();
      std::process::exit(1);
    }
  };

  match cli.format {
    Format::Json => {
      for summary in report.summaries() {
        let _ = serde_json::to_writer(&mut out, &summary);
        let _ = writeln!(out);
      }
    }
    Format::Text => {
      let _ = out.write_all(report.debug_text().as_bytes());
    }
  }

  let _ = out.flush();
}

fn emit_error<W: Write>(out: &mut W, err: ErrorOutput) {
  let _ = serde_json::to_writer(&mut *out, &err);
  let _ = writeln!(out);
}
