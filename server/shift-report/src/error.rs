//! Structured error types for the shift report.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("parse: {0}")]
  Parse(String),

  #[error("no such incident: {0}")]
  NotFound(u32),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl ReportError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn parse(msg: impl Into<String>) -> Self {
    Self::Parse(msg.into())
  }
}
