//! Shift activity report — deterministic, rule-based.
//!
//! Buckets incident activity (creation, dispatch, on-scene, closure, report
//! entries) by work shift, carries open incidents forward as idle, and shapes
//! each shift into render-ready categories.
//!
//! No DB, no network, no HTML; pure computation + in-memory state.

pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod report;
pub mod shift;
pub mod store;
pub mod types;

pub use classify::{ActivityBuckets, IncidentSet, ShiftActivity, ShiftClassifier};
pub use config::Config;
pub use error::ReportError;
pub use filter::{ActivityFilter, StandardFilter};
pub use report::ShiftReport;
pub use shift::{Shift, ShiftSchedule};
pub use store::{IncidentStore, MemoryStore};
pub use types::{Activity, Category, InboundIncident, Incident, ReportEntry, ShiftSummary};
