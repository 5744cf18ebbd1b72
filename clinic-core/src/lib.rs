//! Core filtering, status derivation and aggregation logic for clinic records.
//!
//! Everything here is a pure function over in-memory data. The caller fetches
//! records, supplies `now`, and renders whatever comes back.

use serde::{Deserialize, Serialize};

pub mod checklist;
pub mod criteria;
pub mod payroll;
pub mod record;
pub mod search;
pub mod stats;
pub mod window;

pub use checklist::{derive_status, Checklist, Checkpoint};
pub use criteria::{
    apply_criteria, apply_criteria_with, sort_records, CategoryFilter, FilterCriteria,
    FilterOutcome, SortOrder, StatusFilter,
};
pub use payroll::{net_salary_measure, PayrollBreakdown, PayrollRates};
pub use record::{
    count_overdue, Appointment, AppointmentStatus, ClinicRecord, Expense, ExpenseStatus,
    FieldValue, HasStatus, LabOrder, OrderStatus, PayrollRow, PayrollStatus, Record, Searchable,
    StatusKind, Study, StudyStatus,
};
pub use search::filter_by_search;
pub use stats::{compute_stats, AggregateStats, Measure, NumericStats};
pub use window::{filter_by_time_window, TimeWindow};

/// Default stages a lab order moves through before it is marked complete.
pub const DEFAULT_LAB_STAGES: [&str; 9] = [
    "Impression Received",
    "Model Poured",
    "Die Trimmed",
    "Wax Up",
    "Casting",
    "Metal Try-in",
    "Porcelain Build-up",
    "Glazing",
    "Quality Check",
];

/// Name of the checkpoint that marks a lab order as finished.
pub const DEFAULT_TERMINAL_STAGE: &str = "Completed";

/// Tunable knobs shared by every entry point (CLI, WASM, JSON ingestion).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClinicConfig {
    /// Statutory contribution rates applied to basic salary.
    pub payroll: PayrollRates,
    /// Ordered non-terminal lab tracking stages.
    pub lab_stages: Vec<String>,
    /// Terminal lab tracking stage.
    pub terminal_stage: String,
    /// Window used when the caller does not pick one.
    pub default_window: TimeWindow,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            payroll: PayrollRates::default(),
            lab_stages: DEFAULT_LAB_STAGES.iter().map(|s| s.to_string()).collect(),
            terminal_stage: DEFAULT_TERMINAL_STAGE.to_string(),
            default_window: TimeWindow::All,
        }
    }
}

impl ClinicConfig {
    /// Empty checklist shaped after the configured lab pipeline.
    pub fn empty_lab_checklist(&self) -> Checklist {
        Checklist::new(
            self.lab_stages.iter().map(String::as_str),
            &self.terminal_stage,
        )
    }
}

/// Errors raised by the engine. Malformed record data is never an error;
/// only caller mistakes (bad tokens, bad names, illegal transitions) are.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClinicError {
    #[error("unknown time window token: {0:?}")]
    UnknownTimeWindow(String),
    #[error("unknown {kind} status: {value:?}")]
    UnknownStatus { kind: &'static str, value: String },
    #[error("unknown field {field:?}; expected one of {expected}")]
    UnknownField { field: String, expected: String },
    #[error("unknown checkpoint: {0:?}")]
    UnknownCheckpoint(String),
    #[error("cannot mark {terminal:?} yet: {remaining} checkpoint(s) remaining")]
    PrerequisitesIncomplete { terminal: String, remaining: usize },
    #[error("input is missing required data")]
    MissingData,
    #[error("could not read input: {0}")]
    Parse(String),
}
