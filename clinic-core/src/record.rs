//! Domain records and the capability traits the engine is generic over.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checklist::{derive_status, Checklist};

/// Identity and anchor date of a record.
pub trait Record {
    fn id(&self) -> &str;
    fn date(&self) -> Option<DateTime<Utc>>;
}

/// A field value exposed to text search and category filters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Amount(f64),
}

impl<'a> FieldValue<'a> {
    /// Canonical string form used for matching.
    ///
    /// Amounts use the shortest round-trip `Display` of `f64`, so `500.0`
    /// renders as `"500"` and `12.5` as `"12.5"`.
    pub fn canonical(&self) -> Cow<'a, str> {
        match *self {
            FieldValue::Text(text) => Cow::Borrowed(text),
            FieldValue::Amount(value) => Cow::Owned(value.to_string()),
        }
    }
}

/// Records with a fixed, named set of searchable attributes.
pub trait Searchable {
    /// Every field name accepted by [`Searchable::field`].
    const FIELDS: &'static [&'static str];

    /// Value of `name`, or `None` when the record has nothing there.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// A closed enumeration of lifecycle states.
pub trait StatusKind: Copy + Eq + Sized + 'static {
    /// Human name of the record family, used in error messages.
    const KIND: &'static str;
    /// Every member, in display order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Lenient lookup: case-insensitive, `-` and spaces read as `_`.
    fn parse(value: &str) -> Option<Self> {
        let normalized = normalize_token(value);
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
    }
}

/// Records with a (possibly unknown) lifecycle status.
pub trait HasStatus {
    type Status: StatusKind;

    fn status(&self) -> Option<Self::Status>;
}

pub(crate) fn normalize_token(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace(['-', ' '], "_")
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    #[serde(alias = "cancelled")]
    Canceled,
}

impl StatusKind for AppointmentStatus {
    const KIND: &'static str = "appointment";
    const ALL: &'static [Self] = &[
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Canceled,
    ];

    fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Canceled => "canceled",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match normalize_token(value).as_str() {
            "pending" => Some(AppointmentStatus::Pending),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "completed" => Some(AppointmentStatus::Completed),
            "canceled" | "cancelled" => Some(AppointmentStatus::Canceled),
            _ => None,
        }
    }
}

/// Lab order status, always derived from the tracking checklist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
}

impl StatusKind for OrderStatus {
    const KIND: &'static str = "lab order";
    const ALL: &'static [Self] = &[
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Completed,
    ];

    fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
        }
    }
}

/// Reporting state of a DICOM study.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StudyStatus {
    Pending,
    InProgress,
    Completed,
}

impl StatusKind for StudyStatus {
    const KIND: &'static str = "study";
    const ALL: &'static [Self] = &[
        StudyStatus::Pending,
        StudyStatus::InProgress,
        StudyStatus::Completed,
    ];

    fn as_str(self) -> &'static str {
        match self {
            StudyStatus::Pending => "pending",
            StudyStatus::InProgress => "in_progress",
            StudyStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

impl StatusKind for ExpenseStatus {
    const KIND: &'static str = "expense";
    const ALL: &'static [Self] = &[
        ExpenseStatus::Pending,
        ExpenseStatus::Approved,
        ExpenseStatus::Rejected,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "pending",
            ExpenseStatus::Approved => "approved",
            ExpenseStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Pending,
    Paid,
}

impl StatusKind for PayrollStatus {
    const KIND: &'static str = "payroll";
    const ALL: &'static [Self] = &[PayrollStatus::Pending, PayrollStatus::Paid];

    fn as_str(self) -> &'static str {
        match self {
            PayrollStatus::Pending => "pending",
            PayrollStatus::Paid => "paid",
        }
    }
}

/// A scheduled patient visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub patient: String,
    #[serde(default)]
    pub dentist: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
}

impl Record for Appointment {
    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.scheduled_at
    }
}

impl Searchable for Appointment {
    const FIELDS: &'static [&'static str] = &["id", "patient", "dentist", "reason"];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "patient" => Some(FieldValue::Text(&self.patient)),
            "dentist" => self.dentist.as_deref().map(FieldValue::Text),
            "reason" => self.reason.as_deref().map(FieldValue::Text),
            _ => None,
        }
    }
}

impl HasStatus for Appointment {
    type Status = AppointmentStatus;

    fn status(&self) -> Option<AppointmentStatus> {
        self.status
    }
}

/// Work sent to the dental lab, tracked stage by stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabOrder {
    pub id: String,
    pub patient: String,
    #[serde(default)]
    pub dentist: Option<String>,
    pub work_type: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub tracking: Checklist,
}

impl LabOrder {
    /// Past due and not yet completed. Undated orders are never overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due < now && derive_status(&self.tracking) != OrderStatus::Completed,
            None => false,
        }
    }
}

/// Number of orders for which [`LabOrder::is_overdue`] holds.
pub fn count_overdue(orders: &[LabOrder], now: DateTime<Utc>) -> usize {
    orders.iter().filter(|order| order.is_overdue(now)).count()
}

impl Record for LabOrder {
    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }
}

impl Searchable for LabOrder {
    const FIELDS: &'static [&'static str] = &["id", "patient", "dentist", "work_type", "priority"];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "patient" => Some(FieldValue::Text(&self.patient)),
            "dentist" => self.dentist.as_deref().map(FieldValue::Text),
            "work_type" => Some(FieldValue::Text(&self.work_type)),
            "priority" => self.priority.as_deref().map(FieldValue::Text),
            _ => None,
        }
    }
}

impl HasStatus for LabOrder {
    type Status = OrderStatus;

    fn status(&self) -> Option<OrderStatus> {
        Some(derive_status(&self.tracking))
    }
}

/// A DICOM imaging study awaiting or holding a radiology report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Study {
    pub id: String,
    pub patient: String,
    #[serde(default)]
    pub modality: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub study_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<StudyStatus>,
}

impl Record for Study {
    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.study_date
    }
}

impl Searchable for Study {
    const FIELDS: &'static [&'static str] = &["id", "patient", "modality", "description"];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "patient" => Some(FieldValue::Text(&self.patient)),
            "modality" => self.modality.as_deref().map(FieldValue::Text),
            "description" => self.description.as_deref().map(FieldValue::Text),
            _ => None,
        }
    }
}

impl HasStatus for Study {
    type Status = StudyStatus;

    fn status(&self) -> Option<StudyStatus> {
        self.status
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub spent_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<ExpenseStatus>,
}

impl Record for Expense {
    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.spent_on
    }
}

impl Searchable for Expense {
    const FIELDS: &'static [&'static str] = &["id", "title", "category", "amount"];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "title" => Some(FieldValue::Text(&self.title)),
            "category" => self.category.as_deref().map(FieldValue::Text),
            "amount" => Some(FieldValue::Amount(self.amount)),
            _ => None,
        }
    }
}

impl HasStatus for Expense {
    type Status = ExpenseStatus;

    fn status(&self) -> Option<ExpenseStatus> {
        self.status
    }
}

/// One salary payment for one employee and period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayrollRow {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub pay_date: Option<DateTime<Utc>>,
    pub basic_salary: f64,
    #[serde(default)]
    pub allowances: f64,
    #[serde(default)]
    pub overtime: f64,
    #[serde(default)]
    pub deductions: f64,
    #[serde(default)]
    pub status: Option<PayrollStatus>,
}

impl Record for PayrollRow {
    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.pay_date
    }
}

impl Searchable for PayrollRow {
    const FIELDS: &'static [&'static str] = &["id", "employee_id", "employee_name", "role"];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "employee_id" => Some(FieldValue::Text(&self.employee_id)),
            "employee_name" => Some(FieldValue::Text(&self.employee_name)),
            "role" => self.role.as_deref().map(FieldValue::Text),
            _ => None,
        }
    }
}

impl HasStatus for PayrollRow {
    type Status = PayrollStatus;

    fn status(&self) -> Option<PayrollStatus> {
        self.status
    }
}

/// Any record the clinic tracks, tagged by `kind` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClinicRecord {
    Appointment(Appointment),
    LabOrder(LabOrder),
    Study(Study),
    Expense(Expense),
    Payroll(PayrollRow),
}

impl Record for ClinicRecord {
    fn id(&self) -> &str {
        match self {
            ClinicRecord::Appointment(r) => r.id(),
            ClinicRecord::LabOrder(r) => r.id(),
            ClinicRecord::Study(r) => r.id(),
            ClinicRecord::Expense(r) => r.id(),
            ClinicRecord::Payroll(r) => r.id(),
        }
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        match self {
            ClinicRecord::Appointment(r) => r.date(),
            ClinicRecord::LabOrder(r) => r.date(),
            ClinicRecord::Study(r) => r.date(),
            ClinicRecord::Expense(r) => r.date(),
            ClinicRecord::Payroll(r) => r.date(),
        }
    }
}

impl Searchable for ClinicRecord {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "patient",
        "dentist",
        "reason",
        "work_type",
        "priority",
        "modality",
        "description",
        "title",
        "category",
        "amount",
        "employee_id",
        "employee_name",
        "role",
    ];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match self {
            ClinicRecord::Appointment(r) => r.field(name),
            ClinicRecord::LabOrder(r) => r.field(name),
            ClinicRecord::Study(r) => r.field(name),
            ClinicRecord::Expense(r) => r.field(name),
            ClinicRecord::Payroll(r) => r.field(name),
        }
    }
}
