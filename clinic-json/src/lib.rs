//! Backend JSON payloads to typed clinic records and dashboard snapshots.
//!
//! The REST backend is loose about shapes: ids may be numbers, dates come in
//! several formats, statuses drift in spelling. Everything here is lenient per
//! field and strict per call: a malformed record degrades (unknown status,
//! no date) instead of failing the whole list.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use clinic_core::{
    apply_criteria, apply_criteria_with, count_overdue, filter_by_search, filter_by_time_window,
    net_salary_measure, sort_records, Appointment, Checklist, ClinicConfig, ClinicError,
    ClinicRecord, Expense, ExpenseStatus, FilterCriteria, FilterOutcome, LabOrder, Measure,
    PayrollRow, PayrollStatus, SortOrder, StatusKind, Study, StudyStatus, TimeWindow,
};

/// Filters shared by every section of the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DashboardFilters {
    /// Falls back to [`ClinicConfig::default_window`].
    pub time_window: Option<TimeWindow>,
    pub search_term: String,
    pub sort: SortOrder,
}

impl DashboardFilters {
    fn criteria(&self, config: &ClinicConfig) -> FilterCriteria {
        FilterCriteria {
            time_window: Some(self.time_window.unwrap_or(config.default_window)),
            search_term: self.search_term.clone(),
            sort: self.sort,
            ..FilterCriteria::default()
        }
    }
}

/// Every list the clinic dashboards show, filtered the same way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub appointments: FilterOutcome<Appointment>,
    pub lab_orders: FilterOutcome<LabOrder>,
    /// Overdue among the filtered lab orders.
    pub overdue_lab_orders: usize,
    pub studies: FilterOutcome<Study>,
    /// Numeric stats aggregate `amount` per expense.
    pub expenses: FilterOutcome<Expense>,
    /// Numeric stats aggregate net salary per employee.
    pub payroll: FilterOutcome<PayrollRow>,
}

/// Record families the backend serves as separate collections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Appointments,
    LabOrders,
    Studies,
    Expenses,
    Payroll,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 5] = [
        CollectionKind::Appointments,
        CollectionKind::LabOrders,
        CollectionKind::Studies,
        CollectionKind::Expenses,
        CollectionKind::Payroll,
    ];

    /// Key of this collection in a dashboard payload.
    pub fn payload_key(self) -> &'static str {
        match self {
            CollectionKind::Appointments => "appointments",
            CollectionKind::LabOrders => "lab_orders",
            CollectionKind::Studies => "studies",
            CollectionKind::Expenses => "expenses",
            CollectionKind::Payroll => "payroll",
        }
    }
}

impl FromStr for CollectionKind {
    type Err = ClinicError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace('-', "_");
        CollectionKind::ALL
            .into_iter()
            .find(|kind| kind.payload_key() == normalized)
            .ok_or_else(|| ClinicError::Parse(format!("unknown collection {value:?}")))
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.payload_key())
    }
}

/// Outcome of filtering one collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "outcome", rename_all = "snake_case")]
pub enum CollectionOutcome {
    Appointments(FilterOutcome<Appointment>),
    LabOrders(FilterOutcome<LabOrder>),
    Studies(FilterOutcome<Study>),
    Expenses(FilterOutcome<Expense>),
    Payroll(FilterOutcome<PayrollRow>),
}

/// Build a dashboard snapshot from a JSON string.
pub fn summarize_dashboard_str(
    payload_json: &str,
    filters: &DashboardFilters,
    now: DateTime<Utc>,
    config: &ClinicConfig,
) -> Result<DashboardSnapshot, ClinicError> {
    let value: Value =
        serde_json::from_str(payload_json).map_err(|err| ClinicError::Parse(err.to_string()))?;
    summarize_dashboard_value(&value, filters, now, config)
}

/// Build a dashboard snapshot from an object keyed by collection name.
/// Missing collections are treated as empty.
pub fn summarize_dashboard_value(
    payload: &Value,
    filters: &DashboardFilters,
    now: DateTime<Utc>,
    config: &ClinicConfig,
) -> Result<DashboardSnapshot, ClinicError> {
    let payload = payload.as_object().ok_or(ClinicError::MissingData)?;
    let criteria = filters.criteria(config);

    let appointments = parse_appointments(collection(payload, CollectionKind::Appointments)?);
    let lab_orders = parse_lab_orders(collection(payload, CollectionKind::LabOrders)?, config);
    let studies = parse_studies(collection(payload, CollectionKind::Studies)?);
    let expenses = parse_expenses(collection(payload, CollectionKind::Expenses)?);
    let payroll = parse_payroll(collection(payload, CollectionKind::Payroll)?);

    let lab_orders = apply_criteria(&lab_orders, &criteria, now)?;
    let overdue_lab_orders = count_overdue(&lab_orders.records, now);
    let expense_measure = Measure::per_record(|expense: &Expense| Some(expense.amount));
    let payroll_measure = net_salary_measure(config.payroll);

    Ok(DashboardSnapshot {
        generated_at: now,
        appointments: apply_criteria(&appointments, &criteria, now)?,
        lab_orders,
        overdue_lab_orders,
        studies: apply_criteria(&studies, &criteria, now)?,
        expenses: apply_criteria_with(&expenses, &criteria, now, Some(&expense_measure))?,
        payroll: apply_criteria_with(&payroll, &criteria, now, Some(&payroll_measure))?,
    })
}

/// Search every collection of a dashboard payload at once.
///
/// The term is matched against every field a record exposes; the window
/// falls back to [`ClinicConfig::default_window`].
pub fn search_payload_value(
    payload: &Value,
    filters: &DashboardFilters,
    now: DateTime<Utc>,
    config: &ClinicConfig,
) -> Result<Vec<ClinicRecord>, ClinicError> {
    let payload = payload.as_object().ok_or(ClinicError::MissingData)?;

    let mut records: Vec<ClinicRecord> = Vec::new();
    records.extend(
        parse_appointments(collection(payload, CollectionKind::Appointments)?)
            .into_iter()
            .map(ClinicRecord::Appointment),
    );
    records.extend(
        parse_lab_orders(collection(payload, CollectionKind::LabOrders)?, config)
            .into_iter()
            .map(ClinicRecord::LabOrder),
    );
    records.extend(
        parse_studies(collection(payload, CollectionKind::Studies)?)
            .into_iter()
            .map(ClinicRecord::Study),
    );
    records.extend(
        parse_expenses(collection(payload, CollectionKind::Expenses)?)
            .into_iter()
            .map(ClinicRecord::Expense),
    );
    records.extend(
        parse_payroll(collection(payload, CollectionKind::Payroll)?)
            .into_iter()
            .map(ClinicRecord::Payroll),
    );

    let window = filters.time_window.unwrap_or(config.default_window);
    let every_field: [&str; 0] = [];
    let mut found = filter_by_search(
        &filter_by_time_window(&records, window, now),
        &filters.search_term,
        &every_field,
    )?;
    sort_records(&mut found, filters.sort);
    Ok(found)
}

/// Parse and filter a single collection. An unset window in `criteria`
/// falls back to [`ClinicConfig::default_window`].
pub fn filter_collection_value(
    kind: CollectionKind,
    records: &Value,
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
    config: &ClinicConfig,
) -> Result<CollectionOutcome, ClinicError> {
    let items = entries(records)?;
    let criteria = &criteria.with_default_window(config.default_window);
    let outcome = match kind {
        CollectionKind::Appointments => CollectionOutcome::Appointments(apply_criteria(
            &parse_appointments(items),
            criteria,
            now,
        )?),
        CollectionKind::LabOrders => CollectionOutcome::LabOrders(apply_criteria(
            &parse_lab_orders(items, config),
            criteria,
            now,
        )?),
        CollectionKind::Studies => {
            CollectionOutcome::Studies(apply_criteria(&parse_studies(items), criteria, now)?)
        }
        CollectionKind::Expenses => {
            let measure = Measure::per_record(|expense: &Expense| Some(expense.amount));
            CollectionOutcome::Expenses(apply_criteria_with(
                &parse_expenses(items),
                criteria,
                now,
                Some(&measure),
            )?)
        }
        CollectionKind::Payroll => {
            let measure = net_salary_measure(config.payroll);
            CollectionOutcome::Payroll(apply_criteria_with(
                &parse_payroll(items),
                criteria,
                now,
                Some(&measure),
            )?)
        }
    };
    Ok(outcome)
}

fn collection(
    payload: &Map<String, Value>,
    kind: CollectionKind,
) -> Result<&[Value], ClinicError> {
    match payload.get(kind.payload_key()) {
        None | Some(Value::Null) => Ok(&[]),
        Some(value) => entries(value),
    }
}

/// Accept a bare array or the backend's `{ "data": [...] }` envelope.
fn entries(value: &Value) -> Result<&[Value], ClinicError> {
    let array = match value {
        Value::Array(items) => items,
        Value::Object(obj) => obj
            .get("data")
            .and_then(Value::as_array)
            .ok_or(ClinicError::MissingData)?,
        other => {
            return Err(ClinicError::Parse(format!(
                "expected an array of records, received {}",
                json_type(other)
            )))
        }
    };
    Ok(array.as_slice())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Objects in `items` that carry an id, paired with it. Others are logged
/// and skipped.
fn identified<'a>(
    items: &'a [Value],
    collection: &'static str,
    id_keys: &[&str],
) -> Vec<(String, &'a Map<String, Value>)> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let Some(obj) = item.as_object() else {
                warn!(collection, index, "skipping non-object entry");
                return None;
            };
            match extract_string(obj, id_keys) {
                Some(id) => Some((id, obj)),
                None => {
                    warn!(collection, index, "skipping record without id");
                    None
                }
            }
        })
        .collect()
}

pub fn parse_appointments(items: &[Value]) -> Vec<Appointment> {
    identified(items, "appointments", &["id", "appointment_id"])
        .into_iter()
        .map(|(id, obj)| {
            let scheduled_at = extract_datetime_with_time(
                obj,
                &["appointment_date", "date", "scheduled_at"],
                &["appointment_time", "time"],
            );
            Appointment {
                status: extract_status(obj, &["status"], &id),
                patient: extract_string(obj, &["patient_name", "patient"]).unwrap_or_default(),
                dentist: extract_string(obj, &["dentist_name", "dentist", "doctor_name"]),
                reason: extract_string(obj, &["reason", "treatment", "notes"]),
                scheduled_at,
                id,
            }
        })
        .collect()
}

pub fn parse_lab_orders(items: &[Value], config: &ClinicConfig) -> Vec<LabOrder> {
    identified(items, "lab_orders", &["id", "order_id"])
        .into_iter()
        .map(|(id, obj)| LabOrder {
            patient: extract_string(obj, &["patient_name", "patient"]).unwrap_or_default(),
            dentist: extract_string(obj, &["dentist_name", "dentist"]),
            work_type: extract_string(obj, &["work_type", "order_type", "type"])
                .unwrap_or_else(|| "Lab work".to_string()),
            priority: extract_string(obj, &["priority"]),
            order_date: extract_datetime(obj, &["order_date", "created_at"]),
            due_date: extract_datetime(obj, &["due_date", "delivery_date"]),
            tracking: obj
                .get("tracking")
                .or_else(|| obj.get("tracking_status"))
                .map(|value| parse_tracking(value, config, &id))
                .unwrap_or_else(|| config.empty_lab_checklist()),
            id,
        })
        .collect()
}

pub fn parse_studies(items: &[Value]) -> Vec<Study> {
    identified(items, "studies", &["id", "study_id", "study_uid"])
        .into_iter()
        .map(|(id, obj)| Study {
            patient: extract_string(obj, &["patient_name", "patient"]).unwrap_or_default(),
            modality: extract_string(obj, &["modality"]),
            description: extract_string(obj, &["description", "study_description"]),
            study_date: extract_datetime(obj, &["study_date", "date"]),
            status: extract_status::<StudyStatus>(obj, &["status"], &id),
            id,
        })
        .collect()
}

pub fn parse_expenses(items: &[Value]) -> Vec<Expense> {
    identified(items, "expenses", &["id", "expense_id"])
        .into_iter()
        .map(|(id, obj)| Expense {
            title: extract_string(obj, &["title", "description"]).unwrap_or_default(),
            category: extract_string(obj, &["category"]),
            amount: extract_number(obj, &["amount"]).unwrap_or_else(|| {
                debug!(record = %id, "expense without a numeric amount");
                0.0
            }),
            spent_on: extract_datetime(obj, &["expense_date", "date"]),
            status: extract_status::<ExpenseStatus>(obj, &["status"], &id),
            id,
        })
        .collect()
}

pub fn parse_payroll(items: &[Value]) -> Vec<PayrollRow> {
    identified(items, "payroll", &["id", "payroll_id"])
        .into_iter()
        .map(|(id, obj)| PayrollRow {
            employee_id: extract_string(obj, &["employee_id", "staff_id"])
                .unwrap_or_else(|| id.clone()),
            employee_name: extract_string(obj, &["employee_name", "name"]).unwrap_or_default(),
            role: extract_string(obj, &["role"]),
            pay_date: extract_datetime(obj, &["pay_date", "date", "month"]),
            basic_salary: extract_number(obj, &["basic_salary", "basic"]).unwrap_or(0.0),
            allowances: extract_number(obj, &["allowances"]).unwrap_or(0.0),
            overtime: extract_number(obj, &["overtime", "ot_amount"]).unwrap_or(0.0),
            deductions: extract_number(obj, &["deductions"]).unwrap_or(0.0),
            status: extract_status::<PayrollStatus>(obj, &["status"], &id),
            id,
        })
        .collect()
}

/// Tracking arrives either as `{ "Stage": bool, ... }` or as an array of
/// `{ "name"|"stage": .., "done"|"completed": bool }`.
fn parse_tracking(value: &Value, config: &ClinicConfig, id: &str) -> Checklist {
    let mut flags: Vec<(String, bool)> = match value {
        Value::Object(obj) => obj
            .iter()
            .map(|(name, done)| (name.clone(), done.as_bool().unwrap_or(false)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                let name = extract_string(obj, &["name", "stage"])?;
                let done = ["done", "completed"]
                    .iter()
                    .find_map(|key| obj.get(*key).and_then(Value::as_bool))
                    .unwrap_or(false);
                Some((name, done))
            })
            .collect(),
        _ => {
            debug!(record = %id, "unreadable tracking, using empty checklist");
            return config.empty_lab_checklist();
        }
    };

    // configured stages first, in pipeline order, then anything extra
    let mut ordered = Vec::with_capacity(flags.len().max(config.lab_stages.len()));
    for stage in &config.lab_stages {
        let done = flags
            .iter()
            .position(|(name, _)| name == stage)
            .map(|index| flags.remove(index).1)
            .unwrap_or(false);
        ordered.push((stage.clone(), done));
    }
    ordered.extend(flags);

    Checklist::from_flags(ordered, &config.terminal_stage)
}

fn extract_status<S: StatusKind>(
    obj: &Map<String, Value>,
    keys: &[&str],
    id: &str,
) -> Option<S> {
    let raw = extract_string(obj, keys)?;
    let status = S::parse(&raw);
    if status.is_none() {
        debug!(record = %id, status = %raw, kind = S::KIND, "unrecognised status");
    }
    status
}

/// First key holding a non-blank string or a number.
fn extract_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// First key holding a number or a numeric string.
fn extract_number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite()),
        _ => None,
    })
}

fn extract_datetime(obj: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::String(text) => parse_datetime(text),
        Value::Number(number) => number
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    })
}

/// Date keys optionally completed by a separate time-of-day key. The time is
/// only applied when the date itself carries none.
fn extract_datetime_with_time(
    obj: &Map<String, Value>,
    date_keys: &[&str],
    time_keys: &[&str],
) -> Option<DateTime<Utc>> {
    let date_only = date_keys.iter().find_map(|key| {
        obj.get(*key)
            .and_then(Value::as_str)
            .and_then(|text| NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok())
    });

    if let Some(date) = date_only {
        let time = time_keys
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str).and_then(parse_time))
            .unwrap_or_default();
        return Some(date.and_time(time).and_utc());
    }

    extract_datetime(obj, date_keys)
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// RFC 3339, naive date-times (taken as UTC) or bare dates (midnight UTC).
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::AppointmentStatus;
    use serde_json::json;

    #[test]
    fn parses_common_date_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 4, 2, 9, 15, 0).unwrap();
        assert_eq!(parse_datetime("2024-04-02T09:15:00Z"), Some(expected));
        assert_eq!(parse_datetime("2024-04-02T14:45:00+05:30"), Some(expected));
        assert_eq!(parse_datetime("2024-04-02 09:15:00"), Some(expected));
        assert_eq!(parse_datetime("2024-04-02T09:15"), Some(expected));
        assert_eq!(
            parse_datetime("2024-04-02"),
            Some(Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_datetime("02/04/2024"), None);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn appointment_date_and_time_combine() {
        let items = vec![json!({
            "appointment_id": 17,
            "patient_name": "Sunil",
            "appointment_date": "2024-04-02",
            "appointment_time": "09:15",
            "status": "Confirmed"
        })];
        let parsed = parse_appointments(&items);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "17");
        assert_eq!(
            parsed[0].scheduled_at,
            Some(Utc.with_ymd_and_hms(2024, 4, 2, 9, 15, 0).unwrap())
        );
        assert_eq!(parsed[0].status, Some(AppointmentStatus::Confirmed));
    }

    #[test]
    fn malformed_fields_degrade_instead_of_failing() {
        let items = vec![
            json!({ "id": "A-1", "patient_name": "X", "date": "not a date", "status": "lost" }),
            json!({ "patient_name": "no id" }),
            json!("garbage"),
        ];
        let parsed = parse_appointments(&items);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].scheduled_at, None);
        assert_eq!(parsed[0].status, None);
    }

    #[test]
    fn tracking_object_follows_configured_order() {
        let config = ClinicConfig::default();
        let items = vec![json!({
            "order_id": "LO-3",
            "patient_name": "Dilani",
            "work_type": "Bridge",
            "tracking": {
                "Wax Up": true,
                "Model Poured": true,
                "Completed": false,
                "Courier": false
            }
        })];
        let orders = parse_lab_orders(&items, &config);
        let steps = orders[0].tracking.steps();
        assert_eq!(steps.len(), 10);
        assert_eq!(steps[1].name, "Model Poured");
        assert!(steps[1].done);
        assert_eq!(steps[9].name, "Courier");
        assert_eq!(
            clinic_core::derive_status(&orders[0].tracking),
            clinic_core::OrderStatus::InProgress
        );
    }

    #[test]
    fn tracking_array_shape_is_accepted() {
        let config = ClinicConfig {
            lab_stages: vec!["Scan".to_string()],
            ..ClinicConfig::default()
        };
        let tracking = json!([
            { "stage": "Scan", "completed": true },
            { "name": "Completed", "done": true }
        ]);
        let checklist = parse_tracking(&tracking, &config, "LO-1");
        assert_eq!(
            clinic_core::derive_status(&checklist),
            clinic_core::OrderStatus::Completed
        );
    }

    #[test]
    fn numbers_and_numeric_strings_are_amounts() {
        let items = vec![
            json!({ "id": 1, "title": "Lab Costs", "amount": "1,250.50" }),
            json!({ "id": 2, "title": "Office Supplies", "amount": 500 }),
        ];
        let expenses = parse_expenses(&items);
        assert_eq!(expenses[0].amount, 1250.5);
        assert_eq!(expenses[1].amount, 500.0);
    }

    #[test]
    fn non_finite_amount_strings_are_ignored() {
        let items = vec![
            json!({ "id": 1, "title": "Broken import", "amount": "NaN" }),
            json!({ "id": 2, "title": "Overflow", "amount": "inf" }),
            json!({ "id": 3, "title": "Gloves", "amount": "75.25" }),
        ];
        let expenses = parse_expenses(&items);
        assert_eq!(expenses[0].amount, 0.0);
        assert_eq!(expenses[1].amount, 0.0);

        let measure = Measure::per_record(|expense: &Expense| Some(expense.amount));
        let outcome =
            apply_criteria_with(&expenses, &FilterCriteria::default(), Utc::now(), Some(&measure))
                .unwrap();
        let numeric = outcome.stats.numeric.unwrap();
        assert_eq!(numeric.sum, 75.25);
        assert_eq!(numeric.max, Some(75.25));
    }

    #[test]
    fn single_collection_uses_configured_default_window() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
        let config = ClinicConfig {
            default_window: TimeWindow::Week,
            ..ClinicConfig::default()
        };
        let records = json!([
            { "id": "A-1", "patient_name": "Old", "date": "2024-02-24", "status": "completed" },
            { "id": "A-2", "patient_name": "New", "date": "2024-06-01", "status": "pending" }
        ]);
        let unset: FilterCriteria = serde_json::from_str("{}").unwrap();

        let outcome =
            filter_collection_value(CollectionKind::Appointments, &records, &unset, now, &config)
                .unwrap();
        let CollectionOutcome::Appointments(outcome) = outcome else {
            panic!("expected appointments outcome");
        };
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].id, "A-2");
        assert_eq!(outcome.stats.total, 1);

        // an explicit window still wins over the configured one
        let overall = FilterCriteria {
            time_window: Some(TimeWindow::All),
            ..FilterCriteria::default()
        };
        let outcome =
            filter_collection_value(CollectionKind::Appointments, &records, &overall, now, &config)
                .unwrap();
        let CollectionOutcome::Appointments(outcome) = outcome else {
            panic!("expected appointments outcome");
        };
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn collection_kind_accepts_dashes() {
        assert_eq!("lab-orders".parse::<CollectionKind>(), Ok(CollectionKind::LabOrders));
        assert!("invoices".parse::<CollectionKind>().is_err());
    }

    #[test]
    fn non_object_payload_is_missing_data() {
        let result = summarize_dashboard_value(
            &json!([1, 2, 3]),
            &DashboardFilters::default(),
            Utc::now(),
            &ClinicConfig::default(),
        );
        assert_eq!(result.unwrap_err(), ClinicError::MissingData);
    }

    #[test]
    fn envelope_without_data_is_missing_data() {
        let result = filter_collection_value(
            CollectionKind::Studies,
            &json!({ "items": [] }),
            &FilterCriteria::default(),
            Utc::now(),
            &ClinicConfig::default(),
        );
        assert_eq!(result.unwrap_err(), ClinicError::MissingData);
    }
}
