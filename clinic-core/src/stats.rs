//! Dashboard counters: records per status plus optional numeric aggregates.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::record::{HasStatus, StatusKind};

/// Counts over a filtered record set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateStats {
    pub total: usize,
    /// Every member of the status enumeration, zero when absent.
    pub by_status: BTreeMap<String, usize>,
    /// Records with a missing or unrecognised status.
    pub unknown: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStats>,
}

impl AggregateStats {
    pub fn count(&self, status: &str) -> usize {
        self.by_status.get(status).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericStats {
    pub sum: f64,
    /// `sum / entities`, or 0 when nothing was measured.
    pub average: f64,
    pub max: Option<f64>,
    /// Distinct entities contributing a value.
    pub entities: usize,
}

/// Which number to aggregate and what counts as one entity for the average.
pub struct Measure<'a, R> {
    value: Box<dyn Fn(&R) -> Option<f64> + 'a>,
    entity: Option<Box<dyn Fn(&R) -> String + 'a>>,
}

impl<'a, R> Measure<'a, R> {
    /// Average over records that carry a value.
    pub fn per_record(value: impl Fn(&R) -> Option<f64> + 'a) -> Self {
        Self {
            value: Box::new(value),
            entity: None,
        }
    }

    /// Average over distinct `entity` keys, e.g. employee id for payroll rows.
    pub fn per_entity(
        value: impl Fn(&R) -> Option<f64> + 'a,
        entity: impl Fn(&R) -> String + 'a,
    ) -> Self {
        Self {
            value: Box::new(value),
            entity: Some(Box::new(entity)),
        }
    }
}

/// Status breakdown of `records`, with numeric aggregates when `measure` is
/// given.
pub fn compute_stats<R: HasStatus>(
    records: &[R],
    measure: Option<&Measure<'_, R>>,
) -> AggregateStats {
    let mut by_status: BTreeMap<String, usize> = <R::Status as StatusKind>::ALL
        .iter()
        .map(|status| (status.as_str().to_string(), 0))
        .collect();
    let mut unknown = 0;

    for record in records {
        match record.status() {
            Some(status) => *by_status.entry(status.as_str().to_string()).or_insert(0) += 1,
            None => unknown += 1,
        }
    }

    AggregateStats {
        total: records.len(),
        by_status,
        unknown,
        numeric: measure.map(|measure| numeric_stats(records, measure)),
    }
}

fn numeric_stats<R>(records: &[R], measure: &Measure<'_, R>) -> NumericStats {
    let mut sum = 0.0;
    let mut max: Option<f64> = None;
    let mut measured = 0usize;
    let mut entities = HashSet::new();

    for record in records {
        let Some(value) = (measure.value)(record) else {
            continue;
        };
        sum += value;
        measured += 1;
        max = Some(max.map_or(value, |current| current.max(value)));
        if let Some(entity) = &measure.entity {
            entities.insert(entity(record));
        }
    }

    let divisor = if measure.entity.is_some() {
        entities.len()
    } else {
        measured
    };

    NumericStats {
        sum,
        average: if divisor == 0 { 0.0 } else { sum / divisor as f64 },
        max,
        entities: divisor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Appointment, AppointmentStatus, PayrollRow, PayrollStatus};

    fn appointment(id: &str, status: Option<AppointmentStatus>) -> Appointment {
        Appointment {
            id: id.to_string(),
            patient: "Patient".to_string(),
            dentist: None,
            reason: None,
            scheduled_at: None,
            status,
        }
    }

    fn payroll(id: &str, employee: &str, basic: f64) -> PayrollRow {
        PayrollRow {
            id: id.to_string(),
            employee_id: employee.to_string(),
            employee_name: employee.to_string(),
            role: None,
            pay_date: None,
            basic_salary: basic,
            allowances: 0.0,
            overtime: 0.0,
            deductions: 0.0,
            status: Some(PayrollStatus::Paid),
        }
    }

    #[test]
    fn every_status_is_reported() {
        let stats = compute_stats(
            &[
                appointment("1", Some(AppointmentStatus::Completed)),
                appointment("2", Some(AppointmentStatus::Completed)),
                appointment("3", None),
            ],
            None,
        );
        assert_eq!(stats.total, 3);
        assert_eq!(stats.count("completed"), 2);
        assert_eq!(stats.count("pending"), 0);
        assert_eq!(stats.by_status.len(), 4);
        assert_eq!(stats.unknown, 1);
        assert!(stats.numeric.is_none());
    }

    #[test]
    fn average_is_per_distinct_entity() {
        let rows = vec![
            payroll("P-1", "EMP-1", 1000.0),
            payroll("P-2", "EMP-1", 1000.0),
            payroll("P-3", "EMP-2", 2000.0),
        ];
        let measure = Measure::per_entity(
            |row: &PayrollRow| Some(row.basic_salary),
            |row: &PayrollRow| row.employee_id.clone(),
        );
        let numeric = compute_stats(&rows, Some(&measure)).numeric.unwrap();
        assert_eq!(numeric.sum, 4000.0);
        assert_eq!(numeric.entities, 2);
        assert_eq!(numeric.average, 2000.0);
        assert_eq!(numeric.max, Some(2000.0));

        let per_row = Measure::per_record(|row: &PayrollRow| Some(row.basic_salary));
        let numeric = compute_stats(&rows, Some(&per_row)).numeric.unwrap();
        assert!((numeric.average - 4000.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_averages_to_zero() {
        let rows: Vec<PayrollRow> = Vec::new();
        let measure = Measure::per_record(|row: &PayrollRow| Some(row.basic_salary));
        let stats = compute_stats(&rows, Some(&measure));
        assert_eq!(stats.total, 0);
        let numeric = stats.numeric.unwrap();
        assert_eq!(numeric.average, 0.0);
        assert_eq!(numeric.max, None);
    }
}
