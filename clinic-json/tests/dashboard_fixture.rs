use std::fs;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use clinic_core::{ClinicConfig, ClinicRecord, FilterCriteria, Record, TimeWindow};
use clinic_json::{
    filter_collection_value, search_payload_value, summarize_dashboard_str, CollectionKind,
    CollectionOutcome, DashboardFilters, DashboardSnapshot,
};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap()
}

fn snapshot(filters: DashboardFilters) -> DashboardSnapshot {
    let payload = fs::read_to_string(fixture_path("clinic_payload.json"))
        .expect("fixture payload should be readable");
    summarize_dashboard_str(&payload, &filters, now(), &ClinicConfig::default())
        .expect("fixture payload should summarize")
}

fn ids<'a>(iter: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    iter.collect()
}

#[test]
fn overall_view_keeps_every_identified_record() {
    let snapshot = snapshot(DashboardFilters::default());

    let appointments = &snapshot.appointments;
    assert_eq!(
        ids(appointments.records.iter().map(|a| a.id.as_str())),
        vec!["101", "102", "103", "104", "105"]
    );
    assert_eq!(appointments.stats.total, 5);
    assert_eq!(appointments.stats.count("completed"), 1);
    assert_eq!(appointments.stats.count("confirmed"), 2);
    assert_eq!(appointments.stats.count("pending"), 1);
    assert_eq!(appointments.stats.count("canceled"), 1);
    assert_eq!(appointments.stats.unknown, 0);

    assert_eq!(snapshot.lab_orders.stats.total, 3);
    assert_eq!(snapshot.lab_orders.stats.count("pending"), 1);
    assert_eq!(snapshot.lab_orders.stats.count("in_progress"), 1);
    assert_eq!(snapshot.lab_orders.stats.count("completed"), 1);
    assert_eq!(snapshot.overdue_lab_orders, 1);

    assert_eq!(snapshot.studies.stats.total, 3);
    assert_eq!(snapshot.studies.stats.unknown, 1);
}

#[test]
fn week_view_matches_dashboard_counters() {
    let snapshot = snapshot(DashboardFilters {
        time_window: Some(TimeWindow::Week),
        ..DashboardFilters::default()
    });

    let appointments = &snapshot.appointments;
    assert_eq!(
        ids(appointments.records.iter().map(|a| a.id.as_str())),
        vec!["101", "102"]
    );
    assert_eq!(appointments.stats.total, 2);
    assert_eq!(appointments.stats.count("completed"), 1);
    assert_eq!(appointments.stats.count("confirmed"), 1);
    assert_eq!(appointments.stats.count("pending"), 0);
    assert_eq!(appointments.stats.count("canceled"), 0);

    // LO-3 is due in the future, outside a look-back window
    assert_eq!(
        ids(snapshot.lab_orders.records.iter().map(|o| o.id.as_str())),
        vec!["LO-2", "LO-1"]
    );
    assert_eq!(snapshot.overdue_lab_orders, 1);

    assert_eq!(snapshot.expenses.stats.total, 2);
    assert_eq!(snapshot.payroll.stats.total, 2);
}

#[test]
fn money_aggregates() {
    let snapshot = snapshot(DashboardFilters::default());

    let expenses = snapshot.expenses.stats.numeric.expect("expense totals");
    assert!((expenses.sum - 4750.5).abs() < 1e-9);
    assert!((expenses.average - 1583.5).abs() < 1e-9);
    assert_eq!(expenses.max, Some(3000.0));

    // EMP-1 paid twice, EMP-2 once: average is per employee
    let payroll = snapshot.payroll.stats.numeric.expect("payroll totals");
    assert!((payroll.sum - 127_600.0).abs() < 1e-9);
    assert_eq!(payroll.entities, 2);
    assert!((payroll.average - 63_800.0).abs() < 1e-9);
}

#[test]
fn search_applies_to_every_section() {
    let snapshot = snapshot(DashboardFilters {
        search_term: "kamala".to_string(),
        ..DashboardFilters::default()
    });
    assert_eq!(snapshot.appointments.records.len(), 1);
    assert_eq!(snapshot.lab_orders.records.len(), 1);
    assert_eq!(snapshot.studies.records.len(), 1);
    assert!(snapshot.expenses.records.is_empty());
    assert!(snapshot.payroll.records.is_empty());
}

#[test]
fn global_search_spans_every_collection() {
    let payload: Value = serde_json::from_str(
        &fs::read_to_string(fixture_path("clinic_payload.json")).expect("fixture"),
    )
    .expect("valid json");

    let found = search_payload_value(
        &payload,
        &DashboardFilters {
            search_term: "kamala".to_string(),
            ..DashboardFilters::default()
        },
        now(),
        &ClinicConfig::default(),
    )
    .expect("payload should search");

    assert_eq!(ids(found.iter().map(Record::id)), vec!["102", "LO-2", "S-2"]);
    assert!(matches!(found[0], ClinicRecord::Appointment(_)));
    assert!(matches!(found[1], ClinicRecord::LabOrder(_)));
    assert!(matches!(found[2], ClinicRecord::Study(_)));

    let tagged = serde_json::to_value(&found).expect("serializable records");
    assert_eq!(tagged[1]["kind"], "lab_order");

    // amounts are searchable as their canonical text
    let found = search_payload_value(
        &payload,
        &DashboardFilters {
            search_term: "500".to_string(),
            time_window: Some(TimeWindow::Week),
            ..DashboardFilters::default()
        },
        now(),
        &ClinicConfig::default(),
    )
    .expect("payload should search");
    assert!(found
        .iter()
        .any(|record| matches!(record, ClinicRecord::Expense(e) if e.amount == 500.0)));
}

#[test]
fn single_collection_filter_by_title() {
    let payload: Value = serde_json::from_str(
        &fs::read_to_string(fixture_path("clinic_payload.json")).expect("fixture"),
    )
    .expect("valid json");

    let criteria = FilterCriteria {
        search_term: "lab".to_string(),
        search_fields: vec!["title".to_string()],
        ..FilterCriteria::default()
    };
    let outcome = filter_collection_value(
        CollectionKind::Expenses,
        &payload["expenses"],
        &criteria,
        now(),
        &ClinicConfig::default(),
    )
    .expect("expenses should filter");

    let CollectionOutcome::Expenses(outcome) = outcome else {
        panic!("expected expenses outcome");
    };
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].title, "Lab Costs");
}

#[test]
fn snapshot_serializes_with_stable_keys() {
    let snapshot = snapshot(DashboardFilters::default());
    let value = serde_json::to_value(&snapshot).expect("serializable snapshot");

    assert_eq!(value["generated_at"], "2024-06-03T10:00:00Z");
    assert_eq!(value["appointments"]["stats"]["by_status"]["canceled"], 1);
    assert_eq!(value["lab_orders"]["records"][0]["id"], "LO-3");
    // newest study carries a status the backend invented
    assert_eq!(value["studies"]["records"][0]["id"], "S-3");
    assert!(value["studies"]["records"][0]["status"].is_null());
}
