//! Framework-neutral WASM <-> JavaScript bridge for the clinic filter engine.

use chrono::{DateTime, Utc};
use clinic_core::{
    derive_status, Checklist, ClinicConfig, ClinicError, FilterCriteria, PayrollRates,
};
use clinic_json::{parse_datetime, CollectionKind, DashboardFilters};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsClinicConfig {
    #[serde(default)]
    epf_employee: Option<f64>,
    #[serde(default)]
    epf_employer: Option<f64>,
    #[serde(default)]
    etf: Option<f64>,
    #[serde(default)]
    lab_stages: Option<Vec<String>>,
    #[serde(default)]
    terminal_stage: Option<String>,
    #[serde(default)]
    default_window: Option<String>,
}

impl TryFrom<JsClinicConfig> for ClinicConfig {
    type Error = ClinicError;

    fn try_from(cfg: JsClinicConfig) -> Result<Self, Self::Error> {
        let mut base = ClinicConfig::default();
        let defaults = PayrollRates::default();
        base.payroll = PayrollRates {
            epf_employee: cfg.epf_employee.unwrap_or(defaults.epf_employee),
            epf_employer: cfg.epf_employer.unwrap_or(defaults.epf_employer),
            etf: cfg.etf.unwrap_or(defaults.etf),
        };
        if let Some(stages) = cfg.lab_stages {
            base.lab_stages = stages;
        }
        if let Some(terminal) = cfg.terminal_stage {
            base.terminal_stage = terminal;
        }
        if let Some(window) = cfg.default_window {
            base.default_window = window.parse()?;
        }
        Ok(base)
    }
}

#[derive(Serialize)]
struct ToggleResult {
    checklist: Checklist,
    status: clinic_core::OrderStatus,
}

#[wasm_bindgen]
pub fn summarize_dashboard(
    payload: JsValue,
    filters: Option<JsValue>,
    now: Option<String>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let payload_value = from_value::<serde_json::Value>(payload)
        .map_err(|err| JsValue::from_str(&format!("Could not read payload JSON: {err}")))?;
    let filters = read_filters(filters)?;
    let cfg = read_config(config)?;
    let now = read_now(now)?;

    let snapshot = clinic_json::summarize_dashboard_value(&payload_value, &filters, now, &cfg)
        .map_err(|err| JsValue::from_str(&format_clinic_error(err)))?;

    to_js(&snapshot)
}

#[wasm_bindgen]
pub fn filter_collection(
    kind: &str,
    records: JsValue,
    criteria: Option<JsValue>,
    now: Option<String>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let kind: CollectionKind = kind
        .parse()
        .map_err(|err| JsValue::from_str(&format_clinic_error(err)))?;
    let records_value = from_value::<serde_json::Value>(records)
        .map_err(|err| JsValue::from_str(&format!("Could not read records JSON: {err}")))?;
    let criteria = match criteria {
        Some(js_criteria) => from_value::<FilterCriteria>(js_criteria)
            .map_err(|err| JsValue::from_str(&format!("Could not read criteria: {err}")))?,
        None => FilterCriteria::default(),
    };
    let cfg = read_config(config)?;
    let now = read_now(now)?;

    let outcome = clinic_json::filter_collection_value(kind, &records_value, &criteria, now, &cfg)
        .map_err(|err| JsValue::from_str(&format_clinic_error(err)))?;

    to_js(&outcome)
}

/// Records from every collection matching the filters' search term.
#[wasm_bindgen]
pub fn search_records(
    payload: JsValue,
    filters: Option<JsValue>,
    now: Option<String>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let payload_value = from_value::<serde_json::Value>(payload)
        .map_err(|err| JsValue::from_str(&format!("Could not read payload JSON: {err}")))?;
    let filters = read_filters(filters)?;
    let cfg = read_config(config)?;
    let now = read_now(now)?;

    let found = clinic_json::search_payload_value(&payload_value, &filters, now, &cfg)
        .map_err(|err| JsValue::from_str(&format_clinic_error(err)))?;

    to_js(&found)
}

/// Toggle one checkpoint; returns the new checklist and its derived status.
#[wasm_bindgen]
pub fn toggle_checkpoint(checklist: JsValue, name: &str, done: bool) -> Result<JsValue, JsValue> {
    let checklist: Checklist = from_value(checklist)
        .map_err(|err| JsValue::from_str(&format!("Could not read checklist: {err}")))?;
    let next = checklist
        .set(name, done)
        .map_err(|err| JsValue::from_str(&format_clinic_error(err)))?;

    to_js(&ToggleResult {
        status: derive_status(&next),
        checklist: next,
    })
}

fn read_filters(filters: Option<JsValue>) -> Result<DashboardFilters, JsValue> {
    match filters {
        Some(js_filters) => from_value::<DashboardFilters>(js_filters)
            .map_err(|err| JsValue::from_str(&format!("Could not read filters: {err}"))),
        None => Ok(DashboardFilters::default()),
    }
}

fn read_config(config: Option<JsValue>) -> Result<ClinicConfig, JsValue> {
    let Some(js_cfg) = config else {
        return Ok(ClinicConfig::default());
    };
    let cfg: JsClinicConfig = from_value(js_cfg)
        .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
    ClinicConfig::try_from(cfg).map_err(|err| JsValue::from_str(&format_clinic_error(err)))
}

fn read_now(now: Option<String>) -> Result<DateTime<Utc>, JsValue> {
    match now {
        Some(text) => parse_datetime(&text)
            .ok_or_else(|| JsValue::from_str(&format!("Could not read timestamp {text:?}"))),
        None => Ok(Utc::now()),
    }
}

/// Plain objects rather than JS `Map`s, so status buckets read like JSON.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&format!("Could not serialize result: {err}")))
}

fn format_clinic_error(err: ClinicError) -> String {
    format!("Clinic error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::TimeWindow;

    #[test]
    fn partial_js_config_overrides_defaults() {
        let cfg = ClinicConfig::try_from(JsClinicConfig {
            etf: Some(0.05),
            default_window: Some("month".to_string()),
            ..JsClinicConfig::default()
        })
        .unwrap();
        assert_eq!(cfg.payroll.etf, 0.05);
        assert_eq!(cfg.payroll.epf_employee, 0.08);
        assert_eq!(cfg.default_window, TimeWindow::Month);
        assert_eq!(cfg.lab_stages.len(), 9);
    }

    #[test]
    fn bad_window_in_js_config_is_rejected() {
        let result = ClinicConfig::try_from(JsClinicConfig {
            default_window: Some("quarter".to_string()),
            ..JsClinicConfig::default()
        });
        assert_eq!(
            result,
            Err(ClinicError::UnknownTimeWindow("quarter".to_string()))
        );
    }
}
