//! User-chosen filters combined into one pass, plus display ordering.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{HasStatus, Record, Searchable, StatusKind};
use crate::search::{matches_needle, validate_fields};
use crate::stats::{compute_stats, AggregateStats, Measure};
use crate::window::TimeWindow;
use crate::ClinicError;

/// Everything a list view lets the user pick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterCriteria {
    /// Unset means the caller's default window, or ALL in [`apply_criteria`].
    pub time_window: Option<TimeWindow>,
    /// `all` or one status of the record family.
    pub status: String,
    pub search_term: String,
    /// Fields to search; empty means every searchable field.
    pub search_fields: Vec<String>,
    pub category: Option<CategoryFilter>,
    pub sort: SortOrder,
}

impl FilterCriteria {
    /// Fill an unset window with `default`.
    pub fn with_default_window(&self, default: TimeWindow) -> FilterCriteria {
        FilterCriteria {
            time_window: Some(self.time_window.unwrap_or(default)),
            ..self.clone()
        }
    }
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            time_window: None,
            status: "all".to_string(),
            search_term: String::new(),
            search_fields: Vec::new(),
            category: None,
            sort: SortOrder::default(),
        }
    }
}

/// Exact match on the canonical string of one field (modality, priority...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryFilter {
    pub field: String,
    pub value: String,
}

impl CategoryFilter {
    pub fn matches<R: Searchable>(&self, record: &R) -> bool {
        record
            .field(&self.field)
            .map(|value| value.canonical() == self.value.as_str())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Keep input order.
    None,
    DateAsc,
    #[default]
    DateDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter<S> {
    All,
    Only(S),
}

impl<S: StatusKind> StatusFilter<S> {
    /// `all` (or blank) selects everything; anything else must name a status.
    pub fn parse(token: &str) -> Result<Self, ClinicError> {
        let trimmed = token.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        S::parse(trimmed)
            .map(StatusFilter::Only)
            .ok_or_else(|| ClinicError::UnknownStatus {
                kind: S::KIND,
                value: token.to_string(),
            })
    }

    /// Unknown statuses only pass [`StatusFilter::All`].
    pub fn matches(&self, status: Option<S>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == Some(*wanted),
        }
    }
}

/// Display list plus counters for the same view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterOutcome<R> {
    pub records: Vec<R>,
    /// Computed before the status filter, so every status tab keeps its count.
    pub stats: AggregateStats,
}

/// Apply `criteria` to `records` as of `now`.
pub fn apply_criteria<R>(
    records: &[R],
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> Result<FilterOutcome<R>, ClinicError>
where
    R: Record + Searchable + HasStatus + Clone,
{
    apply_criteria_with(records, criteria, now, None)
}

/// Like [`apply_criteria`], also aggregating `measure` over the scoped set.
pub fn apply_criteria_with<R>(
    records: &[R],
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
    measure: Option<&Measure<'_, R>>,
) -> Result<FilterOutcome<R>, ClinicError>
where
    R: Record + Searchable + HasStatus + Clone,
{
    let status = StatusFilter::<R::Status>::parse(&criteria.status)?;
    validate_fields::<R, String>(&criteria.search_fields)?;
    if let Some(category) = &criteria.category {
        validate_fields::<R, &str>(&[category.field.as_str()])?;
    }

    let window = criteria.time_window.unwrap_or_default();
    let needle = criteria.search_term.trim().to_lowercase();
    let scoped: Vec<R> = records
        .iter()
        .filter(|record| window.contains(record.date(), now))
        .filter(|record| {
            criteria
                .category
                .as_ref()
                .map_or(true, |category| category.matches(*record))
        })
        .filter(|record| {
            needle.is_empty()
                || matches_needle(*record, &needle, criteria.search_fields.as_slice())
        })
        .cloned()
        .collect();

    let stats = compute_stats(&scoped, measure);

    let mut records: Vec<R> = scoped
        .into_iter()
        .filter(|record| status.matches(record.status()))
        .collect();
    sort_records(&mut records, criteria.sort);

    Ok(FilterOutcome { records, stats })
}

/// Stable sort by date, ties by id; undated records always go last.
pub fn sort_records<R: Record>(records: &mut [R], order: SortOrder) {
    let descending = match order {
        SortOrder::None => return,
        SortOrder::DateAsc => false,
        SortOrder::DateDesc => true,
    };
    records.sort_by(|a, b| compare_by_date(a, b, descending));
}

fn compare_by_date<R: Record>(a: &R, b: &R, descending: bool) -> Ordering {
    let by_date = match (a.date(), b.date()) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| a.id().cmp(b.id()))
}
