//! Relative time windows anchored at a caller-supplied `now`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::ClinicError;

/// A look-back window. Month and year are fixed 30 and 365 day spans.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "String", into = "String")]
pub enum TimeWindow {
    #[default]
    All,
    Day,
    ThreeDays,
    Week,
    Month,
    Year,
}

impl TimeWindow {
    /// Window length in days; `None` for [`TimeWindow::All`].
    pub fn days(self) -> Option<i64> {
        match self {
            TimeWindow::All => None,
            TimeWindow::Day => Some(1),
            TimeWindow::ThreeDays => Some(3),
            TimeWindow::Week => Some(7),
            TimeWindow::Month => Some(30),
            TimeWindow::Year => Some(365),
        }
    }

    /// Canonical token.
    pub fn as_token(self) -> &'static str {
        match self {
            TimeWindow::All => "ALL",
            TimeWindow::Day => "1D",
            TimeWindow::ThreeDays => "3D",
            TimeWindow::Week => "1W",
            TimeWindow::Month => "1M",
            TimeWindow::Year => "1Y",
        }
    }

    /// Whether `date` lies in `[now - days, now]`. Undated records only pass
    /// the unbounded window.
    pub fn contains(self, date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(days) = self.days() else {
            return true;
        };
        let Some(date) = date else {
            return false;
        };
        let start = now - Duration::days(days);
        start <= date && date <= now
    }
}

impl FromStr for TimeWindow {
    type Err = ClinicError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "all" | "overall" => Ok(TimeWindow::All),
            "1d" | "day" => Ok(TimeWindow::Day),
            "3d" => Ok(TimeWindow::ThreeDays),
            "1w" | "week" => Ok(TimeWindow::Week),
            "1m" | "month" => Ok(TimeWindow::Month),
            "1y" | "year" => Ok(TimeWindow::Year),
            _ => Err(ClinicError::UnknownTimeWindow(token.to_string())),
        }
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = ClinicError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        token.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(window: TimeWindow) -> Self {
        window.as_token().to_string()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Records whose date falls inside `window`, in their original order.
pub fn filter_by_time_window<R: Record + Clone>(
    records: &[R],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Vec<R> {
    records
        .iter()
        .filter(|record| window.contains(record.date(), now))
        .cloned()
        .collect()
}
