//! Close-price history and range windows.
//!
//! A series is always fetched and cached at its longest range; shorter
//! ranges are tail slices of the cached series.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::market_data::error::MarketDataError;
use crate::types::time::days_since_year_start;

/// Rows fetched on a history miss, the `2Y` window.
pub const MAX_HISTORY_ROWS: usize = 504;

/// Fraction of calendar days that are trading days, used for `YTD`.
const TRADING_DAY_RATIO: f64 = 0.7;

/// One daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
}

/// Requested look-back window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HistoryRange {
    /// One month, 21 rows
    #[serde(rename = "1M")]
    OneMonth,
    /// Three months, 63 rows
    #[serde(rename = "3M")]
    ThreeMonths,
    /// Six months, 126 rows
    #[default]
    #[serde(rename = "6M")]
    SixMonths,
    /// Year to date
    #[serde(rename = "YTD")]
    YearToDate,
    /// One year, 252 rows
    #[serde(rename = "1Y")]
    OneYear,
    /// Two years, 504 rows
    #[serde(rename = "2Y")]
    TwoYears,
}

impl HistoryRange {
    /// Query-string spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRange::OneMonth => "1M",
            HistoryRange::ThreeMonths => "3M",
            HistoryRange::SixMonths => "6M",
            HistoryRange::YearToDate => "YTD",
            HistoryRange::OneYear => "1Y",
            HistoryRange::TwoYears => "2Y",
        }
    }

    /// Number of rows the window covers as of `today`.
    ///
    /// `YTD` approximates trading days as 70% of the calendar days elapsed
    /// since January 1st, with a floor of one row.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use market_core::market_data::HistoryRange;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    /// assert_eq!(HistoryRange::OneYear.limit(today), 252);
    /// // 60 days elapsed -> 42 rows
    /// assert_eq!(HistoryRange::YearToDate.limit(today), 42);
    /// ```
    pub fn limit(&self, today: NaiveDate) -> usize {
        match self {
            HistoryRange::OneMonth => 21,
            HistoryRange::ThreeMonths => 63,
            HistoryRange::SixMonths => 126,
            HistoryRange::OneYear => 252,
            HistoryRange::TwoYears => MAX_HISTORY_ROWS,
            HistoryRange::YearToDate => {
                let rows = (days_since_year_start(today) as f64 * TRADING_DAY_RATIO).floor() as usize;
                rows.max(1)
            }
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryRange {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1M" => Ok(HistoryRange::OneMonth),
            "3M" => Ok(HistoryRange::ThreeMonths),
            "6M" => Ok(HistoryRange::SixMonths),
            "YTD" => Ok(HistoryRange::YearToDate),
            "1Y" => Ok(HistoryRange::OneYear),
            "2Y" => Ok(HistoryRange::TwoYears),
            other => Err(MarketDataError::UnknownParameter {
                kind: "history range",
                value: other.to_string(),
            }),
        }
    }
}

/// Closes in ascending date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySeries {
    points: Vec<HistoryPoint>,
}

impl HistorySeries {
    /// Build from warehouse rows in any order, dropping rows without a
    /// finite close.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use market_core::market_data::HistorySeries;
    ///
    /// let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
    /// let series = HistorySeries::from_rows(vec![(d(3), Some(101.0)), (d(2), None), (d(1), Some(100.0))]);
    /// assert_eq!(series.len(), 2);
    /// assert_eq!(series.points()[0].date, d(1));
    /// ```
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let mut points: Vec<HistoryPoint> = rows
            .into_iter()
            .filter_map(|(date, close)| {
                close
                    .filter(|c| c.is_finite())
                    .map(|close| HistoryPoint { date, close })
            })
            .collect();
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    /// All points, oldest first.
    #[inline]
    pub fn points(&self) -> &[HistoryPoint] {
        &self.points
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the series has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when the series holds at least `limit` points.
    #[inline]
    pub fn covers(&self, limit: usize) -> bool {
        self.points.len() >= limit
    }

    /// The most recent `limit` points, or all of them if fewer.
    pub fn tail(&self, limit: usize) -> &[HistoryPoint] {
        let start = self.points.len().saturating_sub(limit);
        &self.points[start..]
    }
}
