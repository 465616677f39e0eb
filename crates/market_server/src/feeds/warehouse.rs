//! CSV-backed price warehouse
//!
//! Reads daily closes from a file with a `Date,Ticker,Close` header. The
//! file is re-read on every call; the orchestrators in front of it cache
//! the results.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use super::{FeedError, HistoricalPriceService};

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "Close", deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
}

/// Historical price service reading a local CSV file
#[derive(Debug, Clone)]
pub struct CsvWarehouse {
    path: Option<PathBuf>,
}

impl CsvWarehouse {
    /// Warehouse backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Warehouse without a backing file; every call fails with `NotConfigured`.
    pub fn unconfigured() -> Self {
        Self { path: None }
    }

    async fn load(&self) -> Result<Vec<PriceRow>, FeedError> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| FeedError::NotConfigured("price history file is not configured".to_string()))?;

        tokio::task::spawn_blocking(move || read_rows(&path))
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?
    }
}

fn read_rows(path: &Path) -> Result<Vec<PriceRow>, FeedError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| FeedError::Transport(format!("cannot open {}: {}", path.display(), e)))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize::<PriceRow>() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(FeedError::Transport(e.to_string())),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(path = %path.display(), skipped, "price_warehouse skipped_rows");
    }
    Ok(rows)
}

#[async_trait]
impl HistoricalPriceService for CsvWarehouse {
    async fn tickers(&self) -> Result<Vec<String>, FeedError> {
        let mut tickers: Vec<String> = self
            .load()
            .await?
            .into_iter()
            .map(|row| row.ticker)
            .filter(|t| !t.trim().is_empty())
            .collect();
        tickers.sort();
        tickers.dedup();
        Ok(tickers)
    }

    async fn history(
        &self,
        ticker: &str,
        limit: usize,
    ) -> Result<Vec<(NaiveDate, Option<f64>)>, FeedError> {
        let mut rows: Vec<(NaiveDate, Option<f64>)> = self
            .load()
            .await?
            .into_iter()
            .filter(|row| row.ticker == ticker)
            .map(|row| (row.date, row.close))
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        rows.truncate(limit);
        Ok(rows)
    }
}
