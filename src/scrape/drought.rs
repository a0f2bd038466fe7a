// src/scrape/drought.rs
//! Drought: the raw weekly history (bulk) and a per-county trend prediction
//! computed from it (per-row, no network).

use std::collections::HashMap;

use crate::config::consts::{col, DROUGHT, DROUGHT_HISTORY};
use crate::config::options::FetchOptions;
use crate::core::net::HttpClient;
use crate::error::{EdenError, FieldError, SourceError};
use crate::normalize::extract_number;
use crate::specs::drought::{parse_drought_history, parse_map_date, COLUMNS};
use crate::table::{Cell, Table};

use super::bulk::{download, BulkSource};
use super::collect::{RowKey, RowSource};

/// Highest level the monitor can report.
const MAX_LEVEL: f64 = 5.0;

pub struct DroughtHistorySource<'a> {
    client: &'a dyn HttpClient,
    fetch: &'a FetchOptions,
    url: &'a str,
}

impl<'a> DroughtHistorySource<'a> {
    pub fn new(client: &'a dyn HttpClient, fetch: &'a FetchOptions, url: &'a str) -> Self {
        Self { client, fetch, url }
    }
}

impl BulkSource for DroughtHistorySource<'_> {
    fn concern(&self) -> &'static str {
        DROUGHT_HISTORY
    }

    fn schema(&self) -> Vec<&'static str> {
        COLUMNS.to_vec()
    }

    fn fetch(&self) -> Result<Table, EdenError> {
        let bytes = download(self.client, self.fetch, DROUGHT_HISTORY, self.url)?;
        Ok(parse_drought_history(&String::from_utf8_lossy(&bytes))?)
    }
}

/// Least-squares line through `(day, level)`; `None` without any point.
/// A single point (or a single day) predicts its mean level.
pub fn fit_and_predict(points: &[(f64, f64)], at_day: f64) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return Some(mean_y);
    }
    let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
    let slope = sxy / sxx;
    Some(mean_y + slope * (at_day - mean_x))
}

/// Predicted drought level per county `Fips`, `horizon_days` after that
/// county's earliest observation, clamped to the monitor's 0..=5 scale.
pub struct DroughtModel {
    series: HashMap<String, Vec<(f64, f64)>>,
    horizon_days: f64,
}

impl DroughtModel {
    pub fn from_history(history: &Table, horizon_days: f64) -> Self {
        let mut dated: HashMap<String, Vec<(chrono::NaiveDate, f64)>> = HashMap::new();
        if let Ok(idx) = history.indices(&COLUMNS) {
            for r in 0..history.len() {
                let Some(k) = history.key(r, &idx) else { continue };
                let (Some(date), Some(level)) = (parse_map_date(k[1]), extract_number(k[2])) else {
                    continue;
                };
                dated.entry(s!(k[0])).or_default().push((date, level));
            }
        }
        let series = dated
            .into_iter()
            .filter_map(|(fips, obs)| {
                let first = obs.iter().map(|o| o.0).min()?;
                let pts = obs.iter().map(|(d, l)| ((*d - first).num_days() as f64, *l)).collect();
                Some((fips, pts))
            })
            .collect();
        Self { series, horizon_days }
    }

    /// One row per distinct county in `master`.
    pub fn seed(master: &Table) -> Table {
        let mut t = Table::new(cols![col::FIPS]);
        if let Some(c) = master.column(col::FIPS) {
            for f in master.distinct(c) {
                t.push_row(vec![Cell::value(f)]);
            }
        }
        t
    }

    pub fn predict(&self, fips: &str) -> Option<f64> {
        let pts = self.series.get(fips)?;
        fit_and_predict(pts, self.horizon_days).map(|y| y.clamp(0.0, MAX_LEVEL))
    }
}

impl RowSource for DroughtModel {
    fn concern(&self) -> &'static str {
        DROUGHT
    }

    fn key_columns(&self) -> Vec<&'static str> {
        vec![col::FIPS]
    }

    fn fields(&self) -> Vec<&'static str> {
        vec![col::DROUGHT]
    }

    fn fetch_row(&self, key: &RowKey) -> Result<Vec<Result<String, FieldError>>, SourceError> {
        let level = key
            .get(col::FIPS)
            .and_then(|f| self.predict(f))
            .map(|y| y.to_string())
            .ok_or(FieldError::NotFound(col::DROUGHT));
        Ok(vec![level])
    }

    fn is_remote(&self) -> bool {
        false
    }
}
