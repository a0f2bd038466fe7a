// src/specs/drought.rs
//! County drought history: weekly rows of cumulative percent area in each
//! category (`D0`..`D4`). The level of a week is `(D0+D1+D2+D3+D4) / 100`,
//! i.e. 0 (no drought) to 5 (all of the county in exceptional drought).

use chrono::NaiveDate;

use crate::config::consts::col;
use crate::error::SourceError;
use crate::normalize::extract_number;
use crate::table::{Cell, Table};

use super::{csv_records, fips_key, header_positions};

const RAW: [&str; 7] = ["FIPS", "MapDate", "D0", "D1", "D2", "D3", "D4"];

pub const COLUMNS: [&str; 3] = [col::FIPS, col::MAP_DATE, col::DROUGHT];

/// `MapDate` as written by the drought monitor (`20200107`) or ISO (`2020-01-07`).
pub fn parse_map_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

pub fn parse_drought_history(text: &str) -> Result<Table, SourceError> {
    let (headers, rows) = csv_records(text)?;
    let idx = header_positions(&headers, &RAW)?;
    let mut table = Table::new(COLUMNS.iter().map(|c| s!(*c)).collect());

    for row in rows {
        let get = |k: usize| row.get(idx[k]).map_or("", |v| v.trim());
        let (Some(fips), Some(date)) = (fips_key(get(0)), parse_map_date(get(1))) else {
            continue;
        };
        let cats: Option<Vec<f64>> = (2..7).map(|k| extract_number(get(k))).collect();
        let Some(cats) = cats else { continue };
        let level = cats.iter().sum::<f64>() / 100.0;
        table.push_row(vec![
            Cell::value(fips),
            Cell::value(date.format("%Y-%m-%d").to_string()),
            Cell::from(Some(level)),
        ]);
    }
    Ok(table)
}
