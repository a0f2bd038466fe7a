// src/specs/crime.rs
//! Offenses known to law enforcement, by agency: a zip with one CSV sheet per
//! state, each named by its state code (`il.csv`, `IL_offenses.csv`).
//!
//! Sheet columns used: `City, County, Population, Violent crime, Property crime`.
//! Counts are turned into rates per 100 000 residents.

use crate::catalog::state_by_code;
use crate::config::consts::col;
use crate::core::sanitize::canonicalize;
use crate::error::SourceError;
use crate::normalize::{extract_number, round_to};
use crate::table::{Cell, Table};

use super::{csv_records, header_positions, zip_csv_entries};

const RAW: [&str; 5] = ["City", "County", "Population", "Violent crime", "Property crime"];

pub const COLUMNS: [&str; 5] =
    [col::PLACE, col::COUNTY, col::STATE_CODE, col::VIOLENT_CRIME, col::PROPERTY_CRIME];

/// State code from a sheet name: `"2019/IL_offenses.csv"` → `"il"`.
pub fn sheet_state(entry: &str) -> Option<&'static str> {
    let file = entry.rsplit('/').next()?;
    let stem = file.split(['.', '_', '-', ' ']).next()?;
    state_by_code(&stem.to_ascii_lowercase()).map(|s| s.code)
}

fn per_100k(count: Option<f64>, population: f64) -> Cell {
    Cell::from(count.map(|c| round_to(c / population * 100_000.0, 1)))
}

/// Rows of one state's sheet. Agencies without a usable population are skipped.
pub fn parse_sheet(state_code: &str, text: &str, out: &mut Table) -> Result<(), SourceError> {
    let (headers, rows) = csv_records(text)?;
    let idx = header_positions(&headers, &RAW)?;
    for row in rows {
        let get = |k: usize| row.get(idx[k]).map_or("", |v| v.trim());
        let place = canonicalize(get(0));
        let county = canonicalize(get(1));
        if place.is_empty() || county.is_empty() {
            continue;
        }
        let Some(pop) = extract_number(get(2)).filter(|p| *p > 0.0) else { continue };
        out.push_row(vec![
            Cell::value(place),
            Cell::value(county),
            Cell::value(state_code),
            per_100k(extract_number(get(3)), pop),
            per_100k(extract_number(get(4)), pop),
        ]);
    }
    Ok(())
}

pub fn parse_crime_archive(bytes: &[u8]) -> Result<Table, SourceError> {
    let mut table = Table::new(COLUMNS.iter().map(|c| s!(*c)).collect());
    for (name, text) in zip_csv_entries(bytes)? {
        let Some(code) = sheet_state(&name) else {
            logd!("Skipping crime sheet {name}: no state code in its name.");
            continue;
        };
        parse_sheet(code, &text, &mut table)
            .map_err(|e| SourceError::Malformed(format!("{name}: {e}")))?;
    }
    if table.is_empty() {
        return Err(SourceError::Malformed(s!("crime archive held no usable sheet")));
    }
    Ok(table)
}
