// src/specs/temples.rs
//! Temple locations: a JSON list of `{ "name", "latitude", "longitude" }`.

use serde::Deserialize;

use crate::config::consts::col;
use crate::error::SourceError;
use crate::table::{Cell, Table};

#[derive(Deserialize)]
struct Temple {
    name: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

pub const COLUMNS: [&str; 3] = [col::NAME, col::LATITUDE, col::LONGITUDE];

/// Entries without coordinates are dropped; they cannot be measured against.
pub fn parse_temples(body: &str) -> Result<Table, SourceError> {
    let temples: Vec<Temple> =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(format!("temples: {e}")))?;
    let mut table = Table::new(COLUMNS.iter().map(|c| s!(*c)).collect());
    for t in temples {
        let (Some(lat), Some(lon)) = (t.latitude, t.longitude) else { continue };
        table.push_row(vec![Cell::value(t.name.trim()), Cell::from(Some(lat)), Cell::from(Some(lon))]);
    }
    Ok(table)
}
