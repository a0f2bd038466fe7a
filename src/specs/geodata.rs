// src/specs/geodata.rs
//! City-level geodata: one CSV inside a zip archive.
//!
//! Raw columns → contract columns:
//! `city→City, state_id→StateCode, state_name→State, county_fips→Fips,
//! county_name→County, lat→Latitude, lng→Longitude, population→Population,
//! density→Density, zips→Zip`. Every other raw column is dropped.

use crate::config::consts::col;
use crate::core::sanitize::canonicalize;
use crate::error::SourceError;
use crate::table::{Cell, Table};

use super::{csv_records, fips_key, header_positions, zip_csv_entries};

const RAW: [&str; 10] = [
    "city", "state_id", "state_name", "county_fips", "county_name", "lat", "lng", "population",
    "density", "zips",
];

pub const COLUMNS: [&str; 10] = [
    col::CITY, col::STATE_CODE, col::STATE, col::FIPS, col::COUNTY, col::LATITUDE,
    col::LONGITUDE, col::POPULATION, col::DENSITY, col::ZIP,
];

/// Text of entry `entry` (matched on file name, case-insensitive) inside the archive.
pub fn unzip_entry(bytes: &[u8], entry: &str) -> Result<String, SourceError> {
    zip_csv_entries(bytes)?
        .into_iter()
        .find(|(name, _)| {
            name.rsplit('/').next().is_some_and(|n| n.eq_ignore_ascii_case(entry))
        })
        .map(|(_, text)| text)
        .ok_or_else(|| SourceError::Malformed(format!("archive has no {entry}")))
}

/// Rows with any empty field are dropped. Names are canonicalized so they join
/// against the county table; only the first zip code is kept.
pub fn parse_geodata(text: &str) -> Result<Table, SourceError> {
    let (headers, rows) = csv_records(text)?;
    let idx = header_positions(&headers, &RAW)?;
    let mut table = Table::new(COLUMNS.iter().map(|c| s!(*c)).collect());

    for row in rows {
        let raw: Vec<&str> = idx.iter().map(|&i| row.get(i).map_or("", |v| v.trim())).collect();
        if raw.iter().any(|v| v.is_empty()) {
            continue;
        }
        let Some(fips) = fips_key(raw[3]) else { continue };
        let zip = raw[9].split_ascii_whitespace().next().unwrap_or(raw[9]);
        table.push_row(vec![
            Cell::value(canonicalize(raw[0])),
            Cell::value(raw[1].to_ascii_lowercase()),
            Cell::value(canonicalize(raw[2])),
            Cell::value(fips),
            Cell::value(canonicalize(raw[4])),
            Cell::value(raw[5]),
            Cell::value(raw[6]),
            Cell::value(raw[7]),
            Cell::value(raw[8]),
            Cell::value(zip),
        ]);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
city,city_ascii,state_id,state_name,county_fips,county_name,lat,lng,population,density,source,zips,id
Springfield,Springfield,IL,Illinois,17167,Sangamon,39.7710,-89.6537,114394,1141.9,polygon,62701 62702 62703,1840009517
Athens,Athens,GA,Georgia,13059,Clarke,33.9508,-83.3689,126913,422.4,polygon,30601 30602,1840014719
Nowhere,Nowhere,TX,Texas,48001,Anderson,,,10,1.0,polygon,75801,1
East St. Louis,East St. Louis,IL,Illinois,17163,St. Clair,38.6156,-90.1304,18469,1051.5,polygon,62201,2
";

    #[test]
    fn keeps_complete_rows_canonicalized() {
        let t = parse_geodata(SAMPLE).unwrap();
        assert_eq!(t.headers(), COLUMNS);
        assert_eq!(t.len(), 3);
        assert_eq!(t.get_by(0, col::CITY), Some(&Cell::value("springfield")));
        assert_eq!(t.get_by(0, col::STATE_CODE), Some(&Cell::value("il")));
        assert_eq!(t.get_by(0, col::ZIP), Some(&Cell::value("62701")));
        assert_eq!(t.get_by(1, col::COUNTY), Some(&Cell::value("clarke")));
        assert_eq!(t.get_by(2, col::CITY), Some(&Cell::value("east_st._louis")));
        assert_eq!(t.get_by(2, col::COUNTY), Some(&Cell::value("st._clair")));
    }

    #[test]
    fn missing_raw_column_is_malformed() {
        assert!(matches!(parse_geodata("city,lat\nA,1\n"), Err(SourceError::Malformed(_))));
    }
}
