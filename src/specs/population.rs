// src/specs/population.rs
//! Census sub-county population estimates. Incorporated places are summary level 162.

use crate::catalog::state_by_name;
use crate::config::consts::col;
use crate::core::sanitize::{canonicalize, strip_place_type};
use crate::error::SourceError;
use crate::normalize::extract_number;
use crate::table::{Cell, Table};

use super::{csv_records, header_positions};

const INCORPORATED_PLACE: &str = "162";
const RAW: [&str; 4] = ["SUMLEV", "NAME", "STNAME", "POPESTIMATE2020"];

pub const COLUMNS: [&str; 3] = [col::CITY, col::STATE_CODE, col::CENSUS_POPULATION];

pub fn parse_population(text: &str) -> Result<Table, SourceError> {
    let (headers, rows) = csv_records(text)?;
    let idx = header_positions(&headers, &RAW)?;
    let mut table = Table::new(COLUMNS.iter().map(|c| s!(*c)).collect());

    for row in rows {
        let get = |k: usize| row.get(idx[k]).map_or("", |v| v.trim());
        if get(0) != INCORPORATED_PLACE {
            continue;
        }
        let Some(state) = state_by_name(&canonicalize(get(2))) else { continue };
        let city = strip_place_type(get(1));
        if city.is_empty() {
            continue;
        }
        table.push_row(vec![
            Cell::value(city),
            Cell::value(state.code),
            Cell::from(extract_number(get(3))),
        ]);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incorporated_places_only() {
        let text = "\
SUMLEV,STATE,COUNTY,PLACE,NAME,STNAME,POPESTIMATE2019,POPESTIMATE2020
040,17,000,00000,Illinois,Illinois,12671821,12587530
162,17,000,72000,Springfield city,Illinois,114230,113054
050,17,167,00000,Sangamon County,Illinois,194672,193491
162,54,000,14600,Charles Town city,West Virginia,6000,6100
162,72,000,00100,Adjuntas zona urbana,Puerto Rico,4000,3900
";
        let t = parse_population(text).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows()[0], vec![Cell::value("springfield"), Cell::value("il"), Cell::value("113054")]);
        assert_eq!(t.rows()[1][0], Cell::value("charles_town"));
        assert_eq!(t.rows()[1][1], Cell::value("wv"));
    }
}
