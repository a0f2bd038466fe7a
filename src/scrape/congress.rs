// src/scrape/congress.rs
//! Congressional sources: district by coordinates, then the scorecard per district.

use crate::config::consts::{col, DISTRICTS, VOTING};
use crate::core::net::HttpClient;
use crate::error::{FieldError, SourceError};
use crate::specs::district::{parse_district, query_url};
use crate::specs::scorecard::{parse_scorecard, scorecard_url};
use crate::table::{Cell, Table};

use super::collect::{RowKey, RowSource};

/// Seeded from master rows, which carry coordinates after the geodata stage.
pub struct DistrictSource<'a> {
    client: &'a dyn HttpClient,
    url: &'a str,
}

impl<'a> DistrictSource<'a> {
    pub fn new(client: &'a dyn HttpClient, url: &'a str) -> Self {
        Self { client, url }
    }
}

impl RowSource for DistrictSource<'_> {
    fn concern(&self) -> &'static str {
        DISTRICTS
    }

    fn key_columns(&self) -> Vec<&'static str> {
        vec![col::PLACE, col::STATE_CODE, col::LATITUDE, col::LONGITUDE]
    }

    fn fields(&self) -> Vec<&'static str> {
        vec![col::DISTRICT]
    }

    fn fetch_row(&self, key: &RowKey) -> Result<Vec<Result<String, FieldError>>, SourceError> {
        let (Some(lat), Some(lon)) = (key.get(col::LATITUDE), key.get(col::LONGITUDE)) else {
            return Ok(vec![Err(FieldError::NotFound(col::DISTRICT))]);
        };
        let body = self.client.get_text(&query_url(self.url, lat, lon))?;
        Ok(vec![parse_district(&body)?])
    }
}

pub struct ScorecardSource<'a> {
    client: &'a dyn HttpClient,
    url: &'a str,
}

impl<'a> ScorecardSource<'a> {
    pub fn new(client: &'a dyn HttpClient, url: &'a str) -> Self {
        Self { client, url }
    }

    /// One row per distinct district found in `master`.
    pub fn seed(master: &Table) -> Table {
        let mut t = Table::new(cols![col::DISTRICT]);
        if let Some(c) = master.column(col::DISTRICT) {
            for d in master.distinct(c) {
                t.push_row(vec![Cell::value(d)]);
            }
        }
        t
    }
}

impl RowSource for ScorecardSource<'_> {
    fn concern(&self) -> &'static str {
        VOTING
    }

    fn key_columns(&self) -> Vec<&'static str> {
        vec![col::DISTRICT]
    }

    fn fields(&self) -> Vec<&'static str> {
        vec![col::CONSTITUTIONALITY, col::BIOGUIDE]
    }

    fn fetch_row(&self, key: &RowKey) -> Result<Vec<Result<String, FieldError>>, SourceError> {
        let Some(district) = key.get(col::DISTRICT) else {
            return Ok(vec![
                Err(FieldError::NotFound(col::CONSTITUTIONALITY)),
                Err(FieldError::NotFound(col::BIOGUIDE)),
            ]);
        };
        let body = self.client.get_text(&scorecard_url(self.url, district))?;
        parse_scorecard(&body)
    }
}
