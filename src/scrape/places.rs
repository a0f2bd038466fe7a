// src/scrape/places.rs
//! Per-place page sources: county lookup and the statistics sections.

use crate::catalog::{code_to_state, Catalog};
use crate::config::consts::{col, COUNTIES};
use crate::core::net::HttpClient;
use crate::error::{FieldError, SourceError};
use crate::specs::counties::{parse_county, place_url};
use crate::specs::stats::{StatPage, CLIMATE_PAGE, HEALTH_PAGE, HOUSING_PAGE};

use super::collect::{RowKey, RowSource};

/// `(state name, place)` for a catalog key, or `None` for a code outside the 50 states.
fn place_path(key: &RowKey) -> Option<(&'static str, &str)> {
    let code = key.get(col::STATE_CODE)?;
    Some((code_to_state(code)?, key.get(col::PLACE)?))
}

pub struct CountySource<'a> {
    client: &'a dyn HttpClient,
    base: &'a str,
}

impl<'a> CountySource<'a> {
    pub fn new(client: &'a dyn HttpClient, base: &'a str) -> Self {
        Self { client, base }
    }
}

impl RowSource for CountySource<'_> {
    fn concern(&self) -> &'static str {
        COUNTIES
    }

    fn key_columns(&self) -> Vec<&'static str> {
        Catalog::KEY.to_vec()
    }

    fn fields(&self) -> Vec<&'static str> {
        vec![col::COUNTY]
    }

    fn fetch_row(&self, key: &RowKey) -> Result<Vec<Result<String, FieldError>>, SourceError> {
        let Some((state, place)) = place_path(key) else {
            return Ok(vec![Err(FieldError::NotFound(col::COUNTY))]);
        };
        let doc = self.client.get_text(&place_url(self.base, state, place))?;
        Ok(vec![parse_county(&doc)])
    }
}

/// One statistics section (climate, health or housing) of the place page.
pub struct StatsSource<'a> {
    client: &'a dyn HttpClient,
    base: &'a str,
    page: StatPage,
}

impl<'a> StatsSource<'a> {
    pub fn climate(client: &'a dyn HttpClient, base: &'a str) -> Self {
        Self { client, base, page: CLIMATE_PAGE }
    }

    pub fn health(client: &'a dyn HttpClient, base: &'a str) -> Self {
        Self { client, base, page: HEALTH_PAGE }
    }

    pub fn housing(client: &'a dyn HttpClient, base: &'a str) -> Self {
        Self { client, base, page: HOUSING_PAGE }
    }
}

impl RowSource for StatsSource<'_> {
    fn concern(&self) -> &'static str {
        self.page.concern
    }

    fn key_columns(&self) -> Vec<&'static str> {
        Catalog::KEY.to_vec()
    }

    fn fields(&self) -> Vec<&'static str> {
        self.page.columns()
    }

    fn fetch_row(&self, key: &RowKey) -> Result<Vec<Result<String, FieldError>>, SourceError> {
        let Some((state, place)) = place_path(key) else {
            return Ok(self.page.fields.iter().map(|f| Err(FieldError::NotFound(f.column))).collect());
        };
        let doc = self.client.get_text(&self.page.url(self.base, state, place))?;
        Ok(self.page.parse(&doc))
    }
}
