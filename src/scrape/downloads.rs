// src/scrape/downloads.rs
//! Bulk download sources: geodata, crime, census population, temples.

use crate::config::consts::{CRIME, GEODATA, POPULATION, TEMPLES};
use crate::config::options::FetchOptions;
use crate::core::net::HttpClient;
use crate::error::EdenError;
use crate::specs::{crime, geodata, population, temples};
use crate::table::Table;

use super::bulk::{download, BulkSource};

/// What every download needs: a client, retry settings, a URL.
#[derive(Clone, Copy)]
pub struct Download<'a> {
    pub client: &'a dyn HttpClient,
    pub fetch: &'a FetchOptions,
    pub url: &'a str,
}

impl Download<'_> {
    fn bytes(&self, concern: &str) -> Result<Vec<u8>, EdenError> {
        Ok(download(self.client, self.fetch, concern, self.url)?)
    }

    fn text(&self, concern: &str) -> Result<String, EdenError> {
        Ok(String::from_utf8_lossy(&self.bytes(concern)?).into_owned())
    }
}

pub struct GeodataSource<'a> {
    pub from: Download<'a>,
    /// CSV file inside the archive.
    pub entry: &'a str,
}

impl BulkSource for GeodataSource<'_> {
    fn concern(&self) -> &'static str {
        GEODATA
    }

    fn schema(&self) -> Vec<&'static str> {
        geodata::COLUMNS.to_vec()
    }

    fn fetch(&self) -> Result<Table, EdenError> {
        let bytes = self.from.bytes(GEODATA)?;
        let text = geodata::unzip_entry(&bytes, self.entry)?;
        Ok(geodata::parse_geodata(&text)?)
    }
}

pub struct CrimeSource<'a> {
    pub from: Download<'a>,
}

impl BulkSource for CrimeSource<'_> {
    fn concern(&self) -> &'static str {
        CRIME
    }

    fn schema(&self) -> Vec<&'static str> {
        crime::COLUMNS.to_vec()
    }

    fn fetch(&self) -> Result<Table, EdenError> {
        Ok(crime::parse_crime_archive(&self.from.bytes(CRIME)?)?)
    }
}

pub struct PopulationSource<'a> {
    pub from: Download<'a>,
}

impl BulkSource for PopulationSource<'_> {
    fn concern(&self) -> &'static str {
        POPULATION
    }

    fn schema(&self) -> Vec<&'static str> {
        population::COLUMNS.to_vec()
    }

    fn fetch(&self) -> Result<Table, EdenError> {
        Ok(population::parse_population(&self.from.text(POPULATION)?)?)
    }
}

pub struct TempleSource<'a> {
    pub from: Download<'a>,
}

impl BulkSource for TempleSource<'_> {
    fn concern(&self) -> &'static str {
        TEMPLES
    }

    fn schema(&self) -> Vec<&'static str> {
        temples::COLUMNS.to_vec()
    }

    fn fetch(&self) -> Result<Table, EdenError> {
        Ok(temples::parse_temples(&self.from.text(TEMPLES)?)?)
    }
}
