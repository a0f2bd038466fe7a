// src/scrape/bulk.rs
//! Whole-payload sources: one download is the unit of work, so there is no
//! checkpoint. Either the finished artifact exists or the payload is fetched
//! and written in one go.

use crate::config::options::FetchOptions;
use crate::core::net::{with_retry, HttpClient};
use crate::error::{EdenError, SourceError, StoreError};
use crate::store::{CheckpointStore, ResumeState};
use crate::table::Table;

pub trait BulkSource {
    fn concern(&self) -> &'static str;

    /// Columns the finished artifact must carry.
    fn schema(&self) -> Vec<&'static str>;

    fn fetch(&self) -> Result<Table, EdenError>;
}

/// Cached artifact if complete, otherwise download, shape and finalize.
pub fn collect_bulk(store: &CheckpointStore, source: &dyn BulkSource) -> Result<Table, EdenError> {
    let concern = source.concern();
    let schema = source.schema();
    if store.state(concern) == ResumeState::Complete {
        let (table, _) = store.load_latest(concern, &schema, Table::default)?;
        return Ok(table);
    }

    logf!("Downloading {concern} data.");
    let table = source.fetch()?;
    let missing = table.missing_columns(&schema);
    if !missing.is_empty() {
        return Err(StoreError::SchemaDrift { artifact: s!(concern), missing }.into());
    }
    store.finalize(concern, &table)?;
    Ok(table)
}

/// Shared by the download sources: GET with bounded retry.
pub(crate) fn download(
    client: &dyn HttpClient,
    fetch: &FetchOptions,
    concern: &str,
    url: &str,
) -> Result<Vec<u8>, SourceError> {
    with_retry(fetch, concern, || client.get_bytes(url))
}
