// src/specs/counties.rs
//! Place overview page: `<b>County:</b> <span><a href=...>Sangamon County</a></span>`.

use crate::config::consts::col;
use crate::core::html::{anchors, to_lower};
use crate::core::sanitize::canonicalize;
use crate::error::FieldError;

pub fn place_url(base: &str, state_name: &str, place: &str) -> String {
    format!("{}/city/{}/{}", base.trim_end_matches('/'), state_name, place)
}

/// Canonical county of the place (`"sangamon"`), from the first link after the `County:` label.
pub fn parse_county(doc: &str) -> Result<String, FieldError> {
    let lc = to_lower(doc);
    let label = lc.find("county:").ok_or(FieldError::NotFound(col::COUNTY))?;
    let (_, text) = anchors(&doc[label..])
        .into_iter()
        .next()
        .ok_or(FieldError::NotFound(col::COUNTY))?;
    let county = canonicalize(&text);
    if county.is_empty() {
        return Err(FieldError::Unparseable { field: col::COUNTY, raw: text });
    }
    Ok(county)
}
