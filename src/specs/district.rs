// src/specs/district.rs
//! Congressional district tile query: a point in, the intersecting district out.

use serde::Deserialize;

use crate::catalog::state_by_fips;
use crate::config::consts::col;
use crate::error::{FieldError, SourceError};

use super::decode_json;

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    attributes: Attributes,
}

#[derive(Deserialize)]
struct Attributes {
    #[serde(rename = "STATE")]
    state: String,
    #[serde(rename = "CD118")]
    district: String,
}

pub fn query_url(base: &str, latitude: &str, longitude: &str) -> String {
    format!(
        "{base}?geometry={longitude},{latitude}&geometryType=esriGeometryPoint&inSR=4326\
         &spatialRel=esriSpatialRelIntersects&outFields=STATE,CD118&returnGeometry=false&f=json"
    )
}

/// `"<statecode>-<nn>"`; at-large seats (`00`, `98`) render as `"<statecode>-al"`.
pub fn district_id(state_code: &str, number: &str) -> String {
    let n = number.trim();
    match n {
        "00" | "0" | "98" => format!("{state_code}-al"),
        _ => format!("{state_code}-{n:0>2}"),
    }
}

/// Outer `Err` when the tile server did not answer properly; inner `Err` when
/// it answered but the point lies in no district.
pub fn parse_district(body: &str) -> Result<Result<String, FieldError>, SourceError> {
    let resp: QueryResponse = decode_json(body)?;
    Ok(district_from(resp))
}

fn district_from(resp: QueryResponse) -> Result<String, FieldError> {
    let attrs = resp
        .features
        .into_iter()
        .next()
        .map(|f| f.attributes)
        .ok_or(FieldError::NotFound(col::DISTRICT))?;
    let state = state_by_fips(&attrs.state).ok_or_else(|| FieldError::Unparseable {
        field: col::DISTRICT,
        raw: attrs.state.clone(),
    })?;
    Ok(district_id(state.code, &attrs.district))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_and_at_large() {
        let body = r#"{"features":[{"attributes":{"STATE":"17","CD118":"13"}}]}"#;
        assert_eq!(parse_district(body), Ok(Ok(s!("il-13"))));
        let body = r#"{"features":[{"attributes":{"STATE":"56","CD118":"00"}}]}"#;
        assert_eq!(parse_district(body), Ok(Ok(s!("wy-al"))));
        assert_eq!(district_id("mo", "7"), "mo-07");
    }

    #[test]
    fn no_district_is_absent_but_server_trouble_is_transient() {
        assert_eq!(parse_district(r#"{"features":[]}"#), Ok(Err(FieldError::NotFound(col::DISTRICT))));
        let body = r#"{"features":[{"attributes":{"STATE":"99","CD118":"01"}}]}"#;
        assert!(matches!(parse_district(body), Ok(Err(FieldError::Unparseable { .. }))));

        let envelope = r#"{"error":{"code":400,"message":"Invalid or missing input parameters."}}"#;
        assert!(matches!(parse_district(envelope), Err(SourceError::Transient(_))));
        assert!(matches!(parse_district("<html>"), Err(SourceError::Transient(_))));
    }

    #[test]
    fn point_is_lon_lat() {
        let u = query_url("https://t.gov/q", "39.78", "-89.65");
        assert!(u.starts_with("https://t.gov/q?geometry=-89.65,39.78&"));
        assert!(u.ends_with("f=json"));
    }
}
