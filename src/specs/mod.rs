// src/specs/mod.rs
//! # Source “specs”
//!
//! One module per remote page or payload format. A spec knows *where the
//! value lives* in a document and how to pull it out; it never fetches,
//! caches, sleeps or decides what to do with a failure.
//!
//! ## What lives here
//! - **Pure parsing** of HTML pages (state directory, place pages, statistic tables),
//!   JSON payloads (district tiles, scorecards, temples) and CSV/zip payloads
//!   (geodata, crime, census, drought history).
//! - **Light shaping** into [`Table`](crate::table::Table)s whose column names are the
//!   `config::consts::col` contract.
//! - Per-field failures as [`FieldError`](crate::error::FieldError), whole-payload
//!   failures as [`SourceError::Malformed`](crate::error::SourceError). Per-row JSON
//!   APIs that answer with an error envelope or a body that does not decode are
//!   [`SourceError::Transient`](crate::error::SourceError), so the row is retried.
//!
//! ## What does **not** live here
//! - Networking, retry, throttling: `core::net`.
//! - Resume/checkpoint logic: `scrape::collect`, `scrape::bulk`, `store`.
//! - Joining sources together: `merge`.
//!
//! ## Testing notes
//! Every spec is testable offline against inline fixtures.

pub mod counties;
pub mod crime;
pub mod district;
pub mod drought;
pub mod geodata;
pub mod places;
pub mod population;
pub mod scorecard;
pub mod stats;
pub mod temples;

use std::io::Read;

use serde::de::DeserializeOwned;

use crate::config::consts::STORE_SEP;
use crate::csv::parse_rows;
use crate::error::SourceError;

/// Header row + data rows of a CSV payload, header names trimmed.
pub(crate) fn csv_records(text: &str) -> Result<(Vec<String>, Vec<Vec<String>>), SourceError> {
    let mut rows = parse_rows(text, STORE_SEP).into_iter();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| SourceError::Malformed(s!("empty CSV payload")))?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    Ok((headers, rows.collect()))
}

/// Position of each wanted header (case-insensitive), or a `Malformed` naming the first absent one.
pub(crate) fn header_positions(headers: &[String], wanted: &[&str]) -> Result<Vec<usize>, SourceError> {
    wanted
        .iter()
        .map(|w| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(w))
                .ok_or_else(|| SourceError::Malformed(format!("CSV lacks column {w:?}")))
        })
        .collect()
}

/// `(entry name, UTF-8 text)` for every `.csv` entry of a zip archive, archive order.
pub(crate) fn zip_csv_entries(bytes: &[u8]) -> Result<Vec<(String, String)>, SourceError> {
    let bad = |e: zip::result::ZipError| SourceError::Malformed(format!("zip: {e}"));
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(bad)?;
    let mut out = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(bad)?;
        let name = entry.name().to_string();
        if entry.is_dir() || !name.to_ascii_lowercase().ends_with(".csv") {
            continue;
        }
        let mut buf = Vec::new();
        entry
            .read_to_end(&mut buf)
            .map_err(|e| SourceError::Malformed(format!("zip entry {name}: {e}")))?;
        out.push((name, String::from_utf8_lossy(&buf).into_owned()));
    }
    Ok(out)
}

/// Decode a per-row JSON API body. An `{"error": ...}` envelope or a body that
/// is not the expected shape is a server-side hiccup, not an absent value.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| SourceError::Transient(format!("undecodable response: {e}")))?;
    if let Some(err) = value.get("error") {
        let msg = err
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(SourceError::Transient(format!("server error: {msg}")));
    }
    serde_json::from_value(value).map_err(|e| SourceError::Transient(format!("unexpected response: {e}")))
}

/// County FIPS as a 5-digit string (`"1001"` and `"01001"` → `"01001"`).
pub(crate) fn fips_key(raw: &str) -> Option<String> {
    let digits = raw.trim();
    let digits = digits.split('.').next().unwrap_or(digits);
    if digits.is_empty() || digits.len() > 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{digits:0>5}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let (h, rows) = csv_records("City,STATE_ID\nA,il\n").unwrap();
        assert_eq!(header_positions(&h, &["city", "state_id"]).unwrap(), vec![0, 1]);
        assert!(header_positions(&h, &["zips"]).is_err());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn json_error_envelope_is_transient() {
        let got: Result<Vec<u32>, _> = decode_json(r#"{"error":{"code":500,"message":"Unable to complete operation."}}"#);
        assert_eq!(got, Err(SourceError::Transient(s!("server error: Unable to complete operation."))));
        let got: Result<Vec<u32>, _> = decode_json(r#"{"error":"busy"}"#);
        assert_eq!(got, Err(SourceError::Transient(s!("server error: \"busy\""))));
        let got: Result<Vec<u32>, _> = decode_json("<html>502</html>");
        assert!(matches!(got, Err(SourceError::Transient(m)) if m.starts_with("undecodable")));
        let got: Result<Vec<u32>, _> = decode_json("[1,2]");
        assert_eq!(got, Ok(vec![1, 2]));
    }

    #[test]
    fn fips_is_zero_padded() {
        assert_eq!(fips_key("1001").as_deref(), Some("01001"));
        assert_eq!(fips_key(" 17167 ").as_deref(), Some("17167"));
        assert_eq!(fips_key("17167.0").as_deref(), Some("17167"));
        assert_eq!(fips_key("x12"), None);
        assert_eq!(fips_key(""), None);
    }
}
