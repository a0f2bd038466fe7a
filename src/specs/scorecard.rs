// src/specs/scorecard.rs
//! Legislative scorecard for one district: a JSON list of
//! `{ "bioguide_id", "congress", "score" }` records, one per member and term.

use serde::Deserialize;

use crate::config::consts::col;
use crate::error::{FieldError, SourceError};

use super::decode_json;

#[derive(Deserialize, Debug)]
struct Record {
    bioguide_id: String,
    congress: u32,
    score: Option<f64>,
}

pub fn scorecard_url(base: &str, district: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), district)
}

/// `[Constitutionality, Bioguide]`: mean score over every scored record, and the
/// member of the most recent congress. An error envelope or an undecodable
/// body fails the whole row.
pub fn parse_scorecard(body: &str) -> Result<Vec<Result<String, FieldError>>, SourceError> {
    let records: Vec<Record> = decode_json(body)?;

    let scores: Vec<f64> = records.iter().filter_map(|r| r.score).filter(|x| x.is_finite()).collect();
    let mean = if scores.is_empty() {
        Err(FieldError::NotFound(col::CONSTITUTIONALITY))
    } else {
        Ok((scores.iter().sum::<f64>() / scores.len() as f64).to_string())
    };

    let latest = records
        .iter()
        .filter(|r| !r.bioguide_id.trim().is_empty())
        .max_by_key(|r| r.congress)
        .map(|r| r.bioguide_id.trim().to_string())
        .ok_or(FieldError::NotFound(col::BIOGUIDE));

    Ok(vec![mean, latest])
}
