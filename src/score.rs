// src/score.rs
//! Eden score: `Σ weight · normalized(feature)` over the configured features.
//!
//! Normalization is min-max over the rows of the master at scoring time, so a
//! score is only comparable with scores from the same run.

use crate::config::consts::{col, PREDICT};
use crate::config::options::ScoringOptions;
use crate::error::{EdenError, MergeError, ScoreError};
use crate::merge::Master;
use crate::normalize::{min_max, numeric_column, reverse_min_max, round_to};
use crate::store::CheckpointStore;
use crate::table::{Cell, Table};

const STAGE: &str = "score";

/// Identity columns copied into the feature matrix when the master has them.
const ID_COLUMNS: [&str; 2] = [col::PLACE, col::STATE_CODE];

/// The `predict` table: identity columns, then one normalized column per
/// configured feature (reversed where configured). Non-values stay `Missing`.
pub fn normalized_features(master: &Table, opts: &ScoringOptions) -> Result<Table, ScoreError> {
    let ids: Vec<&str> = ID_COLUMNS.iter().copied().filter(|c| master.has_column(c)).collect();
    let mut predict = master
        .project(&ids)
        .map_err(ScoreError::MissingColumn)?;

    for w in &opts.weights {
        let c = master
            .column(&w.column)
            .ok_or_else(|| ScoreError::MissingColumn(w.column.clone()))?;
        let values = numeric_column(master, c);
        let scaled = if w.reverse { reverse_min_max(&values) } else { min_max(&values) };
        predict.set_column(&w.column, scaled.into_iter().map(Cell::from).collect());
    }
    Ok(predict)
}

/// One score per row of `predict`; `Missing` when any weighted feature of the row is.
pub fn eden_scores(predict: &Table, opts: &ScoringOptions) -> Result<Vec<Cell>, ScoreError> {
    let idx: Vec<(usize, f64)> = opts
        .weights
        .iter()
        .map(|w| {
            predict
                .column(&w.column)
                .map(|c| (c, w.weight))
                .ok_or_else(|| ScoreError::MissingColumn(w.column.clone()))
        })
        .collect::<Result<_, _>>()?;

    Ok(predict
        .rows()
        .iter()
        .map(|row| {
            idx.iter()
                .map(|&(c, weight)| row[c].as_value().and_then(|v| v.parse::<f64>().ok()).map(|x| weight * x))
                .sum::<Option<f64>>()
                .map(|s| round_to(s, 4))
        })
        .map(Cell::from)
        .collect())
}

/// Score the master on disk: writes `predict.csv` and the `EdenScore` column
/// (replacing an earlier score).
pub fn apply(store: &CheckpointStore, opts: &ScoringOptions) -> Result<Table, EdenError> {
    let master_store = Master::new(store);
    let master = master_store
        .load()?
        .ok_or(MergeError::NoMaster(STAGE))?;
    let predict = normalized_features(&master, opts)?;
    let scores = eden_scores(&predict, opts)?;
    let scored = scores.iter().filter(|c| c.as_value().is_some()).count();

    store.write_artifact(PREDICT, &predict)?;
    let master = master_store.replace_column(STAGE, col::EDEN_SCORE, scores)?;
    logf!("Scored {scored} of {} places.", master.len());
    Ok(master)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::FeatureWeight;

    fn master() -> Table {
        let mut t = Table::new(cols![col::PLACE, col::STATE_CODE, col::RAINFALL, col::SNOWFALL]);
        for (p, r, s) in [("a", "10", "0"), ("b", "20", "10"), ("c", "?", "20"), ("d", "30", "20")] {
            t.push_row(vec![Cell::value(p), Cell::value("il"), Cell::from_text(r), Cell::value(s)]);
        }
        t
    }

    fn opts() -> ScoringOptions {
        ScoringOptions {
            weights: vec![
                FeatureWeight::new(col::RAINFALL, 1.0),
                FeatureWeight { column: s!(col::SNOWFALL), weight: 2.0, reverse: true },
            ],
        }
    }

    #[test]
    fn weighted_sum_of_normalized_features() {
        let p = normalized_features(&master(), &opts()).unwrap();
        assert_eq!(p.headers(), &[col::PLACE, col::STATE_CODE, col::RAINFALL, col::SNOWFALL]);
        assert_eq!(p.get(1, 2), &Cell::value("0.5"));
        assert_eq!(p.get(1, 3), &Cell::value("0.5"));
        assert_eq!(p.get(2, 2), &Cell::Missing);

        let s = eden_scores(&p, &opts()).unwrap();
        // a: 0 + 2*1, b: .5 + 2*.5, c: missing rainfall, d: 1 + 0
        assert_eq!(s, vec![Cell::value("2"), Cell::value("1.5"), Cell::Missing, Cell::value("1")]);
    }

    #[test]
    fn absent_feature_column_is_an_error() {
        let o = ScoringOptions { weights: vec![FeatureWeight::new(col::DROUGHT, -2.0)] };
        assert!(matches!(normalized_features(&master(), &o), Err(ScoreError::MissingColumn(c)) if c == col::DROUGHT));
    }
}
