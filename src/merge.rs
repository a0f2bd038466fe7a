// src/merge.rs
//! Master table assembly.
//!
//! Every stage is an inner join onto the accumulated master. Rows that do not
//! match are dropped from the master and written to `data/dropped_<stage>.csv`
//! with the side they came from, so nothing disappears silently.
//!
//! The presence of a stage's columns in the master is its completion marker:
//! enriching again with the same source is a no-op and writes nothing.

use std::collections::HashMap;

use crate::config::consts::{col, COUNTIES, DROPPED_PREFIX, GEODATA, MASTER};
use crate::core::sanitize::city_from_place;
use crate::error::{EdenError, MergeError, StoreError};
use crate::store::CheckpointStore;
use crate::table::{Cell, Table};

pub const SIDE_LEFT: &str = "left";
pub const SIDE_RIGHT: &str = "right";
pub const SIDE_DUPLICATE: &str = "duplicate";

#[derive(Clone, Debug)]
pub struct JoinOutcome {
    pub merged: Table,
    /// Key columns plus `Side`, one row per unmatched (or duplicate) input row.
    pub dropped: Table,
}

impl JoinOutcome {
    pub fn dropped_on(&self, side: &str) -> usize {
        let Some(c) = self.dropped.column(col::SIDE) else { return 0 };
        self.dropped.rows().iter().filter(|r| r[c].as_value() == Some(side)).count()
    }
}

/// Inner join of `right` onto `left` on `keys`.
///
/// Left order is kept. Right columns already present on the left are not
/// copied again. For a key repeated on the right the first row wins and the
/// rest are reported as `duplicate`. A key with a non-value cell never matches.
pub fn inner_join(left: &Table, right: &Table, keys: &[&str]) -> Result<JoinOutcome, MergeError> {
    let l_idx = left
        .indices(keys)
        .map_err(|column| MergeError::MissingKey { table: "left", column })?;
    let r_idx = right
        .indices(keys)
        .map_err(|column| MergeError::MissingKey { table: "right", column })?;

    let extra: Vec<usize> = (0..right.headers().len())
        .filter(|&c| !left.has_column(&right.headers()[c]))
        .collect();

    let mut headers = left.headers().to_vec();
    headers.extend(extra.iter().map(|&c| right.headers()[c].clone()));
    let mut merged = Table::new(headers);

    let mut dropped_headers: Vec<String> = keys.iter().map(|k| s!(*k)).collect();
    dropped_headers.push(s!(col::SIDE));
    let mut dropped = Table::new(dropped_headers);
    let report = |dropped: &mut Table, row: &[Cell], idx: &[usize], side: &str| {
        let mut cells: Vec<Cell> = idx.iter().map(|&i| row[i].clone()).collect();
        cells.push(Cell::value(side));
        dropped.push_row(cells);
    };

    let mut index: HashMap<Vec<&str>, usize> = HashMap::new();
    let mut matched = vec![false; right.len()];
    for r in 0..right.len() {
        match right.key(r, &r_idx) {
            Some(k) if index.contains_key(&k) => {
                matched[r] = true;
                report(&mut dropped, &right.rows()[r], &r_idx, SIDE_DUPLICATE);
            }
            Some(k) => {
                index.insert(k, r);
            }
            None => {}
        }
    }

    for l in 0..left.len() {
        let hit = left.key(l, &l_idx).and_then(|k| index.get(&k).copied());
        match hit {
            Some(r) => {
                matched[r] = true;
                let mut row = left.rows()[l].clone();
                row.extend(extra.iter().map(|&c| right.get(r, c).clone()));
                merged.push_row(row);
            }
            None => report(&mut dropped, &left.rows()[l], &l_idx, SIDE_LEFT),
        }
    }

    for (r, m) in matched.iter().enumerate() {
        if !m {
            report(&mut dropped, &right.rows()[r], &r_idx, SIDE_RIGHT);
        }
    }

    Ok(JoinOutcome { merged, dropped })
}

/// Starting left side of the geodata stage: the county table plus a `City`
/// derived from each place id.
pub fn base_from_counties(counties: &Table) -> Result<Table, MergeError> {
    let p = counties
        .column(col::PLACE)
        .ok_or_else(|| MergeError::MissingKey { table: COUNTIES, column: s!(col::PLACE) })?;
    let mut base = counties.clone();
    let cities = (0..counties.len())
        .map(|r| match counties.get(r, p).as_value() {
            Some(place) => Cell::value(city_from_place(place)),
            None => Cell::Missing,
        })
        .collect();
    base.set_column(col::CITY, cities);
    Ok(base)
}

/// The on-disk master table and the stages that grow it.
pub struct Master<'a> {
    store: &'a CheckpointStore,
}

impl<'a> Master<'a> {
    pub fn new(store: &'a CheckpointStore) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Option<Table>, StoreError> {
        self.store.load_artifact(MASTER)
    }

    fn require(&self, stage: &'static str) -> Result<Table, EdenError> {
        self.load()?.ok_or_else(|| MergeError::NoMaster(stage).into())
    }

    /// Join `right` onto the master on `keys` unless its columns are already there.
    ///
    /// Without a master, only the geodata stage may run; it starts from the
    /// finished county table.
    pub fn enrich(&self, stage: &'static str, right: &Table, keys: &[&str]) -> Result<Table, EdenError> {
        let left = match self.load()? {
            Some(m) => m,
            None if stage == GEODATA => {
                let counties = self.store.load_artifact(COUNTIES)?.ok_or(MergeError::NotCollected(COUNTIES))?;
                base_from_counties(&counties)?
            }
            None => return Err(MergeError::NoMaster(stage).into()),
        };

        let new_cols: Vec<&String> = right
            .headers()
            .iter()
            .filter(|h| !keys.contains(&h.as_str()) && !left.has_column(h))
            .collect();
        if new_cols.is_empty() {
            logf!("Master already has the {stage} columns.");
            return Ok(left);
        }

        let outcome = inner_join(&left, right, keys)?;
        logf!(
            "Merged {stage}: {} rows kept, {} left and {} right rows dropped, {} duplicates.",
            outcome.merged.len(),
            outcome.dropped_on(SIDE_LEFT),
            outcome.dropped_on(SIDE_RIGHT),
            outcome.dropped_on(SIDE_DUPLICATE),
        );
        self.store.write_artifact(MASTER, &outcome.merged)?;
        self.store.write_artifact(&format!("{DROPPED_PREFIX}{stage}"), &outcome.dropped)?;
        Ok(outcome.merged)
    }

    /// Add a computed column, once. `compute` gets the master and returns one cell per row.
    pub fn derive(
        &self,
        stage: &'static str,
        column: &str,
        compute: impl FnOnce(&Table) -> Result<Vec<Cell>, EdenError>,
    ) -> Result<Table, EdenError> {
        let mut master = self.require(stage)?;
        if master.has_column(column) {
            logf!("Master already has {column}.");
            return Ok(master);
        }
        let cells = compute(&master)?;
        master.set_column(column, cells);
        self.store.write_artifact(MASTER, &master)?;
        Ok(master)
    }

    /// Replace (or add) a column unconditionally. Used for the score.
    pub fn replace_column(&self, stage: &'static str, column: &str, cells: Vec<Cell>) -> Result<Table, EdenError> {
        let mut master = self.require(stage)?;
        master.set_column(column, cells);
        self.store.write_artifact(MASTER, &master)?;
        Ok(master)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new(headers.iter().map(|h| s!(*h)).collect());
        for r in rows {
            t.push_row(r.iter().map(|c| Cell::from_text(c)).collect());
        }
        t
    }

    #[test]
    fn every_row_is_merged_or_reported() {
        let left = table(
            &["Place", "StateCode", "County"],
            &[&["a", "il", "x"], &["b", "il", "y"], &["c", "mo", "?"], &["d", "ga", "z"]],
        );
        let right = table(
            &["Place", "StateCode", "Rainfall"],
            &[&["d", "ga", "50"], &["a", "il", "38"], &["a", "il", "99"], &["e", "tx", "20"]],
        );
        let out = inner_join(&left, &right, &["Place", "StateCode"]).unwrap();

        assert_eq!(out.merged.headers(), &["Place", "StateCode", "County", "Rainfall"]);
        assert_eq!(out.merged.len(), 2);
        // left order, first duplicate wins
        assert_eq!(out.merged.rows()[0][3], Cell::value("38"));
        assert_eq!(out.merged.rows()[1][0], Cell::value("d"));

        assert_eq!(out.dropped_on(SIDE_LEFT), 2);
        assert_eq!(out.dropped_on(SIDE_RIGHT), 1);
        assert_eq!(out.dropped_on(SIDE_DUPLICATE), 1);
        assert_eq!(out.merged.len() + out.dropped_on(SIDE_LEFT), left.len());
    }

    #[test]
    fn sentinel_keys_never_match() {
        let left = table(&["County"], &[&["?"], &["x"]]);
        let right = table(&["County", "V"], &[&["?", "1"], &["x", "2"]]);
        let out = inner_join(&left, &right, &["County"]).unwrap();
        assert_eq!(out.merged.len(), 1);
        assert_eq!(out.dropped_on(SIDE_LEFT), 1);
        assert_eq!(out.dropped_on(SIDE_RIGHT), 1);
    }

    #[test]
    fn missing_key_is_an_error() {
        let left = table(&["Place"], &[]);
        let right = table(&["Fips"], &[]);
        assert!(matches!(
            inner_join(&left, &right, &["Place"]),
            Err(MergeError::MissingKey { table: "right", .. })
        ));
    }

    #[test]
    fn many_left_rows_share_one_right_row() {
        let left = table(&["Place", "CongressionalDistrict"], &[&["a", "il-13"], &["b", "il-13"]]);
        let right = table(&["CongressionalDistrict", "Constitutionality"], &[&["il-13", "50"]]);
        let out = inner_join(&left, &right, &["CongressionalDistrict"]).unwrap();
        assert_eq!(out.merged.len(), 2);
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn city_from_place_ids() {
        let counties = table(
            &["Place", "StateCode", "County"],
            &[&["athens_(clarke_county)", "ga", "clarke"], &["springfield", "il", "sangamon"]],
        );
        let base = base_from_counties(&counties).unwrap();
        assert_eq!(base.get_by(0, "City"), Some(&Cell::value("athens")));
        assert_eq!(base.get_by(1, "City"), Some(&Cell::value("springfield")));
    }
}
