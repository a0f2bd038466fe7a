// src/scrape/collect.rs
//! Resumable per-row collection, shared by every per-place (or per-district,
//! per-county) source.
//!
//! A row is *done* when none of its field cells is `Pending`; `Missing` and
//! `Errored` count as attempted. Rerunning over a finished artifact issues no
//! request at all, and rerunning over a checkpoint only touches pending cells.

use std::collections::HashMap;

use crate::config::options::FetchOptions;
use crate::core::net::{with_retry, Throttle};
use crate::error::{EdenError, FieldError, SourceError, StoreError};
use crate::progress::Progress;
use crate::store::{CheckpointStore, ResumeState};
use crate::table::{Cell, Table};

/// Input values of one row, by column name.
#[derive(Clone, Debug)]
pub struct RowKey {
    pub row: usize,
    values: Vec<(&'static str, String)>,
}

impl RowKey {
    pub fn new(row: usize, values: Vec<(&'static str, String)>) -> Self {
        Self { row, values }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.iter().find(|(c, _)| *c == column).map(|(_, v)| v.as_str())
    }

    /// `"springfield, il"`: the first two key values, for log lines.
    pub fn label(&self) -> String {
        self.values.iter().take(2).map(|(_, v)| v.as_str()).collect::<Vec<_>>().join(", ")
    }
}

pub trait RowSource {
    /// Artifact family name (`counties`, `climate`, ...).
    fn concern(&self) -> &'static str;

    /// Columns identifying a row and feeding the request. Never written by `collect`.
    fn key_columns(&self) -> Vec<&'static str>;

    /// Columns this source fills, in order.
    fn fields(&self) -> Vec<&'static str>;

    /// One result per entry of `fields()`.
    fn fetch_row(&self, key: &RowKey) -> Result<Vec<Result<String, FieldError>>, SourceError>;

    /// Sources computed locally skip the politeness delay.
    fn is_remote(&self) -> bool {
        true
    }
}

/// Reshape `seed` to `keys + fields`, carrying over whatever field cells it already has.
pub fn seed_projection(seed: &Table, keys: &[&str], fields: &[&str]) -> Result<Table, StoreError> {
    let key_idx = seed.indices(keys).map_err(|c| StoreError::SchemaDrift {
        artifact: s!("seed table"),
        missing: vec![c],
    })?;
    let field_idx: Vec<Option<usize>> = fields.iter().map(|f| seed.column(f)).collect();
    let mut out = Table::new(keys.iter().chain(fields).map(|c| s!(*c)).collect());
    for row in seed.rows() {
        let mut cells: Vec<Cell> = key_idx.iter().map(|&i| row[i].clone()).collect();
        cells.extend(field_idx.iter().map(|i| i.map_or(Cell::Pending, |i| row[i].clone())));
        out.push_row(cells);
    }
    Ok(out)
}

fn row_done(row: &[Cell], field_idx: &[usize]) -> bool {
    field_idx.iter().all(|&c| !row[c].is_pending())
}

fn fill_pending(table: &mut Table, r: usize, field_idx: &[usize], mut cell: impl FnMut(usize) -> Cell) {
    for (i, &c) in field_idx.iter().enumerate() {
        if table.get(r, c).is_pending() {
            table.set(r, c, cell(i));
        }
    }
}

/// Lay a resumed checkpoint over the seed: seed rows in seed order, each taken
/// from the checkpoint when it holds that key, pending otherwise. Checkpoint rows
/// whose key the seed no longer has are kept at the end.
pub fn reconcile_with_seed(checkpoint: &Table, seed: &Table, keys: &[&str]) -> Result<Table, StoreError> {
    let drift = |c: String| StoreError::SchemaDrift { artifact: s!("checkpoint"), missing: vec![c] };
    let headers: Vec<&str> = seed.headers().iter().map(String::as_str).collect();
    let resumed = checkpoint.project(&headers).map_err(drift)?;
    let key_idx = resumed.indices(keys).map_err(drift)?;
    let seed_idx = seed.indices(keys).map_err(drift)?;

    let mut by_key: HashMap<Vec<&str>, usize> = HashMap::new();
    for r in 0..resumed.len() {
        if let Some(k) = resumed.key(r, &key_idx) {
            by_key.entry(k).or_insert(r);
        }
    }

    let mut used = vec![false; resumed.len()];
    let mut out = Table::new(seed.headers().to_vec());
    for r in 0..seed.len() {
        let hit = seed.key(r, &seed_idx).and_then(|k| by_key.get(&k).copied());
        match hit {
            Some(c) if !used[c] => {
                used[c] = true;
                out.push_row(resumed.rows()[c].clone());
            }
            _ => out.push_row(seed.rows()[r].clone()),
        }
    }
    for (c, row) in resumed.rows().iter().enumerate() {
        if !used[c] && resumed.key(c, &key_idx).is_some() {
            out.push_row(row.clone());
        }
    }
    Ok(out)
}

/// Fill every pending field of `source`'s table, resuming from disk.
///
/// Per row: `Ok` fields become values (a field that could not be extracted is
/// `Missing`); `NotFound` makes the whole row `Missing`; a `Transient` failure
/// that outlasts the retries makes it `Errored`. `Unavailable` and `Malformed`
/// stop the run after a checkpoint, as do more than `max_consecutive_errors`
/// errored rows in a row.
///
/// A resumed checkpoint is reconciled with the seed, so rows missing from it
/// are collected too.
pub fn collect(
    store: &CheckpointStore,
    source: &dyn RowSource,
    seed: impl FnOnce() -> Result<Table, EdenError>,
    opts: &FetchOptions,
    throttle: &Throttle,
    progress: &mut dyn Progress,
) -> Result<Table, EdenError> {
    let concern = source.concern();
    let keys = source.key_columns();
    let fields = source.fields();
    let schema: Vec<&str> = keys.iter().chain(&fields).copied().collect();
    let projected = |seed: Table| seed_projection(&seed, &keys, &fields).map_err(EdenError::from);

    // The seed is built when nothing is on disk or a checkpoint is resumed.
    let mut seed = Some(seed);
    let mut seed_err = None;
    let (mut table, state) = store.load_latest(concern, &schema, || {
        match seed.take().map(|f| f().and_then(projected)) {
            Some(Ok(t)) => t,
            Some(Err(e)) => {
                seed_err = Some(e);
                Table::default()
            }
            None => Table::default(),
        }
    })?;
    if let Some(e) = seed_err {
        return Err(e);
    }
    match state {
        ResumeState::Complete => return Ok(table),
        ResumeState::Partial => {
            if let Some(f) = seed.take() {
                let seeded = f().and_then(projected)?;
                let before = table.len();
                table = reconcile_with_seed(&table, &seeded, &keys)?;
                if table.len() != before {
                    logw!("{concern}: checkpoint had {before} rows, seed has {}; reconciled.", seeded.len());
                }
            }
        }
        ResumeState::NotStarted => {}
    }

    let drift = |c: String| StoreError::SchemaDrift { artifact: s!(concern), missing: vec![c] };
    let key_idx = table.indices(&keys).map_err(drift)?;
    let field_idx = table.indices(&fields).map_err(drift)?;

    let todo: Vec<usize> = (0..table.len()).filter(|&r| !row_done(&table.rows()[r], &field_idx)).collect();
    logf!("{concern}: {} of {} rows to collect.", todo.len(), table.len());
    progress.begin(concern, todo.len());

    let mut processed = 0usize;
    let mut fetched = 0usize;
    let mut consecutive_errors = 0usize;

    for r in todo {
        let values: Option<Vec<(&'static str, String)>> = keys
            .iter()
            .zip(&key_idx)
            .map(|(k, &c)| table.get(r, c).as_value().map(|v| (*k, s!(v))))
            .collect();

        match values {
            None => {
                // No usable input: nothing to ask the source.
                logd!("{concern}: row {r} has an incomplete key; marking it missing.");
                fill_pending(&mut table, r, &field_idx, |_| Cell::Missing);
                progress.item_done(&format!("row {r}"));
            }
            Some(values) => {
                let key = RowKey::new(r, values);
                let label = key.label();

                if source.is_remote() && fetched > 0 {
                    throttle.pause();
                }
                fetched += 1;

                match with_retry(opts, &label, || source.fetch_row(&key)) {
                    Ok(results) => {
                        let mut results: Vec<Option<Result<String, FieldError>>> =
                            results.into_iter().map(Some).collect();
                        fill_pending(&mut table, r, &field_idx, |i| {
                            match results.get_mut(i).and_then(Option::take) {
                                Some(Err(e)) => {
                                    logd!("{label}: {e}");
                                    Cell::Missing
                                }
                                Some(ok) => Cell::from(ok),
                                None => Cell::Missing,
                            }
                        });
                        consecutive_errors = 0;
                        logf!("Collected {label}.");
                        progress.item_done(&label);
                    }
                    Err(SourceError::NotFound(url)) => {
                        fill_pending(&mut table, r, &field_idx, |_| Cell::Missing);
                        consecutive_errors = 0;
                        logf!("Collected {label} (no page at {url}).");
                        progress.item_done(&label);
                    }
                    Err(SourceError::Transient(msg)) => {
                        fill_pending(&mut table, r, &field_idx, |_| Cell::Errored(msg.clone()));
                        consecutive_errors += 1;
                        logw!("Failed {label}: {msg}");
                        progress.item_failed(&label, &msg);
                        if consecutive_errors > opts.max_consecutive_errors {
                            store.save_checkpoint(concern, &table)?;
                            progress.finish();
                            return Err(SourceError::Unavailable(format!(
                                "{concern}: {consecutive_errors} consecutive failed rows, last: {msg}"
                            ))
                            .into());
                        }
                    }
                    Err(e) => {
                        loge!("{concern} stopped at {label}: {e}");
                        store.save_checkpoint(concern, &table)?;
                        progress.finish();
                        return Err(e.into());
                    }
                }
            }
        }

        processed += 1;
        if opts.checkpoint_every > 0 && processed % opts.checkpoint_every == 0 {
            store.save_checkpoint(concern, &table)?;
            logd!("{concern}: checkpoint after {processed} rows.");
        }
    }

    store.finalize(concern, &table)?;
    progress.finish();
    Ok(table)
}

/// Turn `Errored` cells of `concern` back into `Pending` so the next [`collect`]
/// retries exactly those. A complete artifact is demoted to a checkpoint.
/// Returns how many cells were reset.
pub fn retry_errored(store: &CheckpointStore, concern: &str) -> Result<usize, StoreError> {
    let (mut table, state) = store.load_latest(concern, &[], Table::default)?;
    if state == ResumeState::NotStarted {
        return Ok(0);
    }
    let mut reset = 0usize;
    for r in 0..table.len() {
        for c in 0..table.headers().len() {
            if table.get(r, c).is_errored() {
                table.set(r, c, Cell::Pending);
                reset += 1;
            }
        }
    }
    if reset == 0 {
        logf!("{concern}: no errored cells.");
        return Ok(0);
    }
    match state {
        ResumeState::Complete => store.reopen(concern, &table)?,
        _ => store.save_checkpoint(concern, &table)?,
    }
    logf!("{concern}: {reset} errored cells queued for retry.");
    Ok(reset)
}
