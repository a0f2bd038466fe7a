// src/store.rs
//! Durable artifacts under `<root>/data`.
//!
//! Per concern there are three files:
//! - `data/<concern>.csv`: the completed artifact,
//! - `data/temp/<concern>_checkpoint.csv`: a partial snapshot,
//! - `data/temp/<concern>_errors.csv`: which `?` cells are request failures (see [`Cell::Errored`]).
//!
//! The completed artifact always wins over a checkpoint. Every write goes to a
//! sibling `.tmp` file first and is renamed over the target.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::consts::{
    col, ARTIFACT_EXT, CHECKPOINT_SUFFIX, DATA_DIR, ERRORS_SUFFIX, TEMP_SUBDIR,
};
use crate::error::StoreError;
use crate::table::{Cell, Table};

/// Where a concern stands, as far as the disk can tell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResumeState {
    NotStarted,
    Partial,
    Complete,
}

#[derive(Clone, Debug)]
pub struct CheckpointStore {
    data_dir: PathBuf,
    temp_dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let data_dir = root.as_ref().join(DATA_DIR);
        let temp_dir = data_dir.join(TEMP_SUBDIR);
        Self { data_dir, temp_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn final_path(&self, concern: &str) -> PathBuf {
        self.data_dir.join(format!("{concern}.{ARTIFACT_EXT}"))
    }

    pub fn checkpoint_path(&self, concern: &str) -> PathBuf {
        self.temp_dir.join(format!("{concern}{CHECKPOINT_SUFFIX}.{ARTIFACT_EXT}"))
    }

    pub fn errors_path(&self, concern: &str) -> PathBuf {
        self.temp_dir.join(format!("{concern}{ERRORS_SUFFIX}.{ARTIFACT_EXT}"))
    }

    pub fn state(&self, concern: &str) -> ResumeState {
        if self.final_path(concern).is_file() {
            ResumeState::Complete
        } else if self.checkpoint_path(concern).is_file() {
            ResumeState::Partial
        } else {
            ResumeState::NotStarted
        }
    }

    /// Final artifact, else checkpoint, else `seed()`.
    ///
    /// A checkpoint left next to a final artifact (finalize interrupted between
    /// its two steps) is stale and removed. Loaded tables must carry every
    /// column in `schema`, otherwise [`StoreError::SchemaDrift`].
    pub fn load_latest(
        &self,
        concern: &str,
        schema: &[&str],
        seed: impl FnOnce() -> Table,
    ) -> Result<(Table, ResumeState), StoreError> {
        let final_path = self.final_path(concern);
        let checkpoint = self.checkpoint_path(concern);

        let (path, state) = if final_path.is_file() {
            if checkpoint.is_file() {
                logw!("Stale checkpoint for {concern} next to its final artifact; removing it.");
                remove_if_exists(&checkpoint)?;
            }
            (final_path, ResumeState::Complete)
        } else if checkpoint.is_file() {
            (checkpoint, ResumeState::Partial)
        } else {
            logf!("No {concern} data exists.");
            return Ok((seed(), ResumeState::NotStarted));
        };

        let mut table = read_table(&path)?;
        check_schema(&table, &path, schema)?;
        self.apply_error_ledger(concern, &mut table)?;

        match state {
            ResumeState::Complete => logf!("Data for {concern} exists."),
            _ => logf!("Partial {concern} data exists."),
        }
        Ok((table, state))
    }

    /// Overwrite the checkpoint for `concern` with `table`.
    pub fn save_checkpoint(&self, concern: &str, table: &Table) -> Result<(), StoreError> {
        write_table(&self.checkpoint_path(concern), table)?;
        self.write_error_ledger(concern, table)
    }

    /// Write the completed artifact, then drop the checkpoint. Never the other way round.
    pub fn finalize(&self, concern: &str, table: &Table) -> Result<PathBuf, StoreError> {
        let path = self.final_path(concern);
        write_table(&path, table)?;
        self.write_error_ledger(concern, table)?;
        remove_if_exists(&self.checkpoint_path(concern))?;
        logf!("Saved {} rows to {}.", table.len(), path.display());
        Ok(path)
    }

    /// Turn a completed artifact back into a checkpoint so the next run can fill it further.
    pub fn reopen(&self, concern: &str, table: &Table) -> Result<(), StoreError> {
        self.save_checkpoint(concern, table)?;
        remove_if_exists(&self.final_path(concern))
    }

    /// Read a named artifact under `data/` (master, side reports).
    pub fn load_artifact(&self, name: &str) -> Result<Option<Table>, StoreError> {
        let path = self.final_path(name);
        if !path.is_file() {
            return Ok(None);
        }
        read_table(&path).map(Some)
    }

    pub fn write_artifact(&self, name: &str, table: &Table) -> Result<PathBuf, StoreError> {
        let path = self.final_path(name);
        write_table(&path, table)?;
        Ok(path)
    }

    /* ---------------- error ledger ---------------- */

    fn write_error_ledger(&self, concern: &str, table: &Table) -> Result<(), StoreError> {
        let path = self.errors_path(concern);
        let mut ledger = Table::new(cols![col::ROW, col::FIELD, col::ERROR]);
        for (i, row) in table.rows().iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Cell::Errored(msg) = cell {
                    ledger.push_row(vec![
                        Cell::value(i.to_string()),
                        Cell::value(table.headers()[c].as_str()),
                        Cell::value(msg.as_str()),
                    ]);
                }
            }
        }
        if ledger.is_empty() {
            return remove_if_exists(&path);
        }
        write_table(&path, &ledger)
    }

    fn apply_error_ledger(&self, concern: &str, table: &mut Table) -> Result<(), StoreError> {
        let path = self.errors_path(concern);
        if !path.is_file() {
            return Ok(());
        }
        let ledger = read_table(&path)?;
        let idx = ledger.indices(&[col::ROW, col::FIELD, col::ERROR]).map_err(|c| {
            StoreError::SchemaDrift { artifact: path.display().to_string(), missing: vec![c] }
        })?;
        for r in 0..ledger.len() {
            let Some(key) = ledger.key(r, &idx) else { continue };
            let (Ok(row), Some(c)) = (key[0].parse::<usize>(), table.column(key[1])) else {
                continue;
            };
            // Only a sentinel cell can be an errored one; anything else was refilled since.
            if row < table.len() && *table.get(row, c) == Cell::Missing {
                table.set(row, c, Cell::Errored(s!(key[2])));
            }
        }
        Ok(())
    }
}

fn check_schema(table: &Table, path: &Path, schema: &[&str]) -> Result<(), StoreError> {
    let missing = table.missing_columns(schema);
    if missing.is_empty() {
        return Ok(());
    }
    loge!("Schema drift in {}: missing {:?}", path.display(), missing);
    Err(StoreError::SchemaDrift { artifact: path.display().to_string(), missing })
}

pub fn read_table(path: &Path) -> Result<Table, StoreError> {
    let text = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    Table::from_csv(&text).map_err(|reason| StoreError::Malformed { path: path.to_path_buf(), reason })
}

/// Write via `<path>.tmp` + rename so readers never see a torn file.
pub fn write_table(path: &Path, table: &Table) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, table.to_csv()).map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
}

pub fn ensure_directory(dir: &Path) -> Result<(), StoreError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    if dir.exists() && !dir.is_dir() {
        return Err(StoreError::io(
            dir,
            io::Error::new(io::ErrorKind::AlreadyExists, "path exists but is not a directory"),
        ));
    }
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))
}

fn remove_if_exists(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io(path, e)),
    }
}
