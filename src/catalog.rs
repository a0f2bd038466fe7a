// src/catalog.rs
//! The place catalog: every `(Place, StateCode)` the ranking site lists.
//!
//! Collected one state page at a time, checkpointed after each state, so an
//! interrupted run resumes at the first state not yet in the checkpoint.

use std::collections::HashSet;

use crate::config::consts::{col, PLACES};
use crate::config::options::FetchOptions;
use crate::core::net::{with_retry, HttpClient, Throttle};
use crate::error::{EdenError, SourceError, StoreError};
use crate::progress::Progress;
use crate::specs::places::{parse_state_directory, state_url};
use crate::store::{CheckpointStore, ResumeState};
use crate::table::{Cell, Table};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateInfo {
    /// Two-letter lowercase code, `"wv"`.
    pub code: &'static str,
    /// Lowercase, underscore-separated, `"west_virginia"`.
    pub name: &'static str,
    /// Two-digit census FIPS code.
    pub fips: &'static str,
}

const fn st(code: &'static str, name: &'static str, fips: &'static str) -> StateInfo {
    StateInfo { code, name, fips }
}

pub const STATES: [StateInfo; 50] = [
    st("al", "alabama", "01"),
    st("ak", "alaska", "02"),
    st("az", "arizona", "04"),
    st("ar", "arkansas", "05"),
    st("ca", "california", "06"),
    st("co", "colorado", "08"),
    st("ct", "connecticut", "09"),
    st("de", "delaware", "10"),
    st("fl", "florida", "12"),
    st("ga", "georgia", "13"),
    st("hi", "hawaii", "15"),
    st("id", "idaho", "16"),
    st("il", "illinois", "17"),
    st("in", "indiana", "18"),
    st("ia", "iowa", "19"),
    st("ks", "kansas", "20"),
    st("ky", "kentucky", "21"),
    st("la", "louisiana", "22"),
    st("me", "maine", "23"),
    st("md", "maryland", "24"),
    st("ma", "massachusetts", "25"),
    st("mi", "michigan", "26"),
    st("mn", "minnesota", "27"),
    st("ms", "mississippi", "28"),
    st("mo", "missouri", "29"),
    st("mt", "montana", "30"),
    st("ne", "nebraska", "31"),
    st("nv", "nevada", "32"),
    st("nh", "new_hampshire", "33"),
    st("nj", "new_jersey", "34"),
    st("nm", "new_mexico", "35"),
    st("ny", "new_york", "36"),
    st("nc", "north_carolina", "37"),
    st("nd", "north_dakota", "38"),
    st("oh", "ohio", "39"),
    st("ok", "oklahoma", "40"),
    st("or", "oregon", "41"),
    st("pa", "pennsylvania", "42"),
    st("ri", "rhode_island", "44"),
    st("sc", "south_carolina", "45"),
    st("sd", "south_dakota", "46"),
    st("tn", "tennessee", "47"),
    st("tx", "texas", "48"),
    st("ut", "utah", "49"),
    st("vt", "vermont", "50"),
    st("va", "virginia", "51"),
    st("wa", "washington", "53"),
    st("wv", "west_virginia", "54"),
    st("wi", "wisconsin", "55"),
    st("wy", "wyoming", "56"),
];

pub fn state_by_code(code: &str) -> Option<&'static StateInfo> {
    STATES.iter().find(|s| s.code.eq_ignore_ascii_case(code.trim()))
}

/// `"wv"` → `"west_virginia"`.
pub fn code_to_state(code: &str) -> Option<&'static str> {
    state_by_code(code).map(|s| s.name)
}

/// Lookup by canonical name (`"west_virginia"`).
pub fn state_by_name(name: &str) -> Option<&'static StateInfo> {
    STATES.iter().find(|s| s.name == name)
}

pub fn state_for_name(name: &str) -> Option<&'static str> {
    state_by_name(name).map(|s| s.code)
}

/// `"6"` and `"06"` both resolve to California.
pub fn state_by_fips(fips: &str) -> Option<&'static StateInfo> {
    let f = fips.trim();
    if f.is_empty() || f.len() > 2 {
        return None;
    }
    let padded = format!("{f:0>2}");
    STATES.iter().find(|s| s.fips == padded)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Place {
    pub place: String,
    pub state: String,
    pub state_code: String,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    places: Vec<Place>,
}

impl Catalog {
    pub const COLUMNS: [&'static str; 3] = [col::PLACE, col::STATE, col::STATE_CODE];
    /// Natural key of a place in every per-place table.
    pub const KEY: [&'static str; 2] = [col::PLACE, col::STATE_CODE];

    pub fn empty_table() -> Table {
        Table::new(cols![col::PLACE, col::STATE, col::STATE_CODE])
    }

    pub fn from_table(table: &Table) -> Result<Self, StoreError> {
        let idx = table.indices(&Self::COLUMNS).map_err(|c| StoreError::SchemaDrift {
            artifact: s!(PLACES),
            missing: vec![c],
        })?;
        let mut seen = HashSet::new();
        let mut places = Vec::with_capacity(table.len());
        for r in 0..table.len() {
            let Some(k) = table.key(r, &idx) else { continue };
            if !seen.insert((s!(k[0]), s!(k[2]))) {
                continue;
            }
            places.push(Place { place: s!(k[0]), state: s!(k[1]), state_code: s!(k[2]) });
        }
        Ok(Self { places })
    }

    pub fn to_table(&self) -> Table {
        let mut t = Self::empty_table();
        for p in &self.places {
            t.push_row(vec![
                Cell::value(p.place.as_str()),
                Cell::value(p.state.as_str()),
                Cell::value(p.state_code.as_str()),
            ]);
        }
        t
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Starting table of a per-place fetcher: `Place, StateCode` then `fields`, all pending.
    pub fn seed(&self, fields: &[&str]) -> Table {
        let mut headers = cols![col::PLACE, col::STATE_CODE];
        headers.extend(fields.iter().map(|f| s!(*f)));
        let mut t = Table::new(headers);
        for p in &self.places {
            t.push_row(vec![Cell::value(p.place.as_str()), Cell::value(p.state_code.as_str())]);
        }
        t
    }

    /// The finished catalog from disk, if there is one.
    pub fn load(store: &CheckpointStore) -> Result<Option<Self>, StoreError> {
        if store.state(PLACES) != ResumeState::Complete {
            return Ok(None);
        }
        let (table, _) = store.load_latest(PLACES, &Self::COLUMNS, Self::empty_table)?;
        Self::from_table(&table).map(Some)
    }
}

/// Build (or resume) the catalog over `states`.
///
/// A state already present in the checkpoint is not fetched again. A state page
/// that cannot be fetched after retries stops the run with a checkpoint on disk.
pub fn list_places(
    store: &CheckpointStore,
    client: &dyn HttpClient,
    base_url: &str,
    fetch: &FetchOptions,
    throttle: &Throttle,
    states: &[StateInfo],
    progress: &mut dyn Progress,
) -> Result<Catalog, EdenError> {
    let (mut table, state) = store.load_latest(PLACES, &Catalog::COLUMNS, Catalog::empty_table)?;
    if state == ResumeState::Complete {
        return Ok(Catalog::from_table(&table)?);
    }

    let code_col = table.column(col::STATE_CODE).unwrap_or(2);
    let done: HashSet<String> = table.distinct(code_col).into_iter().collect();
    let todo: Vec<&StateInfo> = states.iter().filter(|s| !done.contains(s.code)).collect();
    progress.begin(PLACES, todo.len());

    for (i, info) in todo.iter().enumerate() {
        if i > 0 {
            throttle.pause();
        }
        let url = state_url(base_url, info.code);
        let page = match with_retry(fetch, info.name, || client.get_text(&url)) {
            Ok(page) => page,
            Err(SourceError::NotFound(_)) => {
                logw!("No directory page for {}; skipping.", info.name);
                progress.item_failed(info.name, "not found");
                continue;
            }
            Err(e) => {
                loge!("Listing {} failed: {e}", info.name);
                store.save_checkpoint(PLACES, &table)?;
                progress.finish();
                return Err(e.into());
            }
        };

        let slugs = parse_state_directory(&page);
        if slugs.is_empty() {
            logw!("No places listed for {}.", info.name);
        }
        for slug in slugs {
            table.push_row(vec![Cell::value(slug), Cell::value(info.name), Cell::value(info.code)]);
        }
        store.save_checkpoint(PLACES, &table)?;
        logf!("Collected places for {}, {}.", info.name, info.code);
        progress.item_done(info.code);
    }

    store.finalize(PLACES, &table)?;
    progress.finish();
    Ok(Catalog::from_table(&table)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifty_distinct_states() {
        let codes: HashSet<_> = STATES.iter().map(|s| s.code).collect();
        let fips: HashSet<_> = STATES.iter().map(|s| s.fips).collect();
        assert_eq!(codes.len(), 50);
        assert_eq!(fips.len(), 50);
        assert!(STATES.iter().all(|s| s.name.chars().all(|c| c.is_ascii_lowercase() || c == '_')));
    }

    #[test]
    fn lookups() {
        assert_eq!(code_to_state("wv"), Some("west_virginia"));
        assert_eq!(code_to_state("CA"), Some("california"));
        assert_eq!(code_to_state("pr"), None);
        assert_eq!(state_for_name("new_york"), Some("ny"));
        assert_eq!(state_by_fips("6").map(|s| s.code), Some("ca"));
        assert_eq!(state_by_fips("17").map(|s| s.code), Some("il"));
        assert_eq!(state_by_fips("72"), None);
    }

    #[test]
    fn seed_has_key_then_pending_fields() {
        let mut t = Catalog::empty_table();
        t.push_row(vec![Cell::value("springfield"), Cell::value("illinois"), Cell::value("il")]);
        t.push_row(vec![Cell::value("springfield"), Cell::value("illinois"), Cell::value("il")]);
        let cat = Catalog::from_table(&t).unwrap();
        assert_eq!(cat.len(), 1);
        let seed = cat.seed(&[col::COUNTY]);
        assert_eq!(seed.headers(), &[col::PLACE, col::STATE_CODE, col::COUNTY]);
        assert_eq!(seed.rows()[0][2], Cell::Pending);
    }
}
