// src/runner.rs
//! Top-level orchestration: one method per concern and per master stage.
//!
//! Every step is resumable on its own; rerunning a finished step reads the
//! artifact from disk and makes no request.

use std::fmt;

use crate::catalog::{list_places, Catalog, STATES};
use crate::config::consts::{self, col};
use crate::config::options::EdenConfig;
use crate::core::net::{HttpClient, Throttle, UreqClient};
use crate::error::{EdenError, MergeError};
use crate::features::nearest_temple_km;
use crate::merge::Master;
use crate::progress::Progress;
use crate::scrape::{
    collect, collect_bulk, retry_errored, CountySource, CrimeSource, DistrictSource, Download,
    DroughtHistorySource, DroughtModel, GeodataSource, PopulationSource, RowSource,
    ScorecardSource, StatsSource, TempleSource,
};
use crate::score;
use crate::store::CheckpointStore;
use crate::table::Table;

/// Every artifact family the pipeline collects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Concern {
    Places,
    Counties,
    Geodata,
    Districts,
    Climate,
    Health,
    Housing,
    Voting,
    Crime,
    Population,
    DroughtHistory,
    Drought,
    Temples,
}

impl Concern {
    pub const ALL: [Concern; 13] = [
        Concern::Places,
        Concern::Counties,
        Concern::Geodata,
        Concern::Districts,
        Concern::Climate,
        Concern::Health,
        Concern::Housing,
        Concern::Voting,
        Concern::Crime,
        Concern::Population,
        Concern::DroughtHistory,
        Concern::Drought,
        Concern::Temples,
    ];

    /// Master stages, in build order.
    pub const STAGES: [Concern; 10] = [
        Concern::Geodata,
        Concern::Districts,
        Concern::Climate,
        Concern::Health,
        Concern::Housing,
        Concern::Voting,
        Concern::Crime,
        Concern::Population,
        Concern::Drought,
        Concern::Temples,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Concern::Places => consts::PLACES,
            Concern::Counties => consts::COUNTIES,
            Concern::Geodata => consts::GEODATA,
            Concern::Districts => consts::DISTRICTS,
            Concern::Climate => consts::CLIMATE,
            Concern::Health => consts::HEALTH,
            Concern::Housing => consts::HOUSING,
            Concern::Voting => consts::VOTING,
            Concern::Crime => consts::CRIME,
            Concern::Population => consts::POPULATION,
            Concern::DroughtHistory => consts::DROUGHT_HISTORY,
            Concern::Drought => consts::DROUGHT,
            Concern::Temples => consts::TEMPLES,
        }
    }

    pub fn from_name(name: &str) -> Option<Concern> {
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Join key of the concern's table against the master.
    pub fn join_keys(self) -> &'static [&'static str] {
        match self {
            Concern::Geodata => &[col::CITY, col::STATE_CODE, col::COUNTY],
            Concern::Voting => &[col::DISTRICT],
            Concern::Crime => &[col::PLACE, col::COUNTY, col::STATE_CODE],
            Concern::Population => &[col::CITY, col::STATE_CODE],
            Concern::Drought | Concern::DroughtHistory => &[col::FIPS],
            _ => &Catalog::KEY,
        }
    }
}

impl fmt::Display for Concern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct Runner {
    config: EdenConfig,
    store: CheckpointStore,
    client: Box<dyn HttpClient>,
    throttle: Throttle,
}

impl Runner {
    pub fn new(config: EdenConfig) -> Self {
        let client = Box::new(UreqClient::new(&config.fetch));
        let throttle = Throttle::from_options(&config.fetch);
        Self::with_client(config, client, throttle)
    }

    /// Any transport; tests pass a canned one and `Throttle::none()`.
    pub fn with_client(config: EdenConfig, client: Box<dyn HttpClient>, throttle: Throttle) -> Self {
        let store = CheckpointStore::new(&config.root);
        Self { config, store, client, throttle }
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    pub fn config(&self) -> &EdenConfig {
        &self.config
    }

    fn download<'a>(&'a self, url: &'a str) -> Download<'a> {
        Download { client: self.client.as_ref(), fetch: &self.config.fetch, url }
    }

    fn catalog(&self) -> Result<Catalog, EdenError> {
        Catalog::load(&self.store)?.ok_or_else(|| MergeError::NotCollected(consts::PLACES).into())
    }

    fn master(&self, stage: &'static str) -> Result<Table, EdenError> {
        Master::new(&self.store).load()?.ok_or_else(|| MergeError::NoMaster(stage).into())
    }

    fn collect_rows(
        &self,
        source: &dyn RowSource,
        seed: impl FnOnce() -> Result<Table, EdenError>,
        progress: &mut dyn Progress,
    ) -> Result<Table, EdenError> {
        collect(&self.store, source, seed, &self.config.fetch, &self.throttle, progress)
    }

    /// Seed for a per-place source: the finished catalog with `fields` pending.
    fn from_catalog(&self, fields: Vec<&'static str>) -> impl FnOnce() -> Result<Table, EdenError> + '_ {
        move || Ok(self.catalog()?.seed(&fields))
    }

    pub fn places(&self, progress: &mut dyn Progress) -> Result<Catalog, EdenError> {
        list_places(
            &self.store,
            self.client.as_ref(),
            &self.config.sources.bestplaces,
            &self.config.fetch,
            &self.throttle,
            &STATES,
            progress,
        )
    }

    /// Collect one concern into its artifact (no merging).
    pub fn collect(&self, concern: Concern, progress: &mut dyn Progress) -> Result<Table, EdenError> {
        let urls = &self.config.sources;
        let client = self.client.as_ref();
        match concern {
            Concern::Places => self.places(progress).map(|c| c.to_table()),
            Concern::Counties => {
                let src = CountySource::new(client, &urls.bestplaces);
                self.collect_rows(&src, self.from_catalog(src.fields()), progress)
            }
            Concern::Climate | Concern::Health | Concern::Housing => {
                let src = match concern {
                    Concern::Climate => StatsSource::climate(client, &urls.bestplaces),
                    Concern::Health => StatsSource::health(client, &urls.bestplaces),
                    _ => StatsSource::housing(client, &urls.bestplaces),
                };
                self.collect_rows(&src, self.from_catalog(src.fields()), progress)
            }
            Concern::Districts => {
                let src = DistrictSource::new(client, &urls.district_query);
                self.collect_rows(&src, || self.master(consts::DISTRICTS), progress)
            }
            Concern::Voting => {
                let src = ScorecardSource::new(client, &urls.scorecard);
                let seed = || Ok(ScorecardSource::seed(&self.master(consts::VOTING)?));
                self.collect_rows(&src, seed, progress)
            }
            Concern::Drought => {
                let history = self.collect(Concern::DroughtHistory, progress)?;
                let model = DroughtModel::from_history(&history, consts::DROUGHT_HORIZON_DAYS);
                let seed = || Ok(DroughtModel::seed(&self.master(consts::DROUGHT)?));
                self.collect_rows(&model, seed, progress)
            }
            Concern::DroughtHistory => collect_bulk(
                &self.store,
                &DroughtHistorySource::new(client, &self.config.fetch, &urls.drought),
            ),
            Concern::Geodata => collect_bulk(
                &self.store,
                &GeodataSource { from: self.download(&urls.geodata), entry: &urls.geodata_entry },
            ),
            Concern::Crime => collect_bulk(&self.store, &CrimeSource { from: self.download(&urls.crime) }),
            Concern::Population => {
                collect_bulk(&self.store, &PopulationSource { from: self.download(&urls.population) })
            }
            Concern::Temples => collect_bulk(&self.store, &TempleSource { from: self.download(&urls.temples) }),
        }
    }

    /// Collect one master stage and fold it into the master.
    pub fn stage(&self, stage: Concern, progress: &mut dyn Progress) -> Result<Table, EdenError> {
        let master = Master::new(&self.store);
        let table = self.collect(stage, progress)?;
        match stage {
            Concern::Temples => master.derive(consts::TEMPLES, col::TEMPLE_DISTANCE, |m| {
                Ok(nearest_temple_km(m, &table))
            }),
            _ => master.enrich(stage.name(), &table, stage.join_keys()),
        }
    }

    /// Every master stage in order. Stages already in the master are no-ops.
    pub fn build(&self, progress: &mut dyn Progress) -> Result<Table, EdenError> {
        let mut master = Table::default();
        for stage in Concern::STAGES {
            logf!("Stage {stage}.");
            progress.log(&format!("Stage {stage}."));
            master = self.stage(stage, progress)?;
        }
        Ok(master)
    }

    pub fn score(&self) -> Result<Table, EdenError> {
        score::apply(&self.store, &self.config.scoring)
    }

    /// Reset errored cells of `concern` so the next collection retries them.
    pub fn retry(&self, concern: Concern) -> Result<usize, EdenError> {
        Ok(retry_errored(&self.store, concern.name())?)
    }

    /// Places, counties, every master stage, then the score.
    pub fn run_all(&self, progress: &mut dyn Progress) -> Result<Table, EdenError> {
        self.places(progress)?;
        self.collect(Concern::Counties, progress)?;
        self.build(progress)?;
        self.score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concern_names_round_trip() {
        for c in Concern::ALL {
            assert_eq!(Concern::from_name(c.name()), Some(c));
        }
        assert_eq!(Concern::from_name("Drought-History"), Some(Concern::DroughtHistory));
        assert_eq!(Concern::from_name("weather"), None);
    }

    #[test]
    fn stage_keys() {
        assert_eq!(Concern::Geodata.join_keys(), &[col::CITY, col::STATE_CODE, col::COUNTY]);
        assert_eq!(Concern::Climate.join_keys(), &[col::PLACE, col::STATE_CODE]);
        assert_eq!(Concern::Drought.join_keys(), &[col::FIPS]);
    }
}
