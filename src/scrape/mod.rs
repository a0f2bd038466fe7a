// src/scrape/mod.rs
pub mod bulk;
pub mod collect;
mod congress;
mod downloads;
mod drought;
mod places;

pub use bulk::{collect_bulk, BulkSource};
pub use collect::{collect, retry_errored, RowKey, RowSource};
pub use congress::{DistrictSource, ScorecardSource};
pub use downloads::{CrimeSource, Download, GeodataSource, PopulationSource, TempleSource};
pub use drought::{fit_and_predict, DroughtHistorySource, DroughtModel};
pub use places::{CountySource, StatsSource};
