// src/lib.rs

#[macro_use]
pub mod macros;

#[macro_use]
pub mod log;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod specs;

pub mod catalog;
pub mod csv;
pub mod error;
pub mod features;
pub mod merge;
pub mod normalize;
pub mod progress;
pub mod runner;
pub mod score;
pub mod scrape;
pub mod store;
pub mod table;

pub use error::{EdenError, Result};
