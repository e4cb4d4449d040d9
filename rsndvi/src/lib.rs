pub mod collect;
pub mod commons;
pub mod config;
pub mod error;
pub mod export;
pub mod geo_core;
pub mod geometric;

pub use config::NdviConfig;
pub use error::{NdviError, Result};
pub use geometric::pipeline::{NdviOutcome, NdviPipeline};
