// Analyzer module: aggregation of fetched records plus descriptive indicators.

pub mod aggregate;
pub mod indicators;

pub use aggregate::{observations_by_genre, Aggregator};
