//! fxr-analyze library
//!
//! Consensus scoring, descriptive statistics and report rendering over the
//! recipes harvested by fxr-scrape. Scoring and statistics are pure functions
//! over `&[RecipeRecord]`; only `db` touches the database, and only to read.

pub mod consensus;
pub mod db;
pub mod report;
pub mod stats;

pub use consensus::{score, ConsensusProfile, ConsensusReport, FieldConsensus, ScoredField};
pub use stats::{label_frequencies, step_distributions, top_by_sensor, white_balance_trend};
