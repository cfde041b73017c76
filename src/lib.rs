//! Fitness log: a local SQLite record store, a client for the fitness
//! backend, and the weekly/monthly stats derived from either.

pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod models;
pub mod remote;
pub mod stats;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use models::{FitnessRecord, NewRecord, Payload};
pub use stats::{MonthKey, StatsData, TimeRangeStats, aggregate};
pub use store::RecordStore;
pub use types::BodyPart;
