//! Tracker access: the provider abstraction, the REST client, and query
//! construction helpers.

pub mod error;
pub mod provider;
pub mod query;

#[cfg(feature = "remote-tracker")]
pub mod client;

pub use error::{TrackerError, TrackerResult};
pub use provider::{HistoryProvider, StaticHistoryProvider};

#[cfg(feature = "remote-tracker")]
pub use client::{TrackerClient, TrackerClientConfig};
