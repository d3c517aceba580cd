//! # Cadence Rust Backend
//!
//! Cycle-time analytics engine for work items tracked in an external issue
//! system. Given an item's chronological change history, the engine
//! determines when active work began, when it ended, and how much of that
//! interval was active after subtracting excluded-status time and
//! impediment-flagged time, with overlap accounting so no interval is
//! double-counted. Results can be filtered to a specific worker.
//!
//! ## Features
//!
//! - **Engine**: deterministic, pure per-item calculation with a simple and
//!   a complex algorithm behind a heuristic selector
//! - **Tracker access**: paginated changelog retrieval with rate-limit
//!   handling, behind a provider trait
//! - **Reports**: sequential batch computation with summary statistics
//! - **Time Handling**: vendor timestamp normalisation and reporting windows
//! - **HTTP API**: RESTful endpoints for frontend integration
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: identifier newtypes and the consolidated DTO surface
//! - [`models`]: raw changelog types, timestamps, vocabulary, time windows
//! - [`engine`]: the cycle-time engine (the core of the crate)
//! - [`tracker`]: the `HistoryProvider` trait, the REST client, query helpers
//! - [`services`]: batch reports, summary statistics, report-job registry
//! - [`http`]: axum-based HTTP server and request handlers
//!

pub mod api;

pub mod config;
pub mod engine;
pub mod models;

pub mod services;
pub mod tracker;

#[cfg(feature = "http-server")]
pub mod http;
