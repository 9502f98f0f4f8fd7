//! Floor-plan layout editor service.
//!
//! Hosts the `canvas` editing engine per facility floor and persists each
//! floor's elements through a remote Postgres tier backed by a local cache.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
