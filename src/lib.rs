#![forbid(unsafe_code)]

//! Personal task tracker: a `SQLite`-backed REST task store and a sync
//! client that mirrors it.

pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod persistence;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
