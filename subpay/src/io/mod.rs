//! I/O helpers: configuration and seed files.

pub mod config;
pub mod seed_store;
