//! Personal media catalog backend.
//!
//! Users track movies and series, tag them with genres from a fixed taxonomy,
//! and list, filter and sort their own entries.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
