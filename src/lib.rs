//! Earthquake proximity monitoring service.
//!
//! Polls the USGS summary feeds, splits each batch into events near a
//! selected region and significant events worldwide, classifies the newest
//! event into an alert level, and keeps a single self-expiring notification
//! that a presentation layer can read or subscribe to.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod geo;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod regions;
