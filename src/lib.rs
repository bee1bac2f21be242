//! Water-quality monitoring dashboard client.
//!
//! Pulls sites, sensor readings, alerts and analytics from the monitoring
//! backend, listens on its push channel for live readings, and keeps three
//! page views (dashboard, map, analytics) in sync with both.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod dev_mode;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod page;
pub mod push;
pub mod quality;
pub mod session;
pub mod sites;
pub mod verify;
pub mod view;
