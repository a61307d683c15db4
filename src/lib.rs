//! fragviz - Memory fragmentation event log visualizer
//!
//! This library loads JSON fragmentation event logs, down-samples large logs
//! to an evenly spaced subset, and renders single or A/B comparison
//! dashboards.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod driver;
pub mod event_log;
pub mod loader;
pub mod metrics;
pub mod progress;
pub mod sampler;
pub mod svg;
