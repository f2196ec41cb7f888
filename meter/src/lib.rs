//! Metering library for the fuelgauge tools: log-corpus scanning,
//! session-block reconstruction, burn-rate evaluation, and the usage-API
//! client with its cache and credential helpers.

pub mod align;
pub mod api;
pub mod blocks;
pub mod burn;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod extract;
pub mod format;
pub mod notifier;
pub mod parse;
pub mod scan;
