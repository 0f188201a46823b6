//! linkpulse - URL shortener with per-visit analytics
//!
//! Owners create short links, visitors are redirected through them, and every
//! counted visit is recorded with device details. Repeated hits from the same
//! client inside a short window are redirected but not counted.
//!
//! # Architecture
//! - `storage`: `LinkStore` / `AnalyticsStore` traits, sea-orm and in-memory backends
//! - `analytics`: duplicate-hit suppression and user-agent parsing
//! - `services`: code generation, link lifecycle, redirect resolution, visit queries
//! - `api`: HTTP handlers, bearer-token auth
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and server mode
//! - `system`: Logging setup

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
