//! Visit analytics helpers
//!
//! - `dedup`: process-local suppression of rapid repeat hits
//! - `device`: user agent → device / OS / browser

pub mod dedup;
pub mod device;

pub use dedup::{DedupCache, DedupKey};
pub use device::{DeviceInfo, DeviceParser, NoopDeviceParser, WootheeDeviceParser};
