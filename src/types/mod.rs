//! Core types module

mod config;
mod timestamp;

#[cfg(test)]
mod tests;

pub use config::{DmtdConfig, NicConfig, NicConfigBuilder, StampingConfig};
pub use timestamp::HwTimestamp;
