//! # wrnic
//!
//! Hardware timestamping core of a White Rabbit network interface.
//!
//! ## Features
//!
//! - Torn-read-safe sampling of the PPS generator counters
//! - Correlation of TX timestamp captures with in-flight packets, in either
//!   arrival order
//! - DMTD phase readout and PHY calibration modes
//! - Timestamping mode configuration and user-boundary payloads
//!
//! ## Example
//!
//! ```rust
//! use wrnic::clock::ClockSample;
//! use wrnic::correlation::CorrelationEngine;
//! use wrnic::testing::{RecordingSink, ScriptedClock};
//!
//! # fn main() -> Result<(), wrnic::NicError> {
//! let clock = ScriptedClock::fixed(ClockSample::new(500, 1000));
//! let engine = CorrelationEngine::new(clock, RecordingSink::<u32>::new());
//!
//! // Packet parked first; the capture matches it on arrival
//! engine.track(3, 7, 0xcafe)?;
//! engine.on_timestamp_captured(100, 7, 1)?;
//! assert_eq!(engine.sink().delivered_count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Hardware**: [`hw`] - register access, register layout, interrupt-safe lock
//! - **Time**: [`clock`] - consistent tick/seconds samples
//! - **Correlation**: [`correlation`] - pending table, capture ring, interrupt boundary
//! - **Calibration**: [`phase`] - DMTD phase and PHY calibration
//! - **Boundary**: [`stamping`] and [`control`] - user-visible requests

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Error types
pub mod error;
/// Core types
pub mod types;

pub mod clock;
pub mod control;
pub mod correlation;
pub mod hw;
pub mod phase;
pub mod stamping;

/// Testing utilities
pub mod testing;

// Re-exports
pub use clock::{ClockSample, ClockSampler, ClockSource};
pub use correlation::{CorrelationEngine, PacketSink};
pub use error::{NicError, Result};
pub use phase::{CalibrationCommand, PhaseCalibrator, PhaseSample};
pub use stamping::{HwTstampConfig, StampingFlags};
pub use types::{DmtdConfig, HwTimestamp, NicConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
///
/// Convenient re-exports
pub mod prelude {
    pub use crate::correlation::{CaptureIrq, CaptureOutcome, CompletionOutcome};
    pub use crate::hw::RegisterAccess;
    pub use crate::{
        CalibrationCommand, ClockSampler, ClockSource, CorrelationEngine, HwTimestamp, NicConfig,
        NicError, PacketSink, PhaseCalibrator, StampingFlags,
    };
}
