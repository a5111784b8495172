//! Combining a captured tick value with a fresh clock sample.
//!
//! Captures carry only the tick counter. The seconds come from a sample
//! taken when the capture is matched, which may sit on the other side of a
//! second boundary. Each matching path applies its own one-second
//! correction; neither ever moves the result by more than one second.

use crate::clock::ClockSample;
use crate::hw::{NSEC_PER_TICK, REFCLK_FREQ, TICK_MASK};
use crate::types::HwTimestamp;

/// Sample ticks above this are "late in the second".
pub const LATE_IN_SECOND: u32 = 3 * (REFCLK_FREQ / 4);

/// Stored ticks below this are "early in the second".
pub const EARLY_IN_SECOND: u32 = REFCLK_FREQ / 4;

/// Finalize a capture matched the moment it arrived.
///
/// The sample is taken right after the capture, so a sample tick below the
/// capture tick means the counter has wrapped since: the capture belongs to
/// the previous second.
#[must_use]
pub fn finalize_immediate(sample: ClockSample, raw_ticks: u32) -> HwTimestamp {
    let ticks = raw_ticks & TICK_MASK;
    let mut utc = sample.utc_seconds;
    if sample.tick_counter < ticks {
        utc = utc.wrapping_sub(1);
    }
    compose(utc, ticks)
}

/// Finalize a capture that waited in the ring for its packet.
///
/// Only the one window where the current sample is late in its second and
/// the stored tick is early in its second is corrected.
#[must_use]
pub fn finalize_deferred(sample: ClockSample, stored_ticks: u32) -> HwTimestamp {
    let mut utc = sample.utc_seconds;
    if sample.tick_counter > LATE_IN_SECOND && stored_ticks < EARLY_IN_SECOND {
        utc = utc.wrapping_sub(1);
    }
    compose(utc, stored_ticks)
}

fn compose(utc: u32, ticks: u32) -> HwTimestamp {
    HwTimestamp::new(utc, ticks.wrapping_mul(NSEC_PER_TICK))
}
