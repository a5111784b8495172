//! Hardware timestamp attached to a transmitted frame.
//!
//! The NIC reports time as a 31-bit UTC seconds value plus a nanosecond
//! field derived from the reference-clock tick count. The nanosecond field
//! is carried as computed (`ticks * NSEC_PER_TICK`); register garbage is not
//! normalized here.

use std::time::Duration;

/// Seconds + nanoseconds pair delivered with a timestamped packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HwTimestamp {
    /// UTC seconds, masked to 31 bits.
    pub seconds: u32,
    /// Nanoseconds within the second.
    pub nanoseconds: u32,
}

impl HwTimestamp {
    /// Nanoseconds in one second.
    pub const NANOS_PER_SEC: u32 = 1_000_000_000;

    /// Seconds are reported as a non-negative 32-bit signed quantity.
    pub const SECONDS_MASK: u32 = 0x7fff_ffff;

    /// Zero timestamp.
    pub const ZERO: Self = Self {
        seconds: 0,
        nanoseconds: 0,
    };

    /// Create a timestamp, masking seconds to 31 bits.
    #[must_use]
    pub const fn new(seconds: u32, nanoseconds: u32) -> Self {
        Self {
            seconds: seconds & Self::SECONDS_MASK,
            nanoseconds,
        }
    }

    /// Convert to total nanoseconds.
    #[must_use]
    pub fn to_nanos(&self) -> u64 {
        u64::from(self.seconds) * u64::from(Self::NANOS_PER_SEC) + u64::from(self.nanoseconds)
    }

    /// Signed difference in nanoseconds: `self - other`.
    #[must_use]
    pub fn diff_nanos(&self, other: &Self) -> i64 {
        // Both sides are below 2^31 * 10^9 + 2^32, well inside i64.
        #[allow(clippy::cast_possible_wrap)]
        let diff = self.to_nanos().wrapping_sub(other.to_nanos()) as i64;
        diff
    }

    /// Convert to a `Duration` since the UTC epoch.
    #[must_use]
    pub fn to_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.seconds)) + Duration::from_nanos(u64::from(self.nanoseconds))
    }
}

impl std::fmt::Display for HwTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanoseconds)
    }
}

impl std::ops::Sub for HwTimestamp {
    type Output = i64;

    fn sub(self, rhs: Self) -> Self::Output {
        self.diff_nanos(&rhs)
    }
}

impl From<HwTimestamp> for Duration {
    fn from(ts: HwTimestamp) -> Self {
        ts.to_duration()
    }
}
