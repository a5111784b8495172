//! PPS generator time sampling.
//!
//! The tick counter and the UTC seconds counter live in separate registers
//! and cannot be read in one access. If the tick counter wraps between the
//! two reads the seconds counter moves on, and a naive pair would be off by
//! a whole second. [`ClockSampler`] brackets the tick read with two seconds
//! reads and re-reads the ticks once when the brackets disagree.
//!
//! One correction pass is all that is attempted; residual skew within one
//! register read latency is accepted.

use std::sync::Arc;

use crate::hw::RegisterAccess;
use crate::hw::regs::ppsg;


/// Tick counter and UTC seconds read as one consistent pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ClockSample {
    /// Reference-clock ticks within the current second.
    pub tick_counter: u32,
    /// UTC seconds matching `tick_counter`.
    pub utc_seconds: u32,
}

impl ClockSample {
    /// Create a sample from raw counter values.
    #[must_use]
    pub const fn new(tick_counter: u32, utc_seconds: u32) -> Self {
        Self {
            tick_counter,
            utc_seconds,
        }
    }
}

/// Source of [`ClockSample`]s for timestamp finalization.
pub trait ClockSource: Send + Sync {
    /// Take a consistent sample of the current time.
    fn sample(&self) -> ClockSample;
}

impl<T: ClockSource + ?Sized> ClockSource for &T {
    fn sample(&self) -> ClockSample {
        (**self).sample()
    }
}

impl<T: ClockSource + ?Sized> ClockSource for Arc<T> {
    fn sample(&self) -> ClockSample {
        (**self).sample()
    }
}

/// Torn-read-safe reader of the PPS generator counters.
#[derive(Debug)]
pub struct ClockSampler<R> {
    regs: R,
}

impl<R: RegisterAccess> ClockSampler<R> {
    /// Create a sampler over the PPS generator register block.
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Read the tick counter and UTC seconds.
    ///
    /// Seconds are read before and after the ticks. When the two differ the
    /// counter rolled over inside the window, so the ticks are read again to
    /// match the second seconds read, which is the one returned.
    pub fn read_time(&self) -> ClockSample {
        let utc1 = self.regs.read(ppsg::CNTR_UTCLO);
        let mut ticks = self.regs.read(ppsg::CNTR_NSEC);
        let utc2 = self.regs.read(ppsg::CNTR_UTCLO);

        if utc2 != utc1 {
            ticks = self.regs.read(ppsg::CNTR_NSEC);
            tracing::trace!(utc1, utc2, ticks, "PPSG: second rolled over while sampling");
        }

        ClockSample {
            tick_counter: ticks,
            utc_seconds: utc2,
        }
    }

    /// The underlying register block.
    pub fn registers(&self) -> &R {
        &self.regs
    }
}

impl<R: RegisterAccess> ClockSource for ClockSampler<R> {
    fn sample(&self) -> ClockSample {
        self.read_time()
    }
}
