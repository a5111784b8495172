//! Hardware collaborators: register access, register layout and the
//! interrupt-safe lock shared by interrupt and call context.
//!
//! ## Reference Clock
//!
//! The PPS generator and the TX timestamping unit count ticks of the
//! 125 MHz reference clock. One tick is exactly 8 ns; the tick counter
//! wraps once per second and carries into the UTC seconds counter.

pub mod mmio;
pub mod regs;
pub mod sync;


pub use mmio::{Mmio, RegisterAccess};
pub use sync::{HostInterrupts, InterruptControl, IrqSafeGuard, IrqSafeMutex};

/// Reference clock frequency in Hz; also the nominal ticks per second.
pub const REFCLK_FREQ: u32 = 125_000_000;

/// Nanoseconds per reference-clock tick.
pub const NSEC_PER_TICK: u32 = 8;

/// Nanoseconds per second.
pub const NSEC_PER_SEC: u32 = 1_000_000_000;

/// Width of the hardware tick counter captured by the TX timestamping unit.
pub const TICK_MASK: u32 = 0x0fff_ffff;

// The clock period must be a whole number of nanoseconds.
const _: () = assert!(REFCLK_FREQ * NSEC_PER_TICK == NSEC_PER_SEC);
