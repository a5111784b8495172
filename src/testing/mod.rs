//! Test doubles for the hardware and network-stack collaborators.
//!
//! Used by the crate's own tests and benches, and by integrators who want
//! to exercise the core without an FPGA.

mod doubles;
mod registers;

pub use doubles::{RecordingSink, ScriptedClock};
pub use registers::{RegisterFile, RegisterOp};
