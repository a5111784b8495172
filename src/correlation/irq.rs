//! TXTSU interrupt boundary.
//!
//! Pops one capture from the timestamp FIFO registers, feeds it to the
//! correlation engine and acknowledges the interrupt. When the engine
//! cannot store the capture the "FIFO not empty" source is masked: further
//! captures would be lost anyway, and a masked source stops the interrupt
//! from firing in a loop. Notifications stay off until [`CaptureIrq::rearm`]
//! finds room in the ring.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::{CaptureOutcome, TimestampCapture};
use crate::error::{NicError, Result};
use crate::hw::RegisterAccess;
use crate::hw::regs::txtsu;

/// What the interrupt handler did with one capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqOutcome {
    /// Capture delivered or stored.
    Handled(CaptureOutcome),
    /// Ring full; capture dropped and the interrupt source masked.
    Quiesced,
}

/// Interrupt handler state for the TX timestamping unit.
#[derive(Debug)]
pub struct CaptureIrq<R> {
    regs: R,
    enabled: AtomicBool,
    quiesced: AtomicU64,
}

impl<R: RegisterAccess> CaptureIrq<R> {
    /// Create a handler over the TXTSU register block. The interrupt
    /// starts disabled.
    pub fn new(regs: R) -> Self {
        Self {
            regs,
            enabled: AtomicBool::new(false),
            quiesced: AtomicU64::new(0),
        }
    }

    /// Zero the correlation state and optionally enable the interrupt.
    pub fn init(&self, engine: &impl TimestampCapture, enable: bool) {
        engine.reset();
        if enable {
            self.enable();
        }
    }

    /// Service one "FIFO not empty" interrupt.
    pub fn handle(&self, engine: &impl TimestampCapture) -> IrqOutcome {
        let r0 = self.regs.read(txtsu::TSF_R0);
        let r1 = self.regs.read(txtsu::TSF_R1);

        let outcome = match engine.on_timestamp_captured(r0, txtsu::frame_id(r1), txtsu::port_id(r1)) {
            Ok(outcome) => IrqOutcome::Handled(outcome),
            Err(err) => {
                tracing::warn!("TXTSU: {err}. Disabling TX stamping.");
                self.disable();
                self.quiesced.fetch_add(1, Ordering::Relaxed);
                IrqOutcome::Quiesced
            }
        };

        self.regs.write(txtsu::EIC_ISR, txtsu::EIC_NEMPTY);
        outcome
    }

    /// Re-enable capture notifications after exhaustion.
    ///
    /// # Errors
    /// `ResourceExhausted` if the ring is still full; the source stays
    /// masked.
    pub fn rearm(&self, engine: &impl TimestampCapture) -> Result<()> {
        if !engine.has_free_capture_slot() {
            return Err(NicError::ResourceExhausted {
                capacity: engine.ring_capacity(),
            });
        }
        self.enable();
        tracing::info!("TXTSU: capture interrupt re-armed");
        Ok(())
    }

    /// Unmask the "FIFO not empty" source.
    pub fn enable(&self) {
        self.regs.write(txtsu::EIC_IER, txtsu::EIC_NEMPTY);
        self.enabled.store(true, Ordering::Release);
    }

    /// Mask the "FIFO not empty" source.
    pub fn disable(&self) {
        self.regs.write(txtsu::EIC_IDR, txtsu::EIC_NEMPTY);
        self.enabled.store(false, Ordering::Release);
    }

    /// Whether the source is currently unmasked.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// The TXTSU register block.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Number of captures dropped because the ring was full.
    pub fn quiesced_count(&self) -> u64 {
        self.quiesced.load(Ordering::Relaxed)
    }
}
