//! DMTD phase readout and PHY calibration modes.
//!
//! The endpoint's dual-mixer phase detector accumulates `avg_samples`
//! phase measurements into a 24-bit signed register. Reading it yields the
//! averaged phase folded into `[0, max_phase)`.
//!
//! Calibration modes live in the PHY's `WR_SPEC` register and are changed
//! with read-modify-write cycles. The PHY accessor sits behind a mutex so
//! concurrent mode changes cannot lose each other's bits.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{NicError, Result};
use crate::hw::RegisterAccess;
use crate::hw::regs::{ep, phy};
use crate::types::DmtdConfig;


/// Result of one phase readout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseSample {
    /// A new measurement was available.
    pub ready: bool,
    /// Averaged phase in `[0, max_phase)`; zero when not ready.
    pub phase: i32,
}

/// PHY calibration commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CalibrationCommand {
    /// Start sending the transmit calibration pattern
    TxOn = 1,
    /// Stop sending the transmit calibration pattern
    TxOff = 2,
    /// Reset the receive calibration logic
    RxOn = 3,
    /// No-op: receive calibration clears itself
    RxOff = 4,
    /// Report whether a calibration pattern is being received
    RxCheck = 5,
}

impl TryFrom<i32> for CalibrationCommand {
    type Error = NicError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1 => Ok(Self::TxOn),
            2 => Ok(Self::TxOff),
            3 => Ok(Self::RxOn),
            4 => Ok(Self::RxOff),
            5 => Ok(Self::RxCheck),
            _ => Err(NicError::InvalidRequest {
                field: "cmd",
                value,
            }),
        }
    }
}

/// Convert a raw `DMSR` value into an averaged, folded phase.
///
/// Bits 23:0 are sign-extended, divided by `avg_samples` (truncating
/// toward zero) and folded into `[0, max_phase)`. Both parameters must be
/// positive, see [`DmtdConfig::validate`].
#[must_use]
pub fn fold_phase(dmsr: u32, dmtd: DmtdConfig) -> i32 {
    // Move bit 23 into the sign position and shift back arithmetically.
    #[allow(clippy::cast_possible_wrap)]
    let raw = (((dmsr & ep::DMSR_PS_VAL_MASK) << 8) as i32) >> 8;
    let averaged = raw / dmtd.avg_samples;
    averaged.rem_euclid(dmtd.max_phase)
}

/// Phase readout and calibration control for one endpoint.
#[derive(Debug)]
pub struct PhaseCalibrator<E, P> {
    ep: E,
    phy: Mutex<P>,
    dmtd: DmtdConfig,
}

impl<E: RegisterAccess, P: RegisterAccess> PhaseCalibrator<E, P> {
    /// Create a calibrator over the endpoint registers and the PHY's MDIO
    /// registers.
    ///
    /// # Errors
    /// `InvalidConfig` if the DMTD parameters are not positive.
    pub fn new(ep: E, phy: P, dmtd: DmtdConfig) -> Result<Self> {
        dmtd.validate()?;
        Ok(Self {
            ep,
            phy: Mutex::new(phy),
            dmtd,
        })
    }

    /// Read the current phase measurement.
    pub fn read_phase(&self) -> PhaseSample {
        let dmsr = self.ep.read(ep::DMSR);
        if dmsr & ep::DMSR_PS_RDY == 0 {
            return PhaseSample::default();
        }

        let phase = fold_phase(dmsr, self.dmtd);
        tracing::trace!(dmsr, phase, "DMTD: phase sample");
        PhaseSample { ready: true, phase }
    }

    /// Apply a calibration command.
    ///
    /// Returns `Some(cal_present)` for [`CalibrationCommand::RxCheck`] and
    /// `None` for every other command.
    pub fn set_calibration_mode(&self, cmd: CalibrationCommand) -> Option<bool> {
        if cmd == CalibrationCommand::RxOff {
            return None;
        }

        let phy = self.lock_phy();
        let spec = phy.read(phy::WR_SPEC);
        let reply = match cmd {
            CalibrationCommand::TxOn => {
                phy.write(phy::WR_SPEC, spec | phy::WR_SPEC_TX_CAL);
                None
            }
            CalibrationCommand::TxOff => {
                phy.write(phy::WR_SPEC, spec & !phy::WR_SPEC_TX_CAL);
                None
            }
            CalibrationCommand::RxOn => {
                phy.write(phy::WR_SPEC, spec | phy::WR_SPEC_CAL_CRST);
                None
            }
            CalibrationCommand::RxCheck => Some(spec & phy::WR_SPEC_RX_CAL_STAT != 0),
            CalibrationCommand::RxOff => None,
        };
        tracing::debug!(?cmd, spec, ?reply, "PHY: calibration command");
        reply
    }

    /// Lock the PHY accessor for direct register access.
    pub fn lock_phy(&self) -> MutexGuard<'_, P> {
        self.phy.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The endpoint register block.
    pub fn endpoint(&self) -> &E {
        &self.ep
    }

    /// DMTD parameters in use.
    pub fn dmtd(&self) -> DmtdConfig {
        self.dmtd
    }
}
