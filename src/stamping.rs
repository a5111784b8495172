//! Per-endpoint timestamping mode.
//!
//! Transmit stamping is either on or off and any other mode is refused.
//! Receive stamping is all-or-nothing: every filter other than "none"
//! turns on stamping of all incoming frames.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{NicError, Result};
use crate::types::StampingConfig;

/// Transmit timestamping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TxType {
    /// Do not stamp outgoing frames
    Off = 0,
    /// Stamp outgoing frames
    On = 1,
}

impl TryFrom<i32> for TxType {
    type Error = NicError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            _ => Err(NicError::InvalidRequest {
                field: "tx_type",
                value,
            }),
        }
    }
}

/// Receive timestamping filter, reduced to what the hardware supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RxFilter {
    /// Do not stamp incoming frames
    None,
    /// Stamp every incoming frame
    All,
}

impl RxFilter {
    /// Filter code for "none".
    pub const NONE_CODE: i32 = 0;

    /// Map a filter code; every non-zero code means [`RxFilter::All`].
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        if code == Self::NONE_CODE {
            Self::None
        } else {
            Self::All
        }
    }
}

/// Timestamping request as exchanged with the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HwTstampConfig {
    /// Reserved, passed through
    pub flags: i32,
    /// Raw transmit mode
    pub tx_type: i32,
    /// Raw receive filter
    pub rx_filter: i32,
}

/// Transmit and receive stamping flags of one endpoint.
#[derive(Debug, Default)]
pub struct StampingFlags {
    tx: AtomicBool,
    rx: AtomicBool,
}

impl From<StampingConfig> for StampingFlags {
    fn from(config: StampingConfig) -> Self {
        Self {
            tx: AtomicBool::new(config.tx),
            rx: AtomicBool::new(config.rx),
        }
    }
}

impl StampingFlags {
    /// Both directions off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a timestamping request.
    ///
    /// # Errors
    /// `InvalidRequest` for an unknown transmit mode; neither flag changes.
    pub fn apply(&self, config: &HwTstampConfig) -> Result<()> {
        let tx = TxType::try_from(config.tx_type)?;
        let rx = RxFilter::from_code(config.rx_filter);

        self.tx.store(tx == TxType::On, Ordering::Release);
        self.rx.store(rx == RxFilter::All, Ordering::Release);
        tracing::debug!(?tx, ?rx, "EP: timestamping mode updated");
        Ok(())
    }

    /// Whether outgoing frames are stamped.
    pub fn tx(&self) -> bool {
        self.tx.load(Ordering::Acquire)
    }

    /// Whether incoming frames are stamped.
    pub fn rx(&self) -> bool {
        self.rx.load(Ordering::Acquire)
    }

    /// Current flags as a configuration value.
    pub fn config(&self) -> StampingConfig {
        StampingConfig {
            tx: self.tx(),
            rx: self.rx(),
        }
    }
}
