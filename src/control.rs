//! Request and reply payloads exchanged with user space.
//!
//! Every payload is a fixed run of little-endian `i32` fields. Handlers
//! take the caller's buffer, decode the request from it, call into the
//! core and write the reply back in place. A buffer too short for the
//! layout fails with `BoundaryTransfer` before anything is changed.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{NicError, Result};
use crate::hw::RegisterAccess;
use crate::phase::{CalibrationCommand, PhaseCalibrator, PhaseSample};
use crate::stamping::{HwTstampConfig, StampingFlags};

fn check_len(buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(NicError::BoundaryTransfer {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

fn write_back(buf: &mut [u8], encoded: &[u8]) -> Result<()> {
    check_len(buf, encoded.len())?;
    buf[..encoded.len()].copy_from_slice(encoded);
    Ok(())
}

/// Phase readout reply: `{ready, phase}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseReply {
    /// 1 when `phase` holds a fresh measurement
    pub ready: i32,
    /// Averaged phase
    pub phase: i32,
}

impl PhaseReply {
    /// Encoded size
    pub const SIZE: usize = 8;

    /// Encode to bytes
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        buf.put_i32_le(self.ready);
        buf.put_i32_le(self.phase);
        buf.freeze()
    }

    /// Decode from bytes
    ///
    /// # Errors
    /// `BoundaryTransfer` if the buffer is too small.
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        check_len(buf, Self::SIZE)?;
        Ok(Self {
            ready: buf.get_i32_le(),
            phase: buf.get_i32_le(),
        })
    }
}

impl From<PhaseSample> for PhaseReply {
    fn from(sample: PhaseSample) -> Self {
        Self {
            ready: i32::from(sample.ready),
            phase: sample.phase,
        }
    }
}

/// Calibration request: `{cmd, cal_present}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalibrationRequest {
    /// Raw command code
    pub cmd: i32,
    /// Filled in by `RX_CHECK`
    pub cal_present: i32,
}

impl CalibrationRequest {
    /// Encoded size
    pub const SIZE: usize = 8;

    /// Encode to bytes
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        buf.put_i32_le(self.cmd);
        buf.put_i32_le(self.cal_present);
        buf.freeze()
    }

    /// Decode from bytes
    ///
    /// # Errors
    /// `BoundaryTransfer` if the buffer is too small.
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        check_len(buf, Self::SIZE)?;
        Ok(Self {
            cmd: buf.get_i32_le(),
            cal_present: buf.get_i32_le(),
        })
    }
}

impl HwTstampConfig {
    /// Encoded size
    pub const SIZE: usize = 12;

    /// Encode to bytes
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        buf.put_i32_le(self.flags);
        buf.put_i32_le(self.tx_type);
        buf.put_i32_le(self.rx_filter);
        buf.freeze()
    }

    /// Decode from bytes
    ///
    /// # Errors
    /// `BoundaryTransfer` if the buffer is too small.
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        check_len(buf, Self::SIZE)?;
        Ok(Self {
            flags: buf.get_i32_le(),
            tx_type: buf.get_i32_le(),
            rx_filter: buf.get_i32_le(),
        })
    }
}

/// Read the phase and write a [`PhaseReply`] into `buf`.
///
/// # Errors
/// `BoundaryTransfer` if `buf` cannot hold the reply.
pub fn handle_phase_request<E, P>(cal: &PhaseCalibrator<E, P>, buf: &mut [u8]) -> Result<PhaseSample>
where
    E: RegisterAccess,
    P: RegisterAccess,
{
    check_len(buf, PhaseReply::SIZE)?;
    let sample = cal.read_phase();
    write_back(buf, &PhaseReply::from(sample).encode())?;
    Ok(sample)
}

/// Decode a [`CalibrationRequest`] from `buf` and apply it.
///
/// For `RX_CHECK` the request is written back with `cal_present` filled in;
/// other commands leave `buf` untouched.
///
/// # Errors
/// `BoundaryTransfer` for a short buffer, `InvalidRequest` for an unknown
/// command. Neither touches the PHY.
pub fn handle_calibration_request<E, P>(
    cal: &PhaseCalibrator<E, P>,
    buf: &mut [u8],
) -> Result<Option<bool>>
where
    E: RegisterAccess,
    P: RegisterAccess,
{
    let mut request = CalibrationRequest::decode(buf)?;
    let cmd = CalibrationCommand::try_from(request.cmd)?;

    let reply = cal.set_calibration_mode(cmd);
    if let Some(present) = reply {
        request.cal_present = i32::from(present);
        write_back(buf, &request.encode())?;
    }
    Ok(reply)
}

/// Decode an [`HwTstampConfig`] from `buf`, apply it and echo it back.
///
/// # Errors
/// `BoundaryTransfer` for a short buffer, `InvalidRequest` for an unknown
/// transmit mode. The flags are unchanged on error.
pub fn handle_tstamp_request(flags: &StampingFlags, buf: &mut [u8]) -> Result<HwTstampConfig> {
    let config = HwTstampConfig::decode(buf)?;
    flags.apply(&config)?;
    write_back(buf, &config.encode())?;
    Ok(config)
}
