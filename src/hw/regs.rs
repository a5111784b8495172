//! Register offsets and bit fields of the FPGA blocks touched by the core.
//!
//! Offsets are byte offsets within each block, except for [`phy`] where
//! they are MDIO register numbers.

/// PPS generator: free-running nanosecond tick counter and UTC seconds.
pub mod ppsg {
    /// Tick counter within the current second
    pub const CNTR_NSEC: usize = 0x04;
    /// UTC seconds, low word
    pub const CNTR_UTCLO: usize = 0x08;
}

/// TX timestamping unit: timestamp FIFO and its interrupt controller.
pub mod txtsu {
    /// Interrupt disable register
    pub const EIC_IDR: usize = 0x00;
    /// Interrupt enable register
    pub const EIC_IER: usize = 0x04;
    /// Interrupt status register, write 1 to acknowledge
    pub const EIC_ISR: usize = 0x0c;
    /// FIFO word 0: raw tick value of the capture
    pub const TSF_R0: usize = 0x10;
    /// FIFO word 1: port id and frame id of the capture
    pub const TSF_R1: usize = 0x14;

    /// "FIFO not empty" interrupt source
    pub const EIC_NEMPTY: u32 = 1 << 0;

    const TSF_R1_PID_MASK: u32 = 0x1f;
    const TSF_R1_FID_SHIFT: u32 = 16;

    /// Port id field of `TSF_R1`.
    #[must_use]
    pub fn port_id(r1: u32) -> u8 {
        // Masked to 5 bits.
        #[allow(clippy::cast_possible_truncation)]
        let pid = (r1 & TSF_R1_PID_MASK) as u8;
        pid
    }

    /// Frame id field of `TSF_R1`.
    #[must_use]
    pub fn frame_id(r1: u32) -> u16 {
        // Upper half-word.
        #[allow(clippy::cast_possible_truncation)]
        let fid = (r1 >> TSF_R1_FID_SHIFT) as u16;
        fid
    }

    /// Pack a `TSF_R1` word.
    #[must_use]
    pub fn pack_r1(port_id: u8, frame_id: u16) -> u32 {
        (u32::from(frame_id) << TSF_R1_FID_SHIFT) | (u32::from(port_id) & TSF_R1_PID_MASK)
    }
}

/// Endpoint registers used by the DMTD phase detector.
pub mod ep {
    /// DMTD measurement status register
    pub const DMSR: usize = 0x20;

    /// Averaged phase accumulator, 24-bit two's complement
    pub const DMSR_PS_VAL_MASK: u32 = 0x00ff_ffff;
    /// Set when a new phase sample is available
    pub const DMSR_PS_RDY: u32 = 1 << 24;
}

/// PHY registers reached over MDIO.
pub mod phy {
    /// White Rabbit specific control/status register
    pub const WR_SPEC: usize = 0x10;

    /// Transmit calibration pattern enable
    pub const WR_SPEC_TX_CAL: u32 = 1 << 0;
    /// Receive calibration pattern detected
    pub const WR_SPEC_RX_CAL_STAT: u32 = 1 << 1;
    /// Receive calibration reset, self-clearing
    pub const WR_SPEC_CAL_CRST: u32 = 1 << 2;
}
