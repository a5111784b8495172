use thiserror::Error;

/// Errors raised by the timestamping and calibration core
#[derive(Debug, Error)]
pub enum NicError {
    // ===== Correlation Errors =====
    /// Captured-timestamp ring has no free slot for an unmatched capture
    #[error("timestamp ring exhausted ({capacity} slots in use)")]
    ResourceExhausted {
        /// Number of slots in the ring
        capacity: usize,
    },

    /// Descriptor index outside the pending table
    #[error("descriptor slot {slot} out of range (table holds {capacity})")]
    InvalidSlot {
        /// The requested slot
        slot: usize,
        /// Size of the pending table
        capacity: usize,
    },

    /// A packet is already parked in the descriptor slot
    #[error("descriptor slot {slot} already holds a packet")]
    SlotBusy {
        /// The requested slot
        slot: usize,
    },

    // ===== Boundary Errors =====
    /// Request carried a value outside the recognized command set
    #[error("invalid request: {field} = {value}")]
    InvalidRequest {
        /// Name of the offending request field
        field: &'static str,
        /// The raw value received
        value: i32,
    },

    /// Request payload could not be read from or written to the caller's buffer
    #[error("boundary transfer failed: needed {needed} bytes, buffer holds {available}")]
    BoundaryTransfer {
        /// Bytes required by the payload layout
        needed: usize,
        /// Bytes actually available
        available: usize,
    },

    // ===== Configuration Errors =====
    /// Configuration value rejected by validation
    #[error("invalid configuration: {name} - {message}")]
    InvalidConfig {
        /// The name of the parameter
        name: &'static str,
        /// Description of the error
        message: String,
    },

    /// Configuration document could not be parsed
    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl NicError {
    /// Check if the caller can retry the same operation later
    ///
    /// Ring exhaustion clears once a pending packet claims a slot, and a
    /// failed boundary transfer leaves no state behind.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ResourceExhausted { .. } | Self::BoundaryTransfer { .. } | Self::SlotBusy { .. }
        )
    }

    /// Linux errno equivalent, for callers that forward results across an
    /// ioctl-style boundary
    #[must_use]
    pub fn errno(&self) -> i32 {
        match self {
            Self::ResourceExhausted { .. } => 12, // ENOMEM
            Self::BoundaryTransfer { .. } => 14,  // EFAULT
            Self::SlotBusy { .. } => 16,          // EBUSY
            Self::InvalidRequest { .. } => 34,    // ERANGE
            Self::InvalidSlot { .. } | Self::InvalidConfig { .. } | Self::Config(_) => 22, // EINVAL
        }
    }
}

/// Result type alias for timestamping operations
pub type Result<T> = std::result::Result<T, NicError>;
