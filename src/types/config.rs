use serde::{Deserialize, Serialize};

use crate::error::{NicError, Result};

/// DMTD phase detector parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmtdConfig {
    /// Number of samples accumulated by the detector (default: 256)
    pub avg_samples: i32,

    /// Phase range the averaged value is folded into (default: 16384)
    pub max_phase: i32,
}

impl DmtdConfig {
    /// Default averaging factor of the phase detector
    pub const DEFAULT_AVG_SAMPLES: i32 = 256;

    /// Default phase range
    pub const DEFAULT_MAX_PHASE: i32 = 16384;

    /// Check that both parameters are usable as divisors.
    ///
    /// # Errors
    /// Returns `NicError::InvalidConfig` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.avg_samples <= 0 {
            return Err(NicError::InvalidConfig {
                name: "dmtd.avg_samples",
                message: format!("must be positive, got {}", self.avg_samples),
            });
        }
        if self.max_phase <= 0 {
            return Err(NicError::InvalidConfig {
                name: "dmtd.max_phase",
                message: format!("must be positive, got {}", self.max_phase),
            });
        }
        Ok(())
    }
}

impl Default for DmtdConfig {
    fn default() -> Self {
        Self {
            avg_samples: Self::DEFAULT_AVG_SAMPLES,
            max_phase: Self::DEFAULT_MAX_PHASE,
        }
    }
}

/// Initial transmit/receive stamping flags of an endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampingConfig {
    /// Stamp outgoing frames (default: false)
    pub tx: bool,

    /// Stamp incoming frames (default: false)
    pub rx: bool,
}

/// Configuration for a NIC timestamping endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NicConfig {
    /// Phase detector parameters
    pub dmtd: DmtdConfig,

    /// Stamping flags applied at start-up
    pub stamping: StampingConfig,

    /// Enable the TXTSU "FIFO not empty" interrupt at init (default: true)
    pub capture_irq_enabled: bool,
}

impl Default for NicConfig {
    fn default() -> Self {
        Self {
            dmtd: DmtdConfig::default(),
            stamping: StampingConfig::default(),
            capture_irq_enabled: true,
        }
    }
}

impl NicConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> NicConfigBuilder {
        NicConfigBuilder::default()
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `NicError::Config` for malformed JSON and
    /// `NicError::InvalidConfig` for values that fail validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the hardware cannot use.
    ///
    /// # Errors
    /// Returns `NicError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.dmtd.validate()
    }
}

/// Builder for `NicConfig`
#[derive(Debug, Clone, Default)]
pub struct NicConfigBuilder {
    config: NicConfig,
}

impl NicConfigBuilder {
    /// Set the DMTD averaging factor
    #[must_use]
    pub fn avg_samples(mut self, samples: i32) -> Self {
        self.config.dmtd.avg_samples = samples;
        self
    }

    /// Set the DMTD phase range
    #[must_use]
    pub fn max_phase(mut self, max_phase: i32) -> Self {
        self.config.dmtd.max_phase = max_phase;
        self
    }

    /// Set initial transmit stamping
    #[must_use]
    pub fn tx_stamping(mut self, enable: bool) -> Self {
        self.config.stamping.tx = enable;
        self
    }

    /// Set initial receive stamping
    #[must_use]
    pub fn rx_stamping(mut self, enable: bool) -> Self {
        self.config.stamping.rx = enable;
        self
    }

    /// Enable or disable the capture interrupt at init
    #[must_use]
    pub fn capture_irq_enabled(mut self, enable: bool) -> Self {
        self.config.capture_irq_enabled = enable;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// Returns `NicError::InvalidConfig` if a value fails validation.
    pub fn build(self) -> Result<NicConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
