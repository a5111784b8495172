use super::*;
use crate::error::NicError;
use std::time::Duration;

// --- config.rs tests ---

#[test]
fn test_config_defaults() {
    let config = NicConfig::default();

    assert_eq!(config.dmtd.avg_samples, 256);
    assert_eq!(config.dmtd.max_phase, 16384);
    assert!(!config.stamping.tx);
    assert!(!config.stamping.rx);
    assert!(config.capture_irq_enabled);
}

#[test]
fn test_config_builder() {
    let config = NicConfig::builder()
        .avg_samples(16)
        .max_phase(8000)
        .tx_stamping(true)
        .capture_irq_enabled(false)
        .build()
        .unwrap();

    assert_eq!(config.dmtd.avg_samples, 16);
    assert_eq!(config.dmtd.max_phase, 8000);
    assert!(config.stamping.tx);
    assert!(!config.stamping.rx);
    assert!(!config.capture_irq_enabled);
}

#[test]
fn test_config_builder_rejects_zero_avg_samples() {
    let err = NicConfig::builder().avg_samples(0).build().unwrap_err();
    assert!(matches!(
        err,
        NicError::InvalidConfig {
            name: "dmtd.avg_samples",
            ..
        }
    ));
}

#[test]
fn test_config_builder_rejects_negative_max_phase() {
    let err = NicConfig::builder().max_phase(-1).build().unwrap_err();
    assert!(matches!(
        err,
        NicError::InvalidConfig {
            name: "dmtd.max_phase",
            ..
        }
    ));
}

#[test]
fn test_config_from_json_partial() {
    let config = NicConfig::from_json(r#"{ "dmtd": { "avg_samples": 16 }, "stamping": { "rx": true } }"#)
        .unwrap();

    assert_eq!(config.dmtd.avg_samples, 16);
    assert_eq!(config.dmtd.max_phase, 16384);
    assert!(config.stamping.rx);
    assert!(!config.stamping.tx);
    assert!(config.capture_irq_enabled);
}

#[test]
fn test_config_from_json_empty_object() {
    let config = NicConfig::from_json("{}").unwrap();
    assert_eq!(config, NicConfig::default());
}

#[test]
fn test_config_from_json_malformed() {
    let err = NicConfig::from_json("{ dmtd: ").unwrap_err();
    assert!(matches!(err, NicError::Config(_)));
}

#[test]
fn test_config_from_json_invalid_value() {
    let err = NicConfig::from_json(r#"{ "dmtd": { "max_phase": 0 } }"#).unwrap_err();
    assert!(matches!(err, NicError::InvalidConfig { .. }));
}

#[test]
fn test_config_json_roundtrip() {
    let config = NicConfig::builder().tx_stamping(true).build().unwrap();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(NicConfig::from_json(&json).unwrap(), config);
}

// --- timestamp.rs tests ---

#[test]
fn test_timestamp_new_masks_seconds() {
    let ts = HwTimestamp::new(0xffff_ffff, 8);
    assert_eq!(ts.seconds, 0x7fff_ffff);
    assert_eq!(ts.nanoseconds, 8);
}

#[test]
fn test_timestamp_to_nanos() {
    let ts = HwTimestamp::new(3, 250_000_000);
    assert_eq!(ts.to_nanos(), 3_250_000_000);
    assert_eq!(HwTimestamp::ZERO.to_nanos(), 0);
}

#[test]
fn test_timestamp_diff() {
    let a = HwTimestamp::new(10, 500);
    let b = HwTimestamp::new(9, 999_999_500);
    assert_eq!(a.diff_nanos(&b), 1_000);
    assert_eq!(b - a, -1_000);
}

#[test]
fn test_timestamp_display() {
    let ts = HwTimestamp::new(42, 800);
    assert_eq!(ts.to_string(), "42.000000800");
}

#[test]
fn test_timestamp_to_duration() {
    let ts = HwTimestamp::new(2, 8);
    assert_eq!(Duration::from(ts), Duration::new(2, 8));
}
