//! Common test utilities and fixtures
#![allow(dead_code)]

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};
use wrnic::clock::ClockSample;
use wrnic::correlation::CorrelationEngine;
use wrnic::testing::{RecordingSink, ScriptedClock};

static INIT: Once = Once::new();

/// Initialize test logging (call once per test module)
pub fn init_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive("wrnic=debug".parse().unwrap())
            .add_directive("irq_race=info".parse().unwrap());

        fmt().with_env_filter(filter).with_test_writer().init();
    });
}

/// Engine over a frozen clock, recording packet ids.
pub type TestEngine = CorrelationEngine<ScriptedClock, RecordingSink<u32>>;

/// Create an engine whose clock always reads `sample`
pub fn engine_at(sample: ClockSample) -> TestEngine {
    CorrelationEngine::new(ScriptedClock::fixed(sample), RecordingSink::new())
}
