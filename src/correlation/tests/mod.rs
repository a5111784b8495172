use std::sync::Mutex;

use super::*;
use crate::clock::ClockSample;
use crate::testing::{RecordingSink, ScriptedClock};

mod engine;

/// Engine with default table sizes over test doubles.
type TestEngine = CorrelationEngine<ScriptedClock, RecordingSink<u32>>;

/// Engine with a small ring, for exhaustion tests.
type SmallEngine<const R: usize> = CorrelationEngine<ScriptedClock, RecordingSink<u32>, HostInterrupts, 8, R>;

fn engine_at(tick_counter: u32, utc_seconds: u32) -> TestEngine {
    CorrelationEngine::new(
        ScriptedClock::fixed(ClockSample::new(tick_counter, utc_seconds)),
        RecordingSink::new(),
    )
}

fn small_engine<const R: usize>() -> SmallEngine<R> {
    CorrelationEngine::with_interrupts(
        ScriptedClock::fixed(ClockSample::new(500, 1000)),
        RecordingSink::new(),
        HostInterrupts::new(),
    )
}

/// Sink that records whether local interrupts were enabled at delivery.
#[derive(Debug, Default)]
struct ProbeSink {
    irq_enabled_at_delivery: Mutex<Vec<bool>>,
}

impl PacketSink for ProbeSink {
    type Packet = u32;

    fn deliver_timestamped(&self, _packet: u32, _timestamp: HwTimestamp) {
        self.irq_enabled_at_delivery
            .lock()
            .unwrap()
            .push(HostInterrupts::local_enabled());
    }

    fn release(&self, _packet: u32) {}
}
