use criterion::{Criterion, black_box, criterion_group, criterion_main};
use wrnic::clock::{ClockSample, ClockSampler};
use wrnic::correlation::{CorrelationEngine, PacketSink, finalize_deferred, finalize_immediate};
use wrnic::hw::regs::{ep, ppsg};
use wrnic::testing::{RegisterFile, ScriptedClock};
use wrnic::{DmtdConfig, HwTimestamp, PhaseCalibrator};

/// Sink that drops everything, so the benches measure the engine only.
struct NullSink;

impl PacketSink for NullSink {
    type Packet = u32;

    fn deliver_timestamped(&self, packet: u32, timestamp: HwTimestamp) {
        black_box((packet, timestamp));
    }

    fn release(&self, packet: u32) {
        black_box(packet);
    }
}

fn correlation_benchmark(c: &mut Criterion) {
    let engine = CorrelationEngine::new(
        ScriptedClock::fixed(ClockSample::new(50_000_000, 1000)),
        NullSink,
    );

    c.bench_function("correlate_packet_first", |b| {
        b.iter(|| {
            engine.track(0, 7, 1).unwrap();
            engine.on_timestamp_captured(black_box(100), 7, 0).unwrap()
        })
    });

    c.bench_function("correlate_capture_first", |b| {
        b.iter(|| {
            engine.on_timestamp_captured(black_box(100), 7, 0).unwrap();
            engine.track(0, 7, 1).unwrap();
            engine.on_packet_complete(0).unwrap()
        })
    });

    // Worst case scan: ring nearly full of unrelated captures
    for frame_id in 100..131u16 {
        engine.on_timestamp_captured(1, frame_id, 0).unwrap();
    }
    c.bench_function("correlate_capture_first_busy_ring", |b| {
        b.iter(|| {
            engine.on_timestamp_captured(black_box(100), 7, 0).unwrap();
            engine.track(63, 7, 1).unwrap();
            engine.on_packet_complete(63).unwrap()
        })
    });
}

fn finalize_benchmark(c: &mut Criterion) {
    let sample = ClockSample::new(100_000_000, 1000);
    c.bench_function("finalize_immediate", |b| {
        b.iter(|| finalize_immediate(black_box(sample), black_box(20_000_000)))
    });
    c.bench_function("finalize_deferred", |b| {
        b.iter(|| finalize_deferred(black_box(sample), black_box(20_000_000)))
    });
}

fn register_benchmark(c: &mut Criterion) {
    let ppsg_regs = RegisterFile::new();
    ppsg_regs.set(ppsg::CNTR_UTCLO, 1000);
    ppsg_regs.set(ppsg::CNTR_NSEC, 42);
    let sampler = ClockSampler::new(ppsg_regs);

    c.bench_function("clock_read_time", |b| {
        b.iter(|| {
            sampler.registers().clear_log();
            sampler.read_time()
        })
    });

    let cal = PhaseCalibrator::new(RegisterFile::new(), RegisterFile::new(), DmtdConfig::default()).unwrap();
    cal.endpoint().set(ep::DMSR, ep::DMSR_PS_RDY | 0x0080_0000);

    c.bench_function("read_phase", |b| {
        b.iter(|| {
            cal.endpoint().clear_log();
            cal.read_phase()
        })
    });
}

criterion_group!(
    benches,
    correlation_benchmark,
    finalize_benchmark,
    register_benchmark
);
criterion_main!(benches);
