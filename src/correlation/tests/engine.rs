use super::*;

// ===== Capture first, packet second =====

#[test]
fn test_unmatched_capture_is_stored() {
    let engine = engine_at(200, 1000);

    let outcome = engine.on_timestamp_captured(100, 7, 1).unwrap();

    assert_eq!(outcome, CaptureOutcome::Stored { ring_slot: 0 });
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.pending, 0);
    assert_eq!(
        snapshot.captured,
        vec![(
            0,
            CapturedTimestamp {
                valid: true,
                raw_ticks: 100,
                port_id: 1,
                frame_id: 7,
            }
        )]
    );
    assert_eq!(engine.clock().samples_taken(), 0);
}

#[test]
fn test_stored_capture_claimed_on_completion() {
    let engine = engine_at(200, 1000);
    engine.on_timestamp_captured(100, 7, 1).unwrap();
    engine.track(5, 7, 55).unwrap();

    let outcome = engine.on_packet_complete(5).unwrap();

    let expected = HwTimestamp::new(1000, 800);
    assert_eq!(
        outcome,
        CompletionOutcome::Delivered {
            ring_slot: 0,
            timestamp: expected
        }
    );
    assert_eq!(engine.sink().delivered(), vec![(55, expected)]);
    assert_eq!(engine.snapshot(), CorrelationSnapshot::default());
}

#[test]
fn test_deferred_match_late_sample_early_capture() {
    let engine = engine_at(LATE_IN_SECOND + 1, 1000);
    engine.on_timestamp_captured(EARLY_IN_SECOND - 1, 7, 0).unwrap();
    engine.track(0, 7, 1).unwrap();

    let CompletionOutcome::Delivered { timestamp, .. } = engine.on_packet_complete(0).unwrap() else {
        panic!("expected delivery");
    };

    assert_eq!(timestamp.seconds, 999);
    assert_eq!(timestamp.nanoseconds, (EARLY_IN_SECOND - 1) * 8);
}

// ===== Packet first, capture second =====

#[test]
fn test_capture_matches_parked_packet() {
    let engine = engine_at(500, 1000);
    engine.track(3, 7, 42).unwrap();

    let outcome = engine.on_timestamp_captured(100, 7, 1).unwrap();

    let expected = HwTimestamp::new(1000, 800);
    assert_eq!(
        outcome,
        CaptureOutcome::Delivered {
            slot: 3,
            timestamp: expected
        }
    );
    assert_eq!(engine.sink().timestamp_of(&42), Some(expected));
    assert_eq!(engine.snapshot().pending, 0);
    assert!(engine.snapshot().captured.is_empty());
}

#[test]
fn test_capture_after_second_rollover() {
    // Sampled ticks already wrapped past the captured ticks
    let engine = engine_at(50, 1001);
    engine.track(0, 9, 1).unwrap();

    let outcome = engine.on_timestamp_captured(124_999_000, 9, 0).unwrap();

    assert_eq!(
        outcome,
        CaptureOutcome::Delivered {
            slot: 0,
            timestamp: HwTimestamp::new(1000, 999_992_000)
        }
    );
}

#[test]
fn test_capture_picks_lowest_matching_slot() {
    let engine = engine_at(500, 1000);
    engine.track(5, 9, 50).unwrap();
    engine.track(2, 9, 20).unwrap();

    let outcome = engine.on_timestamp_captured(100, 9, 0).unwrap();

    assert!(matches!(outcome, CaptureOutcome::Delivered { slot: 2, .. }));
    assert_eq!(engine.sink().delivered_count(), 1);
    assert_eq!(engine.sink().delivered()[0].0, 20);
    assert_eq!(engine.snapshot().pending, 1);
}

#[test]
fn test_packet_complete_without_capture_waits() {
    let engine = engine_at(500, 1000);
    engine.track(4, 11, 1).unwrap();

    assert_eq!(engine.on_packet_complete(4).unwrap(), CompletionOutcome::AwaitingCapture);
    assert_eq!(engine.snapshot().pending, 1);

    // The interrupt path picks it up later
    let outcome = engine.on_timestamp_captured(100, 11, 0).unwrap();
    assert!(matches!(outcome, CaptureOutcome::Delivered { slot: 4, .. }));
}

#[test]
fn test_packet_complete_ignores_other_frames() {
    let engine = engine_at(500, 1000);
    engine.on_timestamp_captured(100, 12, 0).unwrap();
    engine.track(1, 13, 1).unwrap();

    assert_eq!(engine.on_packet_complete(1).unwrap(), CompletionOutcome::AwaitingCapture);
    assert_eq!(engine.snapshot().captured.len(), 1);
}

// ===== Exhaustion =====

#[test]
fn test_full_ring_rejects_capture() {
    let engine = small_engine::<4>();
    for fid in 0..4u16 {
        engine.on_timestamp_captured(u32::from(fid) * 10, fid, 0).unwrap();
    }
    let before = engine.snapshot();
    assert!(!engine.has_free_capture_slot());

    let err = engine.on_timestamp_captured(99, 100, 0).unwrap_err();

    assert!(matches!(err, NicError::ResourceExhausted { capacity: 4 }));
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_full_ring_still_matches_parked_packets() {
    let engine = small_engine::<2>();
    engine.on_timestamp_captured(1, 1, 0).unwrap();
    engine.on_timestamp_captured(2, 2, 0).unwrap();
    engine.track(0, 3, 30).unwrap();

    let outcome = engine.on_timestamp_captured(3, 3, 0).unwrap();

    assert!(matches!(outcome, CaptureOutcome::Delivered { slot: 0, .. }));
}

#[test]
fn test_completion_frees_ring_slot() {
    let engine = small_engine::<1>();
    engine.on_timestamp_captured(1, 1, 0).unwrap();
    assert!(!engine.has_free_capture_slot());

    engine.track(0, 1, 10).unwrap();
    engine.on_packet_complete(0).unwrap();

    assert!(engine.has_free_capture_slot());
    assert_eq!(
        engine.on_timestamp_captured(2, 2, 0).unwrap(),
        CaptureOutcome::Stored { ring_slot: 0 }
    );
}

// ===== Slot handling =====

#[test]
fn test_packet_complete_out_of_range() {
    let engine = engine_at(0, 0);
    let err = engine.on_packet_complete(N_DESC).unwrap_err();
    assert!(matches!(err, NicError::InvalidSlot { slot: 64, capacity: 64 }));
}

#[test]
fn test_packet_complete_empty_slot() {
    let engine = engine_at(0, 0);
    assert_eq!(engine.on_packet_complete(0).unwrap(), CompletionOutcome::NoPacket);
}

#[test]
fn test_track_busy_slot_releases_packet() {
    let engine = engine_at(0, 0);
    engine.track(1, 1, 10).unwrap();

    let err = engine.track(1, 2, 20).unwrap_err();

    assert!(matches!(err, NicError::SlotBusy { slot: 1 }));
    assert_eq!(engine.sink().released(), vec![20]);
    assert_eq!(engine.snapshot().pending, 1);
}

#[test]
fn test_track_out_of_range_releases_packet() {
    let engine = small_engine::<2>();

    let err = engine.track(8, 1, 10).unwrap_err();

    assert!(matches!(err, NicError::InvalidSlot { slot: 8, capacity: 8 }));
    assert_eq!(engine.sink().released(), vec![10]);
}

#[test]
fn test_discard() {
    let engine = engine_at(0, 0);
    engine.track(6, 1, 60).unwrap();

    assert!(engine.discard(6).unwrap());
    assert!(!engine.discard(6).unwrap());
    assert!(engine.discard(N_DESC).is_err());
    assert_eq!(engine.sink().released(), vec![60]);
    assert_eq!(engine.on_packet_complete(6).unwrap(), CompletionOutcome::NoPacket);
}

#[test]
fn test_reset_releases_everything() {
    let engine = engine_at(0, 0);
    engine.track(9, 1, 90).unwrap();
    engine.track(2, 2, 20).unwrap();
    engine.on_timestamp_captured(5, 3, 0).unwrap();

    engine.reset();

    assert_eq!(engine.sink().released(), vec![20, 90]);
    assert_eq!(engine.snapshot(), CorrelationSnapshot::default());
    assert_eq!(engine.sink().delivered_count(), 0);
}

#[test]
fn test_capacities() {
    let engine = engine_at(0, 0);
    assert_eq!(engine.pending_capacity(), N_DESC);
    assert_eq!(engine.ring_capacity(), TS_BUF_SIZE);

    let small = small_engine::<3>();
    assert_eq!(small.pending_capacity(), 8);
    assert_eq!(TimestampCapture::ring_capacity(&small), 3);
}

// ===== Locking =====

#[test]
fn test_operations_mask_interrupts() {
    let engine = engine_at(500, 1000);
    let before = engine.interrupts().masked_sections();

    engine.on_timestamp_captured(1, 1, 0).unwrap();
    engine.on_packet_complete(0).unwrap();

    assert_eq!(engine.interrupts().masked_sections(), before + 2);
    assert!(HostInterrupts::local_enabled());
}

#[test]
fn test_delivery_happens_outside_lock() {
    let engine = CorrelationEngine::new(
        ScriptedClock::fixed(ClockSample::new(500, 1000)),
        ProbeSink::default(),
    );
    engine.track(0, 1, 1).unwrap();
    engine.on_timestamp_captured(10, 1, 0).unwrap();

    engine.on_timestamp_captured(20, 2, 0).unwrap();
    engine.track(1, 2, 2).unwrap();
    engine.on_packet_complete(1).unwrap();

    let seen = engine.sink().irq_enabled_at_delivery.lock().unwrap().clone();
    assert_eq!(seen, vec![true, true]);
}

#[test]
fn test_engine_shared_through_arc() {
    let engine = std::sync::Arc::new(engine_at(500, 1000));
    let capture: &dyn TimestampCapture = &engine;

    assert!(capture.has_free_capture_slot());
    assert_eq!(capture.ring_capacity(), TS_BUF_SIZE);
    capture.on_timestamp_captured(1, 1, 0).unwrap();
    assert_eq!(engine.snapshot().captured.len(), 1);

    capture.reset();
    assert!(engine.snapshot().captured.is_empty());
}
