//! Channel-driven capture processing.
//!
//! Alternative to calling the engine straight from the interrupt handler:
//! the handler only decodes the FIFO words and pushes a [`CaptureEvent`]
//! with a non-blocking `try_send`, and a single task drains the channel
//! into the engine. Events are processed strictly in arrival order.
//!
//! Ring exhaustion suppresses the sender side. While suppressed,
//! [`CaptureSender::notify`] drops events immediately, which mirrors a
//! masked interrupt source. [`CaptureSender::rearm`] lifts the suppression
//! once the ring has room again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{CaptureOutcome, TimestampCapture};
use crate::error::{NicError, Result};

/// One capture as popped from the TXTSU FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureEvent {
    /// Tick counter at capture time
    pub raw_ticks: u32,
    /// Frame id of the captured frame
    pub frame_id: u16,
    /// Port the frame left through
    pub port_id: u8,
}

/// Counters reported when the pump stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Captures matched to a parked packet
    pub delivered: u64,
    /// Captures stored in the ring
    pub stored: u64,
    /// Captures rejected because the ring was full
    pub exhausted: u64,
}

#[derive(Debug, Default)]
struct Shared {
    suppressed: AtomicBool,
    dropped: AtomicU64,
}

/// Producer half, safe to call from interrupt-like context.
#[derive(Debug, Clone)]
pub struct CaptureSender {
    tx: mpsc::Sender<CaptureEvent>,
    shared: Arc<Shared>,
}

impl CaptureSender {
    /// Queue a capture without blocking.
    ///
    /// Returns `false` if the event was dropped: notifications are
    /// suppressed, the channel is full, or the pump has stopped.
    pub fn notify(&self, event: CaptureEvent) -> bool {
        if self.shared.suppressed.load(Ordering::Acquire) {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("TXTSU pump: dropping capture: {err}");
                self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Whether notifications are suppressed after ring exhaustion.
    pub fn is_suppressed(&self) -> bool {
        self.shared.suppressed.load(Ordering::Acquire)
    }

    /// Number of events dropped on the producer side.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Lift suppression once the engine has a free ring slot.
    ///
    /// # Errors
    /// `ResourceExhausted` if the ring is still full.
    pub fn rearm(&self, engine: &impl TimestampCapture) -> Result<()> {
        if !engine.has_free_capture_slot() {
            return Err(NicError::ResourceExhausted {
                capacity: engine.ring_capacity(),
            });
        }
        self.shared.suppressed.store(false, Ordering::Release);
        tracing::info!("TXTSU pump: capture notifications re-armed");
        Ok(())
    }
}

/// Consumer half: feeds queued captures into the engine.
#[derive(Debug)]
pub struct CapturePump<E> {
    rx: mpsc::Receiver<CaptureEvent>,
    engine: Arc<E>,
    shared: Arc<Shared>,
}

/// Create a bounded capture channel feeding `engine`.
///
/// # Panics
/// Panics if `capacity` is zero.
pub fn capture_channel<E>(engine: Arc<E>, capacity: usize) -> (CaptureSender, CapturePump<E>) {
    let (tx, rx) = mpsc::channel(capacity);
    let shared = Arc::new(Shared::default());
    (
        CaptureSender {
            tx,
            shared: Arc::clone(&shared),
        },
        CapturePump { rx, engine, shared },
    )
}

impl<E: TimestampCapture + 'static> CapturePump<E> {
    /// Drain events until every sender is dropped.
    pub async fn run(mut self) -> PumpStats {
        let mut stats = PumpStats::default();
        while let Some(event) = self.rx.recv().await {
            match self
                .engine
                .on_timestamp_captured(event.raw_ticks, event.frame_id, event.port_id)
            {
                Ok(CaptureOutcome::Delivered { .. }) => stats.delivered += 1,
                Ok(CaptureOutcome::Stored { .. }) => stats.stored += 1,
                Err(err) => {
                    stats.exhausted += 1;
                    if !self.shared.suppressed.swap(true, Ordering::AcqRel) {
                        tracing::warn!("TXTSU pump: {err}. Suppressing capture notifications.");
                    }
                }
            }
        }
        tracing::debug!(?stats, "TXTSU pump: channel closed");
        stats
    }

    /// Run the pump on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<PumpStats> {
        tokio::spawn(self.run())
    }
}
