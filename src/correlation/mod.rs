//! TX timestamp correlation.
//!
//! Two independent event streams have to meet here:
//!
//! - the TX timestamping unit raises an interrupt each time it captures
//!   the tick counter for an outgoing frame ([`CorrelationEngine::on_timestamp_captured`]);
//! - the transmit path reports that a descriptor is done and wants its
//!   timestamp ([`CorrelationEngine::on_packet_complete`]).
//!
//! Either may come first. Whichever arrives second finds the other by
//! frame id, finalizes the timestamp and hands the packet to the
//! [`PacketSink`].
//!
//! ```text
//!  capture IRQ ──► pending[] hit? ──yes──► finalize_immediate ──► deliver
//!                       │no
//!                       ▼
//!                  ring[] free slot? ──no──► ResourceExhausted (IRQ masked)
//!                       │yes
//!                       ▼
//!                    stored ◄── on_packet_complete ── ring hit ──► finalize_deferred ──► deliver
//! ```
//!
//! Both tables sit behind one [`IrqSafeMutex`]; every scan and the
//! mutation it leads to happen under a single acquisition. Packets are
//! handed to the sink after the lock is dropped.
//!
//! Nothing here expires: an unmatched packet or capture stays parked until
//! a later event matches it or the engine is reset.

mod finalize;
mod irq;
mod pending;
#[cfg(feature = "tokio-runtime")]
mod pump;
mod ring;

#[cfg(test)]
mod tests;

pub use finalize::{EARLY_IN_SECOND, LATE_IN_SECOND, finalize_deferred, finalize_immediate};
pub use irq::{CaptureIrq, IrqOutcome};
pub use pending::PendingTable;
#[cfg(feature = "tokio-runtime")]
pub use pump::{CaptureEvent, CapturePump, CaptureSender, PumpStats, capture_channel};
pub use ring::{CaptureRing, CapturedTimestamp};

use crate::clock::ClockSource;
use crate::error::{NicError, Result};
use crate::hw::{HostInterrupts, InterruptControl, IrqSafeMutex};
use crate::types::HwTimestamp;

/// Default number of TX descriptors that can wait for a timestamp.
pub const N_DESC: usize = 64;

/// Default number of captured timestamps that can wait for a packet.
pub const TS_BUF_SIZE: usize = 32;

/// Destination for packets leaving the correlation engine.
///
/// Each packet handed to the engine comes back through exactly one of
/// these calls.
pub trait PacketSink: Send + Sync {
    /// Outbound packet handle.
    type Packet: Send;

    /// Hand a packet with its hardware timestamp to the TX-completion path.
    fn deliver_timestamped(&self, packet: Self::Packet, timestamp: HwTimestamp);

    /// Discard a packet without a timestamp.
    fn release(&self, packet: Self::Packet);
}

/// Result of a capture notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A parked packet matched and was delivered.
    Delivered {
        /// Descriptor slot the packet was parked in
        slot: usize,
        /// Timestamp delivered with it
        timestamp: HwTimestamp,
    },
    /// No packet matched; the capture waits in the ring.
    Stored {
        /// Ring slot used
        ring_slot: usize,
    },
}

/// Result of a packet-complete notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// A stored capture matched and the packet was delivered.
    Delivered {
        /// Ring slot the capture was taken from
        ring_slot: usize,
        /// Timestamp delivered with the packet
        timestamp: HwTimestamp,
    },
    /// No capture yet; the packet stays parked for the interrupt path.
    AwaitingCapture,
    /// The descriptor slot holds no packet.
    NoPacket,
}

/// Point-in-time view of the correlation tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationSnapshot {
    /// Number of packets waiting for a capture
    pub pending: usize,
    /// Valid ring entries with their slot indices
    pub captured: Vec<(usize, CapturedTimestamp)>,
}

/// Capture-side entry points, as seen from the interrupt boundary.
pub trait TimestampCapture: Send + Sync {
    /// See [`CorrelationEngine::on_timestamp_captured`].
    ///
    /// # Errors
    /// `ResourceExhausted` when the capture cannot be stored.
    fn on_timestamp_captured(&self, raw_ticks: u32, frame_id: u16, port_id: u8) -> Result<CaptureOutcome>;

    /// Whether a new unmatched capture would fit.
    fn has_free_capture_slot(&self) -> bool;

    /// Number of slots in the capture ring.
    fn ring_capacity(&self) -> usize;

    /// Return to the freshly initialized state.
    fn reset(&self);
}

#[derive(Debug)]
struct Tables<P, const N: usize, const R: usize> {
    pending: PendingTable<P, N>,
    ring: CaptureRing<R>,
}

/// Rendezvous between captured timestamps and packets awaiting them.
pub struct CorrelationEngine<
    C,
    S: PacketSink,
    I = HostInterrupts,
    const N: usize = N_DESC,
    const R: usize = TS_BUF_SIZE,
> {
    tables: IrqSafeMutex<Tables<S::Packet, N, R>, I>,
    clock: C,
    sink: S,
}

impl<C: ClockSource, S: PacketSink> CorrelationEngine<C, S> {
    /// Create an engine with the default table sizes and host interrupt
    /// control.
    pub fn new(clock: C, sink: S) -> Self {
        Self::with_interrupts(clock, sink, HostInterrupts::new())
    }
}

impl<C, S, I, const N: usize, const R: usize> CorrelationEngine<C, S, I, N, R>
where
    C: ClockSource,
    S: PacketSink,
    I: InterruptControl,
{
    /// Create an engine using `irq` to mask interrupts around the tables.
    pub fn with_interrupts(clock: C, sink: S, irq: I) -> Self {
        Self {
            tables: IrqSafeMutex::new(
                Tables {
                    pending: PendingTable::new(),
                    ring: CaptureRing::new(),
                },
                irq,
            ),
            clock,
            sink,
        }
    }

    /// Park an outbound packet until its timestamp is known.
    ///
    /// # Errors
    /// `InvalidSlot` or `SlotBusy`; the packet is released through the
    /// sink in both cases.
    pub fn track(&self, slot: usize, frame_id: u16, packet: S::Packet) -> Result<()> {
        let rejected = self.tables.lock_irqsave().pending.insert(slot, frame_id, packet);
        match rejected {
            Ok(()) => {
                tracing::trace!(slot, frame_id, "TX: packet parked for timestamp");
                Ok(())
            }
            Err((err, packet)) => {
                self.sink.release(packet);
                Err(err)
            }
        }
    }

    /// Handle a capture reported by the TX timestamping unit.
    ///
    /// Runs in interrupt context. A parked packet with the same frame id
    /// (lowest slot first) is finalized and delivered right away; otherwise
    /// the capture is stored in the ring.
    ///
    /// # Errors
    /// `ResourceExhausted` when no packet matches and the ring is full. The
    /// existing ring entries are left untouched; the caller is expected to
    /// mask further capture interrupts.
    pub fn on_timestamp_captured(
        &self,
        raw_ticks: u32,
        frame_id: u16,
        port_id: u8,
    ) -> Result<CaptureOutcome> {
        let (slot, packet, timestamp) = {
            let mut tables = self.tables.lock_irqsave();
            match tables.pending.take_matching(frame_id) {
                Some((slot, packet)) => {
                    let timestamp = finalize_immediate(self.clock.sample(), raw_ticks);
                    (slot, packet, timestamp)
                }
                None => match tables.ring.store(raw_ticks, port_id, frame_id) {
                    Ok(ring_slot) => {
                        tracing::debug!(ring_slot, frame_id, port_id, "TXTSU: save to slot");
                        return Ok(CaptureOutcome::Stored { ring_slot });
                    }
                    Err(err) => {
                        tracing::debug!(frame_id, "TXTSU: ring full");
                        return Err(err);
                    }
                },
            }
        };

        tracing::debug!(slot, frame_id, %timestamp, "TXTSU: found pending packet");
        self.sink.deliver_timestamped(packet, timestamp);
        Ok(CaptureOutcome::Delivered { slot, timestamp })
    }

    /// Look for a stored capture matching the packet in `slot`.
    ///
    /// Runs in call context once the descriptor is done. Not finding a
    /// capture is normal: the interrupt path will match the packet later.
    ///
    /// # Errors
    /// `InvalidSlot` when `slot` is outside the descriptor table.
    pub fn on_packet_complete(&self, slot: usize) -> Result<CompletionOutcome> {
        if slot >= N {
            return Err(NicError::InvalidSlot { slot, capacity: N });
        }

        let (ring_slot, packet, timestamp) = {
            let mut tables = self.tables.lock_irqsave();
            let Some(frame_id) = tables.pending.frame_id(slot) else {
                tracing::debug!(slot, "TX: completion for empty descriptor");
                return Ok(CompletionOutcome::NoPacket);
            };
            let Some(ring_slot) = tables.ring.find(frame_id) else {
                tracing::debug!(slot, frame_id, "TX: capture not found");
                return Ok(CompletionOutcome::AwaitingCapture);
            };
            let (Some(entry), Some((_, packet))) =
                (tables.ring.claim(ring_slot), tables.pending.take(slot))
            else {
                return Ok(CompletionOutcome::NoPacket);
            };
            let timestamp = finalize_deferred(self.clock.sample(), entry.raw_ticks);
            (ring_slot, packet, timestamp)
        };

        tracing::debug!(slot, ring_slot, %timestamp, "TX: found stored capture");
        self.sink.deliver_timestamped(packet, timestamp);
        Ok(CompletionOutcome::Delivered {
            ring_slot,
            timestamp,
        })
    }

    /// Release the packet in `slot` without a timestamp.
    ///
    /// Returns whether a packet was parked there.
    ///
    /// # Errors
    /// `InvalidSlot` when `slot` is outside the descriptor table.
    pub fn discard(&self, slot: usize) -> Result<bool> {
        if slot >= N {
            return Err(NicError::InvalidSlot { slot, capacity: N });
        }
        let taken = self.tables.lock_irqsave().pending.take(slot);
        Ok(match taken {
            Some((frame_id, packet)) => {
                tracing::debug!(slot, frame_id, "TX: discarding parked packet");
                self.sink.release(packet);
                true
            }
            None => false,
        })
    }

    /// Zero the capture ring and release every parked packet.
    pub fn reset(&self) {
        let drained = {
            let mut tables = self.tables.lock_irqsave();
            tables.ring.clear();
            tables.pending.drain()
        };
        tracing::info!(released = drained.len(), "TXTSU: correlation tables reset");
        for packet in drained {
            self.sink.release(packet);
        }
    }

    /// Whether a new unmatched capture would fit in the ring.
    pub fn has_free_capture_slot(&self) -> bool {
        self.tables.lock_irqsave().ring.has_free()
    }

    /// Copy out the current table contents.
    pub fn snapshot(&self) -> CorrelationSnapshot {
        let tables = self.tables.lock_irqsave();
        CorrelationSnapshot {
            pending: tables.pending.len(),
            captured: tables.ring.entries().map(|(i, e)| (i, *e)).collect(),
        }
    }

    /// Descriptor table size.
    pub const fn pending_capacity(&self) -> usize {
        N
    }

    /// Capture ring size.
    pub const fn ring_capacity(&self) -> usize {
        R
    }

    /// The packet sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The clock source.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The interrupt controller guarding the tables.
    pub fn interrupts(&self) -> &I {
        self.tables.interrupts()
    }
}

impl<C, S, I, const N: usize, const R: usize> TimestampCapture for CorrelationEngine<C, S, I, N, R>
where
    C: ClockSource,
    S: PacketSink,
    I: InterruptControl,
{
    fn on_timestamp_captured(&self, raw_ticks: u32, frame_id: u16, port_id: u8) -> Result<CaptureOutcome> {
        CorrelationEngine::on_timestamp_captured(self, raw_ticks, frame_id, port_id)
    }

    fn has_free_capture_slot(&self) -> bool {
        CorrelationEngine::has_free_capture_slot(self)
    }

    fn ring_capacity(&self) -> usize {
        R
    }

    fn reset(&self) {
        CorrelationEngine::reset(self);
    }
}

impl<T: TimestampCapture + ?Sized> TimestampCapture for std::sync::Arc<T> {
    fn on_timestamp_captured(&self, raw_ticks: u32, frame_id: u16, port_id: u8) -> Result<CaptureOutcome> {
        (**self).on_timestamp_captured(raw_ticks, frame_id, port_id)
    }

    fn has_free_capture_slot(&self) -> bool {
        (**self).has_free_capture_slot()
    }

    fn ring_capacity(&self) -> usize {
        (**self).ring_capacity()
    }

    fn reset(&self) {
        (**self).reset();
    }
}
