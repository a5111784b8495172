//! Pool of captured timestamps that have not met their packet yet.
//!
//! Despite the name this is not a FIFO: slots are reused independently,
//! insertion takes the lowest free index and lookup is a linear scan by
//! frame id.

use crate::error::NicError;
use crate::hw::TICK_MASK;

/// One hardware capture waiting for its packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CapturedTimestamp {
    /// Slot holds a live capture.
    pub valid: bool,
    /// Tick counter at capture time, 28 bits.
    pub raw_ticks: u32,
    /// Port the frame left through.
    pub port_id: u8,
    /// Frame id reported with the capture.
    pub frame_id: u16,
}

/// Fixed pool of `R` capture slots.
#[derive(Debug)]
pub struct CaptureRing<const R: usize> {
    slots: [CapturedTimestamp; R],
}

impl<const R: usize> Default for CaptureRing<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const R: usize> CaptureRing<R> {
    /// Create a ring with every slot invalid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [CapturedTimestamp::default(); R],
        }
    }

    /// Number of slots.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        R
    }

    /// First valid slot holding `frame_id`.
    #[must_use]
    pub fn find(&self, frame_id: u16) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.valid && s.frame_id == frame_id)
    }

    /// Store a capture, returning the slot used.
    ///
    /// A live entry with the same frame id is stale (the id has wrapped
    /// since) and is overwritten in place, so no two valid slots ever share
    /// a frame id. Otherwise the lowest free slot is taken.
    ///
    /// # Errors
    /// `ResourceExhausted` when every slot is valid.
    pub fn store(&mut self, raw_ticks: u32, port_id: u8, frame_id: u16) -> Result<usize, NicError> {
        let slot = match self.find(frame_id) {
            Some(stale) => {
                tracing::warn!(
                    slot = stale,
                    frame_id,
                    "TXTSU: frame id still live in the ring, dropping the older capture"
                );
                stale
            }
            None => self
                .slots
                .iter()
                .position(|s| !s.valid)
                .ok_or(NicError::ResourceExhausted { capacity: R })?,
        };

        self.slots[slot] = CapturedTimestamp {
            valid: true,
            raw_ticks: raw_ticks & TICK_MASK,
            port_id,
            frame_id,
        };
        Ok(slot)
    }

    /// Invalidate `slot`, returning what it held.
    pub fn claim(&mut self, slot: usize) -> Option<CapturedTimestamp> {
        let entry = self.slots.get_mut(slot)?;
        if !entry.valid {
            return None;
        }
        let claimed = *entry;
        entry.valid = false;
        Some(claimed)
    }

    /// Whether at least one slot is free.
    #[must_use]
    pub fn has_free(&self) -> bool {
        self.slots.iter().any(|s| !s.valid)
    }

    /// Number of valid slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.valid).count()
    }

    /// Whether no slot is valid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.slots.iter().any(|s| s.valid)
    }

    /// Valid slots with their indices.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &CapturedTimestamp)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.valid)
    }

    /// Zero every slot.
    pub fn clear(&mut self) {
        self.slots = [CapturedTimestamp::default(); R];
    }
}
