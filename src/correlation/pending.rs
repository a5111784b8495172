//! Descriptor-indexed table of packets waiting for a TX timestamp.

use crate::error::NicError;

#[derive(Debug)]
struct PendingPacket<P> {
    frame_id: u16,
    packet: P,
}

/// Fixed table of `N` descriptor slots.
///
/// A slot holds a packet exactly while that packet is in flight; taking it
/// out hands ownership back to the caller, so a slot cannot be matched
/// twice.
#[derive(Debug)]
pub struct PendingTable<P, const N: usize> {
    slots: [Option<PendingPacket<P>>; N],
}

impl<P, const N: usize> Default for PendingTable<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, const N: usize> PendingTable<P, N> {
    /// Create a table with every slot empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Number of descriptor slots.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Park `packet` in `slot` under `frame_id`.
    ///
    /// # Errors
    /// Hands the packet back with `InvalidSlot` or `SlotBusy`.
    pub fn insert(&mut self, slot: usize, frame_id: u16, packet: P) -> Result<(), (NicError, P)> {
        let Some(entry) = self.slots.get_mut(slot) else {
            return Err((NicError::InvalidSlot { slot, capacity: N }, packet));
        };
        if entry.is_some() {
            return Err((NicError::SlotBusy { slot }, packet));
        }
        *entry = Some(PendingPacket { frame_id, packet });
        Ok(())
    }

    /// First occupied slot, in index order, parked under `frame_id`.
    #[must_use]
    pub fn find(&self, frame_id: u16) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|p| p.frame_id == frame_id))
    }

    /// Frame id of the packet in `slot`, if one is parked there.
    #[must_use]
    pub fn frame_id(&self, slot: usize) -> Option<u16> {
        self.slots.get(slot)?.as_ref().map(|p| p.frame_id)
    }

    /// Remove and return the packet in `slot`.
    pub fn take(&mut self, slot: usize) -> Option<(u16, P)> {
        self.slots
            .get_mut(slot)?
            .take()
            .map(|p| (p.frame_id, p.packet))
    }

    /// Remove the first packet parked under `frame_id`.
    pub fn take_matching(&mut self, frame_id: u16) -> Option<(usize, P)> {
        let slot = self.find(frame_id)?;
        self.take(slot).map(|(_, packet)| (slot, packet))
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no packet is parked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Empty every slot, returning the packets in slot order.
    pub fn drain(&mut self) -> Vec<P> {
        self.slots
            .iter_mut()
            .filter_map(|s| s.take().map(|p| p.packet))
            .collect()
    }
}
