//! Interrupt-safe mutual exclusion.
//!
//! The correlation tables are touched both from the TXTSU interrupt handler
//! and from ordinary call context. A plain mutex taken from call context
//! deadlocks if the same execution unit then takes the interrupt and the
//! handler spins on the lock, so the lock here masks local interrupts
//! first and restores them only after the data is released.

use std::cell::Cell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Local interrupt masking of the current execution unit.
pub trait InterruptControl: Send + Sync {
    /// Mask local interrupts, returning whether they were enabled before.
    fn save_and_disable(&self) -> bool;

    /// Restore the state returned by [`save_and_disable`](Self::save_and_disable).
    fn restore(&self, was_enabled: bool);
}

thread_local! {
    static LOCAL_IRQ_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Interrupt control for hosted builds.
///
/// Each OS thread stands in for one execution unit and keeps its own
/// enabled flag. The number of masked sections is counted so callers can
/// check that a path ran with interrupts off.
#[derive(Debug, Default)]
pub struct HostInterrupts {
    masked_sections: AtomicU64,
}

impl HostInterrupts {
    /// Create a new host interrupt controller
    #[must_use]
    pub const fn new() -> Self {
        Self {
            masked_sections: AtomicU64::new(0),
        }
    }

    /// Whether interrupts are enabled on the calling thread.
    #[must_use]
    pub fn local_enabled() -> bool {
        LOCAL_IRQ_ENABLED.with(Cell::get)
    }

    /// Number of times interrupts were masked through this controller.
    #[must_use]
    pub fn masked_sections(&self) -> u64 {
        self.masked_sections.load(Ordering::Relaxed)
    }
}

impl InterruptControl for HostInterrupts {
    fn save_and_disable(&self) -> bool {
        self.masked_sections.fetch_add(1, Ordering::Relaxed);
        LOCAL_IRQ_ENABLED.with(|enabled| enabled.replace(false))
    }

    fn restore(&self, was_enabled: bool) {
        LOCAL_IRQ_ENABLED.with(|enabled| enabled.set(was_enabled));
    }
}

/// Mutex that masks local interrupts while held.
///
/// Safe to take from interrupt context too: there the saved state is
/// "disabled" and restoring it is a no-op.
#[derive(Debug)]
pub struct IrqSafeMutex<T, I = HostInterrupts> {
    irq: I,
    inner: Mutex<T>,
}

impl<T, I: InterruptControl> IrqSafeMutex<T, I> {
    /// Create a new lock around `data`.
    pub fn new(data: T, irq: I) -> Self {
        Self {
            irq,
            inner: Mutex::new(data),
        }
    }

    /// Mask local interrupts, then acquire the lock.
    ///
    /// Interrupts are restored when the guard drops, after the lock is
    /// released.
    pub fn lock_irqsave(&self) -> IrqSafeGuard<'_, T, I> {
        let was_enabled = self.irq.save_and_disable();
        let restore = IrqRestore {
            irq: &self.irq,
            was_enabled,
        };
        // A panic while holding the lock leaves the tables consistent at
        // slot granularity, so a poisoned lock is still usable.
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        IrqSafeGuard {
            guard,
            _restore: restore,
        }
    }

    /// The interrupt controller used by this lock.
    pub fn interrupts(&self) -> &I {
        &self.irq
    }

    /// Mutable access without locking; the borrow proves exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}

struct IrqRestore<'a, I: InterruptControl> {
    irq: &'a I,
    was_enabled: bool,
}

impl<I: InterruptControl> Drop for IrqRestore<'_, I> {
    fn drop(&mut self) {
        self.irq.restore(self.was_enabled);
    }
}

/// Guard returned by [`IrqSafeMutex::lock_irqsave`].
pub struct IrqSafeGuard<'a, T, I: InterruptControl> {
    // Field order matters: the mutex guard drops before interrupts return.
    guard: MutexGuard<'a, T>,
    _restore: IrqRestore<'a, I>,
}

impl<T, I: InterruptControl> Deref for IrqSafeGuard<'_, T, I> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T, I: InterruptControl> DerefMut for IrqSafeGuard<'_, T, I> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
