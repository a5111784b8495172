//! 32-bit register access.
//!
//! Every access is treated as having side effects: reads may pop FIFOs
//! and writes may acknowledge interrupts, so nothing here is cached or
//! reordered.

use std::ptr::NonNull;
use std::sync::Arc;

/// Read/write access to a block of 32-bit hardware registers.
///
/// Offsets are relative to the start of the block. Implementations must not
/// elide, merge or reorder accesses.
pub trait RegisterAccess: Send + Sync {
    /// Read the register at `offset`.
    fn read(&self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`.
    fn write(&self, offset: usize, value: u32);
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value);
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for Arc<T> {
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value);
    }
}

/// Memory-mapped register block accessed with volatile loads and stores.
#[derive(Debug)]
pub struct Mmio {
    base: NonNull<u8>,
    len: usize,
}

// Safety: the block is device memory; exclusive access to individual
// registers is the caller's business (see `IrqSafeMutex`).
unsafe impl Send for Mmio {}
unsafe impl Sync for Mmio {}

impl Mmio {
    /// Wrap a mapped register block.
    ///
    /// # Safety
    /// - `base` must point to `len` bytes of mapped device memory that stays
    ///   mapped for the lifetime of the returned value
    /// - `base` must be 4-byte aligned
    #[must_use]
    pub unsafe fn new(base: NonNull<u8>, len: usize) -> Self {
        Self { base, len }
    }

    /// Size of the block in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the block is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn register(&self, offset: usize) -> *mut u32 {
        assert!(
            offset % 4 == 0 && offset + 4 <= self.len,
            "register offset {offset:#x} outside block of {:#x} bytes",
            self.len
        );
        // In bounds by the check above.
        unsafe { self.base.as_ptr().add(offset).cast::<u32>() }
    }
}

impl RegisterAccess for Mmio {
    fn read(&self, offset: usize) -> u32 {
        let reg = self.register(offset);
        // Safety: aligned and inside the mapping promised by `new`.
        unsafe { reg.read_volatile() }
    }

    fn write(&self, offset: usize, value: u32) {
        let reg = self.register(offset);
        // Safety: aligned and inside the mapping promised by `new`.
        unsafe { reg.write_volatile(value) }
    }
}
