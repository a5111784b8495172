use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::hw::RegisterAccess;

/// One register access observed by a [`RegisterFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOp {
    /// A read and the value it returned
    Read {
        /// Register offset
        offset: usize,
        /// Value returned
        value: u32,
    },
    /// A write and the value written
    Write {
        /// Register offset
        offset: usize,
        /// Value written
        value: u32,
    },
}

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<usize, u32>,
    scripted: HashMap<usize, VecDeque<u32>>,
    log: Vec<RegisterOp>,
}

/// In-memory register block that records every access.
///
/// Registers behave like plain memory unless a read script is queued for
/// an offset, in which case reads pop the script first. The last scripted
/// value sticks once the script runs out.
#[derive(Debug, Default)]
pub struct RegisterFile {
    inner: Mutex<Inner>,
}

impl RegisterFile {
    /// Create an empty register file; every register reads as zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set a register without logging an access.
    pub fn set(&self, offset: usize, value: u32) {
        self.inner().values.insert(offset, value);
    }

    /// Current value of a register, without logging an access.
    #[must_use]
    pub fn get(&self, offset: usize) -> u32 {
        self.inner().values.get(&offset).copied().unwrap_or(0)
    }

    /// Queue values returned by successive reads of `offset`.
    pub fn script_reads(&self, offset: usize, values: impl IntoIterator<Item = u32>) {
        self.inner()
            .scripted
            .entry(offset)
            .or_default()
            .extend(values);
    }

    /// Every access so far, in order.
    #[must_use]
    pub fn log(&self) -> Vec<RegisterOp> {
        self.inner().log.clone()
    }

    /// Values written to `offset`, in order.
    #[must_use]
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.inner()
            .log
            .iter()
            .filter_map(|op| match *op {
                RegisterOp::Write { offset: o, value } if o == offset => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Number of reads of `offset`.
    #[must_use]
    pub fn read_count(&self, offset: usize) -> usize {
        self.inner()
            .log
            .iter()
            .filter(|op| matches!(op, RegisterOp::Read { offset: o, .. } if *o == offset))
            .count()
    }

    /// Forget the access log, keeping register values.
    pub fn clear_log(&self) {
        self.inner().log.clear();
    }
}

impl RegisterAccess for RegisterFile {
    fn read(&self, offset: usize) -> u32 {
        let mut inner = self.inner();
        let scripted = inner.scripted.get_mut(&offset).and_then(VecDeque::pop_front);
        let value = match scripted {
            Some(v) => {
                inner.values.insert(offset, v);
                v
            }
            None => inner.values.get(&offset).copied().unwrap_or(0),
        };
        inner.log.push(RegisterOp::Read { offset, value });
        value
    }

    fn write(&self, offset: usize, value: u32) {
        let mut inner = self.inner();
        inner.values.insert(offset, value);
        inner.log.push(RegisterOp::Write { offset, value });
    }
}
