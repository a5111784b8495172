use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::clock::{ClockSample, ClockSource};
use crate::correlation::PacketSink;
use crate::types::HwTimestamp;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock that replays queued samples, then repeats the last one.
#[derive(Debug, Default)]
pub struct ScriptedClock {
    queue: Mutex<VecDeque<ClockSample>>,
    last: Mutex<ClockSample>,
    taken: AtomicUsize,
}

impl ScriptedClock {
    /// Clock that always returns `sample`.
    #[must_use]
    pub fn fixed(sample: ClockSample) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            last: Mutex::new(sample),
            taken: AtomicUsize::new(0),
        }
    }

    /// Clock that replays `samples` in order.
    #[must_use]
    pub fn new(samples: impl IntoIterator<Item = ClockSample>) -> Self {
        Self {
            queue: Mutex::new(samples.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Queue another sample.
    pub fn push(&self, sample: ClockSample) {
        lock(&self.queue).push_back(sample);
    }

    /// Replace the repeating sample and drop anything queued.
    pub fn set(&self, sample: ClockSample) {
        lock(&self.queue).clear();
        *lock(&self.last) = sample;
    }

    /// Number of samples taken so far.
    #[must_use]
    pub fn samples_taken(&self) -> usize {
        self.taken.load(Ordering::Relaxed)
    }
}

impl ClockSource for ScriptedClock {
    fn sample(&self) -> ClockSample {
        self.taken.fetch_add(1, Ordering::Relaxed);
        let next = lock(&self.queue).pop_front();
        let mut last = lock(&self.last);
        if let Some(sample) = next {
            *last = sample;
        }
        *last
    }
}

/// Packet sink that records what it is handed.
#[derive(Debug)]
pub struct RecordingSink<T> {
    delivered: Mutex<Vec<(T, HwTimestamp)>>,
    released: Mutex<Vec<T>>,
}

impl<T> Default for RecordingSink<T> {
    fn default() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            released: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> RecordingSink<T> {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Packets delivered with their timestamps, in delivery order.
    #[must_use]
    pub fn delivered(&self) -> Vec<(T, HwTimestamp)> {
        lock(&self.delivered).clone()
    }

    /// Packets released without a timestamp, in release order.
    #[must_use]
    pub fn released(&self) -> Vec<T> {
        lock(&self.released).clone()
    }

    /// Number of packets delivered.
    #[must_use]
    pub fn delivered_count(&self) -> usize {
        lock(&self.delivered).len()
    }

    /// Timestamp delivered with `packet`, if any.
    #[must_use]
    pub fn timestamp_of(&self, packet: &T) -> Option<HwTimestamp>
    where
        T: PartialEq,
    {
        lock(&self.delivered)
            .iter()
            .find(|(p, _)| p == packet)
            .map(|(_, ts)| *ts)
    }
}

impl<T: Send> PacketSink for RecordingSink<T> {
    type Packet = T;

    fn deliver_timestamped(&self, packet: T, timestamp: HwTimestamp) {
        lock(&self.delivered).push((packet, timestamp));
    }

    fn release(&self, packet: T) {
        lock(&self.released).push(packet);
    }
}
