//! Const-generic, lock-free ring buffer for 8-bit PCM samples.
//!
//! `SampleRing<N>` stores up to `N - 1` bytes without heap allocation. It is
//! a single-producer / single-consumer (SPSC) structure shared between the
//! refill task (writer) and the sample-clock tick (reader): the tick side
//! must never block, so the cursors are atomics rather than a mutex.
//!
//! One slot is deliberately kept open — `read == write` always means empty,
//! and a full buffer holds `N - 1` bytes, so the two states are
//! distinguishable without a separate count.
//!
//! # Constraints
//!
//! - `N` must be at least 2 (one slot is reserved).
//! - Cursor stores use `Release`, cursor loads use `Acquire`: the producer
//!   publishes bytes before the write cursor, so a consumer that observes
//!   the cursor observes the bytes.
//! - Exactly one [`Producer`] and one [`Consumer`] exist per ring, handed
//!   out once by [`SampleRing::try_split`]. The producer alone advances the
//!   write cursor; the consumer alone advances the read cursor.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A fixed-capacity SPSC ring buffer for PCM bytes.
///
/// Capacity is set at compile time via the const generic `N`; the usable
/// capacity is `N - 1`. The ring is `const`-constructible so it can live in
/// a `static` shared between tasks.
pub struct SampleRing<const N: usize> {
    store: UnsafeCell<[u8; N]>,
    /// Index of the next slot to read from. Always `< N`.
    read: AtomicUsize,
    /// Index of the next slot to write to. Always `< N`.
    write: AtomicUsize,
    /// Latch so the producer/consumer pair is handed out at most once.
    split: AtomicBool,
}

// SAFETY: the byte store is only touched through the single Producer (writes
// at the write cursor) and single Consumer (reads at the read cursor), which
// `try_split` hands out at most once. Slots are published to the other side
// via Release stores of the cursors and observed via Acquire loads, so no
// slot is read and written concurrently.
unsafe impl<const N: usize> Sync for SampleRing<N> {}

impl<const N: usize> SampleRing<N> {
    /// Create a new, empty ring.
    ///
    /// This function is `const` so that rings may be stored in `static`
    /// variables without a runtime initialiser.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            store: UnsafeCell::new([0u8; N]),
            read: AtomicUsize::new(0),
            write: AtomicUsize::new(0),
            split: AtomicBool::new(false),
        }
    }

    /// Hand out the producer/consumer pair.
    ///
    /// Returns `None` on every call after the first — a second producer or
    /// consumer would break the single-writer-per-cursor discipline the
    /// ring's safety rests on.
    pub fn try_split(&self) -> Option<(Producer<'_, N>, Consumer<'_, N>)> {
        self.split
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then(|| (Producer { ring: self }, Consumer { ring: self }))
    }

    /// Number of bytes currently buffered.
    #[allow(clippy::arithmetic_side_effects)] // Safety: cursors always < N, so the subtractions cannot underflow
    pub fn len(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        if write >= read {
            write - read
        } else {
            N - (read - write)
        }
    }

    /// Number of bytes that can be pushed before the ring is full.
    #[allow(clippy::arithmetic_side_effects)] // Safety: len() <= N - 1 by the reserved-slot invariant
    pub fn free(&self) -> usize {
        N - 1 - self.len()
    }

    /// `true` when no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.read.load(Ordering::Acquire) == self.write.load(Ordering::Acquire)
    }

    /// Total slot count. One slot is reserved, so at most `N - 1` bytes are
    /// ever buffered.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Reset both cursors to zero, emptying the ring.
    ///
    /// Cursor-only and atomic, but intended for quiescent moments: a
    /// producer or consumer racing with a reset may leave the cursors
    /// desynchronised from its own last position.
    pub fn reset(&self) {
        self.read.store(0, Ordering::Release);
        self.write.store(0, Ordering::Release);
    }

    /// Zero the byte store and reset both cursors.
    ///
    /// # Safety
    ///
    /// The ring must be quiescent: neither the producer nor the consumer may
    /// touch it for the duration of the call. The playback engine guarantees
    /// this by disarming the sample clock and rendezvousing with the refill
    /// worker before clearing.
    pub unsafe fn clear(&self) {
        // SAFETY: quiescence is the caller's contract; with both handles
        // parked nothing else reads or writes the store.
        unsafe {
            core::ptr::write_bytes(self.store.get().cast::<u8>(), 0, N);
        }
        self.reset();
    }
}

impl<const N: usize> Default for SampleRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Write half of a [`SampleRing`], owned by the refill task.
pub struct Producer<'a, const N: usize> {
    ring: &'a SampleRing<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// Number of bytes that can currently be pushed.
    ///
    /// The consumer only ever grows this value, so a push bounded by a prior
    /// `free()` cannot overrun.
    pub fn free(&self) -> usize {
        self.ring.free()
    }

    /// Push as many bytes from `bytes` as fit, returning the count pushed.
    ///
    /// Bytes are stored before the write cursor is published (Release), so
    /// the consumer never observes a slot before its byte.
    #[allow(clippy::arithmetic_side_effects)] // Safety: cursor wraps via % N
    #[allow(clippy::indexing_slicing)] // Safety: n <= bytes.len() by construction
    pub fn push_slice(&mut self, bytes: &[u8]) -> usize {
        let write = self.ring.write.load(Ordering::Acquire);
        let n = bytes.len().min(self.ring.free());
        let base = self.ring.store.get().cast::<u8>();
        let mut pos = write;
        for &byte in &bytes[..n] {
            // SAFETY: pos < N (cursor invariant), and slots in
            // [write, write + n) are free — the consumer never reads past
            // the published write cursor.
            unsafe { base.add(pos).write(byte) };
            pos = (pos + 1) % N;
        }
        self.ring.write.store(pos, Ordering::Release);
        n
    }
}

/// Read half of a [`SampleRing`], owned by the sample-clock tick.
pub struct Consumer<'a, const N: usize> {
    ring: &'a SampleRing<N>,
}

impl<const N: usize> Consumer<'_, N> {
    /// Number of bytes currently buffered.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// `true` when no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Pop one byte, or `None` when the ring is empty.
    ///
    /// Constant-time and non-blocking — safe to call from the sample-clock
    /// context.
    #[allow(clippy::arithmetic_side_effects)] // Safety: cursor wraps via % N
    pub fn pop(&mut self) -> Option<u8> {
        let read = self.ring.read.load(Ordering::Acquire);
        let write = self.ring.write.load(Ordering::Acquire);
        if read == write {
            return None;
        }
        // SAFETY: read < N (cursor invariant), and read != write means the
        // slot was published by the producer's Release store.
        let byte = unsafe { self.ring.store.get().cast::<u8>().add(read).read() };
        self.ring.read.store((read + 1) % N, Ordering::Release);
        Some(byte)
    }
}
