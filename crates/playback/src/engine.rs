//! Streaming playback engine.
//!
//! The engine is split across three execution contexts that share one
//! [`EngineShared`]:
//!
//! - [`Player`] — the control surface (play / pause / resume / stop),
//!   called from a single control context.
//! - [`Refill`] — the blocking-capable worker that streams the current
//!   track file into the sample ring in [`REFILL_CHUNK`]-byte chunks.
//! - [`SampleFeed`] — the sample-clock side; one [`tick`](SampleFeed::tick)
//!   per 125 µs period pops one byte into the DAC and never blocks.
//!
//! A session starts when `play()` hands an opened file to the worker
//! through the session slot and ends either naturally (end-of-file, ring
//! drained, `finished` raised) or by `stop()`. The stop path is a
//! store-then-load handshake on the `playing` / `refill_idle` flags; those
//! operations must be `SeqCst` — with weaker orderings both sides can read
//! stale flags and the control side would clear the ring while the worker
//! still writes into it. Ring cursor traffic itself stays Acquire/Release
//! inside [`ring_buffer`](crate::ring_buffer).

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;

use platform::{File, MonoDac, SampleClock, Storage};

use crate::ring_buffer::{Consumer, Producer, SampleRing};

/// Ring capacity in bytes; usable fill is one less.
pub const RING_CAPACITY: usize = 4096;
/// Bytes the refill worker reads and pushes per iteration.
pub const REFILL_CHUNK: usize = 256;
/// Fixed output sample rate.
pub const SAMPLE_RATE_HZ: u32 = 8_000;
/// Sample-clock period derived from [`SAMPLE_RATE_HZ`]: 125 µs.
pub const TICK_PERIOD_US: u64 = 1_000_000 / SAMPLE_RATE_HZ as u64;
/// Worker sleep while the ring has no room for a full chunk.
pub const BACKPRESSURE_POLL_MS: u64 = 10;
/// Worker sleep while the session is paused.
pub const PAUSE_POLL_MS: u64 = 100;
/// Worker sleep between end-of-file drain checks.
pub const DRAIN_POLL_MS: u64 = 10;
/// Control-side sleep between stop-rendezvous checks.
pub const STOP_POLL_MS: u64 = 10;

/// Errors returned by the engine control surface.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerError<E> {
    /// The engine was already set up, or a task slot could not be obtained.
    Resource,
    /// `play()` while a session is active, or `pause()`/`resume()` while
    /// stopped.
    InvalidState,
    /// Opening the track file failed; nothing about the engine changed.
    Io(E),
}

impl<E> core::fmt::Display for PlayerError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Resource => write!(f, "engine state already claimed"),
            Self::InvalidState => write!(f, "operation invalid for the current session state"),
            Self::Io(_) => write!(f, "track open failed"),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl<E> std::error::Error for PlayerError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// State shared by the control surface, the refill worker, and the sample
/// tick. `const`-constructible so it can live in a `static`.
///
/// `F` is the storage backend's file type, carried to the worker through
/// the session slot.
pub struct EngineShared<F> {
    ring: SampleRing<RING_CAPACITY>,
    /// A session is live (set by `play()`, cleared by `stop()` or playout).
    playing: AtomicBool,
    /// The consumer is frozen; the DAC holds its last level.
    paused: AtomicBool,
    /// Latched on natural playout completion; consumed by `has_finished()`.
    finished: AtomicBool,
    /// The worker is parked on the session slot and will not touch the ring.
    refill_idle: AtomicBool,
    /// Single-slot handoff of the opened file; a later `play()` before the
    /// worker wakes replaces the slot, it does not queue.
    session: Signal<CriticalSectionRawMutex, F>,
}

impl<F> EngineShared<F> {
    /// Create engine state with no session, ready for [`Player::setup`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: SampleRing::new(),
            playing: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            refill_idle: AtomicBool::new(true),
            session: Signal::new(),
        }
    }
}

impl<F> Default for EngineShared<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Control surface of the engine.
///
/// One control context drives it; control calls are not re-entrant.
pub struct Player<'a, S: Storage, K: SampleClock> {
    shared: &'a EngineShared<S::File>,
    storage: S,
    clock: K,
}

/// The refill worker. [`run`](Refill::run) never returns; the application
/// wraps it in a task.
pub struct Refill<'a, F, K: SampleClock> {
    shared: &'a EngineShared<F>,
    producer: Producer<'a, RING_CAPACITY>,
    clock: K,
}

/// The sample-clock side of the engine; owns the ring consumer and the DAC.
pub struct SampleFeed<'a, F, D: MonoDac> {
    shared: &'a EngineShared<F>,
    consumer: Consumer<'a, RING_CAPACITY>,
    dac: D,
}

impl<'a, S, K> Player<'a, S, K>
where
    S: Storage,
    K: SampleClock,
{
    /// Claim `shared` and split it into the three engine halves.
    ///
    /// Succeeds exactly once per [`EngineShared`]; the ring's split latch is
    /// the claim.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Resource`] when `shared` was already claimed.
    pub fn setup<D: MonoDac>(
        shared: &'a EngineShared<S::File>,
        storage: S,
        clock: K,
        dac: D,
    ) -> Result<
        (Self, Refill<'a, S::File, K>, SampleFeed<'a, S::File, D>),
        PlayerError<S::Error>,
    > {
        let (producer, consumer) = shared.ring.try_split().ok_or(PlayerError::Resource)?;
        Ok((
            Player {
                shared,
                storage,
                clock: clock.clone(),
            },
            Refill {
                shared,
                producer,
                clock,
            },
            SampleFeed {
                shared,
                consumer,
                dac,
            },
        ))
    }

    /// Open `path` and start a playback session.
    ///
    /// On success the ring starts empty, the sample clock is armed, and the
    /// opened file is handed to the refill worker.
    ///
    /// # Errors
    ///
    /// - [`PlayerError::InvalidState`] while a session is active — callers
    ///   must `stop()` first.
    /// - [`PlayerError::Io`] when the file cannot be opened; the engine is
    ///   left exactly as it was.
    pub async fn play(&mut self, path: &str) -> Result<(), PlayerError<S::Error>> {
        if self.session_active() {
            return Err(PlayerError::InvalidState);
        }
        let file = self.storage.open_file(path).await.map_err(PlayerError::Io)?;
        self.shared.ring.reset();
        self.shared.paused.store(false, Ordering::SeqCst);
        self.shared.finished.store(false, Ordering::SeqCst);
        self.shared.playing.store(true, Ordering::SeqCst);
        self.clock.arm();
        self.shared.session.signal(file);
        Ok(())
    }

    /// Freeze the output, keeping the session alive.
    ///
    /// The read cursor stops advancing and the DAC holds its last level.
    /// Idempotent while a session is active.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::InvalidState`] when no session is active.
    pub fn pause(&mut self) -> Result<(), PlayerError<S::Error>> {
        if !self.session_active() {
            return Err(PlayerError::InvalidState);
        }
        self.shared.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Unfreeze the output; playback continues from the frozen position.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::InvalidState`] when no session is active.
    pub fn resume(&mut self) -> Result<(), PlayerError<S::Error>> {
        if !self.session_active() {
            return Err(PlayerError::InvalidState);
        }
        self.shared.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// End the session. Always succeeds; stopping a stopped engine is a
    /// no-op.
    ///
    /// Disarms the sample clock, drops any session file the worker never
    /// received, waits for the worker to park, then clears the ring. On
    /// return: cursors equal, `playing`/`paused`/`finished` all false.
    pub async fn stop(&mut self) {
        self.clock.disarm();
        self.shared.playing.store(false, Ordering::SeqCst);
        self.shared.paused.store(false, Ordering::SeqCst);
        self.shared.session.reset();
        // Store-then-load handshake with the worker (see module docs for
        // why these flag ops are SeqCst).
        while !self.shared.refill_idle.load(Ordering::SeqCst) {
            Timer::after_millis(STOP_POLL_MS).await;
        }
        self.shared.finished.store(false, Ordering::SeqCst);
        // SAFETY: the clock is disarmed and the worker has parked
        // (rendezvous above), so neither handle touches the ring.
        unsafe { self.shared.ring.clear() };
    }

    /// Consume the playout-complete latch.
    ///
    /// Returns `true` exactly once after a track reached end-of-file and
    /// the ring fully drained; `false` again until the next session ends
    /// that way.
    pub fn has_finished(&self) -> bool {
        self.shared.finished.swap(false, Ordering::SeqCst)
    }

    /// A session is live (including paused).
    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::SeqCst)
    }

    /// The output is frozen.
    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// Bytes currently buffered in the ring.
    pub fn buffered(&self) -> usize {
        self.shared.ring.len()
    }

    /// Direct access to the storage backend, for control-context work
    /// between sessions (directory listing at boot).
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// A session counts as active until the worker has parked, so a
    /// `play()` racing the worker's teardown cannot re-arm the clock the
    /// teardown is about to disarm.
    fn session_active(&self) -> bool {
        self.shared.playing.load(Ordering::SeqCst)
            || !self.shared.refill_idle.load(Ordering::SeqCst)
    }
}

impl<F, K> Refill<'_, F, K>
where
    F: File,
    K: SampleClock,
{
    /// Worker loop: park on the session slot, stream each delivered file.
    /// Never returns; wrap it in a task.
    pub async fn run(&mut self) {
        loop {
            let file = self.shared.session.wait().await;
            self.stream(file).await;
        }
    }

    /// One session: pump the file into the ring, drain after end-of-file,
    /// then tear down and park.
    async fn stream(&mut self, mut file: F) {
        self.shared.refill_idle.store(false, Ordering::SeqCst);
        let completed = self.pump(&mut file).await && self.drain().await;
        if completed {
            self.shared.playing.store(false, Ordering::SeqCst);
            self.clock.disarm();
            self.shared.finished.store(true, Ordering::SeqCst);
        }
        // On a stop() abort the control side owns cleanup; the worker just
        // drops the file and parks.
        drop(file);
        self.shared.refill_idle.store(true, Ordering::SeqCst);
    }

    /// Stream `file` into the ring chunk by chunk.
    ///
    /// Returns `true` on end-of-file (including a read fault, which ends
    /// the stream the same way: whatever is buffered plays out), `false`
    /// when a `stop()` aborted the session.
    async fn pump(&mut self, file: &mut F) -> bool {
        let mut chunk = [0u8; REFILL_CHUNK];
        loop {
            if !self.shared.playing.load(Ordering::SeqCst) {
                return false;
            }
            if self.shared.paused.load(Ordering::SeqCst) {
                Timer::after_millis(PAUSE_POLL_MS).await;
                continue;
            }
            if self.producer.free() < REFILL_CHUNK {
                Timer::after_millis(BACKPRESSURE_POLL_MS).await;
                continue;
            }
            match file.read(&mut chunk).await {
                Ok(0) => return true,
                Ok(n) => {
                    let n = n.min(REFILL_CHUNK);
                    // The free check above bounds the push: the consumer
                    // only ever grows free space.
                    #[allow(clippy::indexing_slicing)] // Safety: n <= chunk.len() just clamped
                    self.producer.push_slice(&chunk[..n]);
                    if n < REFILL_CHUNK {
                        return true;
                    }
                }
                Err(_) => return true,
            }
        }
    }

    /// Poll until the consumer drains the ring.
    ///
    /// While paused the consumer is frozen, so the drain completes only
    /// after resume. Returns `false` when a `stop()` aborted the drain.
    async fn drain(&mut self) -> bool {
        while !self.shared.ring.is_empty() {
            if !self.shared.playing.load(Ordering::SeqCst) {
                return false;
            }
            Timer::after_millis(DRAIN_POLL_MS).await;
        }
        true
    }
}

impl<F, D> SampleFeed<'_, F, D>
where
    D: MonoDac,
{
    /// One sample period: pop a byte and latch it into the DAC.
    ///
    /// Does nothing while stopped or paused. On underrun (ring empty
    /// mid-session) it also does nothing — the DAC holds its last level and
    /// playback resumes from the live read cursor when data arrives.
    /// Non-blocking; callable from the clock context.
    pub fn tick(&mut self) {
        if !self.shared.playing.load(Ordering::SeqCst)
            || self.shared.paused.load(Ordering::SeqCst)
        {
            return;
        }
        if let Some(level) = self.consumer.pop() {
            self.dac.write_level(level);
        }
    }
}
