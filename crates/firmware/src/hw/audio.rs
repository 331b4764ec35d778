//! Speaker DAC and the 8 kHz sample clock.
//!
//! The clock is an embassy [`Ticker`] inside [`sample_feed_task`], which
//! runs on the interrupt executor so ticks preempt SD reads on the thread
//! executor. [`TickerGate`] is the control-side handle: `arm` wakes the
//! task, `disarm` makes it park again.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_stm32::dac::{DacCh1, Value};
use embassy_stm32::dma::NoDma;
use embassy_stm32::peripherals::DAC1;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};

use platform::{MonoDac, SampleClock};
use playback::engine::{SampleFeed, TICK_PERIOD_US};

use super::storage::SdFile;

/// DAC channel 1 on PA4, 8-bit right-aligned.
pub type SpeakerDac = DacCh1<'static, DAC1, NoDma>;

/// Mono speaker output through the on-chip DAC.
pub struct BoardDac {
    ch: SpeakerDac,
}

impl BoardDac {
    /// Wrap an already-constructed DAC channel.
    pub fn new(ch: SpeakerDac) -> Self {
        Self { ch }
    }
}

impl MonoDac for BoardDac {
    fn write_level(&mut self, level: u8) {
        self.ch.set(Value::Bit8(level));
    }
}

/// Shared state between [`TickerGate`] handles and [`sample_feed_task`].
///
/// Lives in a `static` so the gate handles are `Copy` and the task can be
/// spawned with a plain reference.
pub struct GateState {
    armed: AtomicBool,
    kick: Signal<CriticalSectionRawMutex, ()>,
}

impl GateState {
    /// A disarmed gate.
    pub const fn new() -> Self {
        Self {
            armed: AtomicBool::new(false),
            kick: Signal::new(),
        }
    }

    fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}

impl Default for GateState {
    fn default() -> Self {
        Self::new()
    }
}

/// Control-side handle for the sample clock.
#[derive(Clone, Copy)]
pub struct TickerGate {
    state: &'static GateState,
}

impl TickerGate {
    /// Handle onto `state`.
    pub fn new(state: &'static GateState) -> Self {
        Self { state }
    }
}

impl SampleClock for TickerGate {
    fn arm(&self) {
        self.state.armed.store(true, Ordering::SeqCst);
        self.state.kick.signal(());
    }

    fn disarm(&self) {
        self.state.armed.store(false, Ordering::SeqCst);
    }
}

/// Drive [`SampleFeed::tick`] at the sample rate while the gate is armed.
///
/// Spawn this on the interrupt executor. A fresh [`Ticker`] is created on
/// every arm, so the first sample of a session lands exactly one period
/// after `arm` with no catch-up burst. The park/wake round trip relies on
/// the engine never re-arming before the previous disarm was observed,
/// which `stop()`'s worker rendezvous guarantees.
#[embassy_executor::task]
pub async fn sample_feed_task(
    gate: &'static GateState,
    mut feed: SampleFeed<'static, SdFile, BoardDac>,
) {
    loop {
        gate.kick.wait().await;
        if !gate.is_armed() {
            continue; // stale kick from an already-stopped session
        }
        let mut ticker = Ticker::every(Duration::from_micros(TICK_PERIOD_US));
        while gate.is_armed() {
            feed.tick();
            ticker.next().await;
        }
    }
}
