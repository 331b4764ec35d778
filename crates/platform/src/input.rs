//! Button input abstraction
//!
//! The appliance has three buttons. The input task detects press edges and
//! records them into a [`LatestEvent`] slot that keeps only the newest
//! unconsumed event. The orchestrator drains the slot on its own schedule
//! through [`InputSource`], so a burst of presses between polls collapses
//! to the last press.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Button events, one per physical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    /// Skip to the previous track.
    Previous,
    /// Toggle between playing and paused; starts playback when stopped.
    PauseToggle,
    /// Skip to the next track.
    Next,
}

/// Where the orchestrator gets its button events from.
///
/// `take_last` is non-blocking and consumes the newest pending event;
/// presses that arrived earlier and were never consumed are gone.
pub trait InputSource {
    /// Consume the newest pending event, if any.
    fn take_last(&mut self) -> Option<ButtonEvent>;
}

/// Single-slot, last-wins event mailbox between the input task and the
/// orchestrator.
///
/// [`record`](Self::record) overwrites any unconsumed event;
/// [`take`](Self::take) consumes the newest one. Neither side ever blocks.
pub struct LatestEvent {
    slot: Signal<CriticalSectionRawMutex, ButtonEvent>,
}

impl LatestEvent {
    /// Create an empty slot. `const` so it can live in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self { slot: Signal::new() }
    }

    /// Record an event, replacing any event not yet consumed.
    pub fn record(&self, event: ButtonEvent) {
        self.slot.signal(event);
    }

    /// Consume the newest event, leaving the slot empty.
    pub fn take(&self) -> Option<ButtonEvent> {
        self.slot.try_take()
    }
}

impl Default for LatestEvent {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for &LatestEvent {
    fn take_last(&mut self) -> Option<ButtonEvent> {
        self.take()
    }
}
