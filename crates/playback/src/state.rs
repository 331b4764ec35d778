//! Track-selection state machine.
//!
//! `PlayerState` is a pure, `no_std`, allocation-free state machine that
//! tracks which entry of a bounded track list is selected and whether the
//! player is stopped, playing, or paused.
//!
//! It deliberately has **no** I/O — it does not open files or drive the
//! engine. The orchestrator reads the selection, issues engine calls, and
//! writes the status back. This separation makes the state machine trivially
//! testable on the host.

use platform::{TrackName, TrackNames};

/// Current player status, as the orchestrator last recorded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerStatus {
    /// No session is active.
    Stopped,
    /// A track is streaming to the DAC.
    Playing,
    /// A session is active but the output is frozen.
    Paused,
}

/// Bounded track list with a wrapping selection index.
///
/// The index survives stop/play cycles: selection is independent of engine
/// session state. Whenever the list is non-empty, `current < len()`.
pub struct PlayerState {
    tracks: TrackNames,
    current: usize,
    status: PlayerStatus,
}

impl PlayerState {
    /// Build a state machine over `tracks`, selecting index 0, `Stopped`.
    #[must_use]
    pub fn from_tracks(tracks: TrackNames) -> Self {
        Self {
            tracks,
            current: 0,
            status: PlayerStatus::Stopped,
        }
    }

    /// Name of the selected track, or `None` when the list is empty.
    pub fn current_track(&self) -> Option<&str> {
        self.tracks.get(self.current).map(TrackName::as_str)
    }

    /// Advance the selection by one, wrapping from the last track to the
    /// first. Returns the newly selected name; no-op `None` on an empty
    /// list.
    #[allow(clippy::arithmetic_side_effects)] // Safety: current < len() <= MAX_TRACKS, and len() > 0 here
    pub fn next(&mut self) -> Option<&str> {
        if self.tracks.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.tracks.len();
        self.current_track()
    }

    /// Move the selection back by one, wrapping from the first track to the
    /// last. Returns the newly selected name; no-op `None` on an empty
    /// list.
    #[allow(clippy::arithmetic_side_effects)] // Safety: len() > 0 here, so len() - 1 cannot underflow
    pub fn prev(&mut self) -> Option<&str> {
        if self.tracks.is_empty() {
            return None;
        }
        self.current = if self.current == 0 {
            self.tracks.len() - 1
        } else {
            self.current - 1
        };
        self.current_track()
    }

    /// Record the player status.
    pub fn set_status(&mut self, status: PlayerStatus) {
        self.status = status;
    }

    /// The last recorded status.
    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    /// Number of tracks in the list.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// `true` when the track list is empty.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
