//! Application configuration and constants
//!
//! Central configuration values used across the appliance. Branding, bounds,
//! and timing constants should reference these rather than hardcoding values.
//! Audio-path constants (sample rate, ring capacity, chunk size) live with the
//! engine in the `playback` crate; everything here is application-level.

/// The appliance name
pub const APP_NAME: &str = "Driftbox";

/// The appliance type/category
pub const APP_TYPE: &str = "BGM appliance"; // looping background-music box

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of tracks the bounded track list can hold.
///
/// Listing a directory with more entries fails with the capacity error
/// rather than silently dropping tracks.
pub const MAX_TRACKS: usize = 64;

/// Maximum length in bytes of a single directory entry name.
pub const MAX_TRACK_NAME: usize = 64;

/// Maximum length in bytes of a full track path (mount point + `/` + name).
pub const MAX_PATH: usize = 128;

/// Dispatch loop period — the orchestrator polls the input slot and the
/// engine completion flag at this interval (~10 Hz).
pub const DISPATCH_PERIOD_MS: u64 = 100;

/// Delay after a button falling edge before the level is sampled again;
/// a press is recorded only if the line is still low. Filters switch
/// bounce shorter than one delay.
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Power-switch poll period.
pub const POWER_POLL_MS: u64 = 100;

/// Delay before re-checking the power switch to confirm an off glitch-free.
pub const POWER_DEBOUNCE_MS: u64 = 100;

/// Fault-trap blink phase length (500 ms on, 500 ms off → 1 Hz).
pub const FAULT_BLINK_MS: u64 = 500;

/// Fault-trap watchdog feed slice — the trap feeds the liveness seam at this
/// interval inside each blink phase so the watchdog never fires while the
/// trap is signalling.
pub const FAULT_FEED_SLICE_MS: u64 = 10;
