//! Hardware Abstraction Layer (HAL) for the Driftbox BGM appliance
//!
//! This crate provides trait-based abstractions for every hardware seam the
//! appliance has, enabling development and testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate — jukebox, fault trap)
//!         ↓
//! Engine Layer (playback — sample ring, refill worker, track state)
//!         ↓
//! Platform HAL (this crate — trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Abstraction Surfaces
//!
//! - [`Storage`] / [`File`] — music volume access (open + directory listing)
//! - [`MountManager`] — removable-card attach/detach
//! - [`MonoDac`] — one 8-bit PCM level per sample tick
//! - [`SampleClock`] — arm/disarm gate for the fixed 8 kHz tick source
//! - [`InputSource`] / [`LatestEvent`] — last-wins button events
//! - [`PowerControl`] / [`Liveness`] — deep sleep and watchdog feeding
//!
//! # Features
//!
//! - `std` — standard-library implementations (`storage_local`, `mocks`) for
//!   the desktop emulator and host tests
//! - `defmt` — `defmt::Format` derives on platform types (hardware builds)

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::missing_panics_doc)] // fallible paths return Result instead
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod audio;
pub mod config;
pub mod input;
pub mod power;
pub mod storage;

#[cfg(any(test, feature = "std"))]
pub mod mocks;
#[cfg(any(test, feature = "std"))]
pub mod storage_local;

// Re-export main high-level traits
pub use audio::{MonoDac, SampleClock};
pub use input::{ButtonEvent, InputSource, LatestEvent};
pub use power::{Liveness, NoopLiveness, PowerControl};
pub use storage::{
    join_path, File, MountManager, PathOverflow, Storage, TrackName, TrackNames, TrackPath,
};
