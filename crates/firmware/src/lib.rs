//! Driftbox firmware
//!
//! Battery-operated background-music appliance: raw 8-bit PCM tracks stream
//! from a removable card through a lock-free sample ring into a mono DAC at
//! a fixed 8 kHz.
//!
//! # Architecture
//!
//! ```text
//! Orchestrator (jukebox, fault)
//!         ↓ control surface
//! Playback engine (playback crate)
//!         ↓ platform traits
//! Board drivers (hw module, hardware builds only)
//!         ↓
//! Platform HAL (Embassy, STM32)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the STM32H7 target (embassy, embedded HAL)
//! - `emulator` - Build for desktop testing (tokio, local-directory storage)
//! - `std` - Enable standard library (for emulator and testing)
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```
//!
//! ## Emulator Target
//!
//! ```bash
//! DRIFTBOX_MUSIC=~/music cargo run --example player_emulator --features emulator
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]

pub mod fault;
pub mod jukebox;

#[cfg(feature = "hardware")]
pub mod hw;

// Re-export key types
pub use jukebox::{Jukebox, StartError};
