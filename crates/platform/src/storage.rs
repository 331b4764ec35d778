//! Storage abstraction for the music volume
//!
//! The appliance reads raw PCM tracks from a removable FAT card. Three seams
//! cover that: [`MountManager`] attaches/detaches the volume, [`Storage`]
//! opens files and lists the music directory, and [`File`] streams bytes.
//!
//! Directory listings are bounded: at most [`MAX_TRACKS`](crate::config::MAX_TRACKS)
//! names of at most [`MAX_TRACK_NAME`](crate::config::MAX_TRACK_NAME) bytes
//! each. Implementations report capacity overflow as an error instead of
//! truncating — a truncated name could never be opened again.

use crate::config::{MAX_PATH, MAX_TRACKS, MAX_TRACK_NAME};

/// One directory entry name.
pub type TrackName = heapless::String<MAX_TRACK_NAME>;

/// Bounded list of entry names, in the order the backend yields them.
pub type TrackNames = heapless::Vec<TrackName, MAX_TRACKS>;

/// A full path to a track (mount point + separator + name).
pub type TrackPath = heapless::String<MAX_PATH>;

/// Storage trait for music volume access
pub trait Storage {
    /// Error type
    type Error: core::fmt::Debug;
    /// File type
    type File: File;

    /// Open file for reading
    fn open_file(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<Self::File, Self::Error>>;

    /// List the plain entries of a directory.
    ///
    /// The `.`/`..` pseudo-entries never appear; backends that can tell also
    /// skip subdirectories. Order is whatever the backend yields.
    fn list_dir(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<TrackNames, Self::Error>>;
}

/// File trait for reading tracks
pub trait File {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read from the current position; `Ok(n < buf.len())` signals
    /// end-of-file per the streaming contract.
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Get file size
    fn size(&self) -> u64;
}

/// Removable-volume attach/detach.
///
/// On hardware this owns the SPI bus bring-up and FAT mount; on the desktop
/// it validates a local directory. Mount and unmount failures are I/O-class
/// errors the boot sequence escalates to the fatal trap.
pub trait MountManager {
    /// Error type
    type Error: core::fmt::Debug;

    /// Attach the volume. Idempotence is implementation-defined; the
    /// appliance mounts exactly once at boot.
    fn mount(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Detach the volume and release the bus.
    fn unmount(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Root under which [`Storage`] paths live. May be empty (FAT root) and
    /// may or may not carry a trailing slash; [`join_path`] tolerates both.
    fn mount_point(&self) -> &str;
}

/// Joining a mount point and an entry name would exceed [`TrackPath`] capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PathOverflow;

/// Join a mount point and an entry name with exactly one `/` separator.
///
/// Tolerates a base with or without a trailing slash; an empty base yields
/// the bare name (FAT-root semantics).
///
/// # Errors
///
/// Returns [`PathOverflow`] when the joined path does not fit `TrackPath` —
/// the path is never truncated.
pub fn join_path(base: &str, name: &str) -> Result<TrackPath, PathOverflow> {
    let mut path = TrackPath::new();
    path.push_str(base).map_err(|_| PathOverflow)?;
    if !base.is_empty() && !base.ends_with('/') {
        path.push('/').map_err(|_| PathOverflow)?;
    }
    path.push_str(name).map_err(|_| PathOverflow)?;
    Ok(path)
}
