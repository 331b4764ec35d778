//! Local filesystem Storage implementation for the desktop emulator.
//!
//! `LocalFileStorage` implements `platform::Storage` using `std::fs`.
//! Used when the `std` feature is enabled (emulator and host-test builds).
//! All paths are resolved relative to the `music_root` provided at
//! construction, so [`LocalMount::mount_point`] is the empty string and
//! joined track paths are bare file names.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::storage::{File, MountManager, Storage, TrackName, TrackNames};

/// Error type for local filesystem operations.
#[derive(Debug)]
pub enum LocalStorageError {
    /// Underlying filesystem error.
    Io(std::io::Error),
    /// A directory entry name is not valid UTF-8.
    NonUtf8Name,
    /// A directory entry name exceeds the track-name capacity.
    NameTooLong,
    /// The directory holds more entries than the track-list capacity.
    TooManyTracks,
}

impl core::fmt::Display for LocalStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "local storage error: {e}"),
            Self::NonUtf8Name => write!(f, "directory entry name is not valid UTF-8"),
            Self::NameTooLong => write!(f, "directory entry name exceeds track-name capacity"),
            Self::TooManyTracks => write!(f, "directory holds more entries than the track list"),
        }
    }
}

impl std::error::Error for LocalStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// An open file on the local filesystem.
pub struct LocalFile {
    inner: fs::File,
    size: u64,
}

impl File for LocalFile {
    type Error = LocalStorageError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Read::read(&mut self.inner, buf).map_err(LocalStorageError::Io)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// A `platform::Storage` implementation backed by `std::fs`.
///
/// Paths passed to [`LocalFileStorage::open_file`] and
/// [`LocalFileStorage::list_dir`] are resolved relative to the `music_root`
/// provided at construction.
///
/// # Example
/// ```ignore
/// # async fn example() {
/// use platform::storage_local::LocalFileStorage;
/// use platform::Storage;
/// let mut storage = LocalFileStorage::new("/home/user/music");
/// let file = storage.open_file("ambient.pcm").await.unwrap();
/// # }
/// ```
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create a new storage rooted at `music_root`.
    #[must_use]
    pub fn new(music_root: &str) -> Self {
        Self { root: PathBuf::from(music_root) }
    }

    /// Create from the `DRIFTBOX_MUSIC` environment variable.
    ///
    /// Returns `None` if `DRIFTBOX_MUSIC` is not set or is not valid UTF-8.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var("DRIFTBOX_MUSIC").ok().map(|p| Self::new(&p))
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Storage for LocalFileStorage {
    type Error = LocalStorageError;
    type File = LocalFile;

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let full = self.resolve(path);
        let file = fs::File::open(&full).map_err(LocalStorageError::Io)?;
        let meta = file.metadata().map_err(LocalStorageError::Io)?;
        Ok(LocalFile { inner: file, size: meta.len() })
    }

    async fn list_dir(&mut self, path: &str) -> Result<TrackNames, Self::Error> {
        let full = self.resolve(path);
        let mut names = TrackNames::new();
        for entry in fs::read_dir(&full).map_err(LocalStorageError::Io)? {
            let entry = entry.map_err(LocalStorageError::Io)?;
            let kind = entry.file_type().map_err(LocalStorageError::Io)?;
            if kind.is_dir() {
                continue;
            }
            let os_name = entry.file_name();
            let name = os_name.to_str().ok_or(LocalStorageError::NonUtf8Name)?;
            let mut track = TrackName::new();
            track.push_str(name).map_err(|_| LocalStorageError::NameTooLong)?;
            names.push(track).map_err(|_| LocalStorageError::TooManyTracks)?;
        }
        Ok(names)
    }
}

/// A [`MountManager`] over a local directory.
///
/// `mount` verifies the directory is readable; `unmount` is a no-op. The
/// mount point is the empty string because [`LocalFileStorage`] already
/// resolves paths under its root.
pub struct LocalMount {
    root: PathBuf,
}

impl LocalMount {
    /// Create a mount manager over `music_root`.
    #[must_use]
    pub fn new(music_root: &str) -> Self {
        Self { root: PathBuf::from(music_root) }
    }
}

impl MountManager for LocalMount {
    type Error = LocalStorageError;

    async fn mount(&mut self) -> Result<(), Self::Error> {
        fs::read_dir(&self.root).map(|_| ()).map_err(LocalStorageError::Io)
    }

    async fn unmount(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn mount_point(&self) -> &str {
        ""
    }
}
