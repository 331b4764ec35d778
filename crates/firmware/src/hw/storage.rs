//! FAT storage on an SPI SD card.
//!
//! [`embedded_sdmmc`] owns the card and the filesystem; everything goes
//! through one [`SdState`] behind a critical-section mutex so the refill
//! worker and the control surface can both hold handles. Raw directory
//! and file tokens keep the borrow-free [`Storage`]/[`File`] shapes —
//! [`SdFile`] closes its token on drop.
//!
//! Reads are blocking SPI in thread mode. At 400 kHz the bus moves a
//! 256-byte chunk in ~6 ms while the ring holds ~512 ms of audio, so the
//! sample feed on the interrupt executor never starves behind a read.

use core::cell::RefCell;
use core::fmt::Write as _;

use embassy_stm32::dma::NoDma;
use embassy_stm32::gpio::{AnyPin, Output};
use embassy_stm32::peripherals::SPI1;
use embassy_stm32::spi::Spi;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::{
    Mode, RawDirectory, RawFile, RawVolume, SdCard, SdCardError, TimeSource, Timestamp,
    VolumeIdx, VolumeManager,
};

use platform::{File, MountManager, Storage, TrackName, TrackNames};

/// The SD card's SPI device: exclusive bus with a software CS pin.
pub type SdSpi = ExclusiveDevice<Spi<'static, SPI1, NoDma, NoDma>, Output<'static, AnyPin>, Delay>;

type SdBlockDevice = SdCard<SdSpi, Delay>;
type BackingError = embedded_sdmmc::Error<SdCardError>;

/// Storage failures surfaced to the engine and the boot path.
#[derive(Debug, defmt::Format)]
pub enum SdError {
    /// An operation before `mount` succeeded.
    NotMounted,
    /// The music directory holds more entries than a listing can carry.
    /// Truncating instead would list names that can never be opened.
    TooManyTracks,
    /// Card or filesystem error from the backing stack.
    Backing(BackingError),
}

/// FAT timestamps for files we never write. The appliance has no RTC, so
/// every timestamp the library asks for is pinned to the epoch below.
struct FixedClock;

impl TimeSource for FixedClock {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 55, // 2025
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

struct MountHandles {
    volume: RawVolume,
    root: RawDirectory,
}

struct SdInner {
    mgr: VolumeManager<SdBlockDevice, FixedClock>,
    mounted: Option<MountHandles>,
}

impl SdInner {
    fn mount(&mut self) -> Result<(), SdError> {
        if self.mounted.is_some() {
            return Ok(());
        }
        let volume = self
            .mgr
            .open_raw_volume(VolumeIdx(0))
            .map_err(SdError::Backing)?;
        let root = match self.mgr.open_root_dir(volume) {
            Ok(root) => root,
            Err(e) => {
                let _ = self.mgr.close_volume(volume);
                return Err(SdError::Backing(e));
            }
        };
        self.mounted = Some(MountHandles { volume, root });
        Ok(())
    }

    fn unmount(&mut self) -> Result<(), SdError> {
        if let Some(handles) = self.mounted.take() {
            let root_res = self.mgr.close_dir(handles.root);
            let volume_res = self.mgr.close_volume(handles.volume);
            root_res.map_err(SdError::Backing)?;
            volume_res.map_err(SdError::Backing)?;
        }
        Ok(())
    }

    fn list_root(&mut self) -> Result<TrackNames, SdError> {
        let root = self.mounted.as_ref().ok_or(SdError::NotMounted)?.root;
        let mut names = TrackNames::new();
        let mut overflow = false;
        self.mgr
            .iterate_dir(root, |entry| {
                // Subdirectories and the volume label are not tracks.
                if entry.attributes.is_directory() || entry.attributes.is_volume() {
                    return;
                }
                let mut name = TrackName::new();
                if write!(name, "{}", entry.name).is_err() || names.push(name).is_err() {
                    overflow = true;
                }
            })
            .map_err(SdError::Backing)?;
        if overflow {
            return Err(SdError::TooManyTracks);
        }
        Ok(names)
    }

    fn open(&mut self, path: &str) -> Result<(RawFile, u32), SdError> {
        let root = self.mounted.as_ref().ok_or(SdError::NotMounted)?.root;
        let file = self
            .mgr
            .open_file_in_dir(root, path, Mode::ReadOnly)
            .map_err(SdError::Backing)?;
        match self.mgr.file_length(file) {
            Ok(len) => Ok((file, len)),
            Err(e) => {
                let _ = self.mgr.close_file(file);
                Err(SdError::Backing(e))
            }
        }
    }

    fn read(&mut self, file: RawFile, buf: &mut [u8]) -> Result<usize, SdError> {
        match self.mgr.read(file, buf) {
            Ok(n) => Ok(n),
            // The engine's streaming contract wants a short or zero read at
            // the end of the track, not an error.
            Err(embedded_sdmmc::Error::EndOfFile) => Ok(0),
            Err(e) => Err(SdError::Backing(e)),
        }
    }

    fn close(&mut self, file: RawFile) {
        let _ = self.mgr.close_file(file);
    }
}

/// The one shared SD stack. Put it in a `StaticCell` and hand out
/// [`SdStorage`]/[`SdMount`] handles.
pub struct SdState {
    inner: Mutex<CriticalSectionRawMutex, RefCell<SdInner>>,
}

impl SdState {
    /// Build the card driver and volume manager on top of `device`.
    pub fn new(device: SdSpi) -> Self {
        let card = SdCard::new(device, Delay);
        Self {
            inner: Mutex::new(RefCell::new(SdInner {
                mgr: VolumeManager::new(card, FixedClock),
                mounted: None,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut SdInner) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// [`Storage`] handle over the shared SD stack.
#[derive(Clone, Copy)]
pub struct SdStorage {
    state: &'static SdState,
}

impl SdStorage {
    /// Handle onto `state`.
    pub fn new(state: &'static SdState) -> Self {
        Self { state }
    }
}

impl Storage for SdStorage {
    type Error = SdError;
    type File = SdFile;

    async fn open_file(&mut self, path: &str) -> Result<SdFile, SdError> {
        let (handle, size) = self.state.with(|sd| sd.open(path))?;
        Ok(SdFile {
            state: self.state,
            handle,
            size,
        })
    }

    async fn list_dir(&mut self, _path: &str) -> Result<TrackNames, SdError> {
        // The mount point is the FAT root; there is nothing else to list.
        self.state.with(SdInner::list_root)
    }
}

/// [`MountManager`] handle over the shared SD stack.
pub struct SdMount {
    state: &'static SdState,
}

impl SdMount {
    /// Handle onto `state`.
    pub fn new(state: &'static SdState) -> Self {
        Self { state }
    }
}

impl MountManager for SdMount {
    type Error = SdError;

    async fn mount(&mut self) -> Result<(), SdError> {
        self.state.with(SdInner::mount)
    }

    async fn unmount(&mut self) -> Result<(), SdError> {
        self.state.with(SdInner::unmount)
    }

    fn mount_point(&self) -> &str {
        // FAT root: joined track paths are bare 8.3 names.
        ""
    }
}

/// An open track. Closes its directory-entry token when dropped.
pub struct SdFile {
    state: &'static SdState,
    handle: RawFile,
    size: u32,
}

impl File for SdFile {
    type Error = SdError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SdError> {
        self.state.with(|sd| sd.read(self.handle, buf))
    }

    fn size(&self) -> u64 {
        u64::from(self.size)
    }
}

impl Drop for SdFile {
    fn drop(&mut self) {
        self.state.with(|sd| sd.close(self.handle));
    }
}
