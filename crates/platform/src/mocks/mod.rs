//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests. The playback and firmware
//! crates drive their host tests through these types.

#![cfg(any(test, feature = "std"))]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::*;

/// Mock DAC that records every level written.
///
/// Clones share the same recording, so a test can keep one handle while the
/// sample feed owns another.
#[derive(Clone, Default)]
pub struct MockDac {
    levels: Arc<Mutex<Vec<u8>>>,
}

impl MockDac {
    /// Create a new mock DAC with an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every level written so far, oldest first.
    #[must_use]
    pub fn levels(&self) -> Vec<u8> {
        self.levels.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The most recent level written, if any.
    #[must_use]
    pub fn last_level(&self) -> Option<u8> {
        self.levels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }
}

impl MonoDac for MockDac {
    fn write_level(&mut self, level: u8) {
        self.levels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(level);
    }
}

/// Mock sample clock that records arm/disarm calls.
#[derive(Clone, Default)]
pub struct MockClock {
    armed: Arc<AtomicBool>,
    arms: Arc<AtomicUsize>,
    disarms: Arc<AtomicUsize>,
}

impl MockClock {
    /// Create a new, disarmed mock clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the clock is currently armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Relaxed)
    }

    /// How many times `arm` has been called.
    #[must_use]
    pub fn arm_count(&self) -> usize {
        self.arms.load(Ordering::Relaxed)
    }

    /// How many times `disarm` has been called.
    #[must_use]
    pub fn disarm_count(&self) -> usize {
        self.disarms.load(Ordering::Relaxed)
    }
}

impl SampleClock for MockClock {
    fn arm(&self) {
        self.armed.store(true, Ordering::Relaxed);
        self.arms.fetch_add(1, Ordering::Relaxed);
    }

    fn disarm(&self) {
        self.armed.store(false, Ordering::Relaxed);
        self.disarms.fetch_add(1, Ordering::Relaxed);
    }
}

/// Error type for [`MockStorage`], [`MockFile`] and [`MockMount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockStorageError {
    /// No file with that path was inserted.
    NotFound,
    /// The directory listing was configured to fail.
    ListFault,
    /// The file was configured to fail partway through reading.
    ReadFault,
    /// The mount manager was configured to fail.
    MountFault,
}

/// An in-memory file with an optional injected read fault.
pub struct MockFile {
    data: Vec<u8>,
    pos: usize,
    fail_after: Option<usize>,
}

impl File for MockFile {
    type Error = MockStorageError;

    #[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)] // Safety: pos <= data.len(); n <= remaining and n <= buf.len()
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if let Some(limit) = self.fail_after {
            if self.pos >= limit {
                return Err(MockStorageError::ReadFault);
            }
        }
        let remaining = self.data.len().saturating_sub(self.pos);
        let n = remaining.min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

struct MockEntry {
    name: String,
    data: Vec<u8>,
    fail_after: Option<usize>,
    phantom: bool,
}

/// In-memory storage holding named byte blobs.
///
/// `list_dir` returns names in insertion order and ignores its path
/// argument; pair it with [`MockMount`], whose mount point is empty, so
/// joined track paths are bare names.
#[derive(Default)]
pub struct MockStorage {
    entries: Vec<MockEntry>,
    fail_list: bool,
}

impl MockStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file.
    pub fn insert(&mut self, name: &str, data: &[u8]) {
        self.entries.push(MockEntry {
            name: name.to_owned(),
            data: data.to_vec(),
            fail_after: None,
            phantom: false,
        });
    }

    /// Insert a file whose reads fail once `fail_after` bytes were read.
    pub fn insert_faulty(&mut self, name: &str, data: &[u8], fail_after: usize) {
        self.entries.push(MockEntry {
            name: name.to_owned(),
            data: data.to_vec(),
            fail_after: Some(fail_after),
            phantom: false,
        });
    }

    /// Insert a name that shows up in listings but cannot be opened.
    pub fn insert_phantom(&mut self, name: &str) {
        self.entries.push(MockEntry {
            name: name.to_owned(),
            data: Vec::new(),
            fail_after: None,
            phantom: true,
        });
    }

    /// Make every `list_dir` call fail.
    pub fn fail_listing(&mut self) {
        self.fail_list = true;
    }
}

impl Storage for MockStorage {
    type Error = MockStorageError;
    type File = MockFile;

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        self.entries
            .iter()
            .find(|entry| !entry.phantom && entry.name == path)
            .map(|entry| MockFile {
                data: entry.data.clone(),
                pos: 0,
                fail_after: entry.fail_after,
            })
            .ok_or(MockStorageError::NotFound)
    }

    async fn list_dir(&mut self, _path: &str) -> Result<TrackNames, Self::Error> {
        if self.fail_list {
            return Err(MockStorageError::ListFault);
        }
        let mut names = TrackNames::new();
        for entry in &self.entries {
            let mut track = TrackName::new();
            track
                .push_str(&entry.name)
                .map_err(|_| MockStorageError::ListFault)?;
            names
                .push(track)
                .map_err(|_| MockStorageError::ListFault)?;
        }
        Ok(names)
    }
}

/// Mock mount manager with an empty mount point.
#[derive(Default)]
pub struct MockMount {
    fail_mount: bool,
    mounted: bool,
}

impl MockMount {
    /// Create a mount manager that mounts successfully.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mount manager whose `mount` call fails.
    #[must_use]
    pub fn failing() -> Self {
        Self { fail_mount: true, mounted: false }
    }

    /// Whether `mount` has succeeded without a later `unmount`.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

impl MountManager for MockMount {
    type Error = MockStorageError;

    async fn mount(&mut self) -> Result<(), Self::Error> {
        if self.fail_mount {
            return Err(MockStorageError::MountFault);
        }
        self.mounted = true;
        Ok(())
    }

    async fn unmount(&mut self) -> Result<(), Self::Error> {
        self.mounted = false;
        Ok(())
    }

    fn mount_point(&self) -> &str {
        ""
    }
}

/// Mock input source that replays a scripted sequence of take results.
pub struct MockInput {
    script: heapless::Deque<Option<ButtonEvent>, 16>,
}

impl MockInput {
    /// Create an input source with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self { script: heapless::Deque::new() }
    }

    /// Append one take result to the script.
    pub fn push(&mut self, result: Option<ButtonEvent>) -> Result<(), Option<ButtonEvent>> {
        self.script.push_back(result)
    }
}

impl Default for MockInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for MockInput {
    fn take_last(&mut self) -> Option<ButtonEvent> {
        self.script.pop_front().flatten()
    }
}

/// Mock power control that records deep-sleep requests instead of sleeping.
#[derive(Clone, Default)]
pub struct MockPower {
    sleeps: Arc<AtomicUsize>,
}

impl MockPower {
    /// Create a mock power control.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times deep sleep was requested.
    #[must_use]
    pub fn sleep_count(&self) -> usize {
        self.sleeps.load(Ordering::Relaxed)
    }
}

impl PowerControl for MockPower {
    type Error = core::convert::Infallible;

    fn deep_sleep(&mut self) -> Result<(), Self::Error> {
        self.sleeps.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Liveness seam that counts feeds.
#[derive(Clone, Default)]
pub struct FeedCounter {
    feeds: Arc<AtomicUsize>,
}

impl FeedCounter {
    /// Create a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `feed` has been called.
    #[must_use]
    pub fn count(&self) -> usize {
        self.feeds.load(Ordering::Relaxed)
    }
}

impl Liveness for FeedCounter {
    fn feed(&mut self) {
        self.feeds.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn mock_dac_records_levels() {
        let mut dac = MockDac::new();
        let probe = dac.clone();
        dac.write_level(0x80);
        dac.write_level(0xFF);
        assert_eq!(probe.levels(), vec![0x80, 0xFF]);
        assert_eq!(probe.last_level(), Some(0xFF));
    }

    #[test]
    fn mock_clock_tracks_armed_state() {
        let clock = MockClock::new();
        assert!(!clock.is_armed());
        clock.arm();
        assert!(clock.is_armed());
        assert_eq!(clock.arm_count(), 1);
        clock.disarm();
        assert!(!clock.is_armed());
        assert_eq!(clock.disarm_count(), 1);
    }

    #[tokio::test]
    async fn mock_storage_lists_and_opens() {
        let mut storage = MockStorage::new();
        storage.insert("a.pcm", &[1, 2, 3]);
        storage.insert("b.pcm", &[4]);
        let names = storage.list_dir("").await.unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].as_str(), "a.pcm");

        let mut file = storage.open_file("a.pcm").await.unwrap();
        assert_eq!(file.size(), 3);
        let mut buf = [0u8; 8];
        assert_eq!(file.read(&mut buf).await.unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(file.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mock_storage_missing_file() {
        let mut storage = MockStorage::new();
        assert_eq!(
            storage.open_file("nope.pcm").await.err(),
            Some(MockStorageError::NotFound)
        );
    }

    #[tokio::test]
    async fn mock_storage_phantom_is_listed_but_unopenable() {
        let mut storage = MockStorage::new();
        storage.insert_phantom("ghost.pcm");
        let names = storage.list_dir("").await.unwrap();
        assert_eq!(names[0].as_str(), "ghost.pcm");
        assert_eq!(
            storage.open_file("ghost.pcm").await.err(),
            Some(MockStorageError::NotFound)
        );
    }

    #[tokio::test]
    async fn mock_file_read_fault_fires_at_threshold() {
        let mut storage = MockStorage::new();
        storage.insert_faulty("bad.pcm", &[0u8; 16], 8);
        let mut file = storage.open_file("bad.pcm").await.unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(file.read(&mut buf).await.unwrap(), 8);
        assert_eq!(
            file.read(&mut buf).await.err(),
            Some(MockStorageError::ReadFault)
        );
    }

    #[test]
    fn mock_input_replays_script() {
        let mut input = MockInput::new();
        input.push(None).unwrap();
        input.push(Some(ButtonEvent::Next)).unwrap();
        assert_eq!(input.take_last(), None);
        assert_eq!(input.take_last(), Some(ButtonEvent::Next));
        assert_eq!(input.take_last(), None);
    }

    #[test]
    fn mock_power_counts_sleep_requests() {
        let mut power = MockPower::new();
        let probe = power.clone();
        power.deep_sleep().unwrap();
        assert_eq!(probe.sleep_count(), 1);
    }
}
